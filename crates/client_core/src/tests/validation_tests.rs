use super::*;

fn input(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn signup_schema() -> Schema {
    Schema::new()
        .field(FieldRules::new("name").required("name is required"))
        .field(
            FieldRules::new("email")
                .required("email is required")
                .email("invalid format"),
        )
        .field(
            FieldRules::new("password")
                .required("password is required")
                .min_length(6, "at least 6 characters"),
        )
}

#[test]
fn collects_every_violation_not_just_the_first() {
    let err = signup_schema()
        .validate(&input(&[("email", "nope"), ("password", "abc")]))
        .expect_err("should fail");

    let fields: Vec<&str> = err.fields().collect();
    assert_eq!(fields, vec!["name", "email", "password"]);

    let errors = err.field_errors();
    assert_eq!(errors["name"], "name is required");
    assert_eq!(errors["email"], "invalid format");
    assert_eq!(errors["password"], "at least 6 characters");
}

#[test]
fn required_failure_suppresses_format_rules_for_that_field() {
    let err = signup_schema()
        .validate(&input(&[("name", "Ana"), ("email", "   "), ("password", "secret")]))
        .expect_err("should fail");

    assert_eq!(
        err.violations,
        vec![Violation {
            path: "email".into(),
            message: "email is required".into(),
        }]
    );
}

#[test]
fn equals_field_compares_against_sibling_value() {
    let schema = Schema::new()
        .field(FieldRules::new("password").required("password is required"))
        .field(
            FieldRules::new("passwordConfirmation")
                .equals_field("password", "must match password"),
        );

    assert!(schema
        .validate(&input(&[("password", "abc"), ("passwordConfirmation", "abc")]))
        .is_ok());

    let err = schema
        .validate(&input(&[("password", "abc"), ("passwordConfirmation", "xyz")]))
        .expect_err("mismatch");
    assert_eq!(
        err.field_errors(),
        FieldErrors::from([("passwordConfirmation".to_string(), "must match password".to_string())])
    );

    let err = schema
        .validate(&input(&[("password", "abc")]))
        .expect_err("missing confirmation does not match");
    assert_eq!(err.fields().collect::<Vec<_>>(), vec!["passwordConfirmation"]);
}

#[test]
fn adapter_keeps_first_message_per_field() {
    let err = ValidationError {
        violations: vec![
            Violation {
                path: "email".into(),
                message: "first".into(),
            },
            Violation {
                path: "email".into(),
                message: "second".into(),
            },
        ],
    };
    assert_eq!(err.field_errors()["email"], "first");
}

#[test]
fn email_pattern_accepts_common_addresses() {
    assert!(is_valid_email("user@example.com"));
    assert!(is_valid_email("first.last+tag@sub.example.co"));
    assert!(!is_valid_email("not-an-email"));
    assert!(!is_valid_email("user@localhost"));
    assert!(!is_valid_email("user @example.com"));
}
