use std::sync::LazyLock;

use regex::Regex;
use shared::domain::{FieldErrors, FormData};
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    MinLength(usize),
    EqualsField(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("form input has {} validation violation(s)", .violations.len())]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for violation in &self.violations {
            errors
                .entry(violation.path.clone())
                .or_insert_with(|| violation.message.clone());
        }
        errors
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.violations.iter().map(|v| v.path.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FieldRules {
    field: String,
    rules: Vec<(Rule, String)>,
}

impl FieldRules {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.rules.push((rule, message.into()));
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Required, message)
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Email, message)
    }

    pub fn min_length(self, len: usize, message: impl Into<String>) -> Self {
        self.rule(Rule::MinLength(len), message)
    }

    pub fn equals_field(self, other: impl Into<String>, message: impl Into<String>) -> Self {
        self.rule(Rule::EqualsField(other.into()), message)
    }

    fn check(&self, input: &FormData, out: &mut Vec<Violation>) {
        let value = input.get(&self.field).map(String::as_str).unwrap_or("");
        let blank = value.trim().is_empty();

        for (rule, message) in &self.rules {
            let passed = match rule {
                Rule::Required => !blank,
                // blank values are left to `Required`
                Rule::Email => blank || EMAIL_RE.is_match(value.trim()),
                Rule::MinLength(len) => blank || value.chars().count() >= *len,
                Rule::EqualsField(other) => {
                    value == input.get(other).map(String::as_str).unwrap_or("")
                }
            };

            if !passed {
                out.push(Violation {
                    path: self.field.clone(),
                    message: message.clone(),
                });
                if *rule == Rule::Required {
                    break;
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldRules>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    pub fn validate(&self, input: &FormData) -> Result<(), ValidationError> {
        let mut violations = Vec::new();
        for field in &self.fields {
            field.check(input, &mut violations);
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations })
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
