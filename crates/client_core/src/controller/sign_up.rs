use shared::{
    domain::{FormData, ToastMessage},
    protocol::SignUpRequest,
};
use tracing::info;

use super::{field, fields, report_failure, validate_form, FormContext, SubmitError};
use crate::{
    form::FormHandle,
    routing::LANDING_PATH,
    validation::{FieldRules, Schema},
};

pub const MIN_PASSWORD_LEN: usize = 6;

pub fn schema() -> Schema {
    Schema::new()
        .field(FieldRules::new(fields::NAME).required("name is required"))
        .field(
            FieldRules::new(fields::EMAIL)
                .required("email is required")
                .email("invalid format"),
        )
        .field(
            FieldRules::new(fields::PASSWORD)
                .required("password is required")
                .min_length(MIN_PASSWORD_LEN, "password must have at least 6 characters"),
        )
}

fn created_toast() -> ToastMessage {
    ToastMessage::success("Account created").with_description("You can now sign in")
}

fn failed_toast() -> ToastMessage {
    ToastMessage::error("Registration failed")
        .with_description("Could not create your account, try again")
}

pub struct SignUpForm {
    ctx: FormContext,
    form: FormHandle,
    schema: Schema,
}

impl SignUpForm {
    pub fn new(ctx: FormContext, form: FormHandle) -> Self {
        Self {
            ctx,
            form,
            schema: schema(),
        }
    }

    pub fn form(&self) -> &FormHandle {
        &self.form
    }

    pub async fn submit(&self, input: FormData) -> Result<(), SubmitError> {
        let _loading = self.form.begin_submission(&input);
        validate_form(&self.form, &self.schema, &input)?;

        let request = SignUpRequest {
            name: field(&input, fields::NAME).trim().to_string(),
            email: field(&input, fields::EMAIL).trim().to_string(),
            password: field(&input, fields::PASSWORD),
        };
        match self.ctx.api.create_user(&request).await {
            Ok(()) => {
                info!("account created");
                self.ctx.notifier.publish(created_toast());
                self.ctx.navigate_from(&self.form, LANDING_PATH);
                Ok(())
            }
            Err(err) => Err(report_failure(
                &self.ctx,
                &self.form,
                err.into(),
                failed_toast(),
            )),
        }
    }
}
