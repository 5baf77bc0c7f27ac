use shared::{
    domain::{FormData, ToastMessage},
    protocol::SignInRequest,
};

use super::{field, fields, report_failure, validate_form, FormContext, SubmitError};
use crate::{
    form::FormHandle,
    session::Session,
    validation::{FieldRules, Schema},
};

pub const DASHBOARD_PATH: &str = "/dashboard";

pub fn schema() -> Schema {
    Schema::new()
        .field(
            FieldRules::new(fields::EMAIL)
                .required("email is required")
                .email("invalid format"),
        )
        .field(FieldRules::new(fields::PASSWORD).required("password is required"))
}

fn failed_toast() -> ToastMessage {
    ToastMessage::error("Authentication failed")
        .with_description("Could not sign in, check your credentials")
}

pub struct SignInForm {
    ctx: FormContext,
    form: FormHandle,
    schema: Schema,
}

impl SignInForm {
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

        let request = SignInRequest {
            email: field(&input, fields::EMAIL).trim().to_string(),
            password: field(&input, fields::PASSWORD),
        };

        match self.ctx.api.create_session(&request).await {
            Ok(response) => {
                self.ctx.sessions.sign_in(Session::from(response));
                self.ctx.navigate_from(&self.form, DASHBOARD_PATH);
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
