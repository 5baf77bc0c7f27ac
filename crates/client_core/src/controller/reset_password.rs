use shared::{
    domain::{FormData, ToastMessage},
    protocol::ResetPasswordRequest,
};
use tracing::info;

use super::{field, fields, report_failure, validate_form, FormContext, SubmitError};
use crate::{
    config::RequestPolicy,
    form::FormHandle,
    routing::LANDING_PATH,
    validation::{FieldRules, Schema},
};

pub const TOKEN_PARAM: &str = "token";

pub fn schema() -> Schema {
    Schema::new()
        .field(FieldRules::new(fields::PASSWORD).required("password is required"))
        .field(
            FieldRules::new(fields::PASSWORD_CONFIRMATION)
                .equals_field(fields::PASSWORD, "must match password"),
        )
}

fn reset_toast() -> ToastMessage {
    ToastMessage::success("Password reset")
        .with_description("You can now sign in with your new password")
}

fn failed_toast() -> ToastMessage {
    ToastMessage::error("Password reset failed").with_description(
        "Something went wrong while resetting your password, check your credentials",
    )
}

pub struct ResetPasswordForm {
    ctx: FormContext,
    form: FormHandle,
    policy: RequestPolicy,
    schema: Schema,
}

impl ResetPasswordForm {
    pub fn new(ctx: FormContext, form: FormHandle, policy: RequestPolicy) -> Self {
        Self {
            ctx,
            form,
            policy,
            schema: schema(),
        }
    }

    pub fn form(&self) -> &FormHandle {
        &self.form
    }

    pub async fn submit(&self, input: FormData) -> Result<(), SubmitError> {
        let _loading = self.form.begin_submission(&input);
        validate_form(&self.form, &self.schema, &input)?;

        let location = self.ctx.navigator.current_location();
        let Some(token) = location.query_param(TOKEN_PARAM).map(str::to_string) else {
            return Err(report_failure(
                &self.ctx,
                &self.form,
                SubmitError::MissingRequiredContext("reset token"),
                failed_toast(),
            ));
        };

        let request = ResetPasswordRequest {
            password: field(&input, fields::PASSWORD),
            password_confirmation: field(&input, fields::PASSWORD_CONFIRMATION),
            token,
        };
        let outcome = self
            .ctx
            .dispatch(self.policy, "reset_password", move |api| async move {
                api.reset_password(&request).await
            })
            .await;

        match outcome {
            Some(Err(err)) => Err(report_failure(
                &self.ctx,
                &self.form,
                err.into(),
                failed_toast(),
            )),
            Some(Ok(())) => {
                info!("password reset accepted");
                self.ctx.notifier.publish(reset_toast());
                self.ctx.navigate_from(&self.form, LANDING_PATH);
                Ok(())
            }
            None => {
                self.ctx.navigate_from(&self.form, LANDING_PATH);
                Ok(())
            }
        }
    }
}
