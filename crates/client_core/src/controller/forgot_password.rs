use shared::{
    domain::{FormData, ToastMessage},
    protocol::ForgotPasswordRequest,
};
use tracing::info;

use super::{field, fields, report_failure, validate_form, FormContext, SubmitError};
use crate::{
    config::RequestPolicy,
    form::FormHandle,
    routing::LANDING_PATH,
    validation::{FieldRules, Schema},
};

pub fn schema() -> Schema {
    Schema::new().field(
        FieldRules::new(fields::EMAIL)
            .required("email is required")
            .email("invalid format"),
    )
}

fn sent_toast() -> ToastMessage {
    ToastMessage::success("Recovery email sent")
        .with_description("We sent you an email to confirm the password recovery")
}

fn failed_toast() -> ToastMessage {
    ToastMessage::error("Password recovery failed").with_description(
        "Something went wrong while recovering your password, check your details",
    )
}

pub struct ForgotPasswordForm {
    ctx: FormContext,
    form: FormHandle,
    policy: RequestPolicy,
    schema: Schema,
}

impl ForgotPasswordForm {
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

        let request = ForgotPasswordRequest {
            email: field(&input, fields::EMAIL).trim().to_string(),
        };
        let outcome = self
            .ctx
            .dispatch(self.policy, "forgot_password", move |api| async move {
                api.forgot_password(&request).await
            })
            .await;

        self.form.set_field_value(fields::EMAIL, "");
        match outcome {
            Some(Ok(())) => {
                info!("password recovery email requested");
                self.ctx.notifier.publish(sent_toast());
                Ok(())
            }
            Some(Err(err)) => Err(report_failure(
                &self.ctx,
                &self.form,
                err.into(),
                failed_toast(),
            )),
            None => {
                self.ctx.navigate_from(&self.form, LANDING_PATH);
                Ok(())
            }
        }
    }
}
