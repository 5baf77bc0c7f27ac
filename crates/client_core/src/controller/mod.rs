use std::{
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
};

use shared::domain::{FormData, ToastMessage};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    api::{AuthApi, RequestError},
    config::RequestPolicy,
    form::FormHandle,
    navigation::Navigator,
    notify::Notifier,
    session::SessionStore,
    validation::{Schema, ValidationError},
};

pub mod forgot_password;
pub mod reset_password;
pub mod sign_in;
pub mod sign_up;

pub mod fields {
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PASSWORD: &str = "password";
    pub const PASSWORD_CONFIRMATION: &str = "passwordConfirmation";
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    ValidationFailed(#[from] ValidationError),
    #[error(transparent)]
    RequestFailed(#[from] RequestError),
    #[error("missing required context: {0}")]
    MissingRequiredContext(&'static str),
}

impl SubmitError {
    pub fn shows_toast(&self) -> bool {
        !matches!(self, Self::ValidationFailed(_))
    }
}

#[derive(Clone)]
pub struct FormContext {
    pub api: Arc<dyn AuthApi>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub sessions: SessionStore,
    pub detached: DetachedRequests,
}

impl FormContext {
    pub fn new(
        api: Arc<dyn AuthApi>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        sessions: SessionStore,
    ) -> Self {
        Self {
            api,
            notifier,
            navigator,
            sessions,
            detached: DetachedRequests::default(),
        }
    }

    pub(crate) fn navigate_from(&self, form: &FormHandle, path: &str) {
        if form.is_mounted() {
            self.navigator.navigate(path);
        } else {
            debug!(form = form.name(), path, "form unmounted; skipping navigation");
        }
    }

    /// Issues the request under `policy`. Returns `None` when it was
    /// detached and its outcome will never reach the caller.
    pub(crate) async fn dispatch<F, Fut>(
        &self,
        policy: RequestPolicy,
        label: &'static str,
        call: F,
    ) -> Option<Result<(), RequestError>>
    where
        F: FnOnce(Arc<dyn AuthApi>) -> Fut,
        Fut: Future<Output = Result<(), RequestError>> + Send + 'static,
    {
        let request = call(self.api.clone());
        match policy {
            RequestPolicy::Await => Some(request.await),
            RequestPolicy::Detach => {
                self.detached.spawn(label, request);
                None
            }
        }
    }
}

pub(crate) fn validate_form(
    form: &FormHandle,
    schema: &Schema,
    input: &FormData,
) -> Result<(), SubmitError> {
    if let Err(err) = schema.validate(input) {
        debug!(form = form.name(), fields = ?err.fields().collect::<Vec<_>>(), "validation failed");
        form.set_errors(err.field_errors());
        return Err(err.into());
    }
    Ok(())
}

pub(crate) fn field(input: &FormData, name: &str) -> String {
    input.get(name).cloned().unwrap_or_default()
}

pub(crate) fn report_failure(
    ctx: &FormContext,
    form: &FormHandle,
    err: SubmitError,
    toast: ToastMessage,
) -> SubmitError {
    warn!(form = form.name(), error = %err, "submission failed");
    if err.shows_toast() {
        ctx.notifier.publish(toast);
    }
    err
}

pub fn sign_out(ctx: &FormContext) {
    ctx.sessions.sign_out();
    ctx.navigator.navigate(crate::routing::LANDING_PATH);
}

#[derive(Clone, Default)]
pub struct DetachedRequests {
    inner: Arc<DetachedInner>,
}

#[derive(Default)]
struct DetachedInner {
    tasks: Mutex<Vec<JoinHandle<()>>>,
    failures: AtomicU64,
}

impl DetachedRequests {
    pub fn spawn<Fut>(&self, label: &'static str, request: Fut)
    where
        Fut: Future<Output = Result<(), RequestError>> + Send + 'static,
    {
        let inner = self.inner.clone();
        let handle = tokio::spawn(async move {
            match request.await {
                Ok(()) => debug!(request = label, "detached request completed"),
                Err(err) => {
                    inner.failures.fetch_add(1, Ordering::Relaxed);
                    warn!(request = label, error = %err, "detached request failed");
                }
            }
        });

        let mut tasks = self
            .inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    pub fn failures(&self) -> u64 {
        self.inner.failures.load(Ordering::Relaxed)
    }

    pub fn pending(&self) -> usize {
        self.inner
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|task| !task.is_finished())
            .count()
    }

    pub async fn drain(&self) {
        let tasks = std::mem::take(
            &mut *self
                .inner
                .tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in tasks {
            if let Err(err) = task.await {
                warn!("detached request task aborted: {err}");
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
