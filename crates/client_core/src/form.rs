use shared::domain::{FieldErrors, FormData};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub loading: bool,
    pub field_errors: FieldErrors,
    pub values: FormData,
    pub mounted: bool,
}

#[derive(Clone)]
pub struct FormHandle {
    name: &'static str,
    tx: watch::Sender<FormState>,
}

impl FormHandle {
    pub fn mount(name: &'static str) -> Self {
        let (tx, _) = watch::channel(FormState {
            mounted: true,
            ..FormState::default()
        });
        Self { name, tx }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn snapshot(&self) -> FormState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.tx.subscribe()
    }

    pub fn is_mounted(&self) -> bool {
        self.tx.borrow().mounted
    }

    pub fn unmount(&self) {
        self.tx.send_modify(|state| state.mounted = false);
    }

    fn update(&self, f: impl FnOnce(&mut FormState)) {
        let applied = self.tx.send_if_modified(|state| {
            if !state.mounted {
                return false;
            }
            f(state);
            true
        });
        if !applied {
            debug!(form = self.name, "form unmounted; dropping state update");
        }
    }

    pub fn set_field_value(&self, field: &str, value: impl Into<String>) {
        let value = value.into();
        self.update(|state| {
            state.values.insert(field.to_string(), value);
        });
    }

    pub fn set_errors(&self, errors: FieldErrors) {
        self.update(|state| state.field_errors = errors);
    }

    pub fn begin_submission(&self, input: &FormData) -> LoadingGuard {
        self.update(|state| {
            state.values = input.clone();
            state.field_errors.clear();
            state.loading = true;
        });
        LoadingGuard { form: self.clone() }
    }
}

#[must_use = "loading resets as soon as the guard is dropped"]
pub struct LoadingGuard {
    form: FormHandle,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.form.update(|state| state.loading = false);
    }
}
