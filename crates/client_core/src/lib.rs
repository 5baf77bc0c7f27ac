pub mod api;
pub mod config;
pub mod controller;
pub mod form;
pub mod navigation;
pub mod notify;
pub mod routing;
pub mod session;
pub mod validation;

pub use api::{AuthApi, HttpAuthApi, RequestError};
pub use config::{RequestPolicy, Settings};
pub use controller::{
    forgot_password::ForgotPasswordForm, reset_password::ResetPasswordForm, sign_in::SignInForm,
    sign_out, sign_up::SignUpForm, DetachedRequests, FormContext, SubmitError,
};
pub use form::{FormHandle, FormState};
pub use navigation::{Location, MemoryNavigator, Navigator};
pub use notify::{Notifier, ToastChannel};
pub use routing::{Rendered, RouteDecision, RouteGuard, RouteTable, Router, View};
pub use session::{Session, SessionStore};
pub use validation::{Schema, ValidationError, Violation};
