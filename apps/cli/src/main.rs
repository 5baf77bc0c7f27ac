use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings_from, prepare_api_url, DEFAULT_SETTINGS_FILE},
    controller::fields,
    ForgotPasswordForm, FormContext, FormHandle, HttpAuthApi, MemoryNavigator, Navigator,
    RequestPolicy, ResetPasswordForm, Router, Session, SessionStore, SignInForm, SignUpForm,
    SubmitError, ToastChannel,
};
use shared::domain::{FormData, ToastKind, ToastMessage};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Drive the scheduling app's account flows from the terminal")]
struct Cli {
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,
    /// Overrides the API base URL from settings/environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Print toasts as JSON lines.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    ForgotPassword {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        policy: Option<RequestPolicy>,
    },
    ResetPassword {
        /// Location the reset link opened, e.g. `/reset-password?token=...`.
        #[arg(long, default_value = "/reset-password")]
        location: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        confirmation: String,
        #[arg(long)]
        policy: Option<RequestPolicy>,
    },
    SignIn {
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    SignUp {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Show which view a path renders, optionally with a session token.
    Route {
        path: String,
        #[arg(long)]
        token: Option<String>,
        /// RFC 3339 expiry for the session token.
        #[arg(long, requires = "token")]
        expires_at: Option<DateTime<Utc>>,
    },
}

fn form_data(pairs: &[(&str, &str)]) -> FormData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn print_toasts(rx: &mut broadcast::Receiver<ToastMessage>, json: bool) -> Result<()> {
    while let Ok(toast) = rx.try_recv() {
        if json {
            println!("{}", serde_json::to_string(&toast)?);
            continue;
        }
        let marker = match toast.kind {
            ToastKind::Success => "ok",
            ToastKind::Error => "error",
        };
        match &toast.description {
            Some(description) => println!("[{marker}] {}: {description}", toast.title),
            None => println!("[{marker}] {}", toast.title),
        }
    }
    Ok(())
}

fn report(form: &FormHandle, result: &std::result::Result<(), SubmitError>) {
    if let Err(SubmitError::ValidationFailed(_)) = result {
        for (field, message) in form.snapshot().field_errors {
            println!("  {field}: {message}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config, |key| std::env::var(key).ok());
    if let Some(api_url) = cli.api_url {
        settings.api_url = api_url;
    }
    let api_url = prepare_api_url(&settings.api_url)?;
    tracing::debug!(%api_url, timeout_secs = settings.request_timeout_secs, "settings loaded");
    let api = HttpAuthApi::with_timeout(api_url, settings.request_timeout())
        .context("failed to build http client")?;

    let start = match &cli.command {
        Command::ForgotPassword { .. } => "/forgot-password",
        Command::ResetPassword { location, .. } => location.as_str(),
        Command::SignIn { .. } => "/",
        Command::SignUp { .. } => "/signup",
        Command::Route { path, .. } => path.as_str(),
    };
    let navigator = Arc::new(
        MemoryNavigator::at(start).with_context(|| format!("invalid location '{start}'"))?,
    );
    let toasts = ToastChannel::default();
    let mut toast_rx = toasts.subscribe();
    let sessions = SessionStore::default();
    let ctx = FormContext::new(
        Arc::new(api),
        Arc::new(toasts),
        navigator.clone(),
        sessions.clone(),
    );
    let router = Router::default();

    match cli.command {
        Command::ForgotPassword { email, policy } => {
            let form = FormHandle::mount("forgot_password");
            let controller = ForgotPasswordForm::new(
                ctx.clone(),
                form.clone(),
                policy.unwrap_or(settings.forgot_password_policy),
            );
            let result = controller
                .submit(form_data(&[(fields::EMAIL, email.as_str())]))
                .await;
            report(&form, &result);
        }
        Command::ResetPassword {
            password,
            confirmation,
            policy,
            ..
        } => {
            let form = FormHandle::mount("reset_password");
            let controller = ResetPasswordForm::new(
                ctx.clone(),
                form.clone(),
                policy.unwrap_or(settings.reset_password_policy),
            );
            let result = controller
                .submit(form_data(&[
                    (fields::PASSWORD, password.as_str()),
                    (fields::PASSWORD_CONFIRMATION, confirmation.as_str()),
                ]))
                .await;
            report(&form, &result);
        }
        Command::SignIn { email, password } => {
            let form = FormHandle::mount("sign_in");
            let controller = SignInForm::new(ctx.clone(), form.clone());
            let result = controller
                .submit(form_data(&[
                    (fields::EMAIL, email.as_str()),
                    (fields::PASSWORD, password.as_str()),
                ]))
                .await;
            report(&form, &result);
        }
        Command::SignUp {
            name,
            email,
            password,
        } => {
            let form = FormHandle::mount("sign_up");
            let controller = SignUpForm::new(ctx.clone(), form.clone());
            let result = controller
                .submit(form_data(&[
                    (fields::NAME, name.as_str()),
                    (fields::EMAIL, email.as_str()),
                    (fields::PASSWORD, password.as_str()),
                ]))
                .await;
            report(&form, &result);
        }
        Command::Route {
            token, expires_at, ..
        } => {
            if let Some(token) = token {
                let mut session = Session::authenticated(token, None);
                if let Some(expires_at) = expires_at {
                    session = session.expiring_at(expires_at);
                }
                sessions.sign_in(session);
            }
        }
    }

    ctx.detached.drain().await;
    print_toasts(&mut toast_rx, cli.json)?;

    sessions.expire_if_stale(Utc::now());
    let rendered = router.route(&navigator.current_location(), &sessions.current());
    println!("{} -> {:?}", rendered.location, rendered.view);

    Ok(())
}
