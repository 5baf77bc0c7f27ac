use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ApiError,
    protocol::{
        ForgotPasswordRequest, ResetPasswordRequest, SessionResponse, SignInRequest,
        SignUpRequest,
    },
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("unexpected response body from {endpoint}: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl RequestError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), RequestError>;
    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), RequestError>;
    async fn create_session(
        &self,
        request: &SignInRequest,
    ) -> Result<SessionResponse, RequestError>;
    async fn create_user(&self, request: &SignUpRequest) -> Result<(), RequestError>;
}

pub struct HttpAuthApi {
    http: Client,
    api_url: String,
}

impl HttpAuthApi {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn with_timeout(api_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            api_url: api_url.into(),
        })
    }

    async fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        body: &B,
    ) -> Result<reqwest::Response, RequestError> {
        let res = self
            .http
            .post(format!("{}{endpoint}", self.api_url))
            .json(body)
            .send()
            .await
            .map_err(|source| RequestError::Transport { endpoint, source })?;

        let status = res.status();
        debug!(endpoint, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(res);
        }

        let raw = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&raw)
            .map(|body| body.message)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        Err(RequestError::Status {
            endpoint,
            status,
            message,
        })
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.post(endpoint, body)
            .await?
            .json()
            .await
            .map_err(|source| RequestError::Decode { endpoint, source })
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn forgot_password(&self, request: &ForgotPasswordRequest) -> Result<(), RequestError> {
        self.post("/password/forgot", request).await?;
        Ok(())
    }

    async fn reset_password(&self, request: &ResetPasswordRequest) -> Result<(), RequestError> {
        self.post("/password/reset", request).await?;
        Ok(())
    }

    async fn create_session(
        &self,
        request: &SignInRequest,
    ) -> Result<SessionResponse, RequestError> {
        self.post_json("/sessions", request).await
    }

    async fn create_user(&self, request: &SignUpRequest) -> Result<(), RequestError> {
        self.post("/users", request).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/api_tests.rs"]
mod tests;
