//! HTTP client for the remote user directory.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{UserId, UserRecord},
    error::ApiError,
    protocol::DirectoryOperation,
};
use tracing::debug;
use url::Url;

use crate::{
    config::EngineSettings,
    error::{SettingsError, TransportError, TransportFailure},
    UserDirectory,
};

const MAX_ERROR_BODY_CHARS: usize = 200;

pub struct HttpUserDirectory {
    http: Client,
    base_url: Url,
}

impl HttpUserDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SettingsError> {
        let base_url = Url::parse(base_url.trim()).map_err(|err| SettingsError::InvalidServerUrl {
            url: base_url.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SettingsError::InvalidServerUrl {
                url: base_url.to_string(),
                reason: "url cannot be used as a base".into(),
            });
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| SettingsError::HttpClient(err.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &EngineSettings) -> Result<Self, SettingsError> {
        Self::new(&settings.server_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Each operation segment is percent-encoded on its own, so identifiers
    /// cannot escape their path position.
    pub fn endpoint(&self, operation: &DirectoryOperation) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                TransportError::new(
                    operation.clone(),
                    TransportFailure::Request("directory url cannot be a base".into()),
                )
            })?
            .pop_if_empty()
            .extend(operation.path_segments());
        Ok(url)
    }

    async fn send(&self, operation: &DirectoryOperation) -> Result<Response, TransportError> {
        let url = self.endpoint(operation)?;
        debug!("directory: {operation} url={url}");

        let request = if operation.is_mutation() {
            self.http.post(url)
        } else {
            self.http.get(url)
        };
        let res = request.send().await.map_err(|err| {
            TransportError::new(operation.clone(), TransportFailure::Request(err.to_string()))
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = ApiError::from_body(&body)
                .map(|api| api.message)
                .unwrap_or_else(|| body.chars().take(MAX_ERROR_BODY_CHARS).collect());
            return Err(TransportError::new(
                operation.clone(),
                TransportFailure::Status {
                    status: status.as_u16(),
                    message,
                },
            ));
        }

        Ok(res)
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn list_users(&self) -> Result<Vec<UserRecord>, TransportError> {
        let operation = DirectoryOperation::ListUsers;
        let res = self.send(&operation).await?;
        res.json::<Vec<UserRecord>>()
            .await
            .map_err(|err| TransportError::new(operation, TransportFailure::Malformed(err.to_string())))
    }

    async fn like_user(&self, user_id: &UserId) -> Result<(), TransportError> {
        self.send(&DirectoryOperation::LikeUser {
            user_id: user_id.clone(),
        })
        .await?;
        Ok(())
    }

    async fn dislike_user(&self, user_id: &UserId) -> Result<(), TransportError> {
        self.send(&DirectoryOperation::DislikeUser {
            user_id: user_id.clone(),
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
