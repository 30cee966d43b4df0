//! Account API client: patches the signed-in user's account.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::config::ReconcileConfig;
use crate::error::ApiError;
use crate::profile::{AccountPatch, UserAccount, UserAccountDto};

const ACCOUNT_PATH: &str = "/api/v1/me/account";

/// Remote account operations the reconciler needs.
#[async_trait]
pub trait AccountApi: Send + Sync {
    /// Apply `patch` to the signed-in user's account and return the updated record.
    async fn patch_account(&self, patch: &AccountPatch) -> Result<UserAccount, ApiError>;
}

/// Problem body returned by the backend on failure.
#[derive(Debug, Deserialize)]
struct ProblemBody {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    detail: Option<String>,
}

/// HTTP implementation of [`AccountApi`].
pub struct HttpAccountClient {
    base_url: String,
    token: SecretString,
    client: reqwest::Client,
}

impl HttpAccountClient {
    pub fn new(base_url: impl Into<String>, token: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.api_base_url.clone(), config.api_token.clone())
    }

    fn account_url(&self) -> String {
        format!("{}{ACCOUNT_PATH}", self.base_url)
    }
}

#[async_trait]
impl AccountApi for HttpAccountClient {
    async fn patch_account(&self, patch: &AccountPatch) -> Result<UserAccount, ApiError> {
        let resp = self
            .client
            .patch(self.account_url())
            .bearer_auth(self.token.expose_secret())
            .json(patch)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let dto: UserAccountDto = resp.json().await?;
            return Ok(dto.into());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(problem_to_error(status, &body))
    }
}

fn problem_to_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    let fallback_title = status
        .canonical_reason()
        .unwrap_or("Unknown status")
        .to_string();

    match serde_json::from_str::<ProblemBody>(body) {
        Ok(problem) => ApiError::Status {
            status: status.as_u16(),
            title: problem.title.unwrap_or(fallback_title),
            code: problem.error,
            detail: problem.detail,
        },
        Err(_) => ApiError::Status {
            status: status.as_u16(),
            title: fallback_title,
            code: None,
            detail: (!body.is_empty()).then(|| body.to_string()),
        },
    }
}
