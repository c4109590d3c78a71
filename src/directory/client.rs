use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{IdentityError, IdentityProvider, NewAccount, TokenInfo};
use crate::core::config::DirectoryConfig;

#[derive(Debug, Clone)]
pub struct ZitadelClient {
    config: DirectoryConfig,
    http_client: reqwest::Client,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ZitadelClient {
    pub fn new(config: DirectoryConfig) -> Result<Self, IdentityError> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| IdentityError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn api_url(&self) -> &str {
        self.config.api_url.trim_end_matches('/')
    }

    pub async fn get_access_token(&self) -> Result<String, IdentityError> {
        {
            let token = self.access_token.read().await;
            if let Some(t) = token.as_ref() {
                return Ok(t.clone());
            }
        }

        let token_url = format!("{}/oauth/v2/token", self.api_url());

        let mut params = vec![
            ("grant_type", "client_credentials".to_string()),
            ("client_id", self.config.client_id.clone()),
            ("client_secret", self.config.client_secret.clone()),
        ];
        let scope = if self.config.project_id.is_empty() {
            "openid urn:zitadel:iam:org:project:id:zitadel:aud".to_string()
        } else {
            format!("openid urn:zitadel:iam:org:project:id:{}:aud", self.config.project_id)
        };
        params.push(("scope", scope));

        let response = self
            .http_client
            .post(&token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Failed to get access token: {}", e)))?;

        let response = check_status(response).await?;
        let token_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(format!("Failed to parse token response: {}", e)))?;

        let access_token = token_data
            .get("access_token")
            .and_then(|t| t.as_str())
            .ok_or_else(|| IdentityError::InvalidResponse("No access token in response".to_string()))?
            .to_string();

        {
            let mut token = self.access_token.write().await;
            *token = Some(access_token.clone());
        }

        Ok(access_token)
    }

    async fn clear_access_token(&self) {
        let mut token = self.access_token.write().await;
        *token = None;
    }

    /// Sends an authenticated management request, refreshing the service token once on 401.
    async fn send_authorized(
        &self,
        method: reqwest::Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, IdentityError> {
        for attempt in 0..2 {
            let token = self.get_access_token().await?;
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .bearer_auth(&token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request
                .send()
                .await
                .map_err(|e| IdentityError::Unavailable(format!("{} {} failed: {}", method, url, e)))?;

            if response.status() == StatusCode::UNAUTHORIZED && attempt == 0 {
                debug!("Service token rejected, requesting a new one");
                self.clear_access_token().await;
                continue;
            }
            return check_status(response).await;
        }
        Err(IdentityError::Unavailable(
            "Service token rejected twice".to_string(),
        ))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(match status {
        StatusCode::CONFLICT => IdentityError::AlreadyExists,
        StatusCode::NOT_FOUND => IdentityError::NotFound,
        s if s.is_server_error() => IdentityError::Unavailable(format!("{}: {}", s, body)),
        s => IdentityError::Rejected {
            status: s.as_u16(),
            body,
        },
    })
}

#[async_trait]
impl IdentityProvider for ZitadelClient {
    async fn introspect(&self, token: &str) -> Result<Option<String>, IdentityError> {
        let url = format!("{}/oauth/v2/introspect", self.api_url());

        let params = [
            ("token", token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(|e| IdentityError::Unavailable(format!("Failed to introspect token: {}", e)))?;

        let info: TokenInfo = check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(format!("Failed to parse introspection response: {}", e)))?;

        Ok(info.subject.filter(|_| info.active))
    }

    async fn create_account(&self, account: &NewAccount) -> Result<String, IdentityError> {
        let url = format!("{}/v2/users/human", self.api_url());
        let (given_name, family_name) = account.name_parts();

        let mut body = serde_json::json!({
            "username": account.email,
            "profile": {
                "givenName": given_name,
                "familyName": family_name,
                "displayName": account.name.trim()
            },
            "email": {
                "email": account.email,
                "isVerified": true
            },
            "password": {
                "password": account.password,
                "changeRequired": false
            }
        });
        if let Some(phone) = &account.phone {
            body["phone"] = serde_json::json!({ "phone": phone, "isVerified": false });
        }

        let response = self
            .send_authorized(reqwest::Method::POST, &url, Some(&body))
            .await?;

        let user_data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| IdentityError::InvalidResponse(format!("Failed to parse user response: {}", e)))?;

        let user_id = user_data
            .get("userId")
            .and_then(|id| id.as_str())
            .ok_or_else(|| IdentityError::InvalidResponse("No userId in response".to_string()))?
            .to_string();

        Ok(user_id)
    }

    async fn delete_account(&self, auth_id: &str) -> Result<(), IdentityError> {
        let url = format!("{}/v2/users/{}", self.api_url(), auth_id);
        self.send_authorized(reqwest::Method::DELETE, &url, None)
            .await?;
        Ok(())
    }

    async fn set_account_active(&self, auth_id: &str, active: bool) -> Result<(), IdentityError> {
        let action = if active { "reactivate" } else { "deactivate" };
        let url = format!("{}/v2/users/{}/{}", self.api_url(), auth_id, action);
        match self
            .send_authorized(reqwest::Method::POST, &url, Some(&serde_json::json!({})))
            .await
        {
            Ok(_) => Ok(()),
            // Zitadel answers 412 when the account already has the requested state.
            Err(IdentityError::Rejected { status: 412, .. }) => {
                warn!("Account {} already {}d at the identity provider", auth_id, action);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
