use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Deserialize;

use crate::session::Credential;

const GOOGLE_OAUTH_BASE: &str = "https://oauth2.googleapis.com";
const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";
const SCOPE: &str = "openid email profile";

/// Prompt data from the device-code endpoint: shown to the user while the
/// client polls for approval.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceAuthorization {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in: u64,
    pub interval: u64,
}

#[derive(Deserialize)]
struct TokenResponse {
    id_token: String,
}

#[derive(Deserialize)]
struct TokenError {
    error: String,
}

/// Google sign-in via the OAuth 2.0 device authorization flow.
///
/// The flow has two halves: `request_device_code` fetches the code and
/// verification URL to show the user, then `poll_for_credential` polls the
/// token endpoint until the user approves, denies, or the code expires. The
/// resulting credential is the ID token, kept opaque by the rest of the
/// client. No local validation, refresh, or expiry handling.
#[derive(Clone)]
pub struct GoogleAuth {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl GoogleAuth {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: GOOGLE_OAUTH_BASE.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        }
    }

    /// Point the client at a different OAuth host (used by tests and
    /// self-hosted provider proxies).
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub async fn request_device_code(&self) -> Result<DeviceAuthorization> {
        let url = format!("{}/device/code", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[("client_id", self.client_id.as_str()), ("scope", SCOPE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("device code request failed {}: {}", status, text));
        }

        let authorization: DeviceAuthorization = response.json().await?;
        Ok(authorization)
    }

    /// Poll the token endpoint at the advertised interval until the user
    /// approves the device code. `slow_down` answers stretch the interval
    /// by five seconds per Google's flow; denial or code expiry ends the
    /// attempt with an error.
    pub async fn poll_for_credential(&self, authorization: &DeviceAuthorization) -> Result<Credential> {
        let url = format!("{}/token", self.base_url);
        let deadline = Instant::now() + Duration::from_secs(authorization.expires_in);
        let mut interval = authorization.interval;

        while Instant::now() < deadline {
            tokio::time::sleep(Duration::from_secs(interval)).await;

            let response = self
                .client
                .post(&url)
                .form(&[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("device_code", authorization.device_code.as_str()),
                    ("grant_type", DEVICE_GRANT_TYPE),
                ])
                .send()
                .await?;

            if response.status().is_success() {
                let token: TokenResponse = response.json().await?;
                return Ok(Credential {
                    token: token.id_token,
                });
            }

            let error: TokenError = response.json().await?;
            match error.error.as_str() {
                "authorization_pending" => {}
                "slow_down" => interval += 5,
                other => return Err(anyhow!("sign-in rejected by provider: {}", other)),
            }
        }

        Err(anyhow!("device code expired before sign-in was approved"))
    }

    /// Tell the provider the session is over so future sign-in prompts are
    /// not auto-suppressed. Called on sign-out.
    pub async fn revoke(&self, credential: &Credential) -> Result<()> {
        let url = format!("{}/revoke", self.base_url);

        let response = self
            .client
            .post(&url)
            .form(&[("token", credential.token.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("token revocation failed: {}", response.status()));
        }

        Ok(())
    }
}
