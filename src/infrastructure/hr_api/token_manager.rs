//! Bearer credential lifecycle for the HR API.
//!
//! One `TokenManager` is shared by every request in the process. Acquisition
//! runs under an async mutex so that a burst of callers finding no valid
//! token produces a single login.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{AUTHORIZATION, SET_COOKIE};
use reqwest::{Client as ReqwestClient, Response};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::join_url;
use crate::domain::errors::HrApiError;
use crate::domain::models::{HrApiConfig, TokenConfig};
use crate::infrastructure::logging::scrub;

/// A bearer token and when it stops being usable.
#[derive(Debug, Clone)]
struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
    refresh_token: Option<String>,
}

impl Credential {
    fn is_valid(&self, safety_margin: Duration) -> bool {
        Utc::now() < self.expires_at - safety_margin
    }
}

/// Credential status for the operational surface.
#[derive(Debug, Clone, Serialize)]
pub struct CredentialStatus {
    pub authenticated: bool,
    pub valid: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub seconds_until_expiry: Option<i64>,
    pub has_refresh_token: bool,
}

/// Owns the HR API credential: login, refresh, expiry and invalidation.
pub struct TokenManager {
    http_client: ReqwestClient,
    login_url: String,
    refresh_url: String,
    auth_cookie: String,
    email: String,
    password: String,
    safety_margin: Duration,
    default_lifetime: Duration,
    credential: Mutex<Option<Credential>>,
}

impl TokenManager {
    pub fn new(http_client: ReqwestClient, api: &HrApiConfig, token: &TokenConfig) -> Self {
        Self {
            http_client,
            login_url: join_url(&api.base_url, &api.login_path),
            refresh_url: join_url(&api.base_url, &api.refresh_path),
            auth_cookie: api.auth_cookie.clone(),
            email: api.email.clone(),
            password: api.password.clone(),
            safety_margin: Duration::seconds(token.safety_margin_secs),
            default_lifetime: Duration::seconds(token.default_lifetime_secs),
            credential: Mutex::new(None),
        }
    }

    /// Return a usable token, refreshing or logging in if necessary.
    ///
    /// A failed refresh falls through to a full login. A failed login is
    /// returned to this caller only; the next caller tries again.
    pub async fn get_valid_token(&self) -> Result<String, HrApiError> {
        let mut guard = self.credential.lock().await;

        if let Some(credential) = guard.as_ref() {
            if credential.is_valid(self.safety_margin) {
                return Ok(credential.token.clone());
            }
        }

        let renewal = guard.as_ref().and_then(|c| c.refresh_token.clone());
        if let Some(refresh_token) = renewal {
            match self.refresh(&refresh_token).await {
                Ok(credential) if credential.is_valid(self.safety_margin) => {
                    let token = credential.token.clone();
                    *guard = Some(credential);
                    return Ok(token);
                }
                Ok(_) => warn!("Refreshed token is already near expiry, logging in again"),
                Err(err) => warn!(error = %err, "Token refresh failed, logging in again"),
            }
        }

        let credential = self.login().await?;
        let token = credential.token.clone();
        *guard = Some(credential);
        Ok(token)
    }

    /// Drop the held credential if it is still `failed_token`.
    ///
    /// When a concurrent caller already replaced it, the newer token is kept.
    pub async fn invalidate(&self, failed_token: &str) {
        let mut guard = self.credential.lock().await;
        if guard.as_ref().is_some_and(|c| c.token == failed_token) {
            debug!("Invalidating rejected HR API token");
            *guard = None;
        }
    }

    /// Discard any held credential and log in immediately.
    pub async fn force_reauthenticate(&self) -> Result<CredentialStatus, HrApiError> {
        let mut guard = self.credential.lock().await;
        *guard = None;
        let credential = self.login().await?;
        *guard = Some(credential);
        Ok(self.describe(guard.as_ref()))
    }

    pub async fn status(&self) -> CredentialStatus {
        let guard = self.credential.lock().await;
        self.describe(guard.as_ref())
    }

    fn describe(&self, credential: Option<&Credential>) -> CredentialStatus {
        credential.map_or(
            CredentialStatus {
                authenticated: false,
                valid: false,
                expires_at: None,
                seconds_until_expiry: None,
                has_refresh_token: false,
            },
            |c| CredentialStatus {
                authenticated: true,
                valid: c.is_valid(self.safety_margin),
                expires_at: Some(c.expires_at),
                seconds_until_expiry: Some((c.expires_at - Utc::now()).num_seconds().max(0)),
                has_refresh_token: c.refresh_token.is_some(),
            },
        )
    }

    async fn login(&self) -> Result<Credential, HrApiError> {
        info!("Logging in to HR API");

        let response = self
            .http_client
            .post(&self.login_url)
            .json(&json!({ "email": self.email, "password": self.password }))
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HR API login request failed");
                HrApiError::Auth(format!("login request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "HR API login rejected");
            let body = scrub(&body, &[self.password.as_str(), self.email.as_str()]);
            return Err(HrApiError::Auth(format!("login returned {status}: {body}")));
        }

        let cookie_token = self.token_from_cookies(&response);
        let body = read_json_lenient(response).await;

        let token = token_from_body(&body)
            .or(cookie_token)
            .ok_or_else(|| HrApiError::Auth("no token in login response or cookies".to_string()))?;

        let credential = Credential {
            expires_at: self.expiry_of(&token),
            refresh_token: body
                .get("refresh_token")
                .and_then(Value::as_str)
                .map(str::to_string),
            token,
        };
        info!(expires_at = %credential.expires_at, "HR API login successful");
        Ok(credential)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Credential, HrApiError> {
        info!("Refreshing HR API token");

        let response = self
            .http_client
            .post(&self.refresh_url)
            .header(AUTHORIZATION, format!("Bearer {refresh_token}"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HrApiError::Http { status, body });
        }

        let body = read_json_lenient(response).await;
        let token = token_from_body(&body)
            .ok_or_else(|| HrApiError::Auth("no token in refresh response".to_string()))?;

        Ok(Credential {
            expires_at: self.expiry_of(&token),
            refresh_token: body
                .get("refresh_token")
                .and_then(Value::as_str)
                .unwrap_or(refresh_token)
                .to_string()
                .into(),
            token,
        })
    }

    fn token_from_cookies(&self, response: &Response) -> Option<String> {
        let prefix = format!("{}=", self.auth_cookie);
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|cookie| cookie.split(';'))
            .map(str::trim)
            .find_map(|part| part.strip_prefix(&prefix))
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    fn expiry_of(&self, token: &str) -> DateTime<Utc> {
        jwt_expiry(token).unwrap_or_else(|| {
            debug!("Token carries no readable expiry, assuming default lifetime");
            Utc::now() + self.default_lifetime
        })
    }
}

async fn read_json_lenient(response: Response) -> Value {
    response.json::<Value>().await.unwrap_or(Value::Null)
}

fn token_from_body(body: &Value) -> Option<String> {
    let body = body.get("data").filter(|d| d.is_object()).unwrap_or(body);
    ["access_token", "token"]
        .iter()
        .find_map(|field| body.get(field).and_then(Value::as_str))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Read the `exp` claim of a JWT without verifying its signature.
pub(crate) fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;
    let exp = claims.get("exp")?;
    let seconds = exp.as_i64().or_else(|| exp.as_f64().map(|f| f as i64))?;
    DateTime::from_timestamp(seconds, 0)
}
