//! HTTP client for the SmartReview backend.

use tracing::debug;

use super::types::{InstallationsResponse, SetupKeyRequest, SetupStatusResponse};
use super::{ApiError, ApiErrorKind, ApiResult, Installation, User};

/// Client for the backend HTTP surface.
///
/// Holds the resolved base URL and a shared connection pool. The session's
/// bearer token is passed per call; the client itself is stateless.
pub struct BackendClient {
    base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    /// Creates a new client for the given base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// URL the browser must visit to start the GitHub OAuth flow.
    pub fn login_url(&self) -> String {
        format!("{}/auth/login", self.base_url)
    }

    /// URL the browser must visit to start the GitHub App installation.
    pub fn install_url(&self) -> String {
        format!("{}/install", self.base_url)
    }

    /// Fetches the authenticated user's identity.
    ///
    /// # Errors
    /// `Unauthorized` when the token is missing or rejected.
    pub async fn fetch_user(&self, token: Option<&str>) -> ApiResult<User> {
        let response = self
            .get("/api/user", token)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = Self::check_status(response).await?;
        response.json().await.map_err(|e| ApiError::parse(&e))
    }

    /// Fetches the user's GitHub App installations.
    ///
    /// # Errors
    /// Returns a `Server` error when the backend reports one in the body.
    pub async fn fetch_installations(&self, token: Option<&str>) -> ApiResult<Vec<Installation>> {
        let response = self
            .get("/api/installations", token)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = Self::check_status(response).await?;
        let body: InstallationsResponse =
            response.json().await.map_err(|e| ApiError::parse(&e))?;

        if let Some(error) = body.error {
            return Err(ApiError {
                kind: ApiErrorKind::Server,
                message: error,
                details: None,
            });
        }
        Ok(body.installations)
    }

    /// Queries whether an API key is stored for this user.
    pub async fn setup_status(&self, token: Option<&str>) -> ApiResult<bool> {
        let response = self
            .get("/api/setup-status", token)
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        let response = Self::check_status(response).await?;
        let body: SetupStatusResponse = response.json().await.map_err(|e| ApiError::parse(&e))?;
        Ok(body.has_api_key)
    }

    /// Stores (creates or replaces) the user's API key.
    pub async fn save_key(&self, token: Option<&str>, api_key: &str) -> ApiResult<()> {
        let response = self
            .with_bearer(
                self.http.post(format!("{}/api/setup-key", self.base_url)),
                token,
            )
            .json(&SetupKeyRequest { api_key })
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Deletes the user's stored API key.
    ///
    /// # Errors
    /// `NotFound` when no key was stored; callers treat that as benign.
    pub async fn delete_key(&self, token: Option<&str>) -> ApiResult<()> {
        let response = self
            .with_bearer(
                self.http.delete(format!("{}/api/setup-key", self.base_url)),
                token,
            )
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    /// Invalidates the server-side session. Callers treat failures as
    /// non-fatal; sign-out must always succeed locally.
    pub async fn logout(&self, token: Option<&str>) -> ApiResult<()> {
        let response = self
            .with_bearer(
                self.http.post(format!("{}/auth/logout", self.base_url)),
                token,
            )
            .send()
            .await
            .map_err(|e| ApiError::network(&e))?;

        Self::check_status(response).await?;
        Ok(())
    }

    fn get(&self, path: &str, token: Option<&str>) -> reqwest::RequestBuilder {
        self.with_bearer(self.http.get(format!("{}{path}", self.base_url)), token)
    }

    fn with_bearer(
        &self,
        builder: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "backend returned an error");
        Err(ApiError::from_status(status.as_u16(), &body))
    }
}
