//! Wire types for the SmartReview backend.

use serde::{Deserialize, Serialize};

/// GitHub identity as reported by `GET /api/user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub login: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Preferred display name: full name when GitHub has one, login otherwise.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

/// A GitHub App installation as reported by `GET /api/installations`.
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: i64,
    pub account: InstallationAccount,
    #[serde(default)]
    pub repos: Vec<Repo>,
    pub repository_selection: String,
}

/// Account the App is installed on.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    pub login: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Repository covered by an installation.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    pub name: String,
    pub full_name: String,
    pub private: bool,
}

/// Body of `GET /api/installations`. The backend reports failures through an
/// `error` field on an otherwise 200 response.
#[derive(Debug, Deserialize)]
pub(crate) struct InstallationsResponse {
    #[serde(default)]
    pub installations: Vec<Installation>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/setup-status`.
#[derive(Debug, Deserialize)]
pub(crate) struct SetupStatusResponse {
    pub has_api_key: bool,
}

/// Body of `POST /api/setup-key`.
#[derive(Debug, Serialize)]
pub(crate) struct SetupKeyRequest<'a> {
    pub api_key: &'a str,
}
