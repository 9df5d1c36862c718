//! One-shot parsing of OAuth / App-installation redirect returns.
//!
//! The backend finishes both external flows by redirecting the browser back
//! to the app with query parameters (`installed`, `repos`, `error`, `auth`,
//! `jwt`). Those parameters are read exactly once and then stripped from the
//! URL so a refresh cannot replay them.

use anyhow::Result;
use url::Url;

use crate::session::SessionStore;

/// Outcome of a GitHub App installation return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReturn {
    pub installed: bool,
    pub repo_count: u32,
    pub error: Option<String>,
}

/// Outcome of an OAuth login return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthReturn {
    pub succeeded: bool,
    pub token: Option<String>,
}

/// Everything a redirect return carried. A URL normally carries one of the
/// two, but both are recognized in a single pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectResult {
    pub install: Option<InstallReturn>,
    pub auth: Option<AuthReturn>,
}

/// Parses redirect-return parameters out of a URL.
///
/// Returns `None` when the URL carries no recognized parameters — which is
/// also what a second parse of an already-stripped URL yields.
pub fn parse_once(url: &Url) -> Option<RedirectResult> {
    let mut installed = None;
    let mut repos = None;
    let mut error = None;
    let mut auth = None;
    let mut jwt = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "installed" => installed = Some(value == "1"),
            "repos" => repos = Some(value.parse::<u32>().unwrap_or(0)),
            "error" => error = Some(value.to_string()),
            "auth" => auth = Some(value == "1"),
            "jwt" => jwt = Some(value.to_string()),
            _ => {}
        }
    }

    let install = installed.map(|installed| InstallReturn {
        installed,
        repo_count: repos.unwrap_or(0),
        error: error.clone(),
    });
    let auth = auth.map(|succeeded| AuthReturn {
        succeeded,
        token: jwt,
    });

    if install.is_none() && auth.is_none() {
        return None;
    }
    Some(RedirectResult { install, auth })
}

/// Returns the URL with its query string removed.
pub fn strip_query(url: &Url) -> Url {
    let mut cleaned = url.clone();
    cleaned.set_query(None);
    cleaned
}

/// Parses a redirect return and applies it to the session.
///
/// A token from a successful OAuth return is committed to durable storage
/// *before* the stripped URL is handed back, so by the time the caller
/// rewrites its location the token can no longer be lost to a refresh.
///
/// # Errors
/// Returns an error if the token cannot be persisted.
pub fn consume(url: &Url, session: &mut SessionStore) -> Result<(Option<RedirectResult>, Url)> {
    let result = parse_once(url);

    if let Some(auth) = result.as_ref().and_then(|r| r.auth.as_ref())
        && auth.succeeded
        && let Some(token) = auth.token.clone()
    {
        session.apply_redirect_token(token)?;
    }

    Ok((result, strip_query(url)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: installation return with repo count.
    #[test]
    fn test_parse_install_return() {
        let url = Url::parse("http://localhost:3000/?installed=1&repos=3").unwrap();
        let result = parse_once(&url).unwrap();
        let install = result.install.unwrap();
        assert!(install.installed);
        assert_eq!(install.repo_count, 3);
        assert!(install.error.is_none());
        assert!(result.auth.is_none());
    }

    /// Test: failed installation carries the error string.
    #[test]
    fn test_parse_install_failure() {
        let url = Url::parse("http://localhost:3000/?installed=0&error=denied").unwrap();
        let install = parse_once(&url).unwrap().install.unwrap();
        assert!(!install.installed);
        assert_eq!(install.repo_count, 0);
        assert_eq!(install.error.as_deref(), Some("denied"));
    }

    /// Test: unparsable repo counts default to zero.
    #[test]
    fn test_parse_bad_repo_count() {
        let url = Url::parse("http://localhost:3000/?installed=1&repos=lots").unwrap();
        assert_eq!(parse_once(&url).unwrap().install.unwrap().repo_count, 0);
    }

    /// Test: OAuth return with a token.
    #[test]
    fn test_parse_auth_return() {
        let url = Url::parse("http://localhost:3000/?auth=1&jwt=XYZ").unwrap();
        let auth = parse_once(&url).unwrap().auth.unwrap();
        assert!(auth.succeeded);
        assert_eq!(auth.token.as_deref(), Some("XYZ"));
    }

    /// Test: a URL without recognized parameters parses to nothing, so the
    /// stripped URL cannot replay.
    #[test]
    fn test_parse_is_one_shot() {
        let url = Url::parse("http://localhost:3000/?auth=1&jwt=XYZ").unwrap();
        assert!(parse_once(&url).is_some());

        let stripped = strip_query(&url);
        assert_eq!(stripped.as_str(), "http://localhost:3000/");
        assert!(parse_once(&stripped).is_none());

        let plain = Url::parse("http://localhost:3000/?tab=settings").unwrap();
        assert!(parse_once(&plain).is_none());
    }

    /// Test: consume persists the token before returning the stripped URL.
    #[test]
    fn test_consume_applies_token_before_strip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let mut session = SessionStore::load_from(path.clone()).unwrap();

        let url = Url::parse("http://localhost:3000/?auth=1&jwt=XYZ").unwrap();
        let (result, cleaned) = consume(&url, &mut session).unwrap();
        assert!(result.unwrap().auth.unwrap().succeeded);
        assert!(cleaned.query().is_none());

        // Already durable: a fresh load sees the token.
        let reloaded = SessionStore::load_from(path).unwrap();
        assert_eq!(reloaded.token(), Some("XYZ"));
    }

    /// Test: a failed OAuth return does not touch the session.
    #[test]
    fn test_consume_ignores_failed_auth() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = SessionStore::load_from(dir.path().join("session.json")).unwrap();

        let url = Url::parse("http://localhost:3000/?auth=0&jwt=XYZ").unwrap();
        let (result, _) = consume(&url, &mut session).unwrap();
        assert!(!result.unwrap().auth.unwrap().succeeded);
        assert!(session.token().is_none());
    }

    /// Test: both parameter families in one URL are both recognized.
    #[test]
    fn test_parse_mixed_return() {
        let url = Url::parse("http://localhost:3000/?installed=1&repos=2&auth=1&jwt=T").unwrap();
        let result = parse_once(&url).unwrap();
        assert!(result.install.is_some());
        assert!(result.auth.is_some());
    }
}
