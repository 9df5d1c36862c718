//! API key validation and lifecycle.
//!
//! The Groq key the backend reviews with is validated locally before any
//! network call, and its stored copy is managed through a small state
//! machine: status checks, validator-gated saves, and confirm-gated deletes.
//! The plaintext key is consumed by `save` and dropped as soon as the call
//! completes; nothing here retains it.

use std::fmt;

use tracing::{debug, warn};

use crate::api::{ApiResult, BackendClient};
use crate::notice::{Notice, NoticeSender};

/// Required key prefix. Groq keys all start with this.
pub const KEY_PREFIX: &str = "gsk_";

const KEY_MIN_LEN: usize = 20;
const KEY_MAX_LEN: usize = 200;
const KEY_MIN_SUFFIX_LEN: usize = 40;

/// Why a submitted key was rejected. Ordered: the first failing rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyValidationError {
    Empty,
    BadPrefix,
    TooShort,
    TooLong,
    BadChars,
    SuspiciousFormat,
}

impl fmt::Display for KeyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            KeyValidationError::Empty => "Please enter your Groq API key",
            KeyValidationError::BadPrefix => {
                "Invalid API key format. Groq API keys must start with \"gsk_\""
            }
            KeyValidationError::TooShort => {
                "API key appears to be too short. Please check your key from Groq Console"
            }
            KeyValidationError::TooLong => {
                "API key appears to be too long. Please check your key from Groq Console"
            }
            KeyValidationError::BadChars => {
                "API key contains invalid characters. Only letters, numbers, underscores, and hyphens are allowed"
            }
            KeyValidationError::SuspiciousFormat => {
                "API key format appears incorrect. Please verify you copied the complete key from Groq Console"
            }
        };
        write!(f, "{message}")
    }
}

impl std::error::Error for KeyValidationError {}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Validates a submitted API key against the Groq key format.
///
/// Pure and synchronous: suitable for per-keystroke feedback as well as the
/// hard gate before submission.
///
/// # Errors
/// Returns the first failing rule, in declaration order.
pub fn validate_api_key(raw: &str) -> Result<(), KeyValidationError> {
    let key = raw.trim();

    if key.is_empty() {
        return Err(KeyValidationError::Empty);
    }
    if !key.starts_with(KEY_PREFIX) {
        return Err(KeyValidationError::BadPrefix);
    }
    if key.len() < KEY_MIN_LEN {
        return Err(KeyValidationError::TooShort);
    }
    if key.len() > KEY_MAX_LEN {
        return Err(KeyValidationError::TooLong);
    }
    if !key[KEY_PREFIX.len()..].chars().all(is_key_char) {
        return Err(KeyValidationError::BadChars);
    }
    if key.len() - KEY_PREFIX.len() < KEY_MIN_SUFFIX_LEN {
        return Err(KeyValidationError::SuspiciousFormat);
    }

    Ok(())
}

/// Whether a key is stored on the backend for this user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStatus {
    /// Status query in flight (initial state).
    Checking,
    /// No key stored.
    Unset,
    /// A key is stored. The value itself is never available client-side.
    Present,
}

/// Callback invoked after a successful save, so collaborators (e.g. the
/// install prompt) can react.
type OnComplete = Box<dyn FnMut() + Send>;

/// Lifecycle controller for the stored API key.
///
/// Mutating operations are serialized: while a save or delete is in flight,
/// further mutating calls are no-ops. Deletes additionally require an
/// explicit confirmation step (`request_delete` then `confirm_delete`).
pub struct CredentialController {
    status: KeyStatus,
    saving: bool,
    deleting: bool,
    confirm_pending: bool,
    last_error: Option<String>,
    notices: NoticeSender,
    on_complete: Option<OnComplete>,
}

impl CredentialController {
    /// Creates a controller wired to the given notice inbox.
    pub fn new(notices: NoticeSender) -> Self {
        Self {
            status: KeyStatus::Checking,
            saving: false,
            deleting: false,
            confirm_pending: false,
            last_error: None,
            notices,
            on_complete: None,
        }
    }

    /// Registers a completion callback fired after each successful save.
    #[must_use]
    pub fn with_on_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn saving(&self) -> bool {
        self.saving
    }

    pub fn deleting(&self) -> bool {
        self.deleting
    }

    pub fn confirm_pending(&self) -> bool {
        self.confirm_pending
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Queries the backend for the stored-key status.
    ///
    /// A failed query resolves to `Unset` so the caller is never stuck on
    /// `Checking`; the user can simply enter a key again.
    pub async fn check_status(&mut self, backend: &BackendClient, token: Option<&str>) {
        self.status = KeyStatus::Checking;
        self.apply_status(backend.setup_status(token).await);
    }

    fn apply_status(&mut self, outcome: ApiResult<bool>) {
        self.status = match outcome {
            Ok(true) => KeyStatus::Present,
            Ok(false) => KeyStatus::Unset,
            Err(e) => {
                warn!("failed to check API key status: {e}");
                KeyStatus::Unset
            }
        };
    }

    /// Validates and saves a key; see `begin_save`/`finish_save`.
    ///
    /// Takes the raw input by value: the plaintext is dropped when the call
    /// returns. Returns true when the key was stored.
    pub async fn save(
        &mut self,
        backend: &BackendClient,
        token: Option<&str>,
        raw_input: String,
    ) -> bool {
        if !self.begin_save(&raw_input) {
            return false;
        }
        let outcome = backend.save_key(token, raw_input.trim()).await;
        self.finish_save(outcome)
    }

    /// Starts a save: no-op while another mutation is in flight, and a hard
    /// validation gate — an invalid key never reaches the network.
    pub fn begin_save(&mut self, raw_input: &str) -> bool {
        if self.saving || self.deleting {
            debug!("save ignored: another credential mutation is in flight");
            return false;
        }
        if let Err(e) = validate_api_key(raw_input) {
            self.last_error = Some(e.to_string());
            let _ = self.notices.send(Notice::error(e.to_string()));
            return false;
        }
        self.saving = true;
        true
    }

    /// Applies the result of the save call started by `begin_save`.
    pub fn finish_save(&mut self, outcome: ApiResult<()>) -> bool {
        self.saving = false;
        match outcome {
            Ok(()) => {
                self.status = KeyStatus::Present;
                self.last_error = None;
                let _ = self.notices.send(Notice::success("API key saved successfully!"));
                if let Some(f) = self.on_complete.as_mut() {
                    f();
                }
                true
            }
            Err(e) => {
                let message = if e.message.starts_with("HTTP ") {
                    "Failed to save API key".to_string()
                } else {
                    e.message.clone()
                };
                self.last_error = Some(message.clone());
                let _ = self.notices.send(Notice::error(message));
                false
            }
        }
    }

    /// Arms the delete confirmation. Purely a state transition; the network
    /// is only touched by `confirm_delete`.
    pub fn request_delete(&mut self) {
        self.confirm_pending = true;
    }

    /// Disarms a pending delete without touching the network.
    pub fn cancel_delete(&mut self) {
        self.confirm_pending = false;
    }

    /// Confirms and executes a pending delete; see `begin_delete`/`finish_delete`.
    /// Returns true when the key is gone (deleted or already absent).
    pub async fn confirm_delete(&mut self, backend: &BackendClient, token: Option<&str>) -> bool {
        if !self.begin_delete() {
            return false;
        }
        let outcome = backend.delete_key(token).await;
        self.finish_delete(outcome)
    }

    /// Starts a confirmed delete: requires an armed confirmation and no other
    /// mutation in flight. The confirmation is consumed when the delete
    /// starts and is not restored on failure.
    pub fn begin_delete(&mut self) -> bool {
        if self.saving || self.deleting {
            debug!("delete ignored: another credential mutation is in flight");
            return false;
        }
        if !self.confirm_pending {
            debug!("delete ignored: not confirmed");
            return false;
        }
        self.confirm_pending = false;
        self.deleting = true;
        true
    }

    /// Applies the result of the delete call started by `begin_delete`.
    ///
    /// A 404 means the backend had no key: state converges to `Unset` with
    /// an informational notice rather than an error.
    pub fn finish_delete(&mut self, outcome: ApiResult<()>) -> bool {
        self.deleting = false;
        match outcome {
            Ok(()) => {
                self.status = KeyStatus::Unset;
                self.last_error = None;
                let _ = self.notices.send(Notice::success("API key deleted"));
                true
            }
            Err(e) if e.is_not_found() => {
                self.status = KeyStatus::Unset;
                self.last_error = None;
                let _ = self
                    .notices
                    .send(Notice::info("API key was already removed"));
                true
            }
            Err(e) => {
                let message = if e.message.starts_with("HTTP ") {
                    "Failed to delete API key".to_string()
                } else {
                    e.message.clone()
                };
                self.last_error = Some(message.clone());
                let _ = self.notices.send(Notice::error(message));
                false
            }
        }
    }
}
