/*
 * Error taxonomy for the control framework. Every condition listed here is a
 * local, recoverable result that callers must inspect; the only fatal class is
 * `RuntimeUnavailable`, which terminates the page-build or dialog operation
 * that observed it.
 */

use crate::types::{ControlId, PageScope};

#[cfg(target_os = "windows")]
use windows::core::Error as WinError;

#[derive(Debug, Clone)]
pub enum PlatformError {
    /// A control ID is already live within its page (or the pageless scope).
    DuplicateId { scope: PageScope, id: ControlId },
    /// A lookup missed. Recoverable; the caller decides whether it matters.
    NotFound(String),
    /// The native control could not be created.
    HandleCreation(String),
    /// The message procedure override could not be installed.
    SubclassAttach(String),
    /// A font or image could not be loaded. Cosmetic only.
    ResourceLoad(String),
    /// The owning window or the windowing runtime went away mid-operation.
    RuntimeUnavailable(String),
    /// An operation was attempted in a state that does not allow it.
    InvalidState(String),
    /// A requested operation could not be completed.
    OperationFailed(String),
    /// Configuration could not be read, parsed or written.
    Config(String),
    #[cfg(target_os = "windows")]
    Win32(WinError),
}

impl PlatformError {
    /*
     * Only the loss of the windowing runtime aborts a whole operation; every
     * other error is isolated to the control or resource that produced it.
     */
    pub fn is_fatal(&self) -> bool {
        matches!(self, PlatformError::RuntimeUnavailable(_))
    }
}

#[cfg(target_os = "windows")]
impl From<WinError> for PlatformError {
    fn from(err: WinError) -> Self {
        PlatformError::Win32(err)
    }
}

impl From<serde_json::Error> for PlatformError {
    fn from(err: serde_json::Error) -> Self {
        PlatformError::Config(err.to_string())
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::DuplicateId { scope, id } => {
                write!(f, "Duplicate ID: control {} already live in {scope}", id.raw())
            }
            PlatformError::NotFound(s) => write!(f, "Not Found: {s}"),
            PlatformError::HandleCreation(s) => write!(f, "Handle Creation Failed: {s}"),
            PlatformError::SubclassAttach(s) => write!(f, "Subclass Attach Failed: {s}"),
            PlatformError::ResourceLoad(s) => write!(f, "Resource Load Failed: {s}"),
            PlatformError::RuntimeUnavailable(s) => write!(f, "Runtime Unavailable: {s}"),
            PlatformError::InvalidState(s) => write!(f, "Invalid State: {s}"),
            PlatformError::OperationFailed(s) => write!(f, "Operation Failed: {s}"),
            PlatformError::Config(s) => write!(f, "Configuration Error: {s}"),
            #[cfg(target_os = "windows")]
            PlatformError::Win32(e) => write!(f, "Win32 Error: {e}"),
        }
    }
}

impl std::error::Error for PlatformError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(target_os = "windows")]
            PlatformError::Win32(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized `Result` type for framework operations.
pub type Result<T> = std::result::Result<T, PlatformError>;

/// One control that could not be created during a batch.
#[derive(Debug, Clone)]
pub struct ControlFailure {
    pub scope: PageScope,
    pub id: ControlId,
    pub error: PlatformError,
}

/*
 * Per-control outcome of a batch operation such as `add_controls`. A failure
 * for one control never prevents its siblings from being created; they are
 * collected here instead so the caller decides what to do about them.
 */
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub created: Vec<ControlId>,
    pub skipped: Vec<ControlId>,
    pub failures: Vec<ControlFailure>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn record_failure(&mut self, scope: &PageScope, id: ControlId, error: PlatformError) {
        log::warn!("AddControls: Control {} in {scope} failed: {error}", id.raw());
        self.failures.push(ControlFailure {
            scope: scope.clone(),
            id,
            error,
        });
    }
}
