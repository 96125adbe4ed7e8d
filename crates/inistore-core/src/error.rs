//! Error types for inistore
//!
//! Errors are structured: a kind, the settings file involved, the
//! underlying I/O error kind when there is one, and an actionable help
//! message. Per-line parse problems are not errors; see [`Diagnostic`].

use std::fmt;
use std::path::Path;
use std::time::SystemTime;

/// Result type alias for inistore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for inistore operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Settings file the operation was working on
    pub file: Option<String>,
    /// Underlying I/O error kind, when the failure came from the filesystem
    pub io_kind: Option<std::io::ErrorKind>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading the settings file failed
    Load,
    /// Writing the settings file failed
    Save,
    /// Internal error (bug in inistore)
    Internal,
}

impl Error {
    /// Create a load error from an I/O failure
    pub fn load(file: &Path, err: &std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Load,
            file: Some(file.display().to_string()),
            io_kind: Some(err.kind()),
            help: Some(load_help(file, err.kind())),
            cause: Some(err.to_string()),
        }
    }

    /// Create a save error from an I/O failure
    pub fn save(file: &Path, err: &std::io::Error) -> Self {
        Self {
            kind: ErrorKind::Save,
            file: Some(file.display().to_string()),
            io_kind: Some(err.kind()),
            help: Some(save_help(file, err.kind())),
            cause: Some(err.to_string()),
        }
    }

    /// Create an internal error (bug in inistore)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            file: None,
            io_kind: None,
            help: Some("This is likely a bug in inistore. Please report it.".into()),
            cause: Some(message.into()),
        }
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// True when the settings file did not exist
    pub fn is_not_found(&self) -> bool {
        self.io_kind == Some(std::io::ErrorKind::NotFound)
    }
}

fn load_help(file: &Path, kind: std::io::ErrorKind) -> String {
    match kind {
        std::io::ErrorKind::NotFound => {
            format!("Check that '{}' exists", file.display())
        }
        std::io::ErrorKind::PermissionDenied => {
            format!("Check that '{}' is readable by this process", file.display())
        }
        std::io::ErrorKind::InvalidData => "Settings files must be valid UTF-8 text".into(),
        _ => format!("Check that '{}' is a readable text file", file.display()),
    }
}

fn save_help(file: &Path, kind: std::io::ErrorKind) -> String {
    match kind {
        std::io::ErrorKind::NotFound => format!(
            "Check that the directory containing '{}' exists",
            file.display()
        ),
        std::io::ErrorKind::PermissionDenied => {
            format!("Check that '{}' is writable by this process", file.display())
        }
        _ => "The file may be partially written; enable atomic_save to avoid this".into(),
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Load => write!(f, "Failed to load settings")?,
            ErrorKind::Save => write!(f, "Failed to save settings")?,
            ErrorKind::Internal => write!(f, "Internal error")?,
        }

        if let Some(file) = &self.file {
            write!(f, "\n  File: {}", file)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

/// A non-fatal report produced while loading or saving
///
/// Diagnostics are delivered to a [`DiagnosticSink`](crate::DiagnosticSink)
/// and never abort the operation that raised them, except for the
/// `LoadFailed`/`SaveFailed` kinds which describe an operation that
/// already failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// When the diagnostic was raised
    pub timestamp: SystemTime,
    /// What happened
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic stamped with the current time
    pub fn now(kind: DiagnosticKind) -> Self {
        Self {
            timestamp: SystemTime::now(),
            kind,
        }
    }

    /// Whether this diagnostic describes a failed load or save
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::LoadFailed { .. } | DiagnosticKind::SaveFailed { .. }
        )
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self
            .timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        write!(f, "{} : {}", secs, self.kind)
    }
}

/// Categories of diagnostics
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticKind {
    /// A line that is neither a header nor contains `=`
    #[error("Invalid key/value pair at line {line_number}: {text}")]
    MalformedLine { line_number: usize, text: String },

    /// A `=value` line with nothing before the delimiter
    #[error("Missing key at line {line_number}: {text}")]
    EmptyKey { line_number: usize, text: String },

    /// A load that failed at the boolean API boundary
    #[error("Unable to load settings from {file}: {message}")]
    LoadFailed { file: String, message: String },

    /// A save that failed at the boolean API boundary
    #[error("Unable to save settings to {file}: {message}")]
    SaveFailed { file: String, message: String },
}
