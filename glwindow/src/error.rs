//! Glwindow error handling.

use std::fmt;

/// A specialized [`Result`] type for window and context operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for all the window and context creation steps.
#[derive(Debug, Clone)]
pub struct Error {
    /// The raw code of the underlying error.
    raw_code: Option<i64>,

    /// The raw message from the os in case it could be obtained.
    raw_os_message: Option<String>,

    /// The simplified error kind to handle mathing.
    kind: ErrorKind,
}

impl Error {
    /// Build an error from the raw host information.
    ///
    /// Host implementations use this to report the raw failure, the creation
    /// state machine later tags it with the step that failed.
    pub fn new(raw_code: Option<i64>, raw_os_message: Option<String>, kind: ErrorKind) -> Self {
        Self { raw_code, raw_os_message, kind }
    }

    /// Helper to check that error is [`ErrorKind::NotSupported`].
    #[inline]
    pub fn not_supported(&self) -> bool {
        matches!(&self.kind, ErrorKind::NotSupported(_))
    }

    /// The underlying error kind.
    #[inline]
    pub fn error_kind(&self) -> ErrorKind {
        self.kind
    }

    /// The underlying raw code in case it's present.
    #[inline]
    pub fn raw_code(&self) -> Option<i64> {
        self.raw_code
    }

    /// Replace the kind while keeping the raw host information.
    pub(crate) fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(raw_code) = self.raw_code {
            write!(f, "[{raw_code:x}] ")?;
        }

        write!(f, "{}", self.kind)?;

        if let Some(raw_os_message) = self.raw_os_message.as_ref() {
            write!(f, ": {raw_os_message}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}

/// Build an error with just a kind.
impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { raw_code: None, raw_os_message: None, kind }
    }
}

/// Capture the last OS error, `GetLastError` on Windows.
impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        let raw_code = value.raw_os_error().map(i64::from);
        Error { raw_code, raw_os_message: Some(value.to_string()), kind: ErrorKind::Misc }
    }
}

/// A list specifying the categories of window and context creation failures.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum ErrorKind {
    /// The windowing host couldn't be reached or refused the connection.
    ConnectionError,

    /// No drawable configuration satisfies the capability floor, or the host
    /// rejected describing or applying the chosen one.
    FormatUnavailable,

    /// The native window couldn't be created, named, surfaced or shown.
    WindowCreationFailed,

    /// The driver accepted none of the requested context versions.
    ContextCreationFailed,

    /// The created context couldn't be made current.
    ContextBindFailed,

    /// The host rejected the close-request protocol registration.
    ProtocolRegistrationFailed,

    /// The operation is not supported by the platform.
    NotSupported(&'static str),

    /// The misc error that can't be classified occurred.
    Misc,
}

impl ErrorKind {
    pub(crate) fn as_str(&self) -> &'static str {
        use ErrorKind::*;
        match *self {
            ConnectionError => "failed to connect to the windowing system",
            FormatUnavailable => "no acceptable pixel format is available",
            WindowCreationFailed => "failed to create the native window",
            ContextCreationFailed => "failed to create the OpenGL context",
            ContextBindFailed => "failed to make the OpenGL context current",
            ProtocolRegistrationFailed => "failed to register the close-request protocol",
            NotSupported(reason) => reason,
            Misc => "misc platform error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
