//! OpenGL version negotiation.

use std::fmt;

use crate::error::{ErrorKind, Result};
use crate::host::{Host, HostFeatures};

/// The OpenGL version requested from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version of the Api.
    pub major: u8,
    /// Minor version of the Api.
    pub minor: u8,
}

impl Version {
    /// Create new version with the given `major` and `minor` values.
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Versions probed with a core profile, newest first.
///
/// Drivers reject unsupported version/profile combinations instead of
/// negotiating them, so each entry is tried in turn.
pub const VERSION_TABLE: &[Version] = &[
    Version::new(4, 6),
    Version::new(4, 5),
    Version::new(4, 4),
    Version::new(4, 3),
    Version::new(4, 2),
    Version::new(4, 1),
    Version::new(4, 0),
    Version::new(3, 3),
    Version::new(3, 2),
    Version::new(3, 1),
    Version::new(3, 0),
    Version::new(2, 1),
    Version::new(2, 0),
    Version::new(1, 5),
    Version::new(1, 4),
    Version::new(1, 3),
    Version::new(1, 2),
    Version::new(1, 1),
    Version::new(1, 0),
];

/// Walk [`VERSION_TABLE`] and return the first version `attempt` accepts.
pub fn negotiate_version<C>(
    mut attempt: impl FnMut(Version) -> Option<C>,
) -> Option<(Version, C)> {
    VERSION_TABLE.iter().find_map(|&version| attempt(version).map(|context| (version, context)))
}

/// The strings reported by `glGetString` once a context is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlInfo {
    /// `GL_VERSION`.
    pub version: String,
    /// `GL_RENDERER`.
    pub renderer: String,
    /// `GL_VENDOR`.
    pub vendor: String,
}

/// Create the most capable context the host allows.
///
/// Returns the negotiated version when the extended creation path was used,
/// `None` for the legacy path.
pub(crate) fn create_context<H: Host>(
    host: &mut H,
    connection: H::Connection,
    surface: H::Surface,
    format: H::Format,
    features: HostFeatures,
) -> Result<(H::Context, Option<Version>)> {
    if !features.contains(HostFeatures::CREATE_CONTEXT_ATTRIBS) {
        log::debug!("creating a legacy context without a version request");
        return host
            .create_legacy_context(connection, surface, format)
            .map(|context| (context, None))
            .map_err(|err| err.with_kind(ErrorKind::ContextCreationFailed));
    }

    // Rejections while probing are expected, keep them away from the error
    // handler until the loop is over.
    host.suspend_errors(connection);
    let negotiated = negotiate_version(|version| {
        let context = host.create_context_with_version(connection, surface, format, version);
        if context.is_none() {
            log::debug!("driver rejected OpenGL {version} core");
        }
        context
    });
    host.restore_errors(connection);

    match negotiated {
        Some((version, context)) => {
            log::debug!("negotiated OpenGL {version} core profile");
            Ok((context, Some(version)))
        },
        None => Err(ErrorKind::ContextCreationFailed.into()),
    }
}
