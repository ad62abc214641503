//! The seam between the creation state machine and a windowing host.
//!
//! Every resource handed out by a [`Host`] is a plain `Copy` handle. The
//! [`Window`] owns them and hands each one back exactly once, in the reverse
//! order of acquisition.
//!
//! [`Window`]: crate::window::Window

use bitflags::bitflags;
use raw_window_handle::{HandleError, RawDisplayHandle, RawWindowHandle};

use crate::config::{FormatTemplate, SampleInfo};
use crate::context::{GlInfo, Version};
use crate::error::Result;
use crate::event::CloseLatch;
use crate::window::WindowAttributes;

bitflags! {
    /// The optional entry points discovered on the connection.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct HostFeatures: u8 {
        /// Candidate formats can be enumerated and their multisampling
        /// attributes queried.
        const EXTENDED_FORMATS       = 0b0000_0001;
        /// Contexts can be created for an explicit version and profile.
        const CREATE_CONTEXT_ATTRIBS = 0b0000_0010;
    }
}

/// A windowing host able to produce OpenGL windows.
///
/// Methods returning [`Result`] may fail with any [`ErrorKind`], the caller
/// re-tags the error with the step that failed. Release methods are called at
/// most once per handle and must not fail.
///
/// [`ErrorKind`]: crate::error::ErrorKind
pub trait Host {
    /// The connection to the windowing system.
    type Connection: Copy;
    /// An enumerated, not yet realized, format candidate.
    type FormatId: Copy;
    /// A realized format with any resources it needs.
    type Format: Copy;
    /// The native window.
    type Window: Copy;
    /// The drawable the context renders to.
    type Surface: Copy;
    /// The OpenGL rendering context.
    type Context: Copy;
    /// The registered close-request protocol.
    type CloseProtocol: Copy;

    /// Open the connection to the windowing system.
    fn open_connection(&mut self) -> Result<Self::Connection>;

    /// Close the connection. Called last.
    fn close_connection(&mut self, connection: Self::Connection);

    /// Detect the optional entry points.
    ///
    /// Failing to detect them is not an error, the host reports the legacy
    /// feature set instead.
    fn features(&mut self, connection: Self::Connection) -> HostFeatures;

    /// Enumerate the candidates satisfying the template.
    fn enumerate_formats(
        &mut self,
        connection: Self::Connection,
        template: &FormatTemplate,
    ) -> Result<Vec<Self::FormatId>>;

    /// Query the multisampling attributes of a candidate.
    fn query_samples(
        &mut self,
        connection: Self::Connection,
        format: Self::FormatId,
    ) -> Result<SampleInfo>;

    /// Let the host pick a single candidate for the template.
    fn choose_legacy_format(
        &mut self,
        connection: Self::Connection,
        template: &FormatTemplate,
    ) -> Result<Self::FormatId>;

    /// Turn the chosen candidate into a usable format.
    fn realize_format(
        &mut self,
        connection: Self::Connection,
        format: Self::FormatId,
    ) -> Result<Self::Format>;

    /// Free whatever [`Host::realize_format`] allocated.
    fn release_format(&mut self, connection: Self::Connection, format: Self::Format);

    /// Create the native window for the format.
    fn create_window(
        &mut self,
        connection: Self::Connection,
        format: Self::Format,
        attributes: &WindowAttributes,
    ) -> Result<Self::Window>;

    /// Destroy the native window.
    fn destroy_window(&mut self, connection: Self::Connection, window: Self::Window);

    /// Set the title shown by the host.
    fn set_title(
        &mut self,
        connection: Self::Connection,
        window: Self::Window,
        title: &str,
    ) -> Result<()>;

    /// Opt into close requests and route them to `latch`.
    fn register_close_protocol(
        &mut self,
        connection: Self::Connection,
        window: Self::Window,
        latch: &CloseLatch,
    ) -> Result<Self::CloseProtocol>;

    /// Obtain the drawable of the window.
    fn acquire_surface(
        &mut self,
        connection: Self::Connection,
        window: Self::Window,
    ) -> Result<Self::Surface>;

    /// Hand the drawable back.
    fn release_surface(
        &mut self,
        connection: Self::Connection,
        window: Self::Window,
        surface: Self::Surface,
    );

    /// Apply the format to the drawable when the host needs it.
    fn apply_format(
        &mut self,
        connection: Self::Connection,
        surface: Self::Surface,
        format: Self::Format,
    ) -> Result<()>;

    /// Stop reporting asynchronous host errors until [`Host::restore_errors`].
    fn suspend_errors(&mut self, _connection: Self::Connection) {}

    /// Resume reporting asynchronous host errors.
    fn restore_errors(&mut self, _connection: Self::Connection) {}

    /// Request a core profile context of exactly `version`.
    ///
    /// `None` means the driver rejected the request.
    fn create_context_with_version(
        &mut self,
        connection: Self::Connection,
        surface: Self::Surface,
        format: Self::Format,
        version: Version,
    ) -> Option<Self::Context>;

    /// Create a context with whatever the driver defaults to.
    fn create_legacy_context(
        &mut self,
        connection: Self::Connection,
        surface: Self::Surface,
        format: Self::Format,
    ) -> Result<Self::Context>;

    /// Delete the context. It's not current anymore at this point.
    fn delete_context(&mut self, connection: Self::Connection, context: Self::Context);

    /// Make the context current on the calling thread.
    fn make_current(
        &mut self,
        connection: Self::Connection,
        surface: Self::Surface,
        context: Self::Context,
    ) -> Result<()>;

    /// Make no context current on the calling thread.
    fn make_not_current(&mut self, connection: Self::Connection);

    /// Show the window.
    fn show_window(&mut self, connection: Self::Connection, window: Self::Window) -> Result<()>;

    /// Drain every pending message without blocking, feeding close requests
    /// addressed to the window into `latch`.
    fn drain_events(
        &mut self,
        connection: Self::Connection,
        window: Self::Window,
        protocol: Self::CloseProtocol,
        latch: &CloseLatch,
    );

    /// Present the back buffer.
    fn swap_buffers(&self, connection: Self::Connection, surface: Self::Surface);

    /// The strings of the current context.
    fn renderer_info(&mut self) -> Option<GlInfo> {
        None
    }

    /// The raw handle of the window.
    fn raw_window_handle(
        &self,
        _connection: Self::Connection,
        _window: Self::Window,
    ) -> std::result::Result<RawWindowHandle, HandleError> {
        Err(HandleError::NotSupported)
    }

    /// The raw handle of the connection.
    fn raw_display_handle(
        &self,
        _connection: Self::Connection,
    ) -> std::result::Result<RawDisplayHandle, HandleError> {
        Err(HandleError::NotSupported)
    }
}
