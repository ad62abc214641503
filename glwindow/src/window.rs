//! The window with a current OpenGL context.

use std::fmt;

use raw_window_handle::{
    DisplayHandle, HandleError, HasDisplayHandle, HasWindowHandle, WindowHandle,
};

use crate::config::{self, FormatTemplate};
use crate::context::{self, Version};
use crate::error::{ErrorKind, Result};
use crate::event::{CloseLatch, CloseState};
use crate::guard::{Acquired, CreationGuard, Resources};
use crate::host::Host;

/// Attributes to use when creating a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowAttributes {
    pub(crate) title: String,
    pub(crate) inner_size: (u32, u32),
    pub(crate) template: FormatTemplate,
}

impl WindowAttributes {
    /// Create the default attributes.
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the title shown in the window decorations.
    ///
    /// By default `"OpenGL Context"` is used.
    #[inline]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the size of the client area in pixels.
    ///
    /// By default `400x300` is used.
    #[inline]
    pub fn with_inner_size(mut self, width: u32, height: u32) -> Self {
        self.inner_size = (width, height);
        self
    }

    /// Sets the capability floor of the pixel format.
    #[inline]
    pub fn with_template(mut self, template: FormatTemplate) -> Self {
        self.template = template;
        self
    }

    /// The requested title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The requested client area size.
    pub fn inner_size(&self) -> (u32, u32) {
        self.inner_size
    }

    /// The requested format floor.
    pub fn template(&self) -> &FormatTemplate {
        &self.template
    }
}

impl Default for WindowAttributes {
    fn default() -> Self {
        Self {
            title: String::from("OpenGL Context"),
            inner_size: (400, 300),
            template: FormatTemplate::default(),
        }
    }
}

/// A shown window owning a context current on the creating thread.
///
/// Dropping the window tears everything down, [`Window::destroy`] is the
/// explicit spelling of that.
pub struct Window<H: Host> {
    host: H,
    resources: Resources<H>,
    window: H::Window,
    surface: H::Surface,
    protocol: H::CloseProtocol,
    latch: CloseLatch,
    version: Option<Version>,
    attributes: WindowAttributes,
}

struct Handles<H: Host> {
    window: H::Window,
    surface: H::Surface,
    protocol: H::CloseProtocol,
    version: Option<Version>,
}

impl<H: Host> Window<H> {
    /// Create the window, its drawable, and a current context on `host`.
    ///
    /// On failure everything acquired so far is released in reverse order and
    /// the error carries the kind of the failing step.
    pub fn new(mut host: H, attributes: WindowAttributes) -> Result<Self> {
        let connection = host
            .open_connection()
            .map_err(|err| err.with_kind(ErrorKind::ConnectionError))?;

        let latch = CloseLatch::new();
        let mut guard = CreationGuard::new(&mut host, connection);
        let handles = Self::materialize(&mut guard, &attributes, &latch)?;
        let resources = guard.commit();

        match host.renderer_info() {
            Some(info) => log::info!(
                "OpenGL {} on {} ({})",
                info.version,
                info.renderer,
                info.vendor
            ),
            None => log::debug!("renderer strings are unavailable"),
        }
        log::info!("window \"{}\" created", attributes.title);

        Ok(Self {
            host,
            resources,
            window: handles.window,
            surface: handles.surface,
            protocol: handles.protocol,
            latch,
            version: handles.version,
            attributes,
        })
    }

    fn materialize(
        guard: &mut CreationGuard<'_, H>,
        attributes: &WindowAttributes,
        latch: &CloseLatch,
    ) -> Result<Handles<H>> {
        let connection = guard.connection();

        let features = guard.host().features(connection);
        log::debug!("host features: {features:?}");

        let format =
            config::negotiate_format(guard.host(), connection, features, &attributes.template)?;
        guard.push(Acquired::Format(format));

        let window = guard
            .host()
            .create_window(connection, format, attributes)
            .map_err(|err| err.with_kind(ErrorKind::WindowCreationFailed))?;
        guard.push(Acquired::Window(window));

        guard
            .host()
            .set_title(connection, window, &attributes.title)
            .map_err(|err| err.with_kind(ErrorKind::WindowCreationFailed))?;

        let protocol = guard
            .host()
            .register_close_protocol(connection, window, latch)
            .map_err(|err| err.with_kind(ErrorKind::ProtocolRegistrationFailed))?;

        let surface = guard
            .host()
            .acquire_surface(connection, window)
            .map_err(|err| err.with_kind(ErrorKind::WindowCreationFailed))?;
        guard.push(Acquired::Surface(window, surface));

        guard
            .host()
            .apply_format(connection, surface, format)
            .map_err(|err| err.with_kind(ErrorKind::FormatUnavailable))?;

        let (context, version) =
            context::create_context(guard.host(), connection, surface, format, features)?;
        guard.push(Acquired::Context(context));

        guard
            .host()
            .make_current(connection, surface, context)
            .map_err(|err| err.with_kind(ErrorKind::ContextBindFailed))?;
        guard.push(Acquired::Current);

        guard
            .host()
            .show_window(connection, window)
            .map_err(|err| err.with_kind(ErrorKind::WindowCreationFailed))?;

        Ok(Handles { window, surface, protocol, version })
    }

    /// Tear the window down.
    ///
    /// The context is made not current and deleted, then the drawable, the
    /// window, the format and the connection are released in that order.
    pub fn destroy(self) {
        drop(self)
    }

    /// Drain the pending host messages and report whether a close was
    /// requested. Once it reports `true` it keeps doing so.
    pub fn poll_events(&mut self) -> bool {
        self.host.drain_events(
            self.resources.connection(),
            self.window,
            self.protocol,
            &self.latch,
        );
        self.latch.is_requested()
    }

    /// Present the back buffer.
    pub fn swap_buffers(&self) {
        self.host.swap_buffers(self.resources.connection(), self.surface);
    }

    /// The negotiated core profile version, `None` for a legacy context.
    pub fn version(&self) -> Option<Version> {
        self.version
    }

    /// The close-request state as of the last [`Window::poll_events`].
    pub fn close_state(&self) -> CloseState {
        self.latch.state()
    }

    /// The attributes the window was created with.
    pub fn attributes(&self) -> &WindowAttributes {
        &self.attributes
    }

    /// The host the window lives on.
    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: Host> Drop for Window<H> {
    fn drop(&mut self) {
        self.resources.release_all(&mut self.host);
        log::info!("window \"{}\" destroyed", self.attributes.title);
    }
}

impl<H: Host> fmt::Debug for Window<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.attributes.title)
            .field("version", &self.version)
            .field("close_state", &self.latch.state())
            .finish_non_exhaustive()
    }
}

impl<H: Host> HasWindowHandle for Window<H> {
    fn window_handle(&self) -> std::result::Result<WindowHandle<'_>, HandleError> {
        let raw = self.host.raw_window_handle(self.resources.connection(), self.window)?;
        // SAFETY: the native window is destroyed only when `self` is dropped.
        Ok(unsafe { WindowHandle::borrow_raw(raw) })
    }
}

impl<H: Host> HasDisplayHandle for Window<H> {
    fn display_handle(&self) -> std::result::Result<DisplayHandle<'_>, HandleError> {
        let raw = self.host.raw_display_handle(self.resources.connection())?;
        // SAFETY: the connection is closed only when `self` is dropped.
        Ok(unsafe { DisplayHandle::borrow_raw(raw) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatTemplateBuilder;

    #[test]
    fn default_attributes() {
        let attributes = WindowAttributes::new();
        assert_eq!(attributes.title(), "OpenGL Context");
        assert_eq!(attributes.inner_size(), (400, 300));
        assert_eq!(attributes.template(), &FormatTemplate::default());
    }

    #[test]
    fn attributes_builder() {
        let template = FormatTemplateBuilder::new().with_alpha_size(0).build();
        let attributes = WindowAttributes::new()
            .with_title("Test")
            .with_inner_size(640, 480)
            .with_template(template);
        assert_eq!(attributes.title(), "Test");
        assert_eq!(attributes.inner_size(), (640, 480));
        assert_eq!(attributes.template().alpha_size, 0);
    }
}
