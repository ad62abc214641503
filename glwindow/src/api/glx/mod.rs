//! GLX host on top of Xlib.

use std::ffi::{c_int, c_void, CStr, CString};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Mutex, PoisonError};

use glutin_glx_sys::{glx, glx_extra};
use libloading::Library;
use once_cell::sync::Lazy;
use raw_window_handle::{
    HandleError, RawDisplayHandle, RawWindowHandle, XlibDisplayHandle, XlibWindowHandle,
};
use x11_dl::xlib::{self, Xlib};

use crate::config::{FormatTemplate, SampleInfo};
use crate::context::{GlInfo, Version};
use crate::error::{Error, ErrorKind, Result};
use crate::event::CloseLatch;
use crate::host::{Host, HostFeatures};
use crate::lib_loading::{self, SymLoading, SymWrapper};
use crate::window::WindowAttributes;

mod config;
mod context;
mod display;
mod window;

pub use self::config::{GlxFormat, GlxFormatId};
pub use self::display::GlxDisplay;

/// The XLIB handle.
pub(crate) static XLIB: Lazy<Option<Xlib>> = Lazy::new(|| Xlib::open().ok());

/// The GLX handle.
pub(crate) static GLX: Lazy<Option<Glx>> = Lazy::new(|| {
    let paths = ["libGL.so.1", "libGL.so"];
    unsafe { SymWrapper::new(&paths).map(Glx).ok() }
});

/// The GLX extension entry points, resolved through `glXGetProcAddress`.
pub(crate) static GLX_EXTRA: Lazy<Option<GlxExtra>> = Lazy::new(|| {
    let glx = GLX.as_ref()?;
    Some(GlxExtra::new(glx))
});

/// The last X error code seen by the recording handler, `0` for none.
static LAST_X_ERROR: AtomicI32 = AtomicI32::new(0);

/// The recording handler install shared by every open display.
static HANDLER_SLOT: Mutex<HandlerSlot> = Mutex::new(HandlerSlot::new());

/// The handler argument and return value of `XSetErrorHandler`.
pub(crate) type XErrorHandler =
    Option<unsafe extern "C" fn(*mut xlib::Display, *mut xlib::XErrorEvent) -> c_int>;

pub(crate) struct Glx(SymWrapper<glx::Glx>);

unsafe impl Sync for Glx {}
unsafe impl Send for Glx {}

impl std::ops::Deref for Glx {
    type Target = glx::Glx;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl SymLoading for glx::Glx {
    unsafe fn load_with(lib: &Library) -> Self {
        Self::load_with(|name| unsafe { lib_loading::lookup(lib, name) })
    }
}

pub(crate) struct GlxExtra(glx_extra::Glx);

unsafe impl Sync for GlxExtra {}
unsafe impl Send for GlxExtra {}

impl GlxExtra {
    fn new(glx: &Glx) -> Self {
        GlxExtra(glx_extra::Glx::load_with(|name| unsafe { get_proc_address(glx, name) }))
    }
}

impl std::ops::Deref for GlxExtra {
    type Target = glx_extra::Glx;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// # Safety
/// The GLX library must stay loaded while the result is used.
unsafe fn get_proc_address(glx: &Glx, name: &str) -> *const c_void {
    let name = match CString::new(name) {
        Ok(name) => name,
        Err(_) => return std::ptr::null(),
    };

    unsafe { glx.GetProcAddress(name.as_ptr() as *const _) as *const c_void }
}

unsafe extern "C" fn record_x_error(
    _display: *mut xlib::Display,
    event: *mut xlib::XErrorEvent,
) -> c_int {
    let code = unsafe { event.as_ref() }.map_or(-1, |event| event.error_code as i32);
    LAST_X_ERROR.store(code, Ordering::Relaxed);
    0
}

unsafe extern "C" fn ignore_x_error(
    _display: *mut xlib::Display,
    _event: *mut xlib::XErrorEvent,
) -> c_int {
    0
}

/// Take the error recorded since the last call.
fn take_x_error() -> Option<i64> {
    match LAST_X_ERROR.swap(0, Ordering::Relaxed) {
        0 => None,
        code => Some(code as i64),
    }
}

/// Reference counted install of [`record_x_error`].
///
/// Xlib keeps a single process-wide handler, so the one found before the
/// first display opened is put back only when the last one closes.
#[derive(Debug)]
pub(crate) struct HandlerSlot {
    users: usize,
    previous: XErrorHandler,
}

impl HandlerSlot {
    const fn new() -> Self {
        Self { users: 0, previous: None }
    }

    /// Run `f` on the shared slot.
    pub(crate) fn with<T>(f: impl FnOnce(&mut HandlerSlot) -> T) -> T {
        let mut slot = HANDLER_SLOT.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut slot)
    }

    /// `set` installs a handler and returns the previous one.
    pub(crate) fn install(&mut self, set: impl FnOnce(XErrorHandler) -> XErrorHandler) {
        if self.users == 0 {
            self.previous = set(Some(record_x_error));
        }
        self.users += 1;
    }

    /// Run `close` with the recording handler still in place, then give the
    /// previous handler back if this was the last user.
    ///
    /// Closing flushes the request queue, errors raised by it must not reach
    /// the default handler which exits the process.
    pub(crate) fn uninstall_after(
        &mut self,
        close: impl FnOnce(),
        set: impl FnOnce(XErrorHandler) -> XErrorHandler,
    ) {
        close();
        self.users = self.users.saturating_sub(1);
        if self.users == 0 {
            set(self.previous.take());
        }
        take_x_error();
    }
}

/// The GLX/Xlib windowing host.
///
/// The recording X error handler stays installed while any connection is
/// open, the previous one is put back when the last of them closes.
#[derive(Debug, Default)]
pub struct GlxHost {
    extra: Option<&'static GlxExtra>,
}

impl GlxHost {
    /// Create the host. Nothing is loaded until the connection is opened.
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for GlxExtra {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GlxExtra")
    }
}

impl GlxDisplay {
    /// Flush the request queue and turn a recorded X error into `kind`.
    pub(crate) fn check(&self, kind: ErrorKind, what: &str) -> Result<()> {
        unsafe {
            (self.xlib.XSync)(self.raw, xlib::False);
        }

        match take_x_error() {
            Some(code) => Err(Error::new(Some(code), Some(format!("{what} failed")), kind)),
            None => Ok(()),
        }
    }
}

impl Host for GlxHost {
    type CloseProtocol = xlib::Atom;
    type Connection = GlxDisplay;
    type Context = glx::types::GLXContext;
    type Format = GlxFormat;
    type FormatId = GlxFormatId;
    type Surface = glx::types::GLXDrawable;
    type Window = xlib::Window;

    fn open_connection(&mut self) -> Result<GlxDisplay> {
        self.open_display()
    }

    fn close_connection(&mut self, connection: GlxDisplay) {
        self.close_display(connection)
    }

    fn features(&mut self, connection: GlxDisplay) -> HostFeatures {
        self.extract_features(connection)
    }

    fn enumerate_formats(
        &mut self,
        connection: GlxDisplay,
        template: &FormatTemplate,
    ) -> Result<Vec<GlxFormatId>> {
        connection.find_configs(template)
    }

    fn query_samples(&mut self, connection: GlxDisplay, format: GlxFormatId) -> Result<SampleInfo> {
        connection.sample_info(format)
    }

    fn choose_legacy_format(
        &mut self,
        connection: GlxDisplay,
        template: &FormatTemplate,
    ) -> Result<GlxFormatId> {
        connection.choose_visual(template)
    }

    fn realize_format(&mut self, connection: GlxDisplay, format: GlxFormatId) -> Result<GlxFormat> {
        connection.realize(format)
    }

    fn release_format(&mut self, connection: GlxDisplay, format: GlxFormat) {
        connection.free_format(format)
    }

    fn create_window(
        &mut self,
        connection: GlxDisplay,
        format: GlxFormat,
        attributes: &WindowAttributes,
    ) -> Result<xlib::Window> {
        connection.create_window(format, attributes)
    }

    fn destroy_window(&mut self, connection: GlxDisplay, window: xlib::Window) {
        connection.destroy_window(window)
    }

    fn set_title(
        &mut self,
        connection: GlxDisplay,
        window: xlib::Window,
        title: &str,
    ) -> Result<()> {
        connection.set_title(window, title)
    }

    fn register_close_protocol(
        &mut self,
        connection: GlxDisplay,
        window: xlib::Window,
        _latch: &CloseLatch,
    ) -> Result<xlib::Atom> {
        connection.register_delete_window(window)
    }

    fn acquire_surface(
        &mut self,
        connection: GlxDisplay,
        window: xlib::Window,
    ) -> Result<glx::types::GLXDrawable> {
        connection.map_window(window)
    }

    fn release_surface(
        &mut self,
        connection: GlxDisplay,
        window: xlib::Window,
        _surface: glx::types::GLXDrawable,
    ) {
        connection.unmap_window(window)
    }

    fn apply_format(
        &mut self,
        _connection: GlxDisplay,
        _surface: glx::types::GLXDrawable,
        _format: GlxFormat,
    ) -> Result<()> {
        // The visual is bound when the window is created.
        Ok(())
    }

    fn suspend_errors(&mut self, connection: GlxDisplay) {
        unsafe {
            (connection.xlib.XSetErrorHandler)(Some(ignore_x_error));
        }
    }

    fn restore_errors(&mut self, connection: GlxDisplay) {
        unsafe {
            // Deliver whatever the probing triggered to the ignoring handler.
            (connection.xlib.XSync)(connection.raw, xlib::False);
            (connection.xlib.XSetErrorHandler)(Some(record_x_error));
        }
        take_x_error();
    }

    fn create_context_with_version(
        &mut self,
        connection: GlxDisplay,
        _surface: glx::types::GLXDrawable,
        format: GlxFormat,
        version: Version,
    ) -> Option<glx::types::GLXContext> {
        let extra = self.extra?;
        connection.create_context_attribs(extra, format, version)
    }

    fn create_legacy_context(
        &mut self,
        connection: GlxDisplay,
        _surface: glx::types::GLXDrawable,
        format: GlxFormat,
    ) -> Result<glx::types::GLXContext> {
        connection.create_legacy_context(format)
    }

    fn delete_context(&mut self, connection: GlxDisplay, context: glx::types::GLXContext) {
        connection.destroy_context(context)
    }

    fn make_current(
        &mut self,
        connection: GlxDisplay,
        surface: glx::types::GLXDrawable,
        context: glx::types::GLXContext,
    ) -> Result<()> {
        connection.make_current(surface, context)
    }

    fn make_not_current(&mut self, connection: GlxDisplay) {
        connection.make_not_current()
    }

    fn show_window(&mut self, connection: GlxDisplay, _window: xlib::Window) -> Result<()> {
        // Mapped when the surface was acquired, only push it to the server.
        unsafe {
            (connection.xlib.XFlush)(connection.raw);
        }
        connection.check(ErrorKind::WindowCreationFailed, "XFlush")
    }

    fn drain_events(
        &mut self,
        connection: GlxDisplay,
        window: xlib::Window,
        protocol: xlib::Atom,
        latch: &CloseLatch,
    ) {
        connection.drain_events(window, protocol, latch)
    }

    fn swap_buffers(&self, connection: GlxDisplay, surface: glx::types::GLXDrawable) {
        unsafe {
            connection.glx.SwapBuffers(connection.raw.cast(), surface);
        }
    }

    fn renderer_info(&mut self) -> Option<GlInfo> {
        let glx = GLX.as_ref()?;
        let get_string = unsafe { get_proc_address(glx, "glGetString") };
        unsafe { context::gl_info(get_string) }
    }

    fn raw_window_handle(
        &self,
        _connection: GlxDisplay,
        window: xlib::Window,
    ) -> std::result::Result<RawWindowHandle, HandleError> {
        Ok(RawWindowHandle::Xlib(XlibWindowHandle::new(window)))
    }

    fn raw_display_handle(
        &self,
        connection: GlxDisplay,
    ) -> std::result::Result<RawDisplayHandle, HandleError> {
        let display = NonNull::new(connection.raw.cast());
        Ok(RawDisplayHandle::Xlib(XlibDisplayHandle::new(display, connection.screen)))
    }
}

/// Read a string owned by the library.
///
/// # Safety
/// `ptr` must be null or point to a valid nul terminated string.
unsafe fn read_string(ptr: *const u8) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr.cast()) }.to_string_lossy().into_owned())
    }
}
