//! WGL host on top of Win32.

use std::ffi::{c_void, OsStr};
use std::fmt;
use std::num::NonZeroIsize;
use std::os::windows::ffi::OsStrExt;

use glutin_wgl_sys::wgl;
use glutin_wgl_sys::wgl::types::HGLRC;
use glutin_wgl_sys::wgl_extra;
use raw_window_handle::{
    HandleError, RawDisplayHandle, RawWindowHandle, Win32WindowHandle, WindowsDisplayHandle,
};
use windows_sys::Win32::Foundation::{HINSTANCE, HWND};
use windows_sys::Win32::Graphics::Gdi::HDC;
use windows_sys::Win32::Graphics::OpenGL::{self as gl, SwapBuffers};

use crate::config::{FormatTemplate, SampleInfo};
use crate::context::{GlInfo, Version};
use crate::error::{ErrorKind, Result};
use crate::event::CloseLatch;
use crate::host::{Host, HostFeatures};
use crate::window::WindowAttributes;

mod config;
mod context;
mod display;
mod window;

pub use self::config::WglFormat;

/// The WGL/Win32 windowing host.
#[derive(Default)]
pub struct WglHost {
    extra: Option<wgl_extra::Wgl>,
}

impl WglHost {
    /// Create the host. The extension entry points are resolved on creation.
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for WglHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WglHost").field("extensions_loaded", &self.extra.is_some()).finish()
    }
}

impl Host for WglHost {
    type CloseProtocol = ();
    type Connection = HINSTANCE;
    type Context = HGLRC;
    type Format = WglFormat;
    type FormatId = i32;
    type Surface = HDC;
    type Window = HWND;

    fn open_connection(&mut self) -> Result<HINSTANCE> {
        display::module_instance()
    }

    fn close_connection(&mut self, _instance: HINSTANCE) {
        // The module handle isn't reference counted.
        self.extra = None;
    }

    fn features(&mut self, instance: HINSTANCE) -> HostFeatures {
        match unsafe { display::load_extra_functions(instance) } {
            Ok(extra) => {
                let features = display::extract_features(&extra);
                self.extra = Some(extra);
                features
            },
            Err(err) => {
                log::warn!("WGL bootstrap failed, using the legacy paths: {err}");
                HostFeatures::empty()
            },
        }
    }

    fn enumerate_formats(
        &mut self,
        _instance: HINSTANCE,
        template: &FormatTemplate,
    ) -> Result<Vec<i32>> {
        let extra = self.extra.as_ref().ok_or(ErrorKind::FormatUnavailable)?;
        unsafe { config::find_configs(extra, template) }
    }

    fn query_samples(&mut self, _instance: HINSTANCE, format: i32) -> Result<SampleInfo> {
        let extra = self.extra.as_ref().ok_or(ErrorKind::FormatUnavailable)?;
        unsafe { config::sample_info(extra, format) }
    }

    fn choose_legacy_format(
        &mut self,
        _instance: HINSTANCE,
        template: &FormatTemplate,
    ) -> Result<i32> {
        unsafe { config::choose_pixel_format(template) }
    }

    fn realize_format(&mut self, _instance: HINSTANCE, format: i32) -> Result<WglFormat> {
        unsafe { config::describe(format) }
    }

    fn release_format(&mut self, _instance: HINSTANCE, _format: WglFormat) {}

    fn create_window(
        &mut self,
        instance: HINSTANCE,
        _format: WglFormat,
        attributes: &WindowAttributes,
    ) -> Result<HWND> {
        unsafe { window::create_window(instance, attributes) }
    }

    fn destroy_window(&mut self, instance: HINSTANCE, hwnd: HWND) {
        unsafe { window::destroy_window(instance, hwnd) }
    }

    fn set_title(&mut self, _instance: HINSTANCE, hwnd: HWND, title: &str) -> Result<()> {
        unsafe { window::set_title(hwnd, title) }
    }

    fn register_close_protocol(
        &mut self,
        _instance: HINSTANCE,
        hwnd: HWND,
        latch: &CloseLatch,
    ) -> Result<()> {
        unsafe { window::attach_latch(hwnd, latch) }
    }

    fn acquire_surface(&mut self, _instance: HINSTANCE, hwnd: HWND) -> Result<HDC> {
        unsafe { window::get_dc(hwnd) }
    }

    fn release_surface(&mut self, _instance: HINSTANCE, hwnd: HWND, hdc: HDC) {
        unsafe { window::release_dc(hwnd, hdc) }
    }

    fn apply_format(&mut self, _instance: HINSTANCE, hdc: HDC, format: WglFormat) -> Result<()> {
        unsafe { config::set_pixel_format(hdc, format) }
    }

    fn create_context_with_version(
        &mut self,
        _instance: HINSTANCE,
        hdc: HDC,
        _format: WglFormat,
        version: Version,
    ) -> Option<HGLRC> {
        let extra = self.extra.as_ref()?;
        unsafe { context::create_context_attribs(extra, hdc, version) }
    }

    fn create_legacy_context(
        &mut self,
        _instance: HINSTANCE,
        hdc: HDC,
        _format: WglFormat,
    ) -> Result<HGLRC> {
        unsafe { context::create_legacy_context(hdc) }
    }

    fn delete_context(&mut self, _instance: HINSTANCE, context: HGLRC) {
        unsafe {
            wgl::DeleteContext(context);
        }
    }

    fn make_current(&mut self, _instance: HINSTANCE, hdc: HDC, context: HGLRC) -> Result<()> {
        unsafe { context::make_current(hdc, context) }
    }

    fn make_not_current(&mut self, _instance: HINSTANCE) {
        unsafe {
            wgl::MakeCurrent(std::ptr::null(), std::ptr::null());
        }
    }

    fn show_window(&mut self, _instance: HINSTANCE, hwnd: HWND) -> Result<()> {
        unsafe { window::show_window(hwnd) }
    }

    fn drain_events(
        &mut self,
        _instance: HINSTANCE,
        _hwnd: HWND,
        _protocol: (),
        _latch: &CloseLatch,
    ) {
        // Close requests reach the latch from the window procedure.
        unsafe { window::pump_messages() }
    }

    fn swap_buffers(&self, _instance: HINSTANCE, hdc: HDC) {
        unsafe {
            SwapBuffers(hdc);
        }
    }

    fn renderer_info(&mut self) -> Option<GlInfo> {
        unsafe {
            Some(GlInfo {
                version: context::read_string(gl::glGetString(gl::GL_VERSION))?,
                renderer: context::read_string(gl::glGetString(gl::GL_RENDERER))?,
                vendor: context::read_string(gl::glGetString(gl::GL_VENDOR))?,
            })
        }
    }

    fn raw_window_handle(
        &self,
        instance: HINSTANCE,
        hwnd: HWND,
    ) -> std::result::Result<RawWindowHandle, HandleError> {
        let hwnd = NonZeroIsize::new(hwnd).ok_or(HandleError::Unavailable)?;
        let mut handle = Win32WindowHandle::new(hwnd);
        handle.hinstance = NonZeroIsize::new(instance);
        Ok(RawWindowHandle::Win32(handle))
    }

    fn raw_display_handle(
        &self,
        _instance: HINSTANCE,
    ) -> std::result::Result<RawDisplayHandle, HandleError> {
        Ok(RawDisplayHandle::Windows(WindowsDisplayHandle::new()))
    }
}

/// Nul terminated UTF-16 for the wide Win32 functions.
pub(crate) fn encode_wide(text: &str) -> Vec<u16> {
    OsStr::new(text).encode_wide().chain(Some(0)).collect()
}

/// Resolve a WGL entry point, treating the sentinel values some drivers
/// return as missing.
///
/// # Safety
/// A context must be current on the calling thread.
pub(crate) unsafe fn get_proc_address(name: &str) -> *const c_void {
    let name = match std::ffi::CString::new(name) {
        Ok(name) => name,
        Err(_) => return std::ptr::null(),
    };

    let addr = unsafe { wgl::GetProcAddress(name.as_ptr()) };
    match addr as isize {
        -1 | 0 | 1 | 2 | 3 => std::ptr::null(),
        _ => addr as *const c_void,
    }
}
