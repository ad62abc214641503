//! Module instance and the dummy bootstrap resolving the WGL extensions.

use std::io;

use glutin_wgl_sys::wgl;
use glutin_wgl_sys::wgl::types::HGLRC;
use glutin_wgl_sys::wgl_extra;
use windows_sys::Win32::Foundation::{HINSTANCE, HWND};
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::Graphics::OpenGL::{DescribePixelFormat, SetPixelFormat};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::WindowsAndMessaging::{CreateWindowExW, DestroyWindow, CW_USEDEFAULT};

use crate::config::FormatTemplate;
use crate::error::{Error, ErrorKind, Result};
use crate::host::HostFeatures;

use super::config::{self, legacy_descriptor};
use super::{encode_wide, get_proc_address};

pub(super) fn module_instance() -> Result<HINSTANCE> {
    let instance = unsafe { GetModuleHandleW(std::ptr::null()) };
    if instance == 0 {
        return Err(Error::from(io::Error::last_os_error()).with_kind(ErrorKind::ConnectionError));
    }

    Ok(instance)
}

/// A simple wrapper that destroys the window when it is destroyed.
struct WindowWrapper(HWND, HDC);

impl Drop for WindowWrapper {
    fn drop(&mut self) {
        unsafe {
            if self.1 != 0 {
                ReleaseDC(self.0, self.1);
            }
            DestroyWindow(self.0);
        }
    }
}

/// Wraps around a context so that it is destroyed when necessary.
struct ContextWrapper(HGLRC);

impl Drop for ContextWrapper {
    fn drop(&mut self) {
        unsafe {
            wgl::DeleteContext(self.0);
        }
    }
}

/// Keeps the dummy context current while alive.
struct CurrentContextGuard;

impl CurrentContextGuard {
    unsafe fn make_current(hdc: HDC, context: &ContextWrapper) -> Result<Self> {
        if unsafe { wgl::MakeCurrent(hdc as _, context.0) } == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(Self)
    }
}

impl Drop for CurrentContextGuard {
    fn drop(&mut self) {
        unsafe {
            wgl::MakeCurrent(std::ptr::null(), std::ptr::null());
        }
    }
}

/// Create a hidden window with a legacy context to resolve the extension
/// entry points. Everything created here is gone when it returns.
pub(super) unsafe fn load_extra_functions(instance: HINSTANCE) -> Result<wgl_extra::Wgl> {
    let class_name = encode_wide("STATIC");
    let title = encode_wide("");

    let hwnd = unsafe {
        CreateWindowExW(
            0,
            class_name.as_ptr(),
            title.as_ptr(),
            0,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            0,
            0,
            instance,
            std::ptr::null(),
        )
    };
    if hwnd == 0 {
        return Err(io::Error::last_os_error().into());
    }

    let mut dummy_window = WindowWrapper(hwnd, 0);
    dummy_window.1 = unsafe { GetDC(hwnd) };
    if dummy_window.1 == 0 {
        return Err(io::Error::last_os_error().into());
    }

    // Getting the pixel format that we will use and setting it.
    unsafe {
        let mut descriptor = legacy_descriptor(&FormatTemplate::default());
        let id = config::choose_dummy_pixel_format(dummy_window.1, &descriptor)?;
        let size = std::mem::size_of_val(&descriptor) as u32;
        if DescribePixelFormat(dummy_window.1, id, size, &mut descriptor) == 0 {
            return Err(io::Error::last_os_error().into());
        }
        if SetPixelFormat(dummy_window.1, id, &descriptor) == 0 {
            return Err(io::Error::last_os_error().into());
        }
    }

    let dummy_context = unsafe { wgl::CreateContext(dummy_window.1 as _) };
    if dummy_context.is_null() {
        return Err(io::Error::last_os_error().into());
    }
    let dummy_context = ContextWrapper(dummy_context);
    let _current = unsafe { CurrentContextGuard::make_current(dummy_window.1, &dummy_context)? };

    Ok(wgl_extra::Wgl::load_with(|name| unsafe { get_proc_address(name) }))
}

pub(super) fn extract_features(extra: &wgl_extra::Wgl) -> HostFeatures {
    let mut features = HostFeatures::empty();

    if extra.ChoosePixelFormatARB.is_loaded() && extra.GetPixelFormatAttribivARB.is_loaded() {
        features |= HostFeatures::EXTENDED_FORMATS;
    }

    if extra.CreateContextAttribsARB.is_loaded() {
        features |= HostFeatures::CREATE_CONTEXT_ATTRIBS;
    }

    features
}
