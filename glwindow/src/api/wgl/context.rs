//! WGL context creation.

use std::ffi::{c_int, CStr};
use std::io;

use glutin_wgl_sys::wgl;
use glutin_wgl_sys::wgl::types::HGLRC;
use glutin_wgl_sys::wgl_extra;
use windows_sys::Win32::Graphics::Gdi::HDC;

use crate::context::Version;
use crate::error::{Error, ErrorKind, Result};

pub(super) unsafe fn create_context_attribs(
    extra: &wgl_extra::Wgl,
    hdc: HDC,
    version: Version,
) -> Option<HGLRC> {
    let attrs = [
        wgl_extra::CONTEXT_MAJOR_VERSION_ARB as c_int,
        version.major as c_int,
        wgl_extra::CONTEXT_MINOR_VERSION_ARB as c_int,
        version.minor as c_int,
        wgl_extra::CONTEXT_PROFILE_MASK_ARB as c_int,
        wgl_extra::CONTEXT_CORE_PROFILE_BIT_ARB as c_int,
        0,
    ];

    let context =
        unsafe { extra.CreateContextAttribsARB(hdc as _, std::ptr::null(), attrs.as_ptr()) };

    (!context.is_null()).then_some(context as HGLRC)
}

pub(super) unsafe fn create_legacy_context(hdc: HDC) -> Result<HGLRC> {
    let context = unsafe { wgl::CreateContext(hdc as _) };
    if context.is_null() {
        return Err(io::Error::last_os_error().into());
    }

    Ok(context)
}

pub(super) unsafe fn make_current(hdc: HDC, context: HGLRC) -> Result<()> {
    if unsafe { wgl::MakeCurrent(hdc as _, context) } == 0 {
        let err = Error::from(io::Error::last_os_error());
        return Err(err.with_kind(ErrorKind::ContextBindFailed));
    }

    Ok(())
}

/// # Safety
/// `ptr` must be null or point to a valid nul terminated string.
pub(super) unsafe fn read_string(ptr: *const u8) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(unsafe { CStr::from_ptr(ptr.cast()) }.to_string_lossy().into_owned())
    }
}
