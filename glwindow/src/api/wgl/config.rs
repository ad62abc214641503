//! Handling of `PIXELFORMATDESCRIPTOR` and pixel format index.

use std::ffi::c_int;
use std::{io, mem};

use glutin_wgl_sys::wgl_extra;
use windows_sys::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows_sys::Win32::Graphics::OpenGL::{
    ChoosePixelFormat, DescribePixelFormat, SetPixelFormat, PFD_DOUBLEBUFFER, PFD_DRAW_TO_WINDOW,
    PFD_MAIN_PLANE, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};

use crate::config::{FormatTemplate, SampleInfo};
use crate::error::{Error, ErrorKind, Result};

/// The upper bound for number of configs we query from `wglChoosePixelFormatARB`.
const MAX_QUERY_CONFIGS: usize = 256;

/// A pixel format index with its description.
#[derive(Clone, Copy)]
pub struct WglFormat {
    pub(crate) id: c_int,
    pub(crate) descriptor: PIXELFORMATDESCRIPTOR,
}

impl std::fmt::Debug for WglFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WglFormat").field("id", &self.id).finish_non_exhaustive()
    }
}

/// The device context of the whole screen, formats are per device.
struct ScreenDc(HDC);

impl ScreenDc {
    unsafe fn get() -> Result<Self> {
        let hdc = unsafe { GetDC(0) };
        if hdc == 0 {
            return Err(io::Error::last_os_error().into());
        }

        Ok(Self(hdc))
    }
}

impl Drop for ScreenDc {
    fn drop(&mut self) {
        unsafe {
            ReleaseDC(0, self.0);
        }
    }
}

pub(super) fn legacy_descriptor(template: &FormatTemplate) -> PIXELFORMATDESCRIPTOR {
    let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };
    descriptor.nSize = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16;
    descriptor.nVersion = 1;
    descriptor.dwFlags = PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL;
    if template.double_buffer {
        descriptor.dwFlags |= PFD_DOUBLEBUFFER;
    }
    descriptor.iPixelType = PFD_TYPE_RGBA as _;
    descriptor.cColorBits = u8::try_from(template.color_bits()).unwrap_or(u8::MAX);
    descriptor.cAlphaBits = template.alpha_size;
    descriptor.iLayerType = PFD_MAIN_PLANE as _;
    descriptor
}

/// This function chooses a pixel format that is likely to be provided by the
/// main video driver of the system.
pub(super) unsafe fn choose_dummy_pixel_format(
    hdc: HDC,
    descriptor: &PIXELFORMATDESCRIPTOR,
) -> Result<c_int> {
    let id = unsafe { ChoosePixelFormat(hdc, descriptor) };
    if id == 0 {
        return Err(io::Error::last_os_error().into());
    }

    Ok(id)
}

pub(super) unsafe fn find_configs(
    extra: &wgl_extra::Wgl,
    template: &FormatTemplate,
) -> Result<Vec<c_int>> {
    let mut attrs = Vec::<c_int>::with_capacity(13);

    attrs.push(wgl_extra::DRAW_TO_WINDOW_ARB as c_int);
    attrs.push(1);

    attrs.push(wgl_extra::SUPPORT_OPENGL_ARB as c_int);
    attrs.push(1);

    attrs.push(wgl_extra::DOUBLE_BUFFER_ARB as c_int);
    attrs.push(template.double_buffer as c_int);

    attrs.push(wgl_extra::PIXEL_TYPE_ARB as c_int);
    attrs.push(wgl_extra::TYPE_RGBA_ARB as c_int);

    attrs.push(wgl_extra::COLOR_BITS_ARB as c_int);
    attrs.push(template.color_bits() as c_int);

    attrs.push(wgl_extra::ALPHA_BITS_ARB as c_int);
    attrs.push(template.alpha_size as c_int);

    // Terminate attrs with zero.
    attrs.push(0);

    unsafe {
        let screen = ScreenDc::get()?;
        let mut configs = vec![0; MAX_QUERY_CONFIGS];
        let mut num_configs = 0;
        if extra.ChoosePixelFormatARB(
            screen.0 as _,
            attrs.as_ptr(),
            std::ptr::null(),
            configs.len() as _,
            configs.as_mut_ptr(),
            &mut num_configs,
        ) == 0
        {
            return Err(io::Error::last_os_error().into());
        }

        configs.truncate(num_configs as usize);
        log::debug!("wglChoosePixelFormatARB returned {} formats", configs.len());
        Ok(configs)
    }
}

/// Query `WGL_SAMPLE_BUFFERS_ARB` and `WGL_SAMPLES_ARB` of a format.
pub(super) unsafe fn sample_info(extra: &wgl_extra::Wgl, id: c_int) -> Result<SampleInfo> {
    let attrs = [wgl_extra::SAMPLE_BUFFERS_ARB as c_int, wgl_extra::SAMPLES_ARB as c_int];
    let mut values = [0 as c_int; 2];

    unsafe {
        let screen = ScreenDc::get()?;
        if extra.GetPixelFormatAttribivARB(
            screen.0 as _,
            id,
            0,
            attrs.len() as _,
            attrs.as_ptr(),
            values.as_mut_ptr(),
        ) == 0
        {
            return Err(io::Error::last_os_error().into());
        }
    }

    Ok(SampleInfo { sample_buffers: values[0], samples: values[1] })
}

pub(super) unsafe fn choose_pixel_format(template: &FormatTemplate) -> Result<c_int> {
    unsafe {
        let screen = ScreenDc::get()?;
        choose_dummy_pixel_format(screen.0, &legacy_descriptor(template))
    }
}

pub(super) unsafe fn describe(id: c_int) -> Result<WglFormat> {
    let mut descriptor: PIXELFORMATDESCRIPTOR = unsafe { mem::zeroed() };

    unsafe {
        let screen = ScreenDc::get()?;
        let size = mem::size_of::<PIXELFORMATDESCRIPTOR>() as u32;
        if DescribePixelFormat(screen.0, id, size, &mut descriptor) == 0 {
            return Err(io::Error::last_os_error().into());
        }
    }

    Ok(WglFormat { id, descriptor })
}

pub(super) unsafe fn set_pixel_format(hdc: HDC, format: WglFormat) -> Result<()> {
    if unsafe { SetPixelFormat(hdc, format.id, &format.descriptor) } == 0 {
        let err = Error::from(io::Error::last_os_error());
        return Err(err.with_kind(ErrorKind::FormatUnavailable));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FormatTemplateBuilder;

    #[test]
    fn legacy_descriptor_follows_template() {
        let descriptor = legacy_descriptor(&FormatTemplate::default());
        assert_eq!(descriptor.cColorBits, 24);
        assert_eq!(descriptor.cAlphaBits, 8);
        assert_ne!(descriptor.dwFlags & PFD_DOUBLEBUFFER, 0);

        let wide = FormatTemplateBuilder::new().with_color_size(100).build();
        assert_eq!(legacy_descriptor(&wide).cColorBits, u8::MAX);
    }
}
