//! GLX context creation and binding.

use std::ffi::{c_int, c_void};

use glutin_glx_sys::glx::types::{GLXContext, GLXDrawable};
use glutin_glx_sys::{glx, glx_extra};

use crate::context::{GlInfo, Version};
use crate::error::{Error, ErrorKind, Result};

use super::{read_string, take_x_error, GlxDisplay, GlxExtra, GlxFormat};

const GL_VENDOR: u32 = 0x1F00;
const GL_RENDERER: u32 = 0x1F01;
const GL_VERSION: u32 = 0x1F02;

type GetString = unsafe extern "system" fn(u32) -> *const u8;

impl GlxDisplay {
    /// Request a core profile context, `None` when the driver refuses it.
    pub(crate) fn create_context_attribs(
        &self,
        extra: &GlxExtra,
        format: GlxFormat,
        version: Version,
    ) -> Option<GLXContext> {
        let config = format.fb_config?;

        let attributes = [
            glx_extra::CONTEXT_MAJOR_VERSION_ARB as c_int,
            version.major as c_int,
            glx_extra::CONTEXT_MINOR_VERSION_ARB as c_int,
            version.minor as c_int,
            glx_extra::CONTEXT_PROFILE_MASK_ARB as c_int,
            glx_extra::CONTEXT_CORE_PROFILE_BIT_ARB as c_int,
            0,
        ];

        let context = unsafe {
            extra.CreateContextAttribsARB(
                self.raw.cast(),
                config,
                std::ptr::null(),
                1,
                attributes.as_ptr(),
            )
        };

        (!context.is_null()).then_some(context)
    }

    pub(crate) fn create_legacy_context(&self, format: GlxFormat) -> Result<GLXContext> {
        let context = unsafe {
            match format.fb_config {
                Some(config) => self.glx.CreateNewContext(
                    self.raw.cast(),
                    config,
                    glx::RGBA_TYPE as c_int,
                    std::ptr::null(),
                    1,
                ),
                None => self.glx.CreateContext(
                    self.raw.cast(),
                    format.visual.cast(),
                    std::ptr::null(),
                    1,
                ),
            }
        };

        self.check(ErrorKind::ContextCreationFailed, "context creation")?;
        if context.is_null() {
            return Err(ErrorKind::ContextCreationFailed.into());
        }

        Ok(context)
    }

    pub(crate) fn destroy_context(&self, context: GLXContext) {
        unsafe {
            self.glx.DestroyContext(self.raw.cast(), context);
        }
    }

    pub(crate) fn make_current(&self, surface: GLXDrawable, context: GLXContext) -> Result<()> {
        let result = unsafe { self.glx.MakeCurrent(self.raw.cast(), surface, context) };
        self.check(ErrorKind::ContextBindFailed, "glXMakeCurrent")?;

        if result == 0 {
            let message = Some("glXMakeCurrent failed".into());
            Err(Error::new(None, message, ErrorKind::ContextBindFailed))
        } else {
            Ok(())
        }
    }

    pub(crate) fn make_not_current(&self) {
        unsafe {
            self.glx.MakeCurrent(self.raw.cast(), 0, std::ptr::null());
        }
        take_x_error();
    }
}

/// Read the renderer strings of the current context.
///
/// # Safety
/// `get_string` must be null or the address of `glGetString`.
pub(super) unsafe fn gl_info(get_string: *const c_void) -> Option<GlInfo> {
    if get_string.is_null() {
        return None;
    }

    unsafe {
        let get_string: GetString = std::mem::transmute(get_string);
        Some(GlInfo {
            version: read_string(get_string(GL_VERSION))?,
            renderer: read_string(get_string(GL_RENDERER))?,
            vendor: read_string(get_string(GL_VENDOR))?,
        })
    }
}
