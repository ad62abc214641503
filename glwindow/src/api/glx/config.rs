//! Everything related to finding and realizing the `GLXFBConfig`.

use std::ffi::c_int;
use std::slice;

use glutin_glx_sys::glx;
use glutin_glx_sys::glx::types::GLXFBConfig;
use x11_dl::xlib;

use crate::config::{FormatTemplate, SampleInfo};
use crate::error::{Error, ErrorKind, Result};

use super::GlxDisplay;

/// A format candidate on GLX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlxFormatId {
    /// A framebuffer config, GLX 1.3 and newer.
    FbConfig(GLXFBConfig),
    /// A visual picked by `glXChooseVisual`, owned until realized.
    Visual(*mut xlib::XVisualInfo),
}

/// A realized format: the visual to create the window with and its colormap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlxFormat {
    pub(crate) fb_config: Option<GLXFBConfig>,
    pub(crate) visual: *mut xlib::XVisualInfo,
    pub(crate) colormap: xlib::Colormap,
}

impl GlxDisplay {
    pub(crate) fn find_configs(&self, template: &FormatTemplate) -> Result<Vec<GlxFormatId>> {
        let mut config_attributes = Vec::<c_int>::with_capacity(19);

        // Double buffer.
        config_attributes.push(glx::DOUBLEBUFFER as c_int);
        config_attributes.push(template.double_buffer as c_int);

        // Color.
        for channel in [glx::RED_SIZE, glx::GREEN_SIZE, glx::BLUE_SIZE] {
            config_attributes.push(channel as c_int);
            config_attributes.push(template.color_size as c_int);
        }

        // Add alpha.
        config_attributes.push(glx::ALPHA_SIZE as c_int);
        config_attributes.push(template.alpha_size as c_int);

        // Add surface type.
        config_attributes.push(glx::DRAWABLE_TYPE as c_int);
        config_attributes.push(glx::WINDOW_BIT as c_int);

        // Render type.
        config_attributes.push(glx::RENDER_TYPE as c_int);
        config_attributes.push(glx::RGBA_BIT as c_int);

        config_attributes.push(glx::X_RENDERABLE as c_int);
        config_attributes.push(1);

        // Push X11 `None` to terminate the list.
        config_attributes.push(0);

        let configs = unsafe {
            let mut num_configs = 0;
            let raw_configs = self.glx.ChooseFBConfig(
                self.raw.cast(),
                self.screen,
                config_attributes.as_ptr(),
                &mut num_configs,
            );

            if raw_configs.is_null() {
                self.check(ErrorKind::FormatUnavailable, "glXChooseFBConfig")?;
                return Err(ErrorKind::FormatUnavailable.into());
            }

            let configs = slice::from_raw_parts(raw_configs, num_configs as usize).to_vec();

            // Free the memory from the Xlib, since we've just copied it.
            (self.xlib.XFree)(raw_configs.cast());

            configs
        };

        self.check(ErrorKind::FormatUnavailable, "glXChooseFBConfig")?;
        log::debug!("glXChooseFBConfig returned {} configs", configs.len());

        Ok(configs.into_iter().map(GlxFormatId::FbConfig).collect())
    }

    /// Query `GLX_SAMPLE_BUFFERS` and `GLX_SAMPLES` of a config.
    pub(crate) fn sample_info(&self, format: GlxFormatId) -> Result<SampleInfo> {
        let config = match format {
            GlxFormatId::FbConfig(config) => config,
            GlxFormatId::Visual(_) => return Ok(SampleInfo::default()),
        };

        let sample_buffers = unsafe { self.raw_attribute(config, glx::SAMPLE_BUFFERS as c_int)? };
        let samples = unsafe { self.raw_attribute(config, glx::SAMPLES as c_int)? };

        Ok(SampleInfo { sample_buffers, samples })
    }

    /// # Safety
    ///
    /// The config must come from this display.
    unsafe fn raw_attribute(&self, config: GLXFBConfig, attr: c_int) -> Result<c_int> {
        let mut value = 0;
        let status =
            unsafe { self.glx.GetFBConfigAttrib(self.raw.cast(), config, attr, &mut value) };
        self.check(ErrorKind::FormatUnavailable, "glXGetFBConfigAttrib")?;

        if status != xlib::Success as c_int {
            return Err(Error::new(
                Some(status as i64),
                Some("glXGetFBConfigAttrib failed".into()),
                ErrorKind::FormatUnavailable,
            ));
        }

        Ok(value)
    }

    pub(crate) fn choose_visual(&self, template: &FormatTemplate) -> Result<GlxFormatId> {
        let mut visual_attributes = vec![
            glx::RGBA as c_int,
            glx::RED_SIZE as c_int,
            template.color_size as c_int,
            glx::GREEN_SIZE as c_int,
            template.color_size as c_int,
            glx::BLUE_SIZE as c_int,
            template.color_size as c_int,
            glx::ALPHA_SIZE as c_int,
            template.alpha_size as c_int,
        ];

        if template.double_buffer {
            visual_attributes.push(glx::DOUBLEBUFFER as c_int);
        }

        visual_attributes.push(0);

        let visual = unsafe {
            self.glx.ChooseVisual(self.raw.cast(), self.screen, visual_attributes.as_mut_ptr())
        };
        self.check(ErrorKind::FormatUnavailable, "glXChooseVisual")?;

        if visual.is_null() {
            return Err(ErrorKind::FormatUnavailable.into());
        }

        Ok(GlxFormatId::Visual(visual.cast()))
    }

    pub(crate) fn realize(&self, format: GlxFormatId) -> Result<GlxFormat> {
        let (fb_config, visual) = match format {
            GlxFormatId::FbConfig(config) => {
                let visual =
                    unsafe { self.glx.GetVisualFromFBConfig(self.raw.cast(), config) };
                if visual.is_null() {
                    return Err(Error::new(
                        None,
                        Some("the config has no X visual".into()),
                        ErrorKind::FormatUnavailable,
                    ));
                }
                (Some(config), visual.cast::<xlib::XVisualInfo>())
            },
            GlxFormatId::Visual(visual) => (None, visual),
        };

        let colormap = unsafe {
            (self.xlib.XCreateColormap)(self.raw, self.root(), (*visual).visual, xlib::AllocNone)
        };

        let format = GlxFormat { fb_config, visual, colormap };
        if let Err(err) = self.check(ErrorKind::FormatUnavailable, "XCreateColormap") {
            self.free_format(format);
            return Err(err);
        }

        Ok(format)
    }

    pub(crate) fn free_format(&self, format: GlxFormat) {
        unsafe {
            if format.colormap != 0 {
                (self.xlib.XFreeColormap)(self.raw, format.colormap);
            }
            (self.xlib.XFree)(format.visual.cast());
        }
    }
}
