//! Connection to the X server and GLX feature discovery.

use std::collections::HashSet;
use std::ffi::{c_int, CStr};
use std::fmt;

use x11_dl::xlib::{self, Xlib};

use crate::context::Version;
use crate::error::{Error, ErrorKind, Result};
use crate::host::HostFeatures;

use super::{take_x_error, Glx, GlxHost, HandlerSlot, GLX, GLX_EXTRA, XLIB};

/// An open Xlib display with the loaded GLX entry points.
#[derive(Clone, Copy)]
pub struct GlxDisplay {
    pub(crate) raw: *mut xlib::Display,
    pub(crate) screen: c_int,
    pub(crate) version: Version,
    pub(crate) xlib: &'static Xlib,
    pub(crate) glx: &'static Glx,
}

impl fmt::Debug for GlxDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlxDisplay")
            .field("raw", &self.raw)
            .field("screen", &self.screen)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl GlxDisplay {
    /// The root window of the default screen.
    pub(crate) fn root(&self) -> xlib::Window {
        unsafe { (self.xlib.XRootWindow)(self.raw, self.screen) }
    }
}

impl GlxHost {
    pub(super) fn open_display(&mut self) -> Result<GlxDisplay> {
        let xlib = XLIB.as_ref().ok_or_else(|| {
            Error::new(None, Some("failed to load libX11".into()), ErrorKind::ConnectionError)
        })?;
        let glx = GLX.as_ref().ok_or_else(|| {
            Error::new(None, Some("failed to load libGL".into()), ErrorKind::ConnectionError)
        })?;

        // Stale errors from another connection must not fail this one.
        take_x_error();
        HandlerSlot::with(|slot| {
            slot.install(|handler| unsafe { (xlib.XSetErrorHandler)(handler) })
        });

        let raw = unsafe { (xlib.XOpenDisplay)(std::ptr::null()) };
        if raw.is_null() {
            release_handler(xlib, || ());
            return Err(Error::new(
                None,
                Some("XOpenDisplay returned null".into()),
                ErrorKind::ConnectionError,
            ));
        }

        // Some drivers need a GLX request handled before anything else happens.
        let (mut major, mut minor) = (0, 0);
        let queried = unsafe { glx.QueryVersion(raw.cast(), &mut major, &mut minor) };
        if queried == 0 || take_x_error().is_some() {
            release_handler(xlib, || unsafe {
                (xlib.XCloseDisplay)(raw);
            });
            return Err(Error::new(
                None,
                Some("the X server doesn't support GLX".into()),
                ErrorKind::ConnectionError,
            ));
        }

        let screen = unsafe { (xlib.XDefaultScreen)(raw) };
        let version = Version::new(major as u8, minor as u8);
        log::debug!("opened X display with GLX {version}");

        Ok(GlxDisplay { raw, screen, version, xlib, glx })
    }

    pub(super) fn close_display(&mut self, display: GlxDisplay) {
        release_handler(display.xlib, || unsafe {
            (display.xlib.XCloseDisplay)(display.raw);
        });
        self.extra = None;
    }

    pub(super) fn extract_features(&mut self, display: GlxDisplay) -> HostFeatures {
        let mut features = HostFeatures::empty();

        if display.version >= Version::new(1, 3) {
            features |= HostFeatures::EXTENDED_FORMATS;
        } else {
            log::warn!("GLX {} lacks framebuffer configs", display.version);
            return features;
        }

        let extensions = unsafe { get_extensions(display) };
        let extra = GLX_EXTRA.as_ref().filter(|extra| extra.CreateContextAttribsARB.is_loaded());

        match extra {
            Some(extra)
                if extensions.contains("GLX_ARB_create_context")
                    && extensions.contains("GLX_ARB_create_context_profile") =>
            {
                features |= HostFeatures::CREATE_CONTEXT_ATTRIBS;
                self.extra = Some(extra);
            },
            _ => log::warn!("glXCreateContextAttribsARB is unavailable"),
        }

        features
    }
}

/// Run `close` and drop this display's use of the recording handler.
fn release_handler(xlib: &Xlib, close: impl FnOnce()) {
    HandlerSlot::with(|slot| {
        slot.uninstall_after(close, |handler| unsafe { (xlib.XSetErrorHandler)(handler) })
    });
}

/// Load the GLX extensions of the screen.
///
/// # Safety
/// The display must be open.
unsafe fn get_extensions(display: GlxDisplay) -> HashSet<String> {
    unsafe {
        let extensions = display.glx.QueryExtensionsString(display.raw.cast(), display.screen);
        if extensions.is_null() {
            return HashSet::new();
        }

        CStr::from_ptr(extensions)
            .to_string_lossy()
            .split(' ')
            .filter(|ext| !ext.is_empty())
            .map(String::from)
            .collect()
    }
}
