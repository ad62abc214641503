//! The Xlib window, its close protocol and event draining.

use std::ffi::{c_int, CString};
use std::mem;

use x11_dl::xlib;

use crate::error::{Error, ErrorKind, Result};
use crate::event::{CloseLatch, HostEvent};
use crate::window::WindowAttributes;

use super::{GlxDisplay, GlxFormat};

const WM_DELETE_WINDOW: &[u8] = b"WM_DELETE_WINDOW\0";

impl GlxDisplay {
    pub(crate) fn create_window(
        &self,
        format: GlxFormat,
        attributes: &WindowAttributes,
    ) -> Result<xlib::Window> {
        let (width, height) = attributes.inner_size();

        let window = unsafe {
            let visual = &*format.visual;

            let mut window_attributes: xlib::XSetWindowAttributes = mem::zeroed();
            window_attributes.background_pixel = (self.xlib.XBlackPixel)(self.raw, self.screen);
            window_attributes.colormap = format.colormap;

            (self.xlib.XCreateWindow)(
                self.raw,
                self.root(),
                0,
                0,
                width,
                height,
                0,
                visual.depth,
                xlib::InputOutput as _,
                visual.visual,
                xlib::CWBackPixel | xlib::CWColormap,
                &mut window_attributes,
            )
        };

        if window == 0 {
            return Err(ErrorKind::WindowCreationFailed.into());
        }

        // A rejected request still hands out the id, but there is no window
        // behind it to destroy.
        self.check(ErrorKind::WindowCreationFailed, "XCreateWindow")?;

        Ok(window)
    }

    pub(crate) fn destroy_window(&self, window: xlib::Window) {
        unsafe {
            (self.xlib.XDestroyWindow)(self.raw, window);
        }
    }

    pub(crate) fn set_title(&self, window: xlib::Window, title: &str) -> Result<()> {
        let title = CString::new(title).map_err(|_| {
            Error::new(
                None,
                Some("the title contains a nul byte".into()),
                ErrorKind::WindowCreationFailed,
            )
        })?;

        unsafe {
            (self.xlib.XStoreName)(self.raw, window, title.as_ptr());
        }

        self.check(ErrorKind::WindowCreationFailed, "XStoreName")
    }

    /// Opt into `WM_DELETE_WINDOW` and return its atom.
    pub(crate) fn register_delete_window(&self, window: xlib::Window) -> Result<xlib::Atom> {
        let mut atom = unsafe {
            (self.xlib.XInternAtom)(self.raw, WM_DELETE_WINDOW.as_ptr().cast(), xlib::False)
        };
        self.check(ErrorKind::ProtocolRegistrationFailed, "XInternAtom")?;

        let status = unsafe { (self.xlib.XSetWMProtocols)(self.raw, window, &mut atom, 1) };
        self.check(ErrorKind::ProtocolRegistrationFailed, "XSetWMProtocols")?;

        if status == 0 {
            return Err(Error::new(
                None,
                Some("XSetWMProtocols failed".into()),
                ErrorKind::ProtocolRegistrationFailed,
            ));
        }

        Ok(atom)
    }

    /// Map the window, it's the drawable the context renders to.
    pub(crate) fn map_window(&self, window: xlib::Window) -> Result<xlib::Window> {
        unsafe {
            (self.xlib.XMapWindow)(self.raw, window);
        }
        self.check(ErrorKind::WindowCreationFailed, "XMapWindow")?;
        Ok(window)
    }

    pub(crate) fn unmap_window(&self, window: xlib::Window) {
        unsafe {
            (self.xlib.XUnmapWindow)(self.raw, window);
        }
    }

    /// Drain the events of `window` without blocking.
    pub(crate) fn drain_events(
        &self,
        window: xlib::Window,
        protocol: xlib::Atom,
        latch: &CloseLatch,
    ) {
        let mut event: xlib::XEvent = unsafe { mem::zeroed() };
        let mut window = window;
        let arg = &mut window as *mut xlib::Window as xlib::XPointer;

        loop {
            let found = unsafe {
                (self.xlib.XCheckIfEvent)(self.raw, &mut event, Some(event_for_window), arg)
            };
            if found == 0 {
                break;
            }

            latch.observe(translate(&event, protocol));
        }
    }
}

fn translate(event: &xlib::XEvent, protocol: xlib::Atom) -> HostEvent {
    if event.get_type() != xlib::ClientMessage {
        return HostEvent::Other;
    }

    let message = xlib::XClientMessageEvent::from(*event);
    if message.data.get_long(0) as xlib::Atom == protocol {
        HostEvent::CloseRequested
    } else {
        HostEvent::Other
    }
}

unsafe extern "C" fn event_for_window(
    _display: *mut xlib::Display,
    event: *mut xlib::XEvent,
    arg: xlib::XPointer,
) -> xlib::Bool {
    unsafe {
        let window = *(arg as *const xlib::Window);
        ((*event).any.window == window) as c_int
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_message(atom: xlib::Atom) -> xlib::XEvent {
        let mut message: xlib::XClientMessageEvent = unsafe { mem::zeroed() };
        message.type_ = xlib::ClientMessage;
        message.format = 32;
        message.data.set_long(0, atom as _);
        xlib::XEvent::from(message)
    }

    #[test]
    fn delete_window_message_requests_close() {
        assert_eq!(translate(&client_message(42), 42), HostEvent::CloseRequested);
        assert_eq!(translate(&client_message(7), 42), HostEvent::Other);

        let mut expose: xlib::XEvent = unsafe { mem::zeroed() };
        expose.type_ = xlib::Expose;
        assert_eq!(translate(&expose, 42), HostEvent::Other);
    }
}
