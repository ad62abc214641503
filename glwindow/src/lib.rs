//! The purpose of this library is to give you one window with a current
//! OpenGL context, negotiated to be as capable as the driver allows.
//!
//! A [`Window`] is created on a [`Host`], the seam to the native windowing
//! system. The creation walks a fixed sequence of steps: connect, pick a
//! pixel/framebuffer format maximizing multisampling, create and name the
//! window, opt into close requests, obtain the drawable, create the most
//! recent core profile context the driver accepts, make it current and show
//! the window. When any step fails everything acquired before it is released
//! in reverse order and the [`Error`] tells which step failed.
//!
//! Once created, drive the window with [`Window::poll_events`] and
//! [`Window::swap_buffers`], and destroy it with [`Window::destroy`] or by
//! dropping it.
//!
//! On X11 (GLX) and Windows (WGL) the native host is picked for you by
//! [`create`].
//!
//! [`Error`]: crate::error::Error
//! [`Host`]: crate::host::Host

#![deny(rust_2018_idioms)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_op_in_unsafe_fn)]
#![deny(improper_ctypes, improper_ctypes_definitions)]
#![deny(clippy::all)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod host;
pub mod window;

mod guard;
#[cfg(glx_backend)]
mod lib_loading;

pub use crate::config::{FormatTemplate, FormatTemplateBuilder};
pub use crate::context::Version;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::event::CloseState;
pub use crate::host::{Host, HostFeatures};
pub use crate::window::{Window, WindowAttributes};

/// The host of the platform this crate was built for.
#[cfg(glx_backend)]
pub type NativeHost = api::glx::GlxHost;

/// The host of the platform this crate was built for.
#[cfg(all(wgl_backend, not(glx_backend)))]
pub type NativeHost = api::wgl::WglHost;

/// A [`Window`] on the [`NativeHost`].
#[cfg(any(glx_backend, wgl_backend))]
pub type NativeWindow = Window<NativeHost>;

/// Create a shown window titled `title` with a `width`x`height` client area
/// and a current OpenGL context, on the native host.
#[cfg(any(glx_backend, wgl_backend))]
pub fn create(title: &str, width: u32, height: u32) -> Result<NativeWindow> {
    let attributes = WindowAttributes::new().with_title(title).with_inner_size(width, height);
    Window::new(NativeHost::new(), attributes)
}
