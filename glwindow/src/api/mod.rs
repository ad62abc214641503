//! The native windowing hosts.

#[cfg(glx_backend)]
pub mod glx;
#[cfg(wgl_backend)]
pub mod wgl;
