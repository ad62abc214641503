//! Runtime loading of the GL client library.

use std::ffi::{c_void, CString};
use std::ops::Deref;

use libloading::Library;

/// A function table which can be resolved from a loaded library.
pub(crate) trait SymLoading {
    /// # Safety
    /// The returned table must not outlive `lib`.
    unsafe fn load_with(lib: &Library) -> Self;
}

/// The function table together with the library keeping it valid.
pub(crate) struct SymWrapper<T> {
    sym: T,
    _lib: Library,
}

impl<T: SymLoading> SymWrapper<T> {
    /// Open the first library from `lib_paths` that loads.
    ///
    /// # Safety
    /// Running the library initializers must be sound for every path.
    pub(crate) unsafe fn new(lib_paths: &[&str]) -> Result<Self, libloading::Error> {
        let mut last_error = None;
        for path in lib_paths {
            match unsafe { Library::new(path) } {
                Ok(lib) => {
                    let sym = unsafe { T::load_with(&lib) };
                    log::debug!("loaded {path}");
                    return Ok(SymWrapper { sym, _lib: lib });
                },
                Err(err) => {
                    log::debug!("failed to load {path}: {err}");
                    last_error = Some(err);
                },
            }
        }

        Err(last_error.unwrap_or(libloading::Error::DlOpenUnknown))
    }
}

impl<T> Deref for SymWrapper<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.sym
    }
}

/// Resolve `name` from `lib`, null when it's missing.
///
/// # Safety
/// The symbol must not be used after `lib` is unloaded.
pub(crate) unsafe fn lookup(lib: &Library, name: &str) -> *const c_void {
    let name = match CString::new(name) {
        Ok(name) => name,
        Err(_) => return std::ptr::null(),
    };

    unsafe {
        lib.get::<*const c_void>(name.as_bytes_with_nul())
            .map(|sym| *sym)
            .unwrap_or(std::ptr::null())
    }
}
