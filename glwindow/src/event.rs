//! Close-request tracking for a single window.

use std::cell::Cell;
use std::ffi::c_void;
use std::rc::Rc;

/// The state of the close-request state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloseState {
    /// No close was requested yet.
    #[default]
    Running,
    /// The host asked to close the window. The state never goes back.
    CloseRequested,
}

/// A host message translated for the close-request state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The close-request protocol message addressed to the window.
    CloseRequested,
    /// Anything else, which is left to the host's default handling.
    Other,
}

/// A per-window latch for the close request.
///
/// Hosts delivering messages through an out-of-band callback reach the latch
/// through the window's user-data slot, see [`CloseLatch::as_ptr`].
#[derive(Debug, Clone, Default)]
pub struct CloseLatch {
    state: Rc<Cell<CloseState>>,
}

impl CloseLatch {
    /// Create a latch in the [`CloseState::Running`] state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a translated host message into the state machine.
    pub fn observe(&self, event: HostEvent) {
        if event == HostEvent::CloseRequested {
            self.request();
        }
    }

    /// Latch the close request.
    pub fn request(&self) {
        self.state.set(CloseState::CloseRequested);
    }

    /// The current state.
    pub fn state(&self) -> CloseState {
        self.state.get()
    }

    /// Whether the close was requested.
    pub fn is_requested(&self) -> bool {
        self.state() == CloseState::CloseRequested
    }

    /// Pointer suitable for storing in a per-window user-data slot.
    ///
    /// Stays valid as long as any clone of this latch is alive.
    pub fn as_ptr(&self) -> *const c_void {
        Rc::as_ptr(&self.state).cast()
    }

    /// Latch the close request through a pointer from [`CloseLatch::as_ptr`].
    ///
    /// # Safety
    ///
    /// `ptr` must be null or come from [`CloseLatch::as_ptr`] of a latch that is
    /// still alive, and it must be used on the thread owning the latch.
    pub unsafe fn request_from_ptr(ptr: *const c_void) {
        if let Some(state) = unsafe { ptr.cast::<Cell<CloseState>>().as_ref() } {
            state.set(CloseState::CloseRequested);
        }
    }
}
