//! Ordered ownership of the host resources.

use crate::host::Host;

/// One resource handed out by the host.
pub(crate) enum Acquired<H: Host> {
    Connection,
    Format(H::Format),
    Window(H::Window),
    Surface(H::Window, H::Surface),
    Context(H::Context),
    Current,
}

impl<H: Host> Acquired<H> {
    fn name(&self) -> &'static str {
        match self {
            Acquired::Connection => "connection",
            Acquired::Format(_) => "format",
            Acquired::Window(_) => "window",
            Acquired::Surface(..) => "surface",
            Acquired::Context(_) => "context",
            Acquired::Current => "current binding",
        }
    }

    fn release(self, host: &mut H, connection: H::Connection) {
        log::trace!("releasing the {}", self.name());
        match self {
            Acquired::Connection => host.close_connection(connection),
            Acquired::Format(format) => host.release_format(connection, format),
            Acquired::Window(window) => host.destroy_window(connection, window),
            Acquired::Surface(window, surface) => host.release_surface(connection, window, surface),
            Acquired::Context(context) => host.delete_context(connection, context),
            Acquired::Current => host.make_not_current(connection),
        }
    }
}

/// The resources of one window, released newest first.
pub(crate) struct Resources<H: Host> {
    connection: H::Connection,
    stack: Vec<Acquired<H>>,
}

impl<H: Host> Resources<H> {
    pub(crate) fn new(connection: H::Connection) -> Self {
        Self { connection, stack: vec![Acquired::Connection] }
    }

    pub(crate) fn connection(&self) -> H::Connection {
        self.connection
    }

    pub(crate) fn push(&mut self, acquired: Acquired<H>) {
        self.stack.push(acquired);
    }

    /// Release everything. Calling it again is a no-op.
    pub(crate) fn release_all(&mut self, host: &mut H) {
        while let Some(acquired) = self.stack.pop() {
            acquired.release(host, self.connection);
        }
    }
}

/// Rolls back every acquired resource unless committed.
pub(crate) struct CreationGuard<'a, H: Host> {
    host: &'a mut H,
    resources: Resources<H>,
}

impl<'a, H: Host> CreationGuard<'a, H> {
    pub(crate) fn new(host: &'a mut H, connection: H::Connection) -> Self {
        Self { host, resources: Resources::new(connection) }
    }

    pub(crate) fn host(&mut self) -> &mut H {
        self.host
    }

    pub(crate) fn connection(&self) -> H::Connection {
        self.resources.connection()
    }

    pub(crate) fn push(&mut self, acquired: Acquired<H>) {
        self.resources.push(acquired);
    }

    /// Keep the resources, they're owned by the caller from now on.
    pub(crate) fn commit(mut self) -> Resources<H> {
        let stack = std::mem::take(&mut self.resources.stack);
        Resources { connection: self.resources.connection, stack }
    }
}

impl<'a, H: Host> Drop for CreationGuard<'a, H> {
    fn drop(&mut self) {
        if !self.resources.stack.is_empty() {
            log::debug!("rolling back partially created window");
            self.resources.release_all(self.host);
        }
    }
}
