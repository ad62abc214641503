//! A recording host standing in for the native windowing system.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use glwindow::config::{FormatTemplate, SampleInfo};
use glwindow::context::{GlInfo, Version};
use glwindow::event::{CloseLatch, HostEvent};
use glwindow::{Error, ErrorKind, Host, HostFeatures, Result, WindowAttributes};

pub const CONNECTION: u32 = 1;
pub const WINDOW: u32 = 10;
pub const SURFACE: u32 = 20;
pub const CONTEXT: u32 = 30;
pub const DELETE_WINDOW: u32 = 99;

/// A creation step the stub can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    OpenConnection,
    EnumerateFormats,
    ChooseLegacyFormat,
    RealizeFormat,
    CreateWindow,
    SetTitle,
    RegisterCloseProtocol,
    AcquireSurface,
    ApplyFormat,
    CreateLegacyContext,
    MakeCurrent,
    ShowWindow,
}

/// Every call the window made on the host, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    OpenConnection,
    CloseConnection,
    Features,
    EnumerateFormats,
    QuerySamples(u32),
    ChooseLegacyFormat,
    RealizeFormat(u32),
    ReleaseFormat(u32),
    CreateWindow(String, (u32, u32)),
    DestroyWindow,
    SetTitle(String),
    RegisterCloseProtocol,
    AcquireSurface,
    ReleaseSurface,
    ApplyFormat(u32),
    SuspendErrors,
    RestoreErrors,
    CreateContextWithVersion(Version),
    CreateLegacyContext,
    DeleteContext,
    MakeCurrent,
    MakeNotCurrent,
    ShowWindow,
    DrainEvents,
    SwapBuffers,
}

impl Call {
    pub fn is_release(&self) -> bool {
        matches!(
            self,
            Call::MakeNotCurrent
                | Call::DeleteContext
                | Call::ReleaseSurface
                | Call::DestroyWindow
                | Call::ReleaseFormat(_)
                | Call::CloseConnection
        )
    }
}

#[derive(Debug, Clone)]
pub struct StubConfig {
    pub features: HostFeatures,
    /// Candidate formats, `None` for a candidate whose attributes can't be
    /// queried.
    pub formats: Vec<Option<SampleInfo>>,
    pub accepted_versions: Vec<Version>,
    pub fail_at: Option<Step>,
}

impl Default for StubConfig {
    fn default() -> Self {
        Self {
            features: HostFeatures::all(),
            formats: samples(&[0, 4, 2, 4]),
            accepted_versions: vec![Version::new(4, 5), Version::new(3, 3)],
            fail_at: None,
        }
    }
}

pub fn samples(samples: &[i32]) -> Vec<Option<SampleInfo>> {
    samples
        .iter()
        .map(|&samples| Some(SampleInfo { sample_buffers: (samples > 0) as i32, samples }))
        .collect()
}

/// The test side of the stub: the call log and the event queue.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    calls: Rc<RefCell<Vec<Call>>>,
    events: Rc<RefCell<VecDeque<u32>>>,
}

impl Probe {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn releases(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_release).collect()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn inject_close(&self) {
        self.events.borrow_mut().push_back(DELETE_WINDOW);
    }

    pub fn inject_other(&self) {
        self.events.borrow_mut().push_back(0);
    }
}

#[derive(Debug)]
pub struct StubHost {
    config: StubConfig,
    probe: Probe,
}

impl StubHost {
    pub fn new(config: StubConfig) -> (Self, Probe) {
        let probe = Probe::default();
        (Self { config, probe: probe.clone() }, probe)
    }

    fn record(&self, call: Call) {
        self.probe.calls.borrow_mut().push(call);
    }

    fn step(&self, step: Step) -> Result<()> {
        if self.config.fail_at == Some(step) {
            Err(Error::new(Some(0xbad), Some(format!("{step:?} injected")), ErrorKind::Misc))
        } else {
            Ok(())
        }
    }
}

impl Host for StubHost {
    type CloseProtocol = u32;
    type Connection = u32;
    type Context = u32;
    type Format = u32;
    type FormatId = u32;
    type Surface = u32;
    type Window = u32;

    fn open_connection(&mut self) -> Result<u32> {
        self.record(Call::OpenConnection);
        self.step(Step::OpenConnection)?;
        Ok(CONNECTION)
    }

    fn close_connection(&mut self, connection: u32) {
        assert_eq!(connection, CONNECTION);
        self.record(Call::CloseConnection);
    }

    fn features(&mut self, _connection: u32) -> HostFeatures {
        self.record(Call::Features);
        self.config.features
    }

    fn enumerate_formats(
        &mut self,
        _connection: u32,
        template: &FormatTemplate,
    ) -> Result<Vec<u32>> {
        assert_eq!(template, &FormatTemplate::default());
        self.record(Call::EnumerateFormats);
        self.step(Step::EnumerateFormats)?;
        Ok((0..self.config.formats.len() as u32).collect())
    }

    fn query_samples(&mut self, _connection: u32, format: u32) -> Result<SampleInfo> {
        self.record(Call::QuerySamples(format));
        self.config.formats[format as usize].ok_or_else(|| ErrorKind::Misc.into())
    }

    fn choose_legacy_format(
        &mut self,
        _connection: u32,
        _template: &FormatTemplate,
    ) -> Result<u32> {
        self.record(Call::ChooseLegacyFormat);
        self.step(Step::ChooseLegacyFormat)?;
        Ok(0)
    }

    fn realize_format(&mut self, _connection: u32, format: u32) -> Result<u32> {
        self.record(Call::RealizeFormat(format));
        self.step(Step::RealizeFormat)?;
        Ok(format)
    }

    fn release_format(&mut self, _connection: u32, format: u32) {
        self.record(Call::ReleaseFormat(format));
    }

    fn create_window(
        &mut self,
        _connection: u32,
        _format: u32,
        attributes: &WindowAttributes,
    ) -> Result<u32> {
        self.record(Call::CreateWindow(attributes.title().into(), attributes.inner_size()));
        self.step(Step::CreateWindow)?;
        Ok(WINDOW)
    }

    fn destroy_window(&mut self, _connection: u32, window: u32) {
        assert_eq!(window, WINDOW);
        self.record(Call::DestroyWindow);
    }

    fn set_title(&mut self, _connection: u32, _window: u32, title: &str) -> Result<()> {
        self.record(Call::SetTitle(title.into()));
        self.step(Step::SetTitle)
    }

    fn register_close_protocol(
        &mut self,
        _connection: u32,
        _window: u32,
        _latch: &CloseLatch,
    ) -> Result<u32> {
        self.record(Call::RegisterCloseProtocol);
        self.step(Step::RegisterCloseProtocol)?;
        Ok(DELETE_WINDOW)
    }

    fn acquire_surface(&mut self, _connection: u32, _window: u32) -> Result<u32> {
        self.record(Call::AcquireSurface);
        self.step(Step::AcquireSurface)?;
        Ok(SURFACE)
    }

    fn release_surface(&mut self, _connection: u32, window: u32, surface: u32) {
        assert_eq!((window, surface), (WINDOW, SURFACE));
        self.record(Call::ReleaseSurface);
    }

    fn apply_format(&mut self, _connection: u32, _surface: u32, format: u32) -> Result<()> {
        self.record(Call::ApplyFormat(format));
        self.step(Step::ApplyFormat)
    }

    fn suspend_errors(&mut self, _connection: u32) {
        self.record(Call::SuspendErrors);
    }

    fn restore_errors(&mut self, _connection: u32) {
        self.record(Call::RestoreErrors);
    }

    fn create_context_with_version(
        &mut self,
        _connection: u32,
        _surface: u32,
        _format: u32,
        version: Version,
    ) -> Option<u32> {
        self.record(Call::CreateContextWithVersion(version));
        self.config.accepted_versions.contains(&version).then_some(CONTEXT)
    }

    fn create_legacy_context(
        &mut self,
        _connection: u32,
        _surface: u32,
        _format: u32,
    ) -> Result<u32> {
        self.record(Call::CreateLegacyContext);
        self.step(Step::CreateLegacyContext)?;
        Ok(CONTEXT)
    }

    fn delete_context(&mut self, _connection: u32, context: u32) {
        assert_eq!(context, CONTEXT);
        self.record(Call::DeleteContext);
    }

    fn make_current(&mut self, _connection: u32, _surface: u32, _context: u32) -> Result<()> {
        self.record(Call::MakeCurrent);
        self.step(Step::MakeCurrent)
    }

    fn make_not_current(&mut self, _connection: u32) {
        self.record(Call::MakeNotCurrent);
    }

    fn show_window(&mut self, _connection: u32, _window: u32) -> Result<()> {
        self.record(Call::ShowWindow);
        self.step(Step::ShowWindow)
    }

    fn drain_events(&mut self, _connection: u32, _window: u32, protocol: u32, latch: &CloseLatch) {
        self.record(Call::DrainEvents);
        while let Some(atom) = self.probe.events.borrow_mut().pop_front() {
            let event =
                if atom == protocol { HostEvent::CloseRequested } else { HostEvent::Other };
            latch.observe(event);
        }
    }

    fn swap_buffers(&self, _connection: u32, surface: u32) {
        assert_eq!(surface, SURFACE);
        self.record(Call::SwapBuffers);
    }

    fn renderer_info(&mut self) -> Option<GlInfo> {
        Some(GlInfo {
            version: "4.5 (Core Profile) Stub".into(),
            renderer: "stub".into(),
            vendor: "glwindow".into(),
        })
    }
}

pub fn attributes(title: &str, width: u32, height: u32) -> WindowAttributes {
    WindowAttributes::new().with_title(title).with_inner_size(width, height)
}
