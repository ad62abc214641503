mod common;

use common::{attributes, Call, Probe, StubConfig, StubHost};
use glwindow::{CloseState, HostFeatures, Version, Window};
use raw_window_handle::{HandleError, HasDisplayHandle, HasWindowHandle};

fn create(config: StubConfig) -> (Window<StubHost>, Probe) {
    let (host, probe) = StubHost::new(config);
    let window = Window::new(host, attributes("Test", 400, 300)).expect("window creation failed");
    (window, probe)
}

#[test]
fn create_poll_close_destroy() {
    let config = StubConfig { accepted_versions: vec![Version::new(4, 5)], ..Default::default() };
    let (mut window, probe) = create(config);

    assert_eq!(window.version(), Some(Version::new(4, 5)));
    assert_eq!(window.close_state(), CloseState::Running);
    assert!(!window.poll_events());

    window.swap_buffers();
    probe.inject_close();
    assert!(window.poll_events());
    assert_eq!(window.close_state(), CloseState::CloseRequested);

    window.destroy();
    assert_eq!(probe.calls().last(), Some(&Call::CloseConnection));
}

#[test]
fn creation_sequence() {
    let config = StubConfig { accepted_versions: vec![Version::new(4, 5)], ..Default::default() };
    let (_window, probe) = create(config);

    let expected = vec![
        Call::OpenConnection,
        Call::Features,
        Call::EnumerateFormats,
        Call::QuerySamples(0),
        Call::QuerySamples(1),
        Call::QuerySamples(2),
        Call::QuerySamples(3),
        Call::RealizeFormat(1),
        Call::CreateWindow("Test".into(), (400, 300)),
        Call::SetTitle("Test".into()),
        Call::RegisterCloseProtocol,
        Call::AcquireSurface,
        Call::ApplyFormat(1),
        Call::SuspendErrors,
        Call::CreateContextWithVersion(Version::new(4, 6)),
        Call::CreateContextWithVersion(Version::new(4, 5)),
        Call::RestoreErrors,
        Call::MakeCurrent,
        Call::ShowWindow,
    ];
    assert_eq!(probe.calls(), expected);
}

#[test]
fn close_request_latches() {
    let (mut window, probe) = create(StubConfig::default());

    probe.inject_other();
    assert!(!window.poll_events());

    probe.inject_other();
    probe.inject_close();
    probe.inject_other();
    assert!(window.poll_events());

    // Nothing pending anymore, the request stays latched.
    for _ in 0..3 {
        assert!(window.poll_events());
    }
    assert_eq!(probe.count(&Call::DrainEvents), 5);
}

#[test]
fn latches_are_per_window() {
    let (mut first, first_probe) = create(StubConfig::default());
    let (mut second, _second_probe) = create(StubConfig::default());

    first_probe.inject_close();
    assert!(first.poll_events());
    assert!(!second.poll_events());
}

#[test]
fn legacy_host() {
    let config = StubConfig { features: HostFeatures::empty(), ..Default::default() };
    let (window, probe) = create(config);

    assert_eq!(window.version(), None);
    let calls = probe.calls();
    assert!(calls.contains(&Call::ChooseLegacyFormat));
    assert!(calls.contains(&Call::CreateLegacyContext));
    assert!(!calls.contains(&Call::EnumerateFormats));
    assert!(!calls.iter().any(|call| matches!(call, Call::CreateContextWithVersion(_))));
}

#[test]
fn legacy_context_with_extended_formats() {
    let config = StubConfig { features: HostFeatures::EXTENDED_FORMATS, ..Default::default() };
    let (window, probe) = create(config);

    assert_eq!(window.version(), None);
    assert!(probe.calls().contains(&Call::RealizeFormat(1)));
    assert!(probe.calls().contains(&Call::CreateLegacyContext));
}

#[test]
fn swap_buffers_presents_the_surface() {
    let (window, probe) = create(StubConfig::default());
    probe.clear();

    window.swap_buffers();
    window.swap_buffers();
    assert_eq!(probe.calls(), vec![Call::SwapBuffers, Call::SwapBuffers]);
}

#[test]
fn attributes_are_kept() {
    let (window, _probe) = create(StubConfig::default());
    assert_eq!(window.attributes().title(), "Test");
    assert_eq!(window.attributes().inner_size(), (400, 300));
    assert!(format!("{window:?}").contains("Test"));
}

#[test]
fn stub_has_no_raw_handles() {
    let (window, _probe) = create(StubConfig::default());
    assert!(matches!(window.window_handle(), Err(HandleError::NotSupported)));
    assert!(matches!(window.display_handle(), Err(HandleError::NotSupported)));
}
