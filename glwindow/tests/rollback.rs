mod common;

use common::{attributes, samples, Call, Probe, Step, StubConfig, StubHost};
use glwindow::{ErrorKind, HostFeatures, Window};

fn fail(config: StubConfig) -> (ErrorKind, Probe) {
    let (host, probe) = StubHost::new(config);
    let err = Window::new(host, attributes("Test", 400, 300)).expect_err("creation should fail");
    (err.error_kind(), probe)
}

fn fail_at(step: Step) -> (ErrorKind, Probe) {
    fail(StubConfig { fail_at: Some(step), ..Default::default() })
}

fn window_releases() -> Vec<Call> {
    vec![Call::DestroyWindow, Call::ReleaseFormat(1), Call::CloseConnection]
}

fn surface_releases() -> Vec<Call> {
    let mut releases = vec![Call::ReleaseSurface];
    releases.extend(window_releases());
    releases
}

fn context_releases() -> Vec<Call> {
    let mut releases = vec![Call::DeleteContext];
    releases.extend(surface_releases());
    releases
}

#[test]
fn connection_failure_releases_nothing() {
    let (kind, probe) = fail_at(Step::OpenConnection);
    assert_eq!(kind, ErrorKind::ConnectionError);
    assert_eq!(probe.calls(), vec![Call::OpenConnection]);
}

#[test]
fn format_failures_close_the_connection() {
    let (kind, probe) = fail_at(Step::EnumerateFormats);
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.releases(), vec![Call::CloseConnection]);

    let (kind, probe) = fail_at(Step::RealizeFormat);
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.releases(), vec![Call::CloseConnection]);

    let (kind, probe) = fail(StubConfig {
        features: HostFeatures::empty(),
        fail_at: Some(Step::ChooseLegacyFormat),
        ..Default::default()
    });
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.releases(), vec![Call::CloseConnection]);
}

#[test]
fn no_surviving_candidate() {
    let (kind, probe) = fail(StubConfig { formats: vec![None, None], ..Default::default() });
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.count(&Call::QuerySamples(1)), 1);
    assert_eq!(probe.releases(), vec![Call::CloseConnection]);

    let (kind, probe) = fail(StubConfig { formats: samples(&[]), ..Default::default() });
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.releases(), vec![Call::CloseConnection]);
}

#[test]
fn window_creation_failure_releases_the_format() {
    let (kind, probe) = fail_at(Step::CreateWindow);
    assert_eq!(kind, ErrorKind::WindowCreationFailed);
    assert_eq!(probe.releases(), vec![Call::ReleaseFormat(1), Call::CloseConnection]);
}

#[test]
fn window_setup_failures_destroy_the_window() {
    let (kind, probe) = fail_at(Step::SetTitle);
    assert_eq!(kind, ErrorKind::WindowCreationFailed);
    assert_eq!(probe.releases(), window_releases());

    let (kind, probe) = fail_at(Step::RegisterCloseProtocol);
    assert_eq!(kind, ErrorKind::ProtocolRegistrationFailed);
    assert_eq!(probe.releases(), window_releases());

    let (kind, probe) = fail_at(Step::AcquireSurface);
    assert_eq!(kind, ErrorKind::WindowCreationFailed);
    assert_eq!(probe.releases(), window_releases());
}

#[test]
fn apply_format_failure_releases_the_surface() {
    let (kind, probe) = fail_at(Step::ApplyFormat);
    assert_eq!(kind, ErrorKind::FormatUnavailable);
    assert_eq!(probe.releases(), surface_releases());
}

#[test]
fn no_accepted_version() {
    let (kind, probe) = fail(StubConfig { accepted_versions: Vec::new(), ..Default::default() });
    assert_eq!(kind, ErrorKind::ContextCreationFailed);
    assert_eq!(probe.releases(), surface_releases());

    // Error reporting is restored even though every version was rejected.
    assert_eq!(probe.count(&Call::SuspendErrors), 1);
    assert_eq!(probe.count(&Call::RestoreErrors), 1);
}

#[test]
fn legacy_context_failure() {
    let (kind, probe) = fail(StubConfig {
        features: HostFeatures::empty(),
        fail_at: Some(Step::CreateLegacyContext),
        ..Default::default()
    });
    assert_eq!(kind, ErrorKind::ContextCreationFailed);
    assert_eq!(
        probe.releases(),
        vec![
            Call::ReleaseSurface,
            Call::DestroyWindow,
            Call::ReleaseFormat(0),
            Call::CloseConnection
        ]
    );
}

#[test]
fn bind_failure_deletes_the_context() {
    let (kind, probe) = fail_at(Step::MakeCurrent);
    assert_eq!(kind, ErrorKind::ContextBindFailed);
    assert_eq!(probe.releases(), context_releases());
}

#[test]
fn show_failure_unbinds_first() {
    let (kind, probe) = fail_at(Step::ShowWindow);
    assert_eq!(kind, ErrorKind::WindowCreationFailed);

    let mut expected = vec![Call::MakeNotCurrent];
    expected.extend(context_releases());
    assert_eq!(probe.releases(), expected);
}

#[test]
fn raw_host_error_is_kept() {
    let (host, _probe) =
        StubHost::new(StubConfig { fail_at: Some(Step::SetTitle), ..Default::default() });
    let err = Window::new(host, attributes("Test", 400, 300)).expect_err("creation should fail");

    assert_eq!(err.raw_code(), Some(0xbad));
    assert!(err.to_string().contains("SetTitle injected"));
}
