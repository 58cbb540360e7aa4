use phpdeps::core::{DeclaredEntity, DependencyEdge, DependencyGraph, QualifiedName};
use phpdeps::render::{
    CommandRunner, PlantUmlRenderer, ProcessOutcome, RenderDispatcher, RenderStrategy,
    SystemShell,
};
use phpdeps::{ConfigError, Error};
use std::ffi::OsString;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Stands in for the plantuml binary; records arguments, writes nothing.
#[derive(Clone)]
struct FakeShell {
    outcome: fn() -> io::Result<ProcessOutcome>,
    calls: Arc<Mutex<Vec<(String, Vec<OsString>)>>>,
}

impl FakeShell {
    fn new(outcome: fn() -> io::Result<ProcessOutcome>) -> Self {
        Self {
            outcome,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn exiting(code: i32) -> Self {
        match code {
            0 => Self::new(|| Ok(ProcessOutcome::Exited(0))),
            _ => Self::new(|| Ok(ProcessOutcome::Exited(1))),
        }
    }

    fn calls(&self) -> Vec<(String, Vec<OsString>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeShell {
    fn run(&self, program: &str, args: &[OsString]) -> io::Result<ProcessOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((program.to_string(), args.to_vec()));
        (self.outcome)()
    }
}

fn sample_graph() -> DependencyGraph {
    let class = |name: &str| DeclaredEntity::class(QualifiedName::parse(name));
    DependencyGraph::from_edges([DependencyEdge::new(
        class("App\\Http\\Controller"),
        class("App\\Domain\\User"),
    )])
}

#[test]
fn detects_if_plantuml_is_not_installed() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("dependencies.png");
    let shell = FakeShell::exiting(1);

    let err = PlantUmlRenderer::new()
        .with_runner(shell.clone())
        .render(&sample_graph(), &destination)
        .unwrap_err();

    assert!(matches!(
        err,
        Error::RendererUnavailable {
            status: Some(1),
            ..
        }
    ));
    assert!(err.is_renderer_unavailable());
    assert!(!destination.exists());
    assert!(!dir.path().join("dependencies.uml").exists());
    assert_eq!(shell.calls().len(), 1);
}

#[test]
fn failed_render_still_honours_keep_flag() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("dependencies.png");

    let err = PlantUmlRenderer::new()
        .with_keep_intermediate(true)
        .with_runner(FakeShell::exiting(1))
        .render(&sample_graph(), &destination)
        .unwrap_err();

    assert!(err.is_renderer_unavailable());
    assert!(dir.path().join("dependencies.uml").exists());
    assert!(!destination.exists());
}

#[test]
fn removes_intermediate_after_success() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("dependencies.png");
    let shell = FakeShell::exiting(0);

    PlantUmlRenderer::new()
        .with_runner(shell.clone())
        .render(&sample_graph(), &destination)
        .unwrap();

    assert!(!dir.path().join("dependencies.uml").exists());
    let calls = shell.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "plantuml");
    assert_eq!(
        calls[0].1,
        vec![dir.path().join("dependencies.uml").into_os_string()]
    );
}

#[test]
fn keeps_intermediate_when_requested() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("dependencies.png");

    PlantUmlRenderer::new()
        .with_keep_intermediate(true)
        .with_runner(FakeShell::exiting(0))
        .render(&sample_graph(), &destination)
        .unwrap();

    let uml = std::fs::read_to_string(dir.path().join("dependencies.uml")).unwrap();
    assert_eq!(uml, "@startuml\nApp.Http.Controller --> App.Domain.User\n@enduml\n");
}

#[test]
fn svg_output_selects_renderer_format() {
    let dir = tempfile::TempDir::new().unwrap();
    let shell = FakeShell::exiting(0);

    PlantUmlRenderer::new()
        .with_program("/opt/plantuml/bin/plantuml")
        .with_runner(shell.clone())
        .render(&sample_graph(), &dir.path().join("graph.svg"))
        .unwrap();

    let calls = shell.calls();
    assert_eq!(calls[0].0, "/opt/plantuml/bin/plantuml");
    assert_eq!(calls[0].1[0], OsString::from("-tsvg"));
    assert_eq!(calls[0].1[1], dir.path().join("graph.uml").into_os_string());
}

#[test]
fn launch_failure_is_distinguishable() {
    let dir = tempfile::TempDir::new().unwrap();
    let shell = FakeShell::new(|| Err(io::Error::new(io::ErrorKind::NotFound, "not found")));

    let err = PlantUmlRenderer::new()
        .with_runner(shell)
        .render(&sample_graph(), &dir.path().join("out.png"))
        .unwrap_err();

    assert!(matches!(err, Error::LaunchFailed { .. }));
    assert!(err.is_renderer_unavailable());
    assert!(!dir.path().join("out.uml").exists());
}

#[test]
fn timeout_is_treated_as_launch_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let shell = FakeShell::new(|| Ok(ProcessOutcome::TimedOut));

    let err = PlantUmlRenderer::new()
        .with_runner(shell)
        .render(&sample_graph(), &dir.path().join("out.png"))
        .unwrap_err();

    match err {
        Error::LaunchFailed { source, .. } => assert_eq!(source.kind(), io::ErrorKind::TimedOut),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_binary_surfaces_as_launch_failure() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = PlantUmlRenderer::new()
        .with_program("phpdeps-test-no-such-renderer")
        .render(&sample_graph(), &dir.path().join("out.png"))
        .unwrap_err();

    assert!(matches!(err, Error::LaunchFailed { .. }));
}

#[cfg(unix)]
#[test]
fn system_shell_reports_exit_codes_and_timeouts() {
    let shell = SystemShell::new();
    assert_eq!(shell.run("true", &[]).unwrap(), ProcessOutcome::Exited(0));
    assert_eq!(shell.run("false", &[]).unwrap(), ProcessOutcome::Exited(1));

    let bounded = SystemShell::new().with_timeout(Some(Duration::from_millis(100)));
    assert_eq!(
        bounded.run("sleep", &[OsString::from("5")]).unwrap(),
        ProcessOutcome::TimedOut
    );
}

#[test]
fn dispatcher_rejects_unsupported_format_before_writing() {
    let dir = tempfile::TempDir::new().unwrap();
    let shell = FakeShell::exiting(0);
    let dispatcher = RenderDispatcher::new(PlantUmlRenderer::new().with_runner(shell.clone()));

    let err = dispatcher
        .render(&sample_graph(), &dir.path().join("graph.jpg"))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigError::UnsupportedFormat { .. })
    ));
    assert!(shell.calls().is_empty());
    assert!(!dir.path().join("graph.uml").exists());
}

#[test]
fn dispatcher_rejects_missing_destination_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let dispatcher = RenderDispatcher::new(PlantUmlRenderer::new().with_runner(FakeShell::exiting(0)));

    let err = dispatcher
        .validate_destination(&dir.path().join("missing/graph.png"))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigError::UnwritableDestination { .. })
    ));
}

#[test]
fn dispatcher_rejects_file_as_destination_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let blocker = dir.path().join("reports");
    std::fs::write(&blocker, "not a directory").unwrap();
    let dispatcher = RenderDispatcher::new(PlantUmlRenderer::new().with_runner(FakeShell::exiting(0)));

    let err = dispatcher
        .validate_destination(&blocker.join("graph.png"))
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Configuration(ConfigError::UnwritableDestination { .. })
    ));
}

#[cfg(unix)]
#[test]
fn destination_check_matches_actual_write_access() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let locked = dir.path().join("locked");
    std::fs::create_dir(&locked).unwrap();
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

    // Privileged users can still write to a 0555 directory.
    let can_write = std::fs::File::create(locked.join("attempt")).is_ok();
    let _ = std::fs::remove_file(locked.join("attempt"));

    let dispatcher = RenderDispatcher::new(PlantUmlRenderer::new().with_runner(FakeShell::exiting(0)));
    let result = dispatcher.validate_destination(&locked.join("graph.png"));

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

    match result {
        Ok(()) => assert!(can_write),
        Err(err) => {
            assert!(!can_write);
            assert!(matches!(
                err,
                Error::Configuration(ConfigError::UnwritableDestination { .. })
            ));
        }
    }
    assert_eq!(std::fs::read_dir(&locked).unwrap().count(), 0);
}

/// Writes `<intermediate stem>.<format>` the way plantuml names its output.
struct ImageShell;

impl CommandRunner for ImageShell {
    fn run(&self, _program: &str, args: &[OsString]) -> io::Result<ProcessOutcome> {
        let format = args
            .iter()
            .filter_map(|arg| arg.to_str()?.strip_prefix("-t"))
            .next()
            .unwrap_or("png")
            .to_string();
        let intermediate = std::path::Path::new(args.last().unwrap());
        std::fs::write(intermediate.with_extension(format), "image")?;
        Ok(ProcessOutcome::Exited(0))
    }
}

#[test]
fn uppercase_extension_lands_at_requested_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let destination = dir.path().join("Out.SVG");

    RenderDispatcher::new(PlantUmlRenderer::new().with_runner(ImageShell))
        .render(&sample_graph(), &destination)
        .unwrap();

    assert_eq!(std::fs::read_to_string(&destination).unwrap(), "image");
    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Out.SVG".to_string()]);
}

#[test]
fn timeout_does_not_replace_configured_runner() {
    let dir = tempfile::TempDir::new().unwrap();
    let shell = FakeShell::exiting(0);

    let renderer = PlantUmlRenderer::new()
        .with_runner(shell.clone())
        .with_timeout(Some(Duration::from_secs(3)));
    assert_eq!(renderer.timeout(), Some(Duration::from_secs(3)));

    renderer
        .render(&sample_graph(), &dir.path().join("out.png"))
        .unwrap();
    assert_eq!(shell.calls().len(), 1);
}
