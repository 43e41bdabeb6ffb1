//! Integration tests driving the manager and converters end to end.
//!
//! External tools are replaced by a scripted process runner so the tests
//! verify the exact commands each provider assembles and the full
//! open-configure-convert lifecycle, without any of the tools installed.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use svgconv::{
    Backend, Config, ConvertError, ConverterManager, MemoryDisk, ProcessOutput, ProcessRunner,
    Storage,
};

/// Runner that records every command and returns a canned result.
///
/// When `write_output` is set, the last single-quoted token of the command
/// (the output path for all four providers) is written with those bytes,
/// imitating a tool that produces its output file.
#[derive(Default)]
struct ScriptedRunner {
    commands: Mutex<Vec<String>>,
    exit_code: i32,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    write_output: Option<Vec<u8>>,
}

impl ScriptedRunner {
    fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn producing(contents: &[u8]) -> Arc<Self> {
        Arc::new(Self {
            write_output: Some(contents.to_vec()),
            ..Self::default()
        })
    }

    fn failing(stderr: &str) -> Arc<Self> {
        Arc::new(Self {
            exit_code: 1,
            stderr: stderr.as_bytes().to_vec(),
            ..Self::default()
        })
    }

    fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    fn last_command(&self) -> String {
        self.commands().last().cloned().unwrap_or_default()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run(&self, command: &str, _timeout: Duration) -> io::Result<ProcessOutput> {
        self.commands.lock().unwrap().push(command.to_string());

        if let Some(contents) = &self.write_output {
            if let Some(path) = command.rsplit('\'').nth(1).filter(|p| !p.is_empty()) {
                fs::write(path, contents)?;
            }
        }

        Ok(ProcessOutput {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
            exit_code: self.exit_code,
            timed_out: false,
        })
    }
}

fn manager_with(runner: Arc<ScriptedRunner>) -> ConverterManager {
    ConverterManager::new(Config::default()).with_runner(runner)
}

fn write_input(dir: &TempDir) -> PathBuf {
    let input = dir.path().join("rect.svg");
    fs::write(&input, "<svg xmlns=\"http://www.w3.org/2000/svg\"/>").unwrap();
    input
}

// ============================================================================
// Command Assembly Per Provider
// ============================================================================

#[test]
fn test_dimension_commands_per_provider() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);
    let input_token = format!("'{}'", input.display());

    let expected = [
        (
            "resvg",
            format!("'resvg' --width 800 --height 600 --dpi 150 {input_token}"),
        ),
        (
            "inkscape",
            format!(
                "'inkscape' --export-width=800 --export-height=600 --export-dpi=150 {input_token}"
            ),
        ),
        (
            "rsvg-convert",
            format!(
                "'rsvg-convert' --width=800 --height=600 --dpi-x=150 --dpi-y=150 {input_token}"
            ),
        ),
        (
            "cairosvg",
            format!("'cairosvg' --output-width 800 --output-height 600 -d 150 {input_token}"),
        ),
    ];

    let mut manager = ConverterManager::default();

    for (provider, command) in expected {
        let conv = manager
            .using(provider)
            .open(&input)
            .unwrap()
            .dimensions(800, 600, Some(150));

        assert_eq!(conv.build_command(), command, "provider: {provider}");
    }
}

#[test]
fn test_convert_writes_sibling_output_by_default() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let runner = ScriptedRunner::succeeding();
    let mut manager = manager_with(runner.clone());

    let output = manager
        .open(&input)
        .unwrap()
        .format("png")
        .unwrap()
        .convert(None)
        .unwrap();

    assert_eq!(output.into_path().unwrap(), dir.path().join("rect.png"));
    assert_eq!(
        runner.last_command(),
        format!(
            "'resvg' '{}' '{}'",
            input.display(),
            dir.path().join("rect.png").display()
        )
    );
}

#[test]
fn test_stdout_commands_never_name_an_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let runner = Arc::new(ScriptedRunner {
        stdout: b"DATA".to_vec(),
        ..ScriptedRunner::default()
    });
    let mut manager = manager_with(runner.clone());

    let bytes = manager
        .open(&input)
        .unwrap()
        .to_stdout(Some("png"))
        .unwrap();
    assert_eq!(bytes, b"DATA");
    assert!(runner.last_command().ends_with("-c"));

    manager.using("rsvg-convert").open(&input).unwrap().to_stdout(Some("png")).unwrap();
    assert!(!runner.last_command().contains("-o "));

    manager.using("cairosvg").open(&input).unwrap().to_stdout(Some("png")).unwrap();
    assert!(!runner.last_command().contains("-o "));

    manager.using("inkscape").open(&input).unwrap().to_stdout(Some("png")).unwrap();
    assert!(runner.last_command().contains("--export-filename='-'"));
}

#[test]
fn test_rsvg_background_folds_opacity_into_rgba() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let mut manager = ConverterManager::default();
    let conv = manager
        .using("rsvg-convert")
        .open(&input)
        .unwrap()
        .background("#ffffff")
        .unwrap()
        .background_opacity(0.5)
        .unwrap();

    assert_eq!(
        conv.build_command(),
        format!(
            "'rsvg-convert' --background-color='rgba(255,255,255,0.5)' '{}'",
            input.display()
        )
    );
}

// ============================================================================
// Error Paths
// ============================================================================

#[test]
fn test_cairosvg_background_capability_error() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let mut manager = ConverterManager::default();
    let err = manager
        .using("cairosvg")
        .open(&input)
        .unwrap()
        .background("#ffffff")
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "CairoSVG does not support background color via the command line"
    );
}

#[test]
fn test_process_failure_names_provider_and_command() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let mut manager = manager_with(ScriptedRunner::failing("malformed SVG"));
    let err = manager
        .open(&input)
        .unwrap()
        .to_stdout(Some("png"))
        .unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("Resvg command failed ["));
    assert!(message.ends_with("]: malformed SVG"));
}

#[test]
fn test_unsupported_format_lists_alternatives() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let mut manager = ConverterManager::default();
    let err = manager.open(&input).unwrap().format("pdf").unwrap_err();

    assert_eq!(
        err.to_string(),
        "unsupported export format: pdf. Supported by Resvg: png"
    );
}

// ============================================================================
// Disk Round Trips
// ============================================================================

#[test]
fn test_disk_to_disk_round_trip() {
    let memory = Arc::new(MemoryDisk::new());
    memory.write("icons/rect.svg", b"<svg/>").unwrap();

    let mut manager = manager_with(ScriptedRunner::producing(b"PNGBYTES"));
    manager.add_disk("assets", memory.clone());

    let path = manager
        .open_from_disk("assets", "icons/rect.svg")
        .unwrap()
        .to_disk("assets", "icons/rect.png", Some("png"))
        .unwrap();

    assert_eq!(path, "icons/rect.png");
    assert_eq!(memory.read("icons/rect.png").unwrap(), b"PNGBYTES");
}

#[test]
fn test_to_disk_detects_missing_output() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    // The runner exits zero but never writes the output file.
    let mut manager = manager_with(ScriptedRunner::succeeding());
    manager.add_disk("assets", Arc::new(MemoryDisk::new()));

    let err = manager
        .open(&input)
        .unwrap()
        .to_disk("assets", "rect.png", Some("png"))
        .unwrap_err();

    assert!(err
        .to_string()
        .contains("Resvg did not produce the expected output file"));
}

#[test]
fn test_content_input_is_cleaned_up() {
    let mut manager = manager_with(ScriptedRunner::succeeding());

    let conv = manager.open_from_content(b"<svg/>", "svg").unwrap();
    let temp_input = conv.input_path().to_path_buf();
    assert!(temp_input.exists());

    let output = conv.format("png").unwrap().convert(Some("-")).unwrap();
    assert!(output.into_bytes().is_some());
    assert!(!temp_input.exists(), "temp input should be removed on drop");
}

// ============================================================================
// Provider Resolution
// ============================================================================

#[test]
fn test_using_override_applies_once() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    let mut manager = ConverterManager::default();

    let conv = manager.using("cairosvg").open(&input).unwrap();
    assert_eq!(conv.provider_name(), "CairoSVG");

    let conv = manager.open(&input).unwrap();
    assert_eq!(conv.provider_name(), "Resvg");
}

#[test]
fn test_registered_provider_is_resolvable() {
    let dir = TempDir::new().unwrap();
    let input = write_input(&dir);

    struct Echo;

    impl Backend for Echo {
        fn name(&self) -> &'static str {
            "Echo"
        }

        fn supported_formats(&self) -> &'static [&'static str] {
            &["png"]
        }

        fn apply_export_options(
            &mut self,
            state: &mut svgconv::converter::CommandState,
            target: &str,
        ) {
            state.output_path = Some(target.to_string());
        }

        fn build_command(&self, state: &svgconv::converter::CommandState) -> String {
            format!("echo '{}'", state.input_path.display())
        }
    }

    let mut manager = ConverterManager::default();
    manager.register("echo", || Box::new(Echo));

    let conv = manager.using("echo").open(&input).unwrap();
    assert_eq!(conv.provider_name(), "Echo");

    let err = manager.using("missing").open(&input).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownProvider(_)));
}

#[test]
fn test_version_uses_configured_binary() {
    let mut config = Config::default();
    config.set_provider(
        "inkscape",
        svgconv::ProviderConfig {
            binary: Some("/opt/inkscape/bin/inkscape".to_string()),
            timeout: None,
        },
    );

    let runner = Arc::new(ScriptedRunner {
        stdout: b"Inkscape 1.3\n".to_vec(),
        ..ScriptedRunner::default()
    });
    let mut manager = ConverterManager::new(config).with_runner(runner.clone());

    assert_eq!(manager.version(Some("inkscape")).unwrap(), "Inkscape 1.3");
    assert_eq!(
        runner.last_command(),
        "'/opt/inkscape/bin/inkscape' --version"
    );
}
