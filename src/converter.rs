//! Converter instances and the shared conversion lifecycle.
//!
//! A [`Converter`] binds one input file to one provider backend. Callers
//! configure it through fluent setters, then call an output method
//! (`convert`, `to_file`, `to_disk`, `to_stdout`, or `raw`); the backend
//! assembles the command string and the process runner executes it. Temp
//! files registered with the instance are deleted when it is dropped, on
//! success and error paths alike.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, trace};

use crate::command::shell_quote;
use crate::config::DEFAULT_TIMEOUT_SECS;
use crate::error::{ConvertError, ConvertResult};
use crate::options::{OptionEntry, OptionSet, OptionValue};
use crate::process::{ProcessOutput, ProcessRunner, ShellRunner};
use crate::providers::Backend;
use crate::storage::DiskRegistry;

/// Output destination meaning "write to standard output".
pub const STDOUT: &str = "-";

/// Timeout for `--version`-style probe invocations.
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// The deterministic inputs to command assembly.
///
/// Building a command from an unchanged state yields a byte-identical
/// string; backends must not mutate the state during `build_command`.
#[derive(Debug, Clone)]
pub struct CommandState {
    /// The binary path or name, quoted as the first command token.
    pub binary: String,
    /// The input file the instance is bound to.
    pub input_path: PathBuf,
    /// Accumulated CLI options in insertion order.
    pub options: OptionSet,
    /// The validated, lower-cased export format, if set.
    pub format: Option<String>,
    /// Positional or `-o` output path for backends that use one.
    pub output_path: Option<String>,
}

/// The result of a `convert` call.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertOutput {
    /// The conversion wrote the file at this path.
    Path(PathBuf),
    /// The conversion targeted stdout; these are the raw bytes.
    Bytes(Vec<u8>),
}

impl ConvertOutput {
    /// Returns the output path, if the conversion wrote a file.
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            ConvertOutput::Path(path) => Some(path),
            ConvertOutput::Bytes(_) => None,
        }
    }

    /// Returns the raw bytes, if the conversion targeted stdout.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ConvertOutput::Bytes(bytes) => Some(bytes),
            ConvertOutput::Path(_) => None,
        }
    }
}

/// A converter instance bound to one input file and one provider backend.
///
/// # Example
///
/// ```ignore
/// use svgconv::{Converter, providers::Resvg};
///
/// let output = Converter::new(Resvg::new(), "logo.svg", "resvg")
///     .format("png")?
///     .dimensions(800, 600, Some(150))
///     .background("#ffffff")?
///     .convert(None)?;
/// ```
pub struct Converter<B: Backend> {
    backend: B,
    state: CommandState,
    timeout: Duration,
    temp_files: Vec<PathBuf>,
    runner: Arc<dyn ProcessRunner>,
    disks: Arc<DiskRegistry>,
}

/// A converter with a runtime-selected backend, as handed out by the manager.
pub type DynConverter = Converter<Box<dyn Backend>>;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a uniquely named path in the system temp directory.
///
/// The suffix combines the process id, wall-clock nanos, and a monotonic
/// counter so concurrently running instances cannot collide.
pub(crate) fn unique_temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let count = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);

    std::env::temp_dir().join(format!(
        "svgconv_{}_{nanos:x}_{count}_{name}",
        std::process::id()
    ))
}

impl<B: Backend> Converter<B> {
    /// Creates a converter for the given backend, input file, and binary.
    pub fn new(backend: B, input_path: impl AsRef<Path>, binary: impl Into<String>) -> Self {
        Self {
            backend,
            state: CommandState {
                binary: binary.into(),
                input_path: input_path.as_ref().to_path_buf(),
                options: OptionSet::new(),
                format: None,
                output_path: None,
            },
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temp_files: Vec::new(),
            runner: Arc::new(ShellRunner::new()),
            disks: Arc::new(DiskRegistry::new()),
        }
    }

    /// Replaces the process runner (the default runs commands via `sh -c`).
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Attaches a disk registry for `to_disk`.
    pub fn with_disks(mut self, disks: Arc<DiskRegistry>) -> Self {
        self.disks = disks;
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// The provider name, as used in error messages.
    pub fn provider_name(&self) -> &'static str {
        self.backend.name()
    }

    /// The formats this provider can export to.
    pub fn supported_formats(&self) -> &'static [&'static str] {
        self.backend.supported_formats()
    }

    /// The input file this instance is bound to.
    pub fn input_path(&self) -> &Path {
        &self.state.input_path
    }

    /// The accumulated CLI options.
    pub fn options(&self) -> &OptionSet {
        &self.state.options
    }

    /// The export format, if one has been set.
    pub fn export_format(&self) -> Option<&str> {
        self.state.format.as_deref()
    }

    /// The configured process timeout in seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }

    pub(crate) fn state(&self) -> &CommandState {
        &self.state
    }

    pub(crate) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub(crate) fn options_mut(&mut self) -> &mut OptionSet {
        &mut self.state.options
    }

    // -------------------------------------------------------------------------
    // Format & Dimensions
    // -------------------------------------------------------------------------

    /// Sets the export format, validated against the provider's whitelist.
    pub fn format(mut self, format: &str) -> ConvertResult<Self> {
        self.set_format(format)?;
        Ok(self)
    }

    /// Sets the export width through the provider's option name.
    pub fn width(mut self, width: u32) -> Self {
        let name = self.backend.width_option();
        self.state.options.set(name, width);
        self
    }

    /// Sets the export height through the provider's option name.
    pub fn height(mut self, height: u32) -> Self {
        let name = self.backend.height_option();
        self.state.options.set(name, height);
        self
    }

    /// Sets the export DPI through the provider's option wiring.
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.backend.apply_dpi(&mut self.state.options, dpi);
        self
    }

    /// Sets width, height, and DPI in one call.
    ///
    /// Passing `None` for the DPI skips setting it; it never clears a
    /// previously set value. The conventional defaults are 1024x1024 at
    /// 96 DPI.
    pub fn dimensions(self, width: u32, height: u32, dpi: Option<u32>) -> Self {
        let this = self.width(width).height(height);
        match dpi {
            Some(dpi) => this.dpi(dpi),
            None => this,
        }
    }

    // -------------------------------------------------------------------------
    // Background
    // -------------------------------------------------------------------------

    /// Sets the background color, validated per the provider's syntax.
    ///
    /// Errors with a capability error on providers whose CLI has no
    /// background support.
    pub fn background(mut self, color: &str) -> ConvertResult<Self> {
        self.backend
            .apply_background(&mut self.state.options, color)?;
        Ok(self)
    }

    /// Sets the background opacity in [0.0, 1.0].
    pub fn background_opacity(mut self, value: f64) -> ConvertResult<Self> {
        self.backend
            .apply_background_opacity(&mut self.state.options, value)?;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Dynamic Options
    // -------------------------------------------------------------------------

    /// Adds an arbitrary provider-native option.
    ///
    /// This is the escape hatch for tool features the named setters do not
    /// cover; the name goes into the command as-is.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.state.options.set(name, value);
        self
    }

    /// Adds an arbitrary provider-native flag (no value).
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.state.options.set_flag(name);
        self
    }

    /// Adds several options at once; bare strings become flags.
    pub fn with_options<I, E>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<OptionEntry>,
    {
        self.state
            .options
            .extend(entries.into_iter().map(Into::into));
        self
    }

    /// Sets the process timeout for subsequent executions.
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Duration::from_secs(seconds);
        self
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Builds the full command string without executing it.
    pub fn build_command(&self) -> String {
        self.backend.build_command(&self.state)
    }

    /// Converts the input and returns the output path or stdout bytes.
    ///
    /// If no format is set, it is inferred from the export name's extension.
    /// Without an export name the destination defaults to the input's
    /// directory and base name with the format's extension; a relative name
    /// resolves against the input's directory. The stdout sentinel `-`
    /// returns the raw process output instead of a path.
    pub fn convert(mut self, export_name: Option<&str>) -> ConvertResult<ConvertOutput> {
        self.prepare_export_format(export_name)?;
        let export_path = self.prepare_export_path(export_name)?;
        self.backend
            .apply_export_options(&mut self.state, &export_path);

        let result = self.execute()?;

        if export_path == STDOUT {
            Ok(ConvertOutput::Bytes(result.stdout))
        } else {
            Ok(ConvertOutput::Path(PathBuf::from(export_path)))
        }
    }

    /// Converts the input to the given local file path.
    ///
    /// The format is inferred from the path's extension if not already set.
    pub fn to_file(mut self, output_path: impl AsRef<Path>) -> ConvertResult<PathBuf> {
        let output_path = output_path.as_ref().to_path_buf();

        if self.state.format.is_none() {
            if let Some(extension) = path_extension(&output_path) {
                self.set_format(&extension)?;
            }
        }

        let target = output_path.to_string_lossy().into_owned();
        self.backend.apply_export_options(&mut self.state, &target);
        self.execute()?;

        Ok(output_path)
    }

    /// Converts the input and writes the result to a named storage disk.
    ///
    /// The conversion targets a temp file registered with this instance;
    /// its bytes are then written to `path` on the disk. An error is raised
    /// if the tool exits zero without producing the expected file.
    pub fn to_disk(mut self, disk: &str, path: &str, format: Option<&str>) -> ConvertResult<String> {
        if let Some(format) = format {
            self.set_format(format)?;
        }

        let extension = self
            .state
            .format
            .clone()
            .or_else(|| path_extension(Path::new(path)));

        let temp_output = match &extension {
            Some(ext) => self.create_temp_file(&format!("output.{ext}")),
            None => self.create_temp_file("output"),
        };

        if self.state.format.is_none() {
            if let Some(ext) = &extension {
                self.set_format(ext)?;
            }
        }

        let target = temp_output.to_string_lossy().into_owned();
        self.backend.apply_export_options(&mut self.state, &target);
        self.execute()?;

        if !temp_output.exists() {
            return Err(ConvertError::MissingOutput {
                provider: self.backend.name().to_string(),
                path: temp_output,
            });
        }

        let contents = fs::read(&temp_output)?;

        let storage = self
            .disks
            .get(disk)
            .ok_or_else(|| ConvertError::UnknownDisk(disk.to_string()))?;
        storage.write(path, &contents)?;

        Ok(path.to_string())
    }

    /// Converts the input and returns the raw output bytes from stdout.
    pub fn to_stdout(mut self, format: Option<&str>) -> ConvertResult<Vec<u8>> {
        if let Some(format) = format {
            self.set_format(format)?;
        }

        self.backend.apply_export_options(&mut self.state, STDOUT);
        let result = self.execute()?;

        Ok(result.stdout)
    }

    /// Runs the built command and returns the structured result without
    /// raising on failure.
    ///
    /// This is the escape hatch for callers inspecting exit codes and
    /// stderr themselves; only spawn-level I/O errors are surfaced.
    pub fn raw(&self) -> ConvertResult<ProcessOutput> {
        let command = self.build_command();
        trace!(provider = self.backend.name(), %command, "running raw command");
        Ok(self.runner.run(&command, self.timeout)?)
    }

    /// Queries the underlying tool's version string.
    pub fn version(&self) -> ConvertResult<String> {
        self.probe("--version")
    }

    /// Runs the binary with a single probe flag and returns trimmed stdout.
    pub(crate) fn probe(&self, flag: &str) -> ConvertResult<String> {
        let command = format!("{} {flag}", shell_quote(&self.state.binary));
        let result = self.runner.run(&command, PROBE_TIMEOUT)?;

        if !result.success() {
            return Err(ConvertError::from_process(
                &result,
                &command,
                self.backend.name(),
            ));
        }

        Ok(result.stdout_str().trim().to_string())
    }

    // -------------------------------------------------------------------------
    // Temp File Management
    // -------------------------------------------------------------------------

    /// Creates a uniquely named temp path and registers it for cleanup.
    ///
    /// The file itself is not created; conversions write it.
    pub fn create_temp_file(&mut self, name: &str) -> PathBuf {
        let path = unique_temp_path(name);
        self.temp_files.push(path.clone());
        path
    }

    /// Registers an externally created file for cleanup.
    pub fn add_temp_file(&mut self, path: impl AsRef<Path>) {
        self.temp_files.push(path.as_ref().to_path_buf());
    }

    /// Deletes all registered temp files.
    ///
    /// Safe to call repeatedly; a second call finds nothing to delete.
    /// Also invoked on drop.
    pub fn cleanup(&mut self) {
        for file in self.temp_files.drain(..) {
            if file.exists() {
                let _ = fs::remove_file(&file);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn set_format(&mut self, format: &str) -> ConvertResult<()> {
        let format = format.to_lowercase();
        let supported = self.backend.supported_formats();

        if !supported.contains(&format.as_str()) {
            return Err(ConvertError::UnsupportedFormat {
                format,
                provider: self.backend.name().to_string(),
                supported: supported.join(", "),
            });
        }

        self.state.format = Some(format);
        Ok(())
    }

    fn execute(&self) -> ConvertResult<ProcessOutput> {
        self.run_command(&self.build_command())
    }

    /// Runs an assembled command, raising a process error on failure.
    pub(crate) fn run_command(&self, command: &str) -> ConvertResult<ProcessOutput> {
        debug!(provider = self.backend.name(), %command, "executing conversion");

        let result = self.runner.run(command, self.timeout)?;

        if !result.success() {
            return Err(ConvertError::from_process(
                &result,
                command,
                self.backend.name(),
            ));
        }

        Ok(result)
    }

    /// Ensures a format is set, inferring it from the export name if needed.
    fn prepare_export_format(&mut self, export_name: Option<&str>) -> ConvertResult<()> {
        if self.state.format.is_some() {
            return Ok(());
        }

        if let Some(name) = export_name {
            if name != STDOUT {
                if let Some(extension) = path_extension(Path::new(name)) {
                    return self.set_format(&extension);
                }
            }
        }

        Err(ConvertError::MissingFormat)
    }

    /// Resolves the destination path for `convert`, creating its directory.
    fn prepare_export_path(&self, export_name: Option<&str>) -> ConvertResult<String> {
        if export_name == Some(STDOUT) {
            return Ok(STDOUT.to_string());
        }

        let input_dir = self
            .state
            .input_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let export_path = match export_name {
            Some(name) if Path::new(name).is_absolute() => PathBuf::from(name),
            Some(name) => input_dir.join(name),
            None => {
                let base = self
                    .state
                    .input_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "output".to_string());
                let format = self
                    .state
                    .format
                    .as_deref()
                    .ok_or(ConvertError::MissingFormat)?;
                input_dir.join(format!("{base}.{format}"))
            }
        };

        if let Some(parent) = export_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        Ok(export_path.to_string_lossy().into_owned())
    }
}

impl<B: Backend> Drop for Converter<B> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl<B: Backend> std::fmt::Debug for Converter<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("provider", &self.backend.name())
            .field("input_path", &self.state.input_path)
            .field("binary", &self.state.binary)
            .field("format", &self.state.format)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

fn path_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
}
