//! Provider resolution and converter construction.
//!
//! The [`ConverterManager`] is the front door of the library: it resolves a
//! provider name to a backend, binds it to an input file, and hands out a
//! ready-to-use [`DynConverter`] carrying the configured binary, timeout,
//! process runner, and disk registry. Provider selection follows the
//! configured default unless [`ConverterManager::using`] arms a one-shot
//! override for the next open.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::config::Config;
use crate::converter::{unique_temp_path, Converter, DynConverter};
use crate::error::{ConvertError, ConvertResult};
use crate::process::{ProcessRunner, ShellRunner};
use crate::providers::{Backend, CairoSvg, Inkscape, Resvg, RsvgConvert};
use crate::storage::{DiskRegistry, Storage};

/// Placeholder input for probe-only instances; probes never read the input.
const PROBE_INPUT: &str = "-";

/// A factory producing a fresh backend per converter instance.
pub type BackendFactory = Box<dyn Fn() -> Box<dyn Backend> + Send + Sync>;

/// Maps provider names to backend factories.
pub struct ProviderRegistry {
    factories: HashMap<String, BackendFactory>,
}

impl ProviderRegistry {
    /// Creates a registry with no providers.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Creates a registry pre-seeded with the four built-in providers.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("resvg", || Box::new(Resvg::new()));
        registry.register("inkscape", || Box::new(Inkscape::new()));
        registry.register("rsvg-convert", || Box::new(RsvgConvert::new()));
        registry.register("cairosvg", || Box::new(CairoSvg::new()));
        registry
    }

    /// Registers a provider factory, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
    }

    /// Creates a fresh backend for the given provider name.
    pub fn create(&self, name: &str) -> Option<Box<dyn Backend>> {
        self.factories.get(name).map(|factory| factory())
    }

    /// Returns true if a provider with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Returns the registered provider names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.names())
            .finish()
    }
}

/// Resolves providers and hands out configured converter instances.
///
/// # Example
///
/// ```ignore
/// use svgconv::{Config, ConverterManager};
///
/// let mut manager = ConverterManager::new(Config::from_env());
/// let output = manager
///     .using("inkscape")
///     .open("logo.svg")?
///     .format("pdf")?
///     .convert(None)?;
/// ```
pub struct ConverterManager {
    config: Config,
    registry: ProviderRegistry,
    runner: Arc<dyn ProcessRunner>,
    disks: Arc<DiskRegistry>,
    next_provider: Option<String>,
}

impl ConverterManager {
    /// Creates a manager with the built-in providers and the given config.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            registry: ProviderRegistry::builtin(),
            runner: Arc::new(ShellRunner::new()),
            disks: Arc::new(DiskRegistry::new()),
            next_provider: None,
        }
    }

    /// Creates a manager configured from environment variables.
    pub fn from_env() -> Self {
        Self::new(Config::from_env())
    }

    /// Replaces the process runner (the default runs commands via `sh -c`).
    pub fn with_runner(mut self, runner: Arc<dyn ProcessRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The shared disk registry.
    pub fn disks(&self) -> Arc<DiskRegistry> {
        self.disks.clone()
    }

    /// The disk used by callers that do not name one explicitly.
    pub fn default_disk(&self) -> &str {
        &self.config.default_disk
    }

    /// Registers a storage disk under the given name.
    ///
    /// Disks are visible to all instances the manager has handed out,
    /// including those created before the registration.
    pub fn add_disk(&self, name: impl Into<String>, storage: Arc<dyn Storage>) {
        self.disks.insert(name, storage);
    }

    /// Registers a custom provider factory.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Backend> + Send + Sync + 'static,
    {
        self.registry.register(name, factory);
    }

    /// Selects the provider for the next open only.
    ///
    /// The override is consumed by the next call that resolves a provider;
    /// after that the configured default applies again.
    pub fn using(&mut self, provider: &str) -> &mut Self {
        self.next_provider = Some(provider.to_string());
        self
    }

    /// Opens a converter for a local input file.
    pub fn open(&mut self, input: impl AsRef<Path>) -> ConvertResult<DynConverter> {
        let input = input.as_ref();

        if !input.exists() {
            return Err(ConvertError::InputNotFound(input.to_path_buf()));
        }

        let name = self.resolve_name(None);
        self.build_instance(&name, input)
    }

    /// Opens a converter for a file on a named storage disk.
    ///
    /// The file is materialized into a temp file the instance cleans up
    /// when dropped.
    pub fn open_from_disk(&mut self, disk: &str, path: &str) -> ConvertResult<DynConverter> {
        let storage = self
            .disks
            .get(disk)
            .ok_or_else(|| ConvertError::UnknownDisk(disk.to_string()))?;

        if !storage.exists(path) {
            return Err(ConvertError::DiskFileNotFound {
                disk: disk.to_string(),
                path: path.to_string(),
            });
        }

        let contents = storage.read(path)?;
        let extension = Path::new(path)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_else(|| "svg".to_string());

        self.open_from_content(&contents, &extension)
    }

    /// Opens a converter for raw SVG content.
    ///
    /// The content is written to a temp file with the given extension; the
    /// instance cleans it up when dropped.
    pub fn open_from_content(
        &mut self,
        contents: &[u8],
        extension: &str,
    ) -> ConvertResult<DynConverter> {
        let name = self.resolve_name(None);
        let temp = unique_temp_path(&format!("input.{extension}"));
        fs::write(&temp, contents)?;

        let mut instance = match self.build_instance(&name, &temp) {
            Ok(instance) => instance,
            Err(err) => {
                let _ = fs::remove_file(&temp);
                return Err(err);
            }
        };
        instance.add_temp_file(&temp);

        Ok(instance)
    }

    /// Queries the version string of the resolved provider's binary.
    pub fn version(&mut self, provider: Option<&str>) -> ConvertResult<String> {
        let name = self.resolve_name(provider);
        let instance = self.build_instance(&name, Path::new(PROBE_INPUT))?;
        instance.version()
    }

    /// Returns the list of available Inkscape actions.
    ///
    /// Errors unless the resolved provider is `inkscape`.
    pub fn action_list(&mut self) -> ConvertResult<String> {
        let name = self.resolve_name(None);

        if name != "inkscape" {
            return Err(ConvertError::UnsupportedCapability {
                provider: name,
                feature: "action listing".to_string(),
            });
        }

        Converter::new(Inkscape::new(), PROBE_INPUT, self.config.binary_for(&name))
            .with_runner(self.runner.clone())
            .action_list()
    }

    /// Returns the binary used for the resolved provider.
    ///
    /// Consumes an armed one-shot override, like the open methods do.
    pub fn binary_for(&mut self, provider: Option<&str>) -> String {
        let name = self.resolve_name(provider);
        self.config.binary_for(&name)
    }

    /// Returns the timeout in seconds for the resolved provider.
    pub fn timeout_for(&mut self, provider: Option<&str>) -> u64 {
        let name = self.resolve_name(provider);
        self.config.timeout_for(&name)
    }

    fn resolve_name(&mut self, explicit: Option<&str>) -> String {
        if let Some(name) = explicit {
            return name.to_string();
        }

        self.next_provider
            .take()
            .unwrap_or_else(|| self.config.default_provider.clone())
    }

    fn build_instance(&self, name: &str, input: &Path) -> ConvertResult<DynConverter> {
        let backend = self
            .registry
            .create(name)
            .ok_or_else(|| ConvertError::UnknownProvider(name.to_string()))?;

        debug!(provider = name, input = %input.display(), "opening converter");

        Ok(Converter::new(backend, input, self.config.binary_for(name))
            .timeout(self.config.timeout_for(name))
            .with_runner(self.runner.clone())
            .with_disks(self.disks.clone()))
    }
}

impl Default for ConverterManager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl std::fmt::Debug for ConverterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConverterManager")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("next_provider", &self.next_provider)
            .finish_non_exhaustive()
    }
}
