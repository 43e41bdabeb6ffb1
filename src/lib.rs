//! # svgconv - SVG Conversion Toolkit
//!
//! A unified front over external SVG-to-raster/vector tools (resvg,
//! Inkscape, rsvg-convert, CairoSVG).
//!
//! One fluent, provider-agnostic API configures a conversion; per-provider
//! backends translate it into each tool's CLI conventions and assemble the
//! exact command string; a process runner executes it. Providers are
//! selected by name through the [`ConverterManager`], with per-provider
//! binaries and timeouts coming from a [`Config`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use svgconv::{Config, ConverterManager};
//!
//! let mut manager = ConverterManager::new(Config::from_env());
//! let output = manager
//!     .open("logo.svg")?
//!     .dimensions(800, 600, Some(150))
//!     .background("#ffffff")?
//!     .convert(Some("logo.png"))?;
//! ```

pub mod color;
pub mod command;
pub mod config;
pub mod converter;
pub mod error;
pub mod manager;
pub mod options;
pub mod process;
pub mod providers;
pub mod storage;

// Re-export main types for convenient access
pub use config::{Config, ProviderConfig};
pub use converter::{ConvertOutput, Converter, DynConverter, STDOUT};
pub use error::{ConvertError, ConvertResult};
pub use manager::{ConverterManager, ProviderRegistry};
pub use options::{OptionEntry, OptionSet, OptionValue};
pub use process::{ProcessOutput, ProcessRunner, ShellRunner};
pub use providers::{Backend, CairoSvg, Inkscape, Resvg, RsvgConvert};
pub use storage::{DiskRegistry, LocalDisk, MemoryDisk, Storage};
