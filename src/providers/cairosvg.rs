//! CairoSVG backend.
//!
//! CairoSVG is the Python renderer built on the Cairo 2D library.
//! Single-character options use `-`, multi-character options use `--`,
//! values are space-separated, and the output goes through a trailing
//! `-o <path>` (omitted for stdout). The CLI has no background color or
//! opacity flags, so both setters raise a capability error.

use crate::command::{render_option, shell_quote, Separator};
use crate::converter::{CommandState, Converter, STDOUT};
use crate::error::{ConvertError, ConvertResult};
use crate::options::OptionSet;

/// Backend for the `cairosvg` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct CairoSvg;

impl CairoSvg {
    /// Creates the CairoSVG backend.
    pub fn new() -> Self {
        Self
    }
}

impl super::Backend for CairoSvg {
    fn name(&self) -> &'static str {
        "CairoSVG"
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        &["png", "pdf", "ps", "svg"]
    }

    fn width_option(&self) -> &'static str {
        "output-width"
    }

    fn height_option(&self) -> &'static str {
        "output-height"
    }

    fn dpi_option(&self) -> &'static str {
        "d"
    }

    fn apply_background(&mut self, _options: &mut OptionSet, _color: &str) -> ConvertResult<()> {
        Err(ConvertError::UnsupportedCapability {
            provider: self.name().to_string(),
            feature: "background color".to_string(),
        })
    }

    fn apply_background_opacity(
        &mut self,
        _options: &mut OptionSet,
        _value: f64,
    ) -> ConvertResult<()> {
        Err(ConvertError::UnsupportedCapability {
            provider: self.name().to_string(),
            feature: "background opacity".to_string(),
        })
    }

    fn apply_export_options(&mut self, state: &mut CommandState, target: &str) {
        if let Some(format) = state.format.clone() {
            state.options.set("f", format);
        }

        // For stdout no -o flag is needed; output goes to stdout by default.
        if target != STDOUT {
            state.output_path = Some(target.to_string());
        }
    }

    fn build_command(&self, state: &CommandState) -> String {
        let mut parts = vec![shell_quote(&state.binary)];

        for (name, value) in &state.options {
            parts.push(render_option(name, value, Separator::Space, true));
        }

        parts.push(shell_quote(&state.input_path.to_string_lossy()));

        if let Some(output) = &state.output_path {
            parts.push(format!("-o {}", shell_quote(output)));
        }

        parts.join(" ")
    }
}

/// CairoSVG-specific fluent options.
impl Converter<CairoSvg> {
    /// Sets the output scaling factor (e.g. 2.0 for 200%).
    pub fn scale(self, scale: f64) -> Self {
        self.with_option("s", scale)
    }

    /// Sets the parent container width in pixels, for SVGs using
    /// percentage widths.
    pub fn container_width(self, width: u32) -> Self {
        self.with_option("W", width)
    }

    /// Sets the parent container height in pixels, for SVGs using
    /// percentage heights.
    pub fn container_height(self, height: u32) -> Self {
        self.with_option("H", height)
    }

    /// Sets both container dimensions at once.
    pub fn container_dimensions(self, width: u32, height: u32) -> Self {
        self.container_width(width).container_height(height)
    }

    /// Enables XML entity resolution and allows very large files.
    ///
    /// WARNING: this makes CairoSVG vulnerable to XXE attacks. Only use
    /// on trusted input.
    pub fn unsafe_mode(self) -> Self {
        self.with_flag("u")
    }
}
