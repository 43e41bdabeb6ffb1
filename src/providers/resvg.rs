//! resvg backend.
//!
//! resvg is a fast PNG-only renderer. Multi-character options use `--` and
//! single-character options use `-`, values are space-separated, and the
//! output path is a positional trailing argument. Stdout output uses the
//! `-c` flag, which (like every single-character valueless flag) must be
//! emitted *after* the input path; resvg's CLI parser requires that order.

use crate::command::{render_option, shell_quote, Separator};
use crate::converter::{CommandState, Converter, STDOUT};
use crate::options::OptionValue;

/// Backend for the `resvg` CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resvg;

impl Resvg {
    /// Creates the resvg backend.
    pub fn new() -> Self {
        Self
    }
}

impl super::Backend for Resvg {
    fn name(&self) -> &'static str {
        "Resvg"
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        &["png"]
    }

    fn width_option(&self) -> &'static str {
        "width"
    }

    fn height_option(&self) -> &'static str {
        "height"
    }

    fn dpi_option(&self) -> &'static str {
        "dpi"
    }

    fn background_option(&self) -> &'static str {
        "background"
    }

    fn background_opacity_option(&self) -> &'static str {
        "background-opacity"
    }

    fn apply_export_options(&mut self, state: &mut CommandState, target: &str) {
        if target == STDOUT {
            state.options.set_flag("c");
            state.output_path = None;
        } else {
            state.output_path = Some(target.to_string());
        }
    }

    fn build_command(&self, state: &CommandState) -> String {
        let mut parts = vec![shell_quote(&state.binary)];
        let mut post_input_flags = Vec::new();

        for (name, value) in &state.options {
            let rendered = render_option(name, value, Separator::Space, true);

            // Single-char flags (like -c for stdout) must come after input.
            if name.chars().count() == 1 && *value == OptionValue::Flag {
                post_input_flags.push(rendered);
            } else {
                parts.push(rendered);
            }
        }

        parts.push(shell_quote(&state.input_path.to_string_lossy()));
        parts.extend(post_input_flags);

        if let Some(output) = state.output_path.as_deref().filter(|o| *o != STDOUT) {
            parts.push(shell_quote(output));
        }

        parts.join(" ")
    }
}

/// resvg-specific fluent options.
impl Converter<Resvg> {
    /// Sets the zoom factor.
    pub fn zoom(self, zoom: f64) -> Self {
        self.with_option("zoom", zoom)
    }

    /// Sets the shape rendering mode (optimizeSpeed, crispEdges,
    /// geometricPrecision).
    pub fn shape_rendering(self, mode: &str) -> Self {
        self.with_option("shape-rendering", mode)
    }

    /// Sets the text rendering mode.
    pub fn text_rendering(self, mode: &str) -> Self {
        self.with_option("text-rendering", mode)
    }

    /// Sets the image rendering mode.
    pub fn image_rendering(self, mode: &str) -> Self {
        self.with_option("image-rendering", mode)
    }

    /// Sets the default font family.
    pub fn default_font_family(self, family: &str) -> Self {
        self.with_option("font-family", family)
    }

    /// Sets the default font size.
    pub fn default_font_size(self, size: u32) -> Self {
        self.with_option("font-size", size)
    }

    /// Uses a specific font file.
    pub fn use_font_file(self, path: &str) -> Self {
        self.with_option("use-font-file", path)
    }

    /// Uses fonts from a directory.
    pub fn use_fonts_dir(self, path: &str) -> Self {
        self.with_option("use-fonts-dir", path)
    }

    /// Skips system fonts.
    pub fn skip_system_fonts(self) -> Self {
        self.with_flag("skip-system-fonts")
    }

    /// Sets the resources directory for relative image paths.
    pub fn resources_dir(self, path: &str) -> Self {
        self.with_option("resources-dir", path)
    }
}
