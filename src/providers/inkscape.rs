//! Inkscape backend.
//!
//! Inkscape is the full vector editor and supports the widest format set.
//! All options use `--` with `=` separating values, and the output
//! destination goes through the `export-type` and `export-filename`
//! options rather than a positional argument; the stdout sentinel is
//! passed as the literal filename `-`.

use std::collections::HashMap;

use crate::command::{render_option, shell_quote, Separator};
use crate::converter::{CommandState, Converter};
use crate::error::ConvertResult;
use crate::options::OptionValue;

use super::Backend;

/// Backend for the `inkscape` CLI.
///
/// Uses the default `export-*` option names for dimensions and background.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inkscape;

impl Inkscape {
    /// Creates the Inkscape backend.
    pub fn new() -> Self {
        Self
    }
}

impl Backend for Inkscape {
    fn name(&self) -> &'static str {
        "Inkscape"
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        &["svg", "png", "ps", "eps", "pdf", "emf", "wmf"]
    }

    fn apply_export_options(&mut self, state: &mut CommandState, target: &str) {
        if let Some(format) = state.format.clone() {
            state.options.set("export-type", format);
        }

        state.options.set("export-filename", target);
    }

    fn build_command(&self, state: &CommandState) -> String {
        let mut parts = vec![shell_quote(&state.binary)];

        for (name, value) in &state.options {
            parts.push(render_option(name, value, Separator::Equals, false));
        }

        parts.push(shell_quote(&state.input_path.to_string_lossy()));

        parts.join(" ")
    }
}

/// Inkscape-specific fluent options.
impl Converter<Inkscape> {
    /// Sets the page(s) to export.
    pub fn page(self, page: impl Into<OptionValue>) -> Self {
        self.with_option("pages", page)
    }

    /// Exports the first page only.
    pub fn first_page(self) -> Self {
        self.page(1)
    }

    /// Sets the export-id for exporting a specific object.
    pub fn export_id(self, id: &str, id_only: bool) -> Self {
        let this = if id_only {
            self.with_flag("export-id-only")
        } else {
            self
        };
        this.with_option("export-id", id)
    }

    /// Exports the page area.
    pub fn export_area_page(self) -> Self {
        self.with_flag("export-area-page")
    }

    /// Exports the drawing area (bounding box of all objects).
    pub fn export_area_drawing(self) -> Self {
        self.with_flag("export-area-drawing")
    }

    /// Sets a custom export area.
    pub fn export_area(self, x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        self.with_option("export-area", format!("{x0}:{y0}:{x1}:{y1}"))
    }

    /// Snaps the export area to integer px values.
    pub fn export_area_snap(self) -> Self {
        self.with_flag("export-area-snap")
    }

    /// Converts text objects to paths on export.
    pub fn export_text_to_path(self) -> Self {
        self.with_flag("export-text-to-path")
    }

    /// Exports plain SVG (no Inkscape namespaces).
    pub fn export_plain_svg(self) -> Self {
        self.with_flag("export-plain-svg")
    }

    /// Overwrites the input file.
    pub fn export_overwrite(self) -> Self {
        self.with_flag("export-overwrite")
    }

    /// Sets the PDF version for export.
    pub fn export_pdf_version(self, version: &str) -> Self {
        self.with_option("export-pdf-version", version)
    }

    /// Sets the PostScript level for PS/EPS export.
    pub fn export_ps_level(self, level: u32) -> Self {
        self.with_option("export-ps-level", level)
    }

    /// Sets the PNG color mode.
    pub fn export_png_color_mode(self, mode: &str) -> Self {
        self.with_option("export-png-color-mode", mode)
    }

    /// Sets the PNG compression level (0-9).
    pub fn export_png_compression(self, level: u32) -> Self {
        self.with_option("export-png-compression", level)
    }

    /// Sets the PNG antialiasing level (0-3).
    pub fn export_png_antialias(self, level: u32) -> Self {
        self.with_option("export-png-antialias", level)
    }

    /// Sets a margin around the exported area.
    pub fn export_margin(self, margin: f64) -> Self {
        self.with_option("export-margin", margin)
    }

    /// Exports a LaTeX companion file.
    pub fn export_latex(self) -> Self {
        self.with_flag("export-latex")
    }

    /// Ignores filters and exports as vectors.
    pub fn export_ignore_filters(self) -> Self {
        self.with_flag("export-ignore-filters")
    }

    /// Removes unused defs from the SVG.
    pub fn vacuum_defs(self) -> Self {
        self.with_flag("vacuum-defs")
    }

    /// Returns the list of available Inkscape actions.
    pub fn action_list(&self) -> ConvertResult<String> {
        self.probe("--action-list")
    }

    /// Queries the geometry of the drawing, or of one object by id.
    ///
    /// Runs the input through the `query-x`/`query-y`/`query-width`/
    /// `query-height` flags, one invocation each, and returns the trimmed
    /// values keyed as `x`, `y`, `width`, and `height`.
    pub fn query(&self, object_id: Option<&str>) -> ConvertResult<HashMap<String, String>> {
        let mut results = HashMap::new();

        for flag in ["query-x", "query-y", "query-width", "query-height"] {
            let mut state = self.state().clone();
            if let Some(id) = object_id {
                state.options.set("query-id", id);
            }
            state.options.set_flag(flag);

            let result = self.run_command(&Inkscape::new().build_command(&state))?;
            let key = flag.trim_start_matches("query-");
            results.insert(key.to_string(), result.stdout_str().trim().to_string());
        }

        Ok(results)
    }
}
