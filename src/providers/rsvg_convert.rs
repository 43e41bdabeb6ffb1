//! rsvg-convert backend.
//!
//! rsvg-convert is the lightweight C renderer. All options use `--` with
//! `=` separating values, the output goes through a trailing `-o <path>`
//! (omitted for stdout), and DPI is split into `--dpi-x`/`--dpi-y`. The
//! tool has no background-opacity flag: opacity is folded into the
//! background color as an RGBA value, whichever order the two are set in.

use crate::color;
use crate::command::{render_option, shell_quote, Separator};
use crate::converter::{CommandState, Converter, STDOUT};
use crate::error::ConvertResult;
use crate::options::OptionSet;

/// Backend for the `rsvg-convert` CLI.
///
/// Carries the background color and opacity separately so the combined
/// RGBA value can be recomputed whenever either is (re)set.
#[derive(Debug, Clone, Default)]
pub struct RsvgConvert {
    background_color: Option<String>,
    background_opacity: Option<f64>,
}

impl RsvgConvert {
    /// Creates the rsvg-convert backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the effective background color into the options, combining
    /// color and opacity when both are present.
    fn apply_background_color(&self, options: &mut OptionSet) {
        let Some(color) = &self.background_color else {
            return;
        };

        let value = match self.background_opacity {
            // An rgba() color already carries its own alpha.
            Some(opacity) if !color::is_rgba_color(color) => {
                color::combine_with_opacity(color, opacity)
            }
            _ => color.clone(),
        };

        options.set("background-color", value);
    }
}

impl super::Backend for RsvgConvert {
    fn name(&self) -> &'static str {
        "rsvg-convert"
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        &["png", "pdf", "ps", "eps", "svg"]
    }

    fn width_option(&self) -> &'static str {
        "width"
    }

    fn height_option(&self) -> &'static str {
        "height"
    }

    fn background_option(&self) -> &'static str {
        "background-color"
    }

    /// rsvg-convert has no single DPI option; both axes are set from one
    /// input.
    fn apply_dpi(&mut self, options: &mut OptionSet, dpi: u32) {
        options.set("dpi-x", dpi);
        options.set("dpi-y", dpi);
    }

    fn apply_background(&mut self, options: &mut OptionSet, color: &str) -> ConvertResult<()> {
        color::validate_color_with_alpha(color)?;
        self.background_color = Some(color.to_string());
        self.apply_background_color(options);
        Ok(())
    }

    fn apply_background_opacity(
        &mut self,
        options: &mut OptionSet,
        value: f64,
    ) -> ConvertResult<()> {
        color::validate_opacity(value)?;
        self.background_opacity = Some(value);
        self.apply_background_color(options);
        Ok(())
    }

    fn apply_export_options(&mut self, state: &mut CommandState, target: &str) {
        if let Some(format) = state.format.clone() {
            state.options.set("format", format);
        }

        // For stdout no -o flag is needed; output goes to stdout by default.
        if target != STDOUT {
            state.output_path = Some(target.to_string());
        }
    }

    fn build_command(&self, state: &CommandState) -> String {
        let mut parts = vec![shell_quote(&state.binary)];

        for (name, value) in &state.options {
            parts.push(render_option(name, value, Separator::Equals, false));
        }

        parts.push(shell_quote(&state.input_path.to_string_lossy()));

        if let Some(output) = &state.output_path {
            parts.push(format!("-o {}", shell_quote(output)));
        }

        parts.join(" ")
    }
}

/// rsvg-convert-specific fluent options.
impl Converter<RsvgConvert> {
    /// Sets the zoom factor (e.g. 2.5 = 250%).
    pub fn zoom(self, zoom: f64) -> Self {
        self.with_option("zoom", zoom)
    }

    /// Sets the horizontal zoom factor.
    pub fn x_zoom(self, zoom: f64) -> Self {
        self.with_option("x-zoom", zoom)
    }

    /// Sets the vertical zoom factor.
    pub fn y_zoom(self, zoom: f64) -> Self {
        self.with_option("y-zoom", zoom)
    }

    /// Preserves the aspect ratio when scaling.
    pub fn keep_aspect_ratio(mut self, keep: bool) -> Self {
        if keep {
            self.options_mut().set_flag("keep-aspect-ratio");
        } else {
            self.options_mut().remove("keep-aspect-ratio");
        }
        self
    }

    /// Applies an external CSS stylesheet to the SVG.
    pub fn stylesheet(self, path: &str) -> Self {
        self.with_option("stylesheet", path)
    }

    /// Disables SVG parser guards (for large or complex SVGs).
    pub fn unlimited(mut self, unlimited: bool) -> Self {
        if unlimited {
            self.options_mut().set_flag("unlimited");
        } else {
            self.options_mut().remove("unlimited");
        }
        self
    }

    /// Sets the page width for PDF/PS output (e.g. `8.5in`, `210mm`).
    ///
    /// Must be paired with [`Converter::page_height`].
    pub fn page_width(self, width: &str) -> Self {
        self.with_option("page-width", width)
    }

    /// Sets the page height for PDF/PS output (e.g. `11in`, `297mm`).
    pub fn page_height(self, height: &str) -> Self {
        self.with_option("page-height", height)
    }

    /// Sets the top margin/offset for page output.
    pub fn top_margin(self, margin: &str) -> Self {
        self.with_option("top", margin)
    }

    /// Sets the left margin/offset for page output.
    pub fn left_margin(self, margin: &str) -> Self {
        self.with_option("left", margin)
    }

    /// Controls whether compressed image data is kept in PDF/PS output.
    ///
    /// `true` adds `--keep-image-data`; `false` adds `--no-keep-image-data`
    /// (embed uncompressed RGB). Each clears the other.
    pub fn keep_image_data(mut self, keep: bool) -> Self {
        if keep {
            self.options_mut().remove("no-keep-image-data");
            self.options_mut().set_flag("keep-image-data");
        } else {
            self.options_mut().remove("keep-image-data");
            self.options_mut().set_flag("no-keep-image-data");
        }
        self
    }

    /// Sets the base URI for resolving relative references in the SVG.
    pub fn base_uri(self, uri: &str) -> Self {
        self.with_option("base-uri", uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionValue;
    use crate::providers::Backend;
    use pretty_assertions::assert_eq;

    fn converter() -> Converter<RsvgConvert> {
        Converter::new(RsvgConvert::new(), "/in/rect.svg", "rsvg-convert")
    }

    #[test]
    fn test_dimension_option_names() {
        let conv = converter().dimensions(800, 600, Some(150));
        assert_eq!(
            conv.build_command(),
            "'rsvg-convert' --width=800 --height=600 --dpi-x=150 --dpi-y=150 '/in/rect.svg'"
        );
    }

    #[test]
    fn test_output_flag() {
        let mut backend = RsvgConvert::new();
        let mut state = CommandState {
            binary: "rsvg-convert".to_string(),
            input_path: "/in/rect.svg".into(),
            options: Default::default(),
            format: Some("png".to_string()),
            output_path: None,
        };
        backend.apply_export_options(&mut state, "/out/rect.png");

        assert_eq!(
            backend.build_command(&state),
            "'rsvg-convert' --format='png' '/in/rect.svg' -o '/out/rect.png'"
        );
    }

    #[test]
    fn test_stdout_omits_output_flag() {
        let mut backend = RsvgConvert::new();
        let mut state = CommandState {
            binary: "rsvg-convert".to_string(),
            input_path: "/in/rect.svg".into(),
            options: Default::default(),
            format: Some("png".to_string()),
            output_path: None,
        };
        backend.apply_export_options(&mut state, STDOUT);

        assert_eq!(
            backend.build_command(&state),
            "'rsvg-convert' --format='png' '/in/rect.svg'"
        );
    }

    #[test]
    fn test_color_then_opacity_combines() {
        let conv = converter()
            .background("#ffffff")
            .unwrap()
            .background_opacity(0.5)
            .unwrap();

        assert_eq!(
            conv.options().get("background-color"),
            Some(&OptionValue::Text("rgba(255,255,255,0.5)".to_string()))
        );
    }

    #[test]
    fn test_opacity_then_color_combines() {
        let conv = converter()
            .background_opacity(0.5)
            .unwrap()
            .background("#ffffff")
            .unwrap();

        assert_eq!(
            conv.options().get("background-color"),
            Some(&OptionValue::Text("rgba(255,255,255,0.5)".to_string()))
        );
    }

    #[test]
    fn test_rgb_color_with_opacity() {
        let conv = converter()
            .background("rgb(255,0,128)")
            .unwrap()
            .background_opacity(0.25)
            .unwrap();

        assert_eq!(
            conv.options().get("background-color"),
            Some(&OptionValue::Text("rgba(255,0,128,0.25)".to_string()))
        );
    }

    #[test]
    fn test_rgba_accepted_directly() {
        let conv = converter().background("rgba(1,2,3,0.5)").unwrap();
        assert_eq!(
            conv.options().get("background-color"),
            Some(&OptionValue::Text("rgba(1,2,3,0.5)".to_string()))
        );
    }

    #[test]
    fn test_color_without_opacity_kept_verbatim() {
        let conv = converter().background("#abc").unwrap();
        assert_eq!(
            conv.options().get("background-color"),
            Some(&OptionValue::Text("#abc".to_string()))
        );
    }

    #[test]
    fn test_format_whitelist() {
        for format in ["png", "pdf", "ps", "eps", "svg"] {
            assert!(converter().format(format).is_ok(), "{format} should pass");
        }
        assert!(converter().format("emf").is_err());
    }

    #[test]
    fn test_keep_aspect_ratio_toggle() {
        let conv = converter().keep_aspect_ratio(true);
        assert!(conv.options().contains("keep-aspect-ratio"));

        let conv = conv.keep_aspect_ratio(false);
        assert!(!conv.options().contains("keep-aspect-ratio"));
    }

    #[test]
    fn test_keep_image_data_is_exclusive() {
        let conv = converter().keep_image_data(false).keep_image_data(true);
        assert!(conv.options().contains("keep-image-data"));
        assert!(!conv.options().contains("no-keep-image-data"));
    }
}
