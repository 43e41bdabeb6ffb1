//! Provider backends.
//!
//! Each backend maps the provider-agnostic conversion contract onto one
//! external tool's argument conventions: option names for the generic
//! width/height/dpi/background concepts, the command assembly rules, and
//! the output destination mechanism. The shared lifecycle lives in
//! [`crate::converter::Converter`]; backends only encode the quirks.

mod cairosvg;
mod inkscape;
mod resvg;
mod rsvg_convert;

pub use cairosvg::CairoSvg;
pub use inkscape::Inkscape;
pub use resvg::Resvg;
pub use rsvg_convert::RsvgConvert;

use crate::color;
use crate::converter::CommandState;
use crate::error::ConvertResult;
use crate::options::OptionSet;

/// The per-provider quirk surface.
///
/// Default implementations cover the common case: a single DPI option and
/// background color/opacity routed through the provider's option names
/// after validation. Backends override the hooks where their tool differs
/// (rsvg-convert's split DPI axes and RGBA folding, CairoSVG's missing
/// background support).
pub trait Backend: Send {
    /// The provider name used in error messages.
    fn name(&self) -> &'static str;

    /// The formats this provider can export to.
    fn supported_formats(&self) -> &'static [&'static str];

    /// The CLI option name for width.
    fn width_option(&self) -> &'static str {
        "export-width"
    }

    /// The CLI option name for height.
    fn height_option(&self) -> &'static str {
        "export-height"
    }

    /// The CLI option name for DPI.
    fn dpi_option(&self) -> &'static str {
        "export-dpi"
    }

    /// The CLI option name for background color.
    fn background_option(&self) -> &'static str {
        "export-background"
    }

    /// The CLI option name for background opacity.
    fn background_opacity_option(&self) -> &'static str {
        "export-background-opacity"
    }

    /// Wires a DPI value into the option set.
    fn apply_dpi(&mut self, options: &mut OptionSet, dpi: u32) {
        options.set(self.dpi_option(), dpi);
    }

    /// Validates and wires a background color into the option set.
    fn apply_background(&mut self, options: &mut OptionSet, color: &str) -> ConvertResult<()> {
        color::validate_color(color)?;
        options.set(self.background_option(), color);
        Ok(())
    }

    /// Validates and wires a background opacity into the option set.
    fn apply_background_opacity(
        &mut self,
        options: &mut OptionSet,
        value: f64,
    ) -> ConvertResult<()> {
        color::validate_opacity(value)?;
        options.set(self.background_opacity_option(), value);
        Ok(())
    }

    /// Wires the format and output destination into the state immediately
    /// before execution. The target is a literal path or the stdout
    /// sentinel `-`.
    fn apply_export_options(&mut self, state: &mut CommandState, target: &str);

    /// Assembles the full command string from the state.
    fn build_command(&self, state: &CommandState) -> String;
}

impl Backend for Box<dyn Backend> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn supported_formats(&self) -> &'static [&'static str] {
        (**self).supported_formats()
    }

    fn width_option(&self) -> &'static str {
        (**self).width_option()
    }

    fn height_option(&self) -> &'static str {
        (**self).height_option()
    }

    fn dpi_option(&self) -> &'static str {
        (**self).dpi_option()
    }

    fn background_option(&self) -> &'static str {
        (**self).background_option()
    }

    fn background_opacity_option(&self) -> &'static str {
        (**self).background_opacity_option()
    }

    fn apply_dpi(&mut self, options: &mut OptionSet, dpi: u32) {
        (**self).apply_dpi(options, dpi);
    }

    fn apply_background(&mut self, options: &mut OptionSet, color: &str) -> ConvertResult<()> {
        (**self).apply_background(options, color)
    }

    fn apply_background_opacity(
        &mut self,
        options: &mut OptionSet,
        value: f64,
    ) -> ConvertResult<()> {
        (**self).apply_background_opacity(options, value)
    }

    fn apply_export_options(&mut self, state: &mut CommandState, target: &str) {
        (**self).apply_export_options(state, target);
    }

    fn build_command(&self, state: &CommandState) -> String {
        (**self).build_command(state)
    }
}
