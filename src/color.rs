//! Color and opacity validation helpers.
//!
//! Providers accept HEX (`#ff007f`, `fff`) and RGB (`rgb(255,0,128)`)
//! color strings, plus RGBA (`rgba(255,0,128,0.5)`) where the underlying
//! tool supports alpha. Whitespace inside the parens is ignored and the
//! `rgb`/`rgba` keyword is matched case-insensitively.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ConvertError, ConvertResult};
use crate::options::OptionValue;

/// Accepted syntaxes for providers without alpha support.
pub const OPAQUE_FORMATS: &str = "HEX (#ff007f) and RGB (rgb(255,0,128))";

/// Accepted syntaxes for providers with alpha support.
pub const ALPHA_FORMATS: &str = "HEX (#ff007f), RGB (rgb(255,0,128)), and RGBA (rgba(255,0,128,0.5))";

static HEX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#?([0-9a-fA-F]{6}|[0-9a-fA-F]{3})$").unwrap());

static RGB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^rgb\(\d{1,3},\d{1,3},\d{1,3}\)$").unwrap());

static RGBA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba\(\d{1,3},\d{1,3},\d{1,3},(0(\.\d+)?|1(\.0+)?)\)$").unwrap()
});

/// Lower-cases the keyword and strips inner whitespace before matching.
fn normalize(color: &str) -> String {
    color.to_lowercase().replace(' ', "")
}

/// Returns true for a 3- or 6-digit hex color, with or without leading `#`.
pub fn is_hex_color(color: &str) -> bool {
    HEX_RE.is_match(color)
}

/// Returns true for an `rgb(r,g,b)` color with 1-3 digit components.
pub fn is_rgb_color(color: &str) -> bool {
    RGB_RE.is_match(&normalize(color))
}

/// Returns true for an `rgba(r,g,b,a)` color with `a` in [0,1].
pub fn is_rgba_color(color: &str) -> bool {
    RGBA_RE.is_match(&normalize(color))
}

/// Validates a color for providers without alpha support (HEX or RGB).
pub fn validate_color(color: &str) -> ConvertResult<()> {
    if is_hex_color(color) || is_rgb_color(color) {
        return Ok(());
    }

    Err(ConvertError::InvalidColor {
        color: color.to_string(),
        formats: OPAQUE_FORMATS,
    })
}

/// Validates a color for providers with alpha support (HEX, RGB, or RGBA).
pub fn validate_color_with_alpha(color: &str) -> ConvertResult<()> {
    if is_hex_color(color) || is_rgb_color(color) || is_rgba_color(color) {
        return Ok(());
    }

    Err(ConvertError::InvalidColor {
        color: color.to_string(),
        formats: ALPHA_FORMATS,
    })
}

/// Validates that an opacity lies in the closed interval [0.0, 1.0].
pub fn validate_opacity(value: f64) -> ConvertResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConvertError::InvalidOpacity { value })
    }
}

/// Combines a HEX or RGB color with an opacity into an `rgba(...)` string.
///
/// 3-digit hex shorthand is expanded to 6 digits before the channel bytes
/// are parsed. An `rgb(...)` input has the opacity spliced in as a fourth
/// component. The caller is expected to have validated both inputs.
pub fn combine_with_opacity(color: &str, opacity: f64) -> String {
    let alpha = OptionValue::format_number(opacity);

    if is_hex_color(color) {
        let hex = color.trim_start_matches('#');
        let expanded = if hex.len() == 3 {
            let bytes = hex.as_bytes();
            String::from_utf8(vec![
                bytes[0], bytes[0], bytes[1], bytes[1], bytes[2], bytes[2],
            ])
            .unwrap_or_else(|_| hex.to_string())
        } else {
            hex.to_string()
        };

        let r = u8::from_str_radix(&expanded[0..2], 16).unwrap_or(0);
        let g = u8::from_str_radix(&expanded[2..4], 16).unwrap_or(0);
        let b = u8::from_str_radix(&expanded[4..6], 16).unwrap_or(0);

        return format!("rgba({r},{g},{b},{alpha})");
    }

    // rgb(r,g,b) -> rgba(r,g,b,opacity)
    let normalized = normalize(color);
    let inner = normalized
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(&normalized);

    format!("rgba({inner},{alpha})")
}
