//! Shell quoting and option rendering.
//!
//! The command string handed to the process runner is a compatibility
//! contract with each external tool: token order, prefixes, separators,
//! and quoting must be bit-exact. This module holds the pieces shared by
//! all provider builders; the per-provider assembly order lives with each
//! builder.

use crate::options::OptionValue;

/// The separator between an option name and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    /// `--width 800`
    Space,
    /// `--export-width=800`
    Equals,
}

impl Separator {
    fn as_str(&self) -> &'static str {
        match self {
            Separator::Space => " ",
            Separator::Equals => "=",
        }
    }
}

/// Quotes a string for POSIX shells.
///
/// The value is wrapped in single quotes with embedded single quotes
/// rewritten as `'\''`. Quoting is applied unconditionally so that the
/// built command is deterministic regardless of content.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Returns the option prefix for a name: `-` for single-character names
/// when the provider uses short options, `--` otherwise.
pub fn option_prefix(name: &str, short_single_dash: bool) -> &'static str {
    if short_single_dash && name.chars().count() == 1 {
        "-"
    } else {
        "--"
    }
}

/// Renders one option according to the provider's prefix and separator
/// conventions.
///
/// A flag emits just the prefixed name; a boolean emits the name plus a
/// literal `true`/`false`; a number emits the unquoted numeric literal;
/// a string emits the value shell-quoted.
pub fn render_option(
    name: &str,
    value: &OptionValue,
    separator: Separator,
    short_single_dash: bool,
) -> String {
    let prefix = option_prefix(name, short_single_dash);
    let sep = separator.as_str();

    match value {
        OptionValue::Flag => format!("{prefix}{name}"),
        OptionValue::Bool(b) => format!("{prefix}{name}{sep}{b}"),
        OptionValue::Number(n) => {
            format!("{prefix}{name}{sep}{}", OptionValue::format_number(*n))
        }
        OptionValue::Text(s) => format!("{prefix}{name}{sep}{}", shell_quote(s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_shell_quote_plain() {
        assert_eq!(shell_quote("input.svg"), "'input.svg'");
    }

    #[test]
    fn test_shell_quote_embedded_quote() {
        assert_eq!(shell_quote("it's.svg"), r"'it'\''s.svg'");
    }

    #[test]
    fn test_render_flag() {
        assert_eq!(
            render_option("unlimited", &OptionValue::Flag, Separator::Equals, false),
            "--unlimited"
        );
        assert_eq!(
            render_option("c", &OptionValue::Flag, Separator::Space, true),
            "-c"
        );
    }

    #[test]
    fn test_render_number_unquoted() {
        assert_eq!(
            render_option("width", &OptionValue::Number(800.0), Separator::Space, true),
            "--width 800"
        );
        assert_eq!(
            render_option(
                "export-width",
                &OptionValue::Number(800.0),
                Separator::Equals,
                false
            ),
            "--export-width=800"
        );
        assert_eq!(
            render_option("zoom", &OptionValue::Number(2.5), Separator::Equals, false),
            "--zoom=2.5"
        );
    }

    #[test]
    fn test_render_bool_literal() {
        assert_eq!(
            render_option("foo", &OptionValue::Bool(true), Separator::Equals, false),
            "--foo=true"
        );
        assert_eq!(
            render_option("foo", &OptionValue::Bool(false), Separator::Space, false),
            "--foo false"
        );
    }

    #[test]
    fn test_render_text_quoted() {
        assert_eq!(
            render_option(
                "font-family",
                &OptionValue::Text("DejaVu Sans".to_string()),
                Separator::Space,
                true
            ),
            "--font-family 'DejaVu Sans'"
        );
    }

    #[test]
    fn test_single_char_with_value_uses_short_prefix() {
        assert_eq!(
            render_option("d", &OptionValue::Number(150.0), Separator::Space, true),
            "-d 150"
        );
    }
}
