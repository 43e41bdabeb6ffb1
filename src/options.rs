//! Ordered CLI option storage.
//!
//! Every provider accumulates its command-line arguments in an [`OptionSet`]
//! before command assembly. Keys are provider-native option names (already
//! translated from the generic width/height/dpi/background concepts), values
//! are tagged variants covering flags, booleans, numbers, and strings.

use std::slice::Iter;

/// A single CLI option value.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// An option with no value; rendered as just the prefixed name.
    Flag,
    /// A boolean; rendered as the literal `true` or `false`.
    Bool(bool),
    /// A numeric value; rendered unquoted, integers without a decimal point.
    Number(f64),
    /// A string value; rendered shell-quoted.
    Text(String),
}

impl OptionValue {
    /// Formats a numeric value the way the CLI expects it: integral values
    /// without a trailing `.0`, everything else in plain decimal notation.
    pub fn format_number(value: f64) -> String {
        if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{value}")
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Number(value)
    }
}

impl From<f32> for OptionValue {
    fn from(value: f32) -> Self {
        OptionValue::Number(f64::from(value))
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Number(f64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Number(f64::from(value))
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Number(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

/// An entry for bulk option application via `with_options`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionEntry {
    /// A bare flag with no value.
    Flag(String),
    /// A keyed option with a value.
    Valued(String, OptionValue),
}

impl From<&str> for OptionEntry {
    fn from(flag: &str) -> Self {
        OptionEntry::Flag(flag.to_string())
    }
}

impl<V: Into<OptionValue>> From<(&str, V)> for OptionEntry {
    fn from((name, value): (&str, V)) -> Self {
        OptionEntry::Valued(name.to_string(), value.into())
    }
}

/// An insertion-ordered mapping from option name to [`OptionValue`].
///
/// Later writes to an existing key overwrite the value in place without
/// changing the key's position; command assembly depends on this ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSet {
    entries: Vec<(String, OptionValue)>,
}

impl OptionSet {
    /// Creates an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an option.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        let name = name.into();
        let value = value.into();

        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Inserts or overwrites a bare flag.
    pub fn set_flag(&mut self, name: impl Into<String>) {
        self.set(name, OptionValue::Flag);
    }

    /// Returns the value stored for the given option name, if any.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Returns true if the option name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Removes an option, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<OptionValue> {
        let index = self.entries.iter().position(|(key, _)| key == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Applies a sequence of entries: bare flags and keyed options.
    pub fn extend<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = OptionEntry>,
    {
        for entry in entries {
            match entry {
                OptionEntry::Flag(name) => self.set_flag(name),
                OptionEntry::Valued(name, value) => self.set(name, value),
            }
        }
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> Iter<'_, (String, OptionValue)> {
        self.entries.iter()
    }

    /// Returns the number of stored options.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no options are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = &'a (String, OptionValue);
    type IntoIter = Iter<'a, (String, OptionValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insertion_order_preserved() {
        let mut options = OptionSet::new();
        options.set("width", 800);
        options.set("height", 600);
        options.set_flag("unlimited");

        let names: Vec<&str> = options.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["width", "height", "unlimited"]);
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut options = OptionSet::new();
        options.set("width", 800);
        options.set("height", 600);
        options.set("width", 1024);

        let names: Vec<&str> = options.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["width", "height"]);
        assert_eq!(options.get("width"), Some(&OptionValue::Number(1024.0)));
    }

    #[test]
    fn test_extend_mixes_flags_and_values() {
        let mut options = OptionSet::new();
        options.extend([
            OptionEntry::from("skip-system-fonts"),
            OptionEntry::from(("dpi", 150)),
            OptionEntry::from(("font-family", "Arial")),
        ]);

        assert_eq!(options.get("skip-system-fonts"), Some(&OptionValue::Flag));
        assert_eq!(options.get("dpi"), Some(&OptionValue::Number(150.0)));
        assert_eq!(
            options.get("font-family"),
            Some(&OptionValue::Text("Arial".to_string()))
        );
    }

    #[test]
    fn test_remove() {
        let mut options = OptionSet::new();
        options.set_flag("keep-aspect-ratio");
        assert_eq!(options.remove("keep-aspect-ratio"), Some(OptionValue::Flag));
        assert_eq!(options.remove("keep-aspect-ratio"), None);
        assert!(options.is_empty());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(OptionValue::format_number(800.0), "800");
        assert_eq!(OptionValue::format_number(2.5), "2.5");
        assert_eq!(OptionValue::format_number(0.5), "0.5");
        assert_eq!(OptionValue::format_number(-3.0), "-3");
    }
}
