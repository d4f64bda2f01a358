//! `pattern` constraint.
//!
//! Schema patterns are written in ECMA 262 syntax. The character-class
//! escapes `\d`, `\D`, `\w` and `\W` are ASCII-only in ECMA 262 but
//! Unicode-aware in the `regex` crate, so they are rewritten to explicit
//! ASCII classes before compilation, and `\b` inside a character class is
//! the backspace character. A pattern must match the whole value.

use std::fmt;

use regex::Regex;

/// A compiled `pattern` keyword.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a schema pattern.
    ///
    /// # Errors
    ///
    /// Returns the `regex` diagnostic when the translated pattern does not
    /// compile (for example, look-around or back-references).
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let translated = translate_escapes(source);
        let regex = Regex::new(&format!("^(?:{translated})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written in the schema.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether `value` matches in its entirety.
    pub fn is_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

fn translate_escapes(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 8);
    let mut in_class = false;
    let mut chars = source.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            match c {
                '[' => in_class = true,
                ']' => in_class = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('d') => out.push_str("[0-9]"),
            Some('D') => out.push_str("[^0-9]"),
            Some('w') => out.push_str("[0-9A-Za-z_]"),
            Some('W') => out.push_str("[^0-9A-Za-z_]"),
            // Inside a class, ECMA `\b` is backspace rather than a word boundary.
            Some('b') if in_class => out.push_str("\\x08"),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}
