//! Symbol values as they appear in a kernel `.config`.

use std::fmt;

/// Value assigned to a configuration symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KconfigValue {
    /// `y` or `n`
    Bool(bool),
    /// `m` (tristate built as a module)
    Module,
    /// Quoted string, stored with its surrounding quote characters
    Str(String),
    /// Any other unquoted value (numbers, hex literals)
    Raw(String),
}

impl KconfigValue {
    /// Parse the right-hand side of a `CONFIG_<NAME>=<value>` line.
    ///
    /// Returns `None` for an empty right-hand side or an unterminated string.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "" => None,
            "y" => Some(KconfigValue::Bool(true)),
            "n" => Some(KconfigValue::Bool(false)),
            "m" => Some(KconfigValue::Module),
            _ if raw.starts_with('"') => {
                if raw.len() >= 2 && raw.ends_with('"') {
                    Some(KconfigValue::Str(raw.to_string()))
                } else {
                    None
                }
            }
            _ => Some(KconfigValue::Raw(raw.to_string())),
        }
    }

    /// True only for `y`.
    pub fn is_enabled(&self) -> bool {
        matches!(self, KconfigValue::Bool(true))
    }
}

impl fmt::Display for KconfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KconfigValue::Bool(true) => f.write_str("y"),
            KconfigValue::Bool(false) => f.write_str("n"),
            KconfigValue::Module => f.write_str("m"),
            KconfigValue::Str(s) | KconfigValue::Raw(s) => f.write_str(s),
        }
    }
}

impl From<bool> for KconfigValue {
    fn from(value: bool) -> Self {
        KconfigValue::Bool(value)
    }
}

impl From<&str> for KconfigValue {
    /// Builds a string value from its quoted literal, e.g. `"\"\""`.
    fn from(literal: &str) -> Self {
        KconfigValue::Str(literal.to_string())
    }
}
