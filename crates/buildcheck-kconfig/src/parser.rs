//! Line classifier for the `.config` format.
//!
//! Recognized shapes:
//! - `CONFIG_<NAME>=<value>`
//! - `# CONFIG_<NAME> is not set`
//!
//! Everything else (blank lines, other comments, garbage) is ignored.

use crate::value::KconfigValue;

const PREFIX: &str = "CONFIG_";
const NOT_SET_SUFFIX: &str = " is not set";

/// One recognized line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// `CONFIG_<NAME>=<value>`
    Set(&'a str, KconfigValue),
    /// `# CONFIG_<NAME> is not set`
    NotSet(&'a str),
}

/// Classify a single line. Returns `None` for lines to skip.
pub fn parse_line(line: &str) -> Option<Line<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(comment) = line.strip_prefix('#') {
        let name = comment
            .trim_start()
            .strip_prefix(PREFIX)?
            .strip_suffix(NOT_SET_SUFFIX)?;
        return valid_name(name).then_some(Line::NotSet(name));
    }

    let (lhs, rhs) = line.trim_start().split_once('=')?;
    let name = lhs.strip_prefix(PREFIX)?;
    if !valid_name(name) {
        return None;
    }
    let value = KconfigValue::parse(rhs.trim_end())?;
    Some(Line::Set(name, value))
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_line() {
        assert_eq!(
            parse_line("CONFIG_EFI_STUB=y"),
            Some(Line::Set("EFI_STUB", KconfigValue::Bool(true)))
        );
    }

    #[test]
    fn test_not_set_line() {
        assert_eq!(
            parse_line("# CONFIG_LOCK_DOWN_IN_EFI_SECURE_BOOT is not set"),
            Some(Line::NotSet("LOCK_DOWN_IN_EFI_SECURE_BOOT"))
        );
    }

    #[test]
    fn test_crlf_is_tolerated() {
        assert_eq!(
            parse_line("CONFIG_A=n\r\n"),
            Some(Line::Set("A", KconfigValue::Bool(false)))
        );
    }

    #[test]
    fn test_skipped_lines() {
        for line in [
            "",
            "   ",
            "#",
            "# Automatically generated file; DO NOT EDIT.",
            "# CONFIG_FOO is enabled",
            "CONFIG_=y",
            "CONFIG_FOO",
            "CONFIG_FOO=",
            "CONFIG_BAD NAME=y",
            "FOO=y",
            "CONFIG_STR=\"unterminated",
        ] {
            assert_eq!(parse_line(line), None, "line {:?} should be skipped", line);
        }
    }
}
