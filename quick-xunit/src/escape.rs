// Copyright (c) The nextest Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escaping of free-form text before it is embedded in a report.
//!
//! Escaping happens in two phases:
//!
//! 1. A handful of common characters (backslash, quotes and the usual control characters) are
//!    replaced with their two-character backslash mnemonics. The backslash is handled first, so
//!    the backslashes introduced by this phase are never escaped again.
//! 2. Whatever is left is scanned one UTF-16 code unit at a time. Remaining control characters
//!    become `\xNN`, and lone surrogates or the non-characters `U+FFFE` and `U+FFFF` become
//!    `\xNNNN`. Valid surrogate pairs are copied through unchanged.
//!
//! The result never contains a raw control character or an invalid code unit.

use std::fmt::Write as _;

/// Escapes `text` for embedding in a report.
///
/// # Examples
///
/// ```
/// assert_eq!(quick_xunit::escape("a\tb\"c\u{1}"), "a\\tb\\\"c\\x01");
/// ```
pub fn escape(text: &str) -> String {
    escape_units(text.chars().map(Ok), text.len())
}

/// Escapes optional text. Absent text escapes to the empty string.
pub fn escape_opt(text: Option<&str>) -> String {
    text.map(escape).unwrap_or_default()
}

/// Escapes a sequence of UTF-16 code units, which may contain unpaired surrogates.
///
/// This is the entry point for text that did not originate as a Rust string, such as output
/// captured from a process that produces UTF-16.
pub fn escape_utf16(units: &[u16]) -> String {
    let len_hint = units.len();
    let units = char::decode_utf16(units.iter().copied())
        .map(|res| res.map_err(|err| err.unpaired_surrogate()));
    escape_units(units, len_hint)
}

fn escape_units(units: impl Iterator<Item = Result<char, u16>>, len_hint: usize) -> String {
    let mut out = String::with_capacity(len_hint);
    for unit in units {
        match unit {
            Ok(c) => match named_escape(c) {
                Some(mnemonic) => out.push_str(mnemonic),
                None => push_scanned(c, &mut out),
            },
            Err(surrogate) => push_wide_escape(surrogate, &mut out),
        }
    }
    out
}

// Phase 1.
fn named_escape(c: char) -> Option<&'static str> {
    let mnemonic = match c {
        '\\' => "\\\\",
        '\r' => "\\r",
        '\n' => "\\n",
        '\t' => "\\t",
        '\0' => "\\0",
        '\u{7}' => "\\a",
        '\u{8}' => "\\b",
        '\u{b}' => "\\v",
        '"' => "\\\"",
        '\u{c}' => "\\f",
        _ => return None,
    };
    Some(mnemonic)
}

// Phase 2. Surrogate pairs have already been combined into a single char by this point.
fn push_scanned(c: char, out: &mut String) {
    match c {
        '\0'..='\u{1f}' => {
            // Writing to a String never fails.
            let _ = write!(out, "\\x{:02x}", u32::from(c));
        }
        '\u{fffe}' | '\u{ffff}' => push_wide_escape(c as u16, out),
        _ => out.push(c),
    }
}

fn push_wide_escape(unit: u16, out: &mut String) {
    let _ = write!(out, "\\x{unit:04x}");
}
