use std::borrow::Cow;
use std::io::Write;

use anyhow::Result;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::*;

/// Output columns after which a truncated value is cut off.
pub const TRUNCATE_COLUMNS: usize = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrettyOptions {
    /// Wrap the output in double quotes and escape `"`.
    pub quoting: bool,
    pub truncate: bool,
    /// Pretty-print values that parse as JSON.
    pub parse_json: bool,
}

/// Writes keys and values to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Printer {
    Raw,
    Base64,
    Pretty(PrettyOptions),
}

impl Printer {
    pub fn new(format: Encoding, options: PrettyOptions) -> Self {
        if format.base64 {
            Printer::Base64
        } else if format.raw {
            Printer::Raw
        } else {
            Printer::Pretty(options)
        }
    }

    pub fn write<W: Write>(&self, out: &mut W, bytes: &[u8]) -> Result<()> {
        match self {
            Printer::Raw => out.write_all(bytes)?,
            Printer::Base64 => out.write_all(STANDARD.encode(bytes).as_bytes())?,
            Printer::Pretty(options) => out.write_all(pretty(bytes, *options).as_bytes())?,
        }
        Ok(())
    }
}

/// Render `bytes` for display. Invalid UTF-8 and non-printable characters are escaped the way
/// [`unescape`] reads them back.
pub fn pretty(bytes: &[u8], options: PrettyOptions) -> String {
    let mut bytes = Cow::Borrowed(bytes);
    if options.parse_json {
        while let Ok(serde_json::Value::String(inner)) = serde_json::from_slice(&bytes) {
            bytes = Cow::Owned(inner.into_bytes());
        }
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&bytes) {
            if let Ok(json) = serde_json::to_string_pretty(&value) {
                return json;
            }
        }
    }

    let mut out = String::with_capacity(bytes.len() + 2);
    if options.quoting {
        out.push('"');
    }
    let mut columns = 0;
    let over = |columns: usize| options.truncate && columns > TRUNCATE_COLUMNS;
    'chunks: for chunk in bytes.utf8_chunks() {
        for c in chunk.valid().chars() {
            if over(columns) {
                out.push_str("...");
                break 'chunks;
            }
            columns += escape_char(&mut out, c, options.quoting);
        }
        for byte in chunk.invalid() {
            if over(columns) {
                out.push_str("...");
                break 'chunks;
            }
            out.push_str(&format!("\\x{byte:02x}"));
            columns += 4;
        }
    }
    if options.quoting {
        out.push('"');
    }
    out
}

/// Append `c`, escaped if needed, and return the columns it takes.
fn escape_char(out: &mut String, c: char, quoting: bool) -> usize {
    let escaped = match c {
        '\0' => "\\0",
        '"' if quoting => "\\\"",
        '\\' => "\\\\",
        '\u{07}' => "\\a",
        '\u{08}' => "\\b",
        '\u{0c}' => "\\f",
        '\n' => "\\n",
        '\r' => "\\r",
        '\t' => "\\t",
        '\u{0b}' => "\\v",
        c if is_printable(c) => {
            out.push(c);
            return 1;
        }
        c if c.is_ascii() => {
            out.push_str(&format!("\\x{:02x}", u32::from(c)));
            return 4;
        }
        c if u32::from(c) <= 0xffff => {
            out.push_str(&format!("\\u{:04x}", u32::from(c)));
            return 6;
        }
        c => {
            out.push_str(&format!("\\U{:08x}", u32::from(c)));
            return 8;
        }
    };
    out.push_str(escaped);
    2
}

/// Letters, marks, numbers, punctuation, symbols and the ASCII space.
fn is_printable(c: char) -> bool {
    if c == ' ' {
        return true;
    }
    !(c.is_control() || c.is_whitespace() || is_format_or_private(c))
}

fn is_format_or_private(c: char) -> bool {
    matches!(
        c,
        '\u{ad}'
            | '\u{600}'..='\u{605}'
            | '\u{61c}'
            | '\u{6dd}'
            | '\u{70f}'
            | '\u{180e}'
            | '\u{200b}'..='\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2060}'..='\u{2064}'
            | '\u{2066}'..='\u{206f}'
            | '\u{e000}'..='\u{f8ff}'
            | '\u{feff}'
            | '\u{fff9}'..='\u{fffb}'
            | '\u{fffe}'..='\u{ffff}'
            | '\u{f0000}'..='\u{10ffff}'
    )
}
