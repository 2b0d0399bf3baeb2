use anyhow::Result;
use base64::Engine;
use base64::alphabet;
use base64::engine::DecodePaddingMode;
use base64::engine::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;

/// Standard alphabet, padding stripped before decoding, non-zero trailing bits accepted.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone),
);

/// Decode standard base64 with optional `=` padding.
pub fn decode_base64(input: &[u8]) -> Result<Vec<u8>> {
    let end = input
        .iter()
        .rposition(|&b| b != b'=')
        .map_or(0, |i| i + 1);
    LENIENT_BASE64
        .decode(&input[..end])
        .map_err(|e| anyhow::anyhow!("invalid base64: {e}"))
}

/// Interpret backslash escapes in a command line argument.
///
/// `\0 \a \b \f \n \r \t \v` stand for their control characters, `\xHH` for a single byte,
/// and `\uHHHH` and `\UHHHHHHHH` for a code point written as UTF-8. A backslash before any
/// other character stands for that character.
pub fn unescape(input: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        if input[pos] != b'\\' {
            out.push(input[pos]);
            pos += 1;
            continue;
        }
        let Some(&escape) = input.get(pos + 1) else {
            anyhow::bail!("truncated backslash escape at position {pos}");
        };
        let mut consumed = 2;
        match escape {
            b'0' => out.push(0x00),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            b'x' | b'u' | b'U' => {
                let digits = match escape {
                    b'x' => 2,
                    b'u' => 4,
                    _ => 8,
                };
                let Some(code) = parse_hex(&input[pos + 2..], digits) else {
                    anyhow::bail!(
                        "truncated \\{} escape at position {pos}",
                        char::from(escape)
                    );
                };
                if escape == b'x' {
                    // at most two digits
                    out.push(code as u8);
                } else {
                    let c = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
                    let mut buf = [0; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
                consumed += digits;
            }
            other => out.push(other),
        }
        pos += consumed;
    }
    Ok(out)
}

fn parse_hex(input: &[u8], digits: usize) -> Option<u32> {
    let digits = input.get(..digits)?;
    digits.iter().try_fold(0u32, |acc, &b| {
        let nibble = char::from(b).to_digit(16)?;
        Some(acc << 4 | nibble)
    })
}
