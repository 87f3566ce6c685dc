use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::error::DecodeError;

/// As defined for `encodeURIComponent` in ECMA-262:
/// https://tc39.es/ecma262/#sec-encodeuricomponent-uricomponent
///
/// Every code point is percent-encoded except the ASCII alphanumerics
/// and `- _ . ! ~ * ' ( )`.
///
/// NOTE: this set encodes `&`, `=` and `?`, so escaped keys and values
/// can never collide with the pair separator or key/value joiner.
const COMPONENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes `input` for use as a single query string key or value.
///
/// Non-ASCII characters are encoded per UTF-8 byte, so `é` becomes
/// `%C3%A9`. Spaces become `%20`; there is no `+` convention on either
/// side of this crate.
///
/// ```
/// assert_eq!(querystring::escape("a b&c"), "a%20b%26c");
/// ```
pub fn escape(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT_SET).collect()
}

/// Infallible [`escape`] lifted into the signature shared by both
/// [`Config`](crate::Config) hooks.
pub(crate) fn escape_fn(input: &str) -> Result<String, DecodeError> {
    Ok(escape(input))
}

#[inline(always)]
fn char_to_digit(c: u8) -> Option<u32> {
    char::from(c).to_digit(16)
}

/// Replaces every `%XX` escape in `input` with its byte and validates the
/// result as UTF-8. The inverse of [`escape`]; `+` is left untouched.
///
/// Malformed input is rejected rather than passed through: a `%` with
/// fewer than two characters after it is
/// [`IncompleteEscape`](DecodeError::IncompleteEscape), non-hex digits are
/// [`InvalidEscape`](DecodeError::InvalidEscape), and escapes decoding to
/// an invalid UTF-8 sequence are [`InvalidUtf8`](DecodeError::InvalidUtf8).
///
/// ```
/// assert_eq!(querystring::unescape("a%20b%26c").as_deref(), Ok("a b&c"));
/// assert!(querystring::unescape("100%").is_err());
/// ```
pub fn unescape(input: &str) -> Result<String, DecodeError> {
    let bytes = input.as_bytes();
    if !bytes.contains(&b'%') {
        return Ok(input.to_string());
    }

    let mut bytes_iter = bytes.iter().enumerate();

    let mut decoded = Vec::with_capacity(bytes.len());
    let mut last_segment = 0;

    while let Some((idx, &b)) = bytes_iter.next() {
        if b != b'%' {
            continue;
        }

        let Some((_, &hi)) = bytes_iter.next() else {
            return Err(DecodeError::IncompleteEscape(idx));
        };
        let Some((_, &lo)) = bytes_iter.next() else {
            return Err(DecodeError::IncompleteEscape(idx));
        };
        let (Some(hi), Some(lo)) = (char_to_digit(hi), char_to_digit(lo)) else {
            return Err(DecodeError::InvalidEscape(idx));
        };

        decoded.extend_from_slice(&bytes[last_segment..idx]);
        decoded.push(hi as u8 * 0x10 + lo as u8);
        last_segment = idx + 3;
    }

    decoded.extend_from_slice(&bytes[last_segment..]);
    Ok(String::from_utf8(decoded)?)
}
