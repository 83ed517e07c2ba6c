//! Post-processing for double-encoded text.
//!
//! Some backends JSON-encode text twice, so after parsing the frame the
//! string still contains literal `\uXXXX` sequences. These are turned into
//! the characters they name before the text reaches a consumer.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static UNICODE_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\\u(d[89ab][0-9a-f]{2})\\u(d[c-f][0-9a-f]{2})|\\u([0-9a-f]{4})")
        .expect("unicode escape pattern is valid")
});

/// Replace literal `\uXXXX` escapes with the characters they encode.
///
/// A high/low surrogate pair written as two escapes becomes one character.
/// A lone surrogate has no character and is left as written.
pub fn unescape_unicode(text: &str) -> String {
    if !text.contains("\\u") && !text.contains("\\U") {
        return text.to_string();
    }

    UNICODE_ESCAPE
        .replace_all(text, |caps: &Captures| {
            let decoded = match (caps.get(1), caps.get(2), caps.get(3)) {
                (Some(high), Some(low), _) => decode_pair(high.as_str(), low.as_str()),
                (_, _, Some(unit)) => u32::from_str_radix(unit.as_str(), 16)
                    .ok()
                    .and_then(char::from_u32),
                _ => None,
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

fn decode_pair(high: &str, low: &str) -> Option<char> {
    let high = u32::from_str_radix(high, 16).ok()?;
    let low = u32::from_str_radix(low, 16).ok()?;
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}
