//! URI-component escaping for plain text attributes.
//!
//! Text is percent-escaped like a URI component and a handful of characters
//! the store accepts verbatim are put back, which keeps stored values
//! readable: space, `/`, `:` and `$`.

use super::CodecError;

/// Escape sequences restored to their literal character after encoding.
///
/// The first group is the URI-component mark set that `urlencoding` escapes
/// but URI-component encoding leaves alone; the second group is what the
/// store tolerates literally.
const RESTORED: [(&str, &str); 9] = [
    ("%21", "!"),
    ("%27", "'"),
    ("%28", "("),
    ("%29", ")"),
    ("%2A", "*"),
    ("%20", " "),
    ("%2F", "/"),
    ("%3A", ":"),
    ("%24", "$"),
];

/// Escape plain text for storage.
pub fn escape_text(text: &str) -> String {
    // Every '%' in the encoded output starts an escape triple, so a plain
    // substring replace cannot match across triples.
    RESTORED
        .iter()
        .fold(urlencoding::encode(text).into_owned(), |acc, (from, to)| {
            acc.replace(from, to)
        })
}

/// Reverse [`escape_text`].
///
/// Fails on a `%` that is not followed by two hex digits, or when the decoded
/// bytes are not valid UTF-8.
pub fn unescape_text(field: &str, text: &str) -> Result<String, CodecError> {
    let bytes = text.as_bytes();
    for (index, byte) in bytes.iter().enumerate() {
        if *byte == b'%' {
            let valid = bytes
                .get(index + 1..index + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(CodecError::MalformedText {
                    field: field.to_string(),
                    reason: format!("invalid percent escape at byte {}", index),
                });
            }
        }
    }

    urlencoding::decode(text)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| CodecError::MalformedText {
            field: field.to_string(),
            reason: e.to_string(),
        })
}
