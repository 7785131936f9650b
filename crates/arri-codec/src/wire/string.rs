//! Deterministic JSON string escaping

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append `value` as a quoted JSON string.
///
/// `"` and `\` are escaped, the short escapes `\b \f \n \r \t` are used where
/// they exist and every other byte below 0x20 becomes `\u00xx`. Everything
/// else, including non-ASCII text, is copied through unchanged.
pub fn append_normalized_string(buf: &mut Vec<u8>, value: &str) {
    buf.reserve(value.len() + 2);
    buf.push(b'"');
    append_escaped(buf, value.as_bytes());
    buf.push(b'"');
}

/// Append raw bytes as a quoted JSON string, replacing invalid UTF-8
/// sequences with U+FFFD
pub fn append_normalized_bytes(buf: &mut Vec<u8>, value: &[u8]) {
    buf.reserve(value.len() + 2);
    buf.push(b'"');
    for chunk in value.utf8_chunks() {
        append_escaped(buf, chunk.valid().as_bytes());
        if !chunk.invalid().is_empty() {
            buf.extend_from_slice(char::REPLACEMENT_CHARACTER.encode_utf8(&mut [0; 4]).as_bytes());
        }
    }
    buf.push(b'"');
}

fn append_escaped(buf: &mut Vec<u8>, bytes: &[u8]) {
    let mut start = 0;
    for (i, &byte) in bytes.iter().enumerate() {
        let escape: &[u8] = match byte {
            b'"' => b"\\\"",
            b'\\' => b"\\\\",
            0x08 => b"\\b",
            0x0c => b"\\f",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            0x00..=0x1f => {
                buf.extend_from_slice(&bytes[start..i]);
                buf.extend_from_slice(b"\\u00");
                buf.push(HEX[(byte >> 4) as usize]);
                buf.push(HEX[(byte & 0x0f) as usize]);
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        buf.extend_from_slice(&bytes[start..i]);
        buf.extend_from_slice(escape);
        start = i + 1;
    }
    buf.extend_from_slice(&bytes[start..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(value: &str) -> String {
        let mut buf = Vec::new();
        append_normalized_string(&mut buf, value);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_plain_and_unicode_pass_through() {
        assert_eq!(normalized("hello"), r#""hello""#);
        assert_eq!(normalized("héllo 🌍"), "\"héllo 🌍\"");
        assert_eq!(normalized(""), r#""""#);
    }

    #[test]
    fn test_short_escapes() {
        assert_eq!(normalized("a\"b\\c"), r#""a\"b\\c""#);
        assert_eq!(normalized("\u{8}\u{c}\n\r\t"), r#""\b\f\n\r\t""#);
    }

    #[test]
    fn test_control_characters() {
        assert_eq!(normalized("\u{0}\u{1f}x\u{1}"), r#""\u0000\u001fx\u0001""#);
        // DEL is not a control character for JSON
        assert_eq!(normalized("\u{7f}"), "\"\u{7f}\"");
    }

    #[test]
    fn test_output_parses_back() {
        let input = "line\nbreak \"quoted\" \u{2} tab\t end";
        let parsed: String = serde_json::from_str(&normalized(input)).unwrap();
        assert_eq!(parsed, input);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut buf = Vec::new();
        append_normalized_bytes(&mut buf, b"ok\xff\xfeend\n");
        assert_eq!(String::from_utf8(buf).unwrap(), "\"ok\u{fffd}\u{fffd}end\\n\"");
    }
}
