//! Path segment encoding for resource ids

/// Percent-encode one URL path segment
///
/// Keeps unreserved characters (`A-Z`, `a-z`, `0-9`, `-`, `_`, `.`, `~`) and
/// encodes every other byte, so application numbers such as `FW24A/0123`
/// stay a single segment.
pub(crate) fn encode_segment(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for &b in input.as_bytes() {
        match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(char::from(b));
            },
            _ => result.push_str(&format!("%{b:02X}")),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slash_is_encoded() {
        assert_eq!(encode_segment("FW24A/0123"), "FW24A%2F0123");
    }

    #[test]
    fn space_is_percent_encoded() {
        assert_eq!(encode_segment("a b"), "a%20b");
    }

    #[test]
    fn unreserved_chars_pass_through() {
        assert_eq!(encode_segment("abc-123_x.y~z"), "abc-123_x.y~z");
    }

    #[test]
    fn multibyte_is_encoded_per_byte() {
        assert_eq!(encode_segment("Dún"), "D%C3%BAn");
    }
}
