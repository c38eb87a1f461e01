//! Text-mode line-ending transforms.
//!
//! Text entries are stored with CRLF line endings; `read` in text mode
//! hands back plain LF. The two functions are inverses for LF-normalized
//! input.

/// Expand lone LF bytes to CRLF (the on-disk text form).
///
/// Existing CRLF sequences are left alone.
pub fn to_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 8);
    let mut prev = 0u8;
    for &b in data {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}

/// Collapse CRLF sequences back to LF (the in-memory text form).
pub fn from_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut i = 0;
    while i < data.len() {
        if data[i] == b'\r' && data.get(i + 1) == Some(&b'\n') {
            i += 1;
            continue;
        }
        out.push(data[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand() {
        assert_eq!(to_crlf(b"a\nb\n"), b"a\r\nb\r\n");
        assert_eq!(to_crlf(b"no newline"), b"no newline");
        assert_eq!(to_crlf(b""), b"");
    }

    #[test]
    fn test_expand_preserves_existing_crlf() {
        assert_eq!(to_crlf(b"a\r\nb\n"), b"a\r\nb\r\n");
    }

    #[test]
    fn test_collapse() {
        assert_eq!(from_crlf(b"a\r\nb\r\n"), b"a\nb\n");
        // A CR not followed by LF is payload, not a line ending.
        assert_eq!(from_crlf(b"a\rb"), b"a\rb");
    }

    #[test]
    fn test_roundtrip() {
        let text = b"line one\nline two\n\nlast";
        assert_eq!(from_crlf(&to_crlf(text)), text);
    }
}
