// ABOUTME: Strips multiplexed stream framing and control bytes from engine output.
// ABOUTME: Payload text, including timestamps, is preserved.

const HEADER_LEN: usize = 8;

/// Remove 8-byte stream frame headers and residual control bytes.
///
/// A header is `[kind, 0, 0, 0, len:u32be]` with kind 0, 1 or 2. When the
/// declared length overruns the buffer the remainder is taken as payload.
pub fn strip_multiplexed(buf: &[u8]) -> String {
    let mut out = Vec::with_capacity(buf.len());
    let mut i = 0;

    while i < buf.len() {
        if let Some(len) = frame_header(&buf[i..]) {
            let start = i + HEADER_LEN;
            let end = start.saturating_add(len).min(buf.len());
            out.extend_from_slice(&buf[start..end]);
            i = end;
        } else {
            out.push(buf[i]);
            i += 1;
        }
    }

    strip_control(&String::from_utf8_lossy(&out))
}

fn frame_header(buf: &[u8]) -> Option<usize> {
    let header = buf.get(..HEADER_LEN)?;
    if header[0] > 2 || header[1..4] != [0, 0, 0] {
        return None;
    }
    let len = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    Some(len as usize)
}

/// Drop control characters other than tab, newline and carriage return.
pub fn strip_control(text: &str) -> String {
    text.chars().filter(|c| !is_stripped(*c)).collect()
}

fn is_stripped(c: char) -> bool {
    matches!(c, '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}')
}
