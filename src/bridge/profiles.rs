// ABOUTME: Decodes the launcher's profile listing.
// ABOUTME: `wsl.exe -l -q` writes UTF-16LE, other launchers write UTF-8.

/// Decode a profile listing into trimmed, non-empty names.
pub fn decode_profile_list(raw: &[u8]) -> Vec<String> {
    let text = if looks_utf16le(raw) {
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(raw).into_owned()
    };

    text.lines()
        .map(|l| l.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}' || c == '\0'))
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

fn looks_utf16le(raw: &[u8]) -> bool {
    if raw.starts_with(&[0xFF, 0xFE]) {
        return true;
    }
    raw.len() >= 2 && raw.iter().skip(1).step_by(2).filter(|b| **b == 0).count() * 2 >= raw.len() / 2
}
