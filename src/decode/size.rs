// ABOUTME: Human-readable size and percentage parsing for CLI stats output.
// ABOUTME: Units are 1024-based and case-insensitive.

/// Parse a size like `1.5GiB`, `10kB` or `512B` into bytes.
///
/// Unknown units count as bytes. Input without a leading number yields 0.
pub fn parse_size(input: &str) -> u64 {
    let input = input.trim();
    let split = input
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(input.len());
    let (number, unit) = input.split_at(split);

    let Ok(value) = number.parse::<f64>() else {
        return 0;
    };

    let bytes = value * multiplier(unit.trim()) as f64;
    if bytes.is_finite() && bytes > 0.0 {
        bytes.round() as u64
    } else {
        0
    }
}

fn multiplier(unit: &str) -> u64 {
    match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        _ => 1,
    }
}

/// Parse a `used / total` pair such as `12MiB / 1.9GiB`.
pub fn parse_size_pair(input: &str) -> (u64, u64) {
    match input.split_once('/') {
        Some((left, right)) => (parse_size(left), parse_size(right)),
        None => (parse_size(input), 0),
    }
}

/// Parse a percentage such as `12.5%`; anything unparseable is 0.
pub fn parse_percent(input: &str) -> f64 {
    input
        .trim()
        .trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_units() {
        assert_eq!(parse_size("512B"), 512);
        assert_eq!(parse_size("1K"), 1024);
        assert_eq!(parse_size("1kB"), 1024);
        assert_eq!(parse_size("1.5GiB"), 1_610_612_736);
        assert_eq!(parse_size("2TB"), 2 * (1 << 40));
        assert_eq!(parse_size("3 MiB"), 3 * (1 << 20));
    }

    #[test]
    fn fallbacks() {
        assert_eq!(parse_size("42"), 42);
        assert_eq!(parse_size("42parsecs"), 42);
        assert_eq!(parse_size("--"), 0);
        assert_eq!(parse_size(""), 0);
        assert_eq!(parse_size("0.4B"), 0);
        assert_eq!(parse_size("0.6B"), 1);
    }

    #[test]
    fn pairs_and_percentages() {
        assert_eq!(parse_size_pair("1KiB / 2KiB"), (1024, 2048));
        assert_eq!(parse_size_pair("7B"), (7, 0));
        assert_eq!(parse_percent("12.50%"), 12.5);
        assert_eq!(parse_percent("--"), 0.0);
    }
}
