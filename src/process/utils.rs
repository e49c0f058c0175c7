/// Parse a count cell. Blank, non-integer, negative or beyond-`i64` text is `None`.
pub fn parse_count(raw: &str) -> Option<u64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|v| u64::try_from(v).ok())
}

/// Parse a ratio cell. Blank, non-numeric, negative or non-finite text is `None`.
pub fn parse_ratio(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Strip the `\r` left behind when CRLF text is split on `\n`.
pub fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}
