/// Format a byte count for attachment labels: `512 B`, `2.4 KB`, `13 MB`.
///
/// Units are decimal (1 KB = 1000 bytes). Values under 10 of a unit keep one decimal; trailing
/// zeros are dropped.
pub fn format_size_compact(bytes: u64) -> String {
    if bytes < 1_000 {
        return format!("{bytes} B");
    }

    let value_f64 = bytes as f64;
    let (scaled, suffix) = if bytes >= 1_000_000_000 {
        (value_f64 / 1_000_000_000.0, "GB")
    } else if bytes >= 1_000_000 {
        (value_f64 / 1_000_000.0, "MB")
    } else {
        (value_f64 / 1_000.0, "KB")
    };

    let decimals = if scaled < 10.0 { 1 } else { 0 };

    let mut formatted = format!("{scaled:.decimals$}");
    if formatted.contains('.') {
        while formatted.ends_with('0') {
            formatted.pop();
        }
        if formatted.ends_with('.') {
            formatted.pop();
        }
    }

    format!("{formatted} {suffix}")
}
