const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

pub fn format_size(size: u64) -> String {
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", size, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// `4.2 MB → 512.0 KB (-88%)`
pub fn compression_summary(original: u64, compressed: u64) -> String {
    if original == 0 {
        return format!("{} → {}", format_size(original), format_size(compressed));
    }
    let change = (compressed as f64 / original as f64 - 1.0) * 100.0;
    format!(
        "{} → {} ({:+.0}%)",
        format_size(original),
        format_size(compressed),
        change
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_sizes() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn summarizes_compression() {
        assert_eq!(
            compression_summary(4 * 1024 * 1024, 512 * 1024),
            "4.0 MB → 512.0 KB (-88%)"
        );
        assert_eq!(compression_summary(0, 10), "0 B → 10 B");
    }
}
