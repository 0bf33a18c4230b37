//! Intake policy constants.
//!
//! These values are fixed at compile time and shared read-only by every
//! submission, so no synchronization is needed to consult them.

/// Maximum accepted upload size in bytes (300 MiB).
pub const MAX_FILE_SIZE: u64 = 300 * 1024 * 1024;

/// Maximum accepted upload size in whole megabytes, for messages.
pub const MAX_FILE_SIZE_MB: u64 = MAX_FILE_SIZE / BYTES_PER_MB;

/// Container formats accepted for analysis, lowercase.
pub const SUPPORTED_FORMATS: [&str; 4] = ["mp4", "avi", "mov", "webm"];

const BYTES_PER_MB: u64 = 1024 * 1024;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Supported formats uppercased and comma separated (`MP4, AVI, MOV, WEBM`).
pub fn supported_formats_label() -> String {
    SUPPORTED_FORMATS
        .iter()
        .map(|f| f.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check whether an extension (any case) is in [`SUPPORTED_FORMATS`].
pub fn is_supported_format(extension: &str) -> bool {
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_FORMATS.contains(&extension.as_str())
}

/// Convert a byte count to megabytes.
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB as f64
}

/// Human readable file size using base-1024 units, e.g. `1.5 KB` or `0 Bytes`.
///
/// At most two decimals are shown and trailing zeros are dropped. Sizes
/// beyond the gigabyte range are still expressed in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, SIZE_UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_formats_label() {
        assert_eq!(supported_formats_label(), "MP4, AVI, MOV, WEBM");
    }

    #[test]
    fn test_is_supported_format_ignores_case() {
        assert!(is_supported_format("MP4"));
        assert!(is_supported_format("WebM"));
        assert!(!is_supported_format("mkv"));
        assert!(!is_supported_format(""));
    }

    #[test]
    fn test_max_file_size() {
        assert_eq!(MAX_FILE_SIZE, 314_572_800);
        assert_eq!(MAX_FILE_SIZE_MB, 300);
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(MAX_FILE_SIZE), "300 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }
}
