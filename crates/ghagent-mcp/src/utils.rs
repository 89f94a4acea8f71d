//! Content helpers shared by tools and resources

const TRUNCATION_NOTICE: &str = "\n\n... (truncated)";

const BINARY_EXTENSIONS: &[&str] = &[
    ".exe", ".dll", ".so", ".dylib", ".bin", ".obj", ".o", ".jpg", ".jpeg", ".png", ".gif",
    ".bmp", ".ico", ".svg", ".mp3", ".mp4", ".avi", ".mov", ".wav", ".flac", ".zip", ".tar",
    ".gz", ".rar", ".7z", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".db", ".sqlite", ".sqlite3",
];

pub const MAX_PATH_LEN: usize = 255;

/// Bytes look like text: no NUL and valid UTF-8
pub fn is_text(data: &[u8]) -> bool {
    !data.contains(&0) && std::str::from_utf8(data).is_ok()
}

/// Cut `diff` at a line boundary so the result, notice included, stays
/// within `max_chars` characters
pub fn summarize_diff(diff: &str, max_chars: usize) -> String {
    if diff.chars().count() <= max_chars {
        return diff.to_string();
    }

    let budget = max_chars.saturating_sub(TRUNCATION_NOTICE.chars().count());
    let mut kept: Vec<&str> = Vec::new();
    let mut used = 0;
    for line in diff.split('\n') {
        let len = line.chars().count() + 1;
        if used + len > budget {
            break;
        }
        kept.push(line);
        used += len;
    }

    let mut summary = kept.join("\n");
    summary.push_str(TRUNCATION_NOTICE);
    summary
}

/// Human readable size: `512 B`, `1.5 KB`, `2.0 MB`, `1.0 GB`
pub fn format_file_size(size: u64) -> String {
    const KB: f64 = 1024.0;
    let bytes = size as f64;
    if size < 1024 {
        format!("{} B", size)
    } else if bytes < KB * KB {
        format!("{:.1} KB", bytes / KB)
    } else if bytes < KB * KB * KB {
        format!("{:.1} MB", bytes / (KB * KB))
    } else {
        format!("{:.1} GB", bytes / (KB * KB * KB))
    }
}

/// Binary by extension
pub fn is_binary_file(filename: &str) -> bool {
    let lower = filename.to_lowercase();
    BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Repository-relative path accepted by the write tools
pub fn validate_file_path(path: &str) -> bool {
    !path.is_empty()
        && path.len() <= MAX_PATH_LEN
        && !path.starts_with('/')
        && !path.split('/').any(|segment| segment == "..")
        && !path.chars().any(|c| c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_text() {
        assert!(is_text(b"fn main() {}\n"));
        assert!(is_text("héllo".as_bytes()));
        assert!(!is_text(b"PNG\x00\x01"));
        assert!(!is_text(&[0xff, 0xfe, 0x41]));
    }

    #[test]
    fn test_summarize_diff_short_input_untouched() {
        assert_eq!(summarize_diff("+a\n-b", 1000), "+a\n-b");
    }

    #[test]
    fn test_summarize_diff_truncates_on_lines() {
        let diff = (0..200).map(|i| format!("+line {}", i)).collect::<Vec<_>>().join("\n");
        let summary = summarize_diff(&diff, 100);
        assert!(summary.chars().count() <= 100);
        assert!(summary.ends_with("\n\n... (truncated)"));
        assert!(summary.starts_with("+line 0\n+line 1\n"));
        let body = summary.trim_end_matches(TRUNCATION_NOTICE);
        assert!(body.lines().all(|l| l.starts_with("+line ")));
    }

    #[test]
    fn test_summarize_diff_counts_characters() {
        let diff = "한".repeat(50);
        assert_eq!(summarize_diff(&diff, 50), diff);
        let long = format!("{}\n{}", "가".repeat(10), "나".repeat(100));
        assert_eq!(summarize_diff(&long, 40), format!("{}{}", "가".repeat(10), TRUNCATION_NOTICE));
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2.0 MB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1.0 GB");
    }

    #[test]
    fn test_is_binary_file() {
        assert!(is_binary_file("logo.PNG"));
        assert!(is_binary_file("data.sqlite3"));
        assert!(!is_binary_file("README.md"));
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("docs/guide.md"));
        assert!(validate_file_path("a..b/file.txt"));
        assert!(!validate_file_path(""));
        assert!(!validate_file_path("/etc/passwd"));
        assert!(!validate_file_path("docs/../secret"));
        assert!(!validate_file_path("bad\0name"));
        assert!(!validate_file_path(&"a".repeat(256)));
    }
}
