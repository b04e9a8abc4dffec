//! Wire-level pieces of the submission protocol: control-line formatting,
//! filename normalization and the error taxonomy.
//!
//! Every control line is ASCII and `\n`-terminated; the payload bytes that
//! follow a `file` line are binary, exactly the announced size, and carry no
//! terminator.

use thiserror::Error;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum MossError {
    /// Rejected locally before any network use: unknown language tag,
    /// limit not greater than 1, malformed wildcard pattern.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A file path that is missing or unreadable.
    #[error("can't find or read the file ({0})")]
    FileNotFound(String),
    /// TCP connect failure, or a transport error outside raw-entry streaming.
    #[error("socket error: {0}")]
    Connection(#[from] std::io::Error),
    /// The server answered `no` to the language handshake. Distinct from the
    /// local allow-list check: this one cost a live round trip.
    #[error("server does not support language '{0}'")]
    UnsupportedLanguage(String),
    /// The handshake response was neither `yes` nor `no`.
    #[error("server is not responding")]
    ServerUnresponsive,
}

/// Rewrite a submission name so it stays a single token on the control line:
/// every space and path separator becomes `_`.
pub fn normalize_name(name: &str) -> String {
    name.replace([' ', '/'], "_")
}

/// Build a `file` control line (without the trailing `\n`). The name is
/// normalized here so callers can't leak a multi-token name onto the wire.
pub fn file_line(id: usize, lang: &str, size: usize, name: &str) -> String {
    format!("file {} {} {} {}", id, lang, size, normalize_name(name))
}

/// Returns true if a query response line is a result URL.
pub fn is_result_url(line: &str) -> bool {
    line.starts_with("http:")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_replaces_spaces_and_separators() {
        assert_eq!(normalize_name("dir one/a b.cc"), "dir_one_a_b.cc");
        assert_eq!(normalize_name("/abs/path/file.c"), "_abs_path_file.c");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_name("some dir/file name.py");
        assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn normalize_leaves_clean_names_unchanged() {
        assert_eq!(normalize_name("main.cc"), "main.cc");
        assert_eq!(normalize_name("a_b.java"), "a_b.java");
    }

    #[test]
    fn file_line_format() {
        assert_eq!(file_line(0, "c", 1024, "base.c"), "file 0 c 1024 base.c");
        assert_eq!(
            file_line(3, "cc", 150, "hw1/a b.cc"),
            "file 3 cc 150 hw1_a_b.cc"
        );
    }

    #[test]
    fn result_url_detection() {
        assert!(is_result_url("http://moss.stanford.edu/results/1\n"));
        assert!(!is_result_url("Error: no files uploaded\n"));
        assert!(!is_result_url(""));
    }

    #[test]
    fn error_display() {
        let err = MossError::UnsupportedLanguage("cc".to_string());
        assert_eq!(err.to_string(), "server does not support language 'cc'");

        let err = MossError::ServerUnresponsive;
        assert_eq!(err.to_string(), "server is not responding");

        let err = MossError::InvalidConfiguration("the limit needs to be greater than 1".into());
        assert_eq!(
            err.to_string(),
            "invalid configuration: the limit needs to be greater than 1"
        );
    }
}
