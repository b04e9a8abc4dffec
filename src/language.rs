//! Language tags accepted by the MOSS server.

/// Every language tag the server understands (moss protocol version 2.0).
/// Validation is a plain membership check against this table; tags are
/// case-sensitive and sent on the wire verbatim.
pub const ALLOWED_LANGUAGES: &[&str] = &[
    "c",
    "cc",
    "java",
    "ml",
    "pascal",
    "ada",
    "lisp",
    "scheme",
    "haskell",
    "fortran",
    "ascii",
    "vhdl",
    "perl",
    "matlab",
    "python",
    "mips",
    "prolog",
    "spice",
    "vb",
    "csharp",
    "modula2",
    "a8086",
    "javascript",
    "plsql",
    "verilog",
];

/// Returns true if `tag` is a language the server accepts.
pub fn is_supported(tag: &str) -> bool {
    ALLOWED_LANGUAGES.contains(&tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_list_has_25_languages() {
        assert_eq!(ALLOWED_LANGUAGES.len(), 25);
    }

    #[test]
    fn common_tags_are_supported() {
        for tag in ["c", "cc", "java", "python", "javascript", "verilog"] {
            assert!(is_supported(tag), "{tag} should be supported");
        }
    }

    #[test]
    fn unknown_tags_are_rejected() {
        for tag in ["php", "rust", "c++", ""] {
            assert!(!is_supported(tag), "{tag} should be rejected");
        }
    }

    #[test]
    fn membership_is_case_sensitive() {
        assert!(is_supported("c"));
        assert!(!is_supported("C"));
        assert!(!is_supported("Java"));
    }
}
