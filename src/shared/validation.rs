use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating slug fields (categories, posts, tags)
    /// Must be lowercase alphanumeric with hyphens
    /// - Valid: "rust-tips", "news2024", "a-b-c"
    /// - Invalid: "-news", "news-", "rust--tips", "Rust", "rust_tips"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap();

    /// Regex for validating display colors: `#rgb` or `#rrggbb`
    pub static ref COLOR_REGEX: Regex =
        Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_regex_valid() {
        assert!(SLUG_REGEX.is_match("rust-tips"));
        assert!(SLUG_REGEX.is_match("news2024"));
        assert!(SLUG_REGEX.is_match("a"));
        assert!(SLUG_REGEX.is_match("a-b-c"));
        assert!(SLUG_REGEX.is_match("category-12"));
    }

    #[test]
    fn test_slug_regex_invalid() {
        assert!(!SLUG_REGEX.is_match("-news")); // starts with hyphen
        assert!(!SLUG_REGEX.is_match("news-")); // ends with hyphen
        assert!(!SLUG_REGEX.is_match("rust--tips")); // double hyphen
        assert!(!SLUG_REGEX.is_match("Rust")); // uppercase
        assert!(!SLUG_REGEX.is_match("rust_tips")); // underscore
        assert!(!SLUG_REGEX.is_match("")); // empty
        assert!(!SLUG_REGEX.is_match("rust tips")); // space
    }

    #[test]
    fn test_color_regex() {
        assert!(COLOR_REGEX.is_match("#fff"));
        assert!(COLOR_REGEX.is_match("#1A2b3C"));
        assert!(!COLOR_REGEX.is_match("fff"));
        assert!(!COLOR_REGEX.is_match("#ffff"));
        assert!(!COLOR_REGEX.is_match("red"));
    }
}
