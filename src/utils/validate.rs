use once_cell::sync::Lazy;
use regex::Regex;

static GITHUB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(www\.)?github\.com/[A-Za-z0-9_.-]+(/[^\s]*)?$")
        .expect("Invalid github link regex")
});

static YOUTUBE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://((www|m)\.)?(youtube\.com|youtu\.be)/[^\s]+$")
        .expect("Invalid youtube link regex")
});

pub fn validate_github_link(link: &str) -> Result<(), &'static str> {
    if !GITHUB_RE.is_match(link) {
        return Err("GitHub link must be an http(s) URL on github.com");
    }
    Ok(())
}

pub fn validate_youtube_link(link: &str) -> Result<(), &'static str> {
    if !YOUTUBE_RE.is_match(link) {
        return Err("YouTube link must be an http(s) URL on youtube.com or youtu.be");
    }
    Ok(())
}

/// 去掉首尾空白，空串视为未提供
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_link() {
        assert!(validate_github_link("https://github.com/alice/capstone").is_ok());
        assert!(validate_github_link("http://www.github.com/alice").is_ok());
        assert!(validate_github_link("https://gitlab.com/alice/capstone").is_err());
        assert!(validate_github_link("github.com/alice").is_err());
        assert!(validate_github_link("https://github.com.evil.io/x").is_err());
    }

    #[test]
    fn test_youtube_link() {
        assert!(validate_youtube_link("https://www.youtube.com/watch?v=abc123").is_ok());
        assert!(validate_youtube_link("https://youtu.be/abc123").is_ok());
        assert!(validate_youtube_link("https://vimeo.com/123").is_err());
        assert!(validate_youtube_link("https://youtube.com/").is_err());
    }

    #[test]
    fn test_normalize_optional() {
        assert_eq!(normalize_optional(Some("  ".to_string())), None);
        assert_eq!(
            normalize_optional(Some(" x ".to_string())),
            Some("x".to_string())
        );
        assert_eq!(normalize_optional(None), None);
    }
}
