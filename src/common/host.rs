//! Host identity: per-host settings are keyed by a canonical hostname.

use crate::common::validation::Issue;
use url::Url;

/// Reduces a raw host (or a full URL) to the form used as a settings key:
/// lowercase, no trailing dot, no leading `www.`.
///
/// # Arguments
/// * `raw`: a hostname such as `WWW.Example.com` or a URL such as
///   `https://example.com/feed`
pub fn canonical_hostname(raw: &str) -> Result<String, Issue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Issue::Warning(String::from("empty hostname")));
    }
    let candidate = if trimmed.contains("://") {
        String::from(trimmed)
    } else {
        format!("http://{}", trimmed)
    };
    let parsed = match Url::parse(candidate.as_str()) {
        Ok(url) => url,
        Err(error) => {
            return Err(Issue::Warning(format!(
                "unable to parse host `{}` (`{}`)",
                trimmed, error
            )))
        }
    };
    let host = match parsed.host_str() {
        Some(value) => value.to_lowercase(),
        None => return Err(Issue::Warning(format!("`{}` has no host", trimmed))),
    };
    let host = host.trim_end_matches('.');
    let host = if host.starts_with("www.") {
        &host[4..]
    } else {
        host
    };
    if host.is_empty() {
        return Err(Issue::Warning(format!("`{}` has an empty host", trimmed)));
    }
    Ok(String::from(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        assert_eq!(canonical_hostname("example.com").unwrap(), "example.com");
        assert_eq!(canonical_hostname("WWW.Example.COM").unwrap(), "example.com");
        assert_eq!(canonical_hostname("example.com.").unwrap(), "example.com");
        assert_eq!(
            canonical_hostname("https://www.twitter.com/home").unwrap(),
            "twitter.com"
        );
        assert_eq!(canonical_hostname("news.example.com:8080").unwrap(), "news.example.com");
    }

    #[test]
    fn test_failures() {
        assert!(canonical_hostname("").is_err());
        assert!(canonical_hostname("   ").is_err());
        assert!(canonical_hostname("http://").is_err());
    }
}
