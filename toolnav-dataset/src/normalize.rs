use url::Url;

/// Normalise a website URL for duplicate detection and dataset lookups.
///
/// Lowercases, drops the scheme, a leading `www.`, any query string or
/// fragment, and trailing slashes. `https://www.Figma.com/?ref=x` and
/// `figma.com` normalise to the same key.
pub fn normalize_url(raw: &str) -> String {
    let mut normalized = raw.trim().to_lowercase();

    if let Some(idx) = normalized.find("://") {
        normalized.replace_range(..idx + 3, "");
    } else if let Some(rest) = normalized.strip_prefix("//") {
        normalized = rest.to_string();
    }

    if let Some(idx) = normalized.find(['?', '#']) {
        normalized.truncate(idx);
    }

    if let Some(rest) = normalized.strip_prefix("www.") {
        normalized = rest.to_string();
    }

    while normalized.ends_with('/') {
        normalized.pop();
    }

    normalized
}

/// Host portion of a URL, without `www.` and port. Returns `None` for
/// input that does not carry a usable host.
pub fn extract_domain(raw: &str) -> Option<String> {
    let normalized = normalize_url(raw);
    if normalized.is_empty() {
        return None;
    }

    Url::parse(&format!("http://{}", normalized))
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_scheme_www_query_and_slash() {
        assert_eq!(normalize_url("https://www.Figma.com/?ref=nav#top"), "figma.com");
        assert_eq!(normalize_url("http://dribbble.com/shots/"), "dribbble.com/shots");
        assert_eq!(normalize_url("//cdn.example.com/x"), "cdn.example.com/x");
    }

    #[test]
    fn empty_input_normalises_to_empty() {
        assert_eq!(normalize_url("   "), "");
        assert_eq!(extract_domain(""), None);
    }

    #[test]
    fn domain_drops_path_and_port() {
        assert_eq!(
            extract_domain("https://www.behance.net:8443/gallery"),
            Some("behance.net".to_string())
        );
    }
}
