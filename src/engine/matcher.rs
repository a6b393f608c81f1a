use rustc_hash::FxHashSet;
use url::Url;

/// Reduces a raw domain or URL to its normalized hostname: lowercase, one
/// leading `www.` stripped, scheme/path/port removed.
///
/// IDN hosts pass through as whatever the URL parser yields (punycode ASCII),
/// so an entry added in punycode form matches; no unicode folding beyond
/// ASCII lowercasing is attempted.
pub fn normalize_host(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let host = if raw.contains("://") {
        Url::parse(raw).ok()?.host_str()?.to_string()
    } else {
        // Bare hostname, possibly with a port or path pasted in.
        raw.split(['/', '?', '#', ':']).next()?.to_string()
    };

    let mut host = host.to_ascii_lowercase();
    if let Some(stripped) = host.strip_prefix("www.") {
        host = stripped.to_string();
    }

    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// In-memory matcher over normalized domain entries.
#[derive(Debug, Default)]
pub struct DomainMatcher {
    domains: FxHashSet<Box<str>>,
}

impl DomainMatcher {
    /// Entries must already be normalized (the store normalizes on ingest).
    pub fn new(entries: impl IntoIterator<Item = String>) -> Self {
        let domains = entries
            .into_iter()
            .map(|d| d.into_boxed_str())
            .collect::<FxHashSet<_>>();
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    /// Returns the matched entry if the hostname equals an entry or is a
    /// subdomain of one. Pure and deterministic; no side effects.
    pub fn is_blocked(&self, hostname: &str) -> Option<&str> {
        let host = normalize_host(hostname)?;

        // Iterative suffix match: look up the full host, then strip one
        // leading label per round. Only whole-label suffixes are looked up, so
        // "notxvideos.com" can never match an entry "xvideos.com".
        let mut part = host.as_str();
        loop {
            if let Some(hit) = self.domains.get(part) {
                return Some(hit);
            }

            match part.find('.') {
                Some(idx) => {
                    part = &part[idx + 1..];
                    if part.is_empty() {
                        break;
                    }
                }
                None => break,
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(entries: &[&str]) -> DomainMatcher {
        DomainMatcher::new(entries.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_matcher_logic() {
        let m = matcher(&["xvideos.com", "sub.ad.com"]);

        // Exact match
        assert_eq!(m.is_blocked("xvideos.com"), Some("xvideos.com"));

        // Suffix match (subdomain of blocked)
        assert_eq!(m.is_blocked("videos.xvideos.com"), Some("xvideos.com"));
        assert_eq!(m.is_blocked("videos.cdn.xvideos.com"), Some("xvideos.com"));

        // No dot boundary, no match
        assert_eq!(m.is_blocked("notxvideos.com"), None);

        // Exact match 2
        assert_eq!(m.is_blocked("sub.ad.com"), Some("sub.ad.com"));
        assert_eq!(m.is_blocked("deep.sub.ad.com"), Some("sub.ad.com"));

        // Unblocked
        assert_eq!(m.is_blocked("example.com"), None);
    }

    #[test]
    fn test_matcher_normalizes_input() {
        let m = matcher(&["xvideos.com"]);
        assert_eq!(m.is_blocked("www.XVideos.com"), Some("xvideos.com"));
        assert_eq!(m.is_blocked("WWW.xvideos.COM"), Some("xvideos.com"));
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("https://WWW.Example.com/path"),
            Some("example.com".to_string())
        );
        assert_eq!(
            normalize_host("Example.COM:8080"),
            Some("example.com".to_string())
        );
        assert_eq!(
            normalize_host("www.example.com/some/path"),
            Some("example.com".to_string())
        );
        assert_eq!(normalize_host(""), None);
        assert_eq!(normalize_host("   "), None);
        assert_eq!(normalize_host("https://"), None);
        // Only one www. is stripped; deeper labels stay.
        assert_eq!(
            normalize_host("www.www.example.com"),
            Some("www.example.com".to_string())
        );
    }

    #[test]
    fn test_empty_matcher_allows_everything() {
        let m = DomainMatcher::default();
        assert!(m.is_empty());
        assert_eq!(m.is_blocked("xvideos.com"), None);
    }
}
