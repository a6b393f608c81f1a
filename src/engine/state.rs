use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use url::Url;

use super::matcher::DomainMatcher;

/// Outcome of checking one navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Blocked {
        /// Normalized hostname of the target.
        host: String,
        /// The blocklist entry that matched.
        matched: String,
    },
}

impl Verdict {
    pub fn is_blocked(&self) -> bool {
        matches!(self, Verdict::Blocked { .. })
    }
}

/// Live filter state shared by every interception surface.
///
/// Cheap to clone; the matcher is hot-swapped on every blocklist edit so a
/// reader never sees a stale list.
#[derive(Clone)]
pub struct FilterState {
    inner: Arc<Inner>,
}

struct Inner {
    enabled: AtomicBool,
    matcher: ArcSwap<DomainMatcher>,
    // Location of the local blocked-page resource; always allowed so a
    // redirect can never loop back into another redirect. Only this resource
    // is excluded: the same path on a different host still gets matched.
    blocked_page_host: Option<String>,
    blocked_page_path: String,
}

impl FilterState {
    /// `blocked_page` is the redirect target, normally a full URL
    /// (`http://127.0.0.1:8943/blocked`). A bare path is accepted for
    /// deployments where the serving host is not known up front; exclusion
    /// then falls back to the path alone.
    pub fn new(blocked_page: impl AsRef<str>) -> Self {
        let raw = blocked_page.as_ref();
        let (host, path) = match Url::parse(raw) {
            Ok(url) => (
                url.host_str().and_then(super::matcher::normalize_host),
                url.path().to_string(),
            ),
            Err(_) => (None, raw.to_string()),
        };
        Self {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(false),
                matcher: ArcSwap::from_pointee(DomainMatcher::default()),
                blocked_page_host: host,
                blocked_page_path: path,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn set_matcher(&self, matcher: DomainMatcher) {
        self.inner.matcher.store(Arc::new(matcher));
    }

    pub fn matcher_len(&self) -> usize {
        self.inner.matcher.load().len()
    }

    /// The single decision routine. Order matters:
    /// 1. disabled filter allows everything (the matcher is not consulted),
    /// 2. the blocked-page resource itself is always allowed,
    /// 3. URLs without a recognizable host fail open,
    /// 4. otherwise the matcher decides.
    pub fn check_url(&self, url: &str) -> Verdict {
        if !self.is_enabled() {
            return Verdict::Allow;
        }
        if self.is_blocked_page(url) {
            return Verdict::Allow;
        }

        let Some(host) = super::matcher::normalize_host(url) else {
            // Malformed target: fail open rather than break unrelated browsing.
            return Verdict::Allow;
        };

        let matcher = self.inner.matcher.load();
        match matcher.is_blocked(&host) {
            Some(entry) => Verdict::Blocked {
                host,
                matched: entry.to_string(),
            },
            None => Verdict::Allow,
        }
    }

    fn is_blocked_page(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        if parsed.path() != self.inner.blocked_page_path {
            return false;
        }
        match (&self.inner.blocked_page_host, parsed.host_str()) {
            // Both hosts known: the exclusion only covers the resource itself.
            (Some(own), Some(host)) => {
                super::matcher::normalize_host(host).as_deref() == Some(own.as_str())
            }
            // Path-only configuration, or a hostless URL: path match decides.
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCKED_PAGE: &str = "http://127.0.0.1:8943/blocked";

    fn state_with(entries: &[&str]) -> FilterState {
        let state = FilterState::new(BLOCKED_PAGE);
        state.set_matcher(DomainMatcher::new(entries.iter().map(|s| s.to_string())));
        state
    }

    #[test]
    fn test_disabled_allows_everything() {
        let state = state_with(&["xvideos.com"]);
        assert_eq!(state.check_url("http://xvideos.com/"), Verdict::Allow);
    }

    #[test]
    fn test_enabled_blocks_match() {
        let state = state_with(&["xvideos.com"]);
        state.set_enabled(true);

        let verdict = state.check_url("http://videos.xvideos.com/clip");
        assert_eq!(
            verdict,
            Verdict::Blocked {
                host: "videos.xvideos.com".to_string(),
                matched: "xvideos.com".to_string(),
            }
        );
        assert_eq!(state.check_url("http://example.com/"), Verdict::Allow);
    }

    #[test]
    fn test_blocked_page_is_always_allowed() {
        // Even when the serving host is itself on the list.
        let state = state_with(&["xvideos.com", "127.0.0.1"]);
        state.set_enabled(true);
        assert_eq!(state.check_url(BLOCKED_PAGE), Verdict::Allow);
    }

    #[test]
    fn test_blocked_page_path_on_other_hosts_still_blocked() {
        // The exclusion covers the resource, not its path name: a
        // blocklisted host serving the same path gets no pass.
        let state = state_with(&["pornhub.com"]);
        state.set_enabled(true);
        assert!(state.check_url("http://pornhub.com/blocked").is_blocked());
        assert!(state
            .check_url("http://www.pornhub.com/blocked")
            .is_blocked());
    }

    #[test]
    fn test_path_only_configuration_falls_back_to_path_match() {
        let state = FilterState::new("/blocked");
        state.set_matcher(DomainMatcher::new(["xvideos.com".to_string()]));
        state.set_enabled(true);
        assert_eq!(
            state.check_url("http://xvideos.com/blocked"),
            Verdict::Allow
        );
        assert!(state.check_url("http://xvideos.com/other").is_blocked());
    }

    #[test]
    fn test_malformed_url_fails_open() {
        let state = state_with(&["xvideos.com"]);
        state.set_enabled(true);
        assert_eq!(state.check_url("http://"), Verdict::Allow);
        assert_eq!(state.check_url(""), Verdict::Allow);
    }

    #[test]
    fn test_matcher_swap_is_visible_immediately() {
        let state = state_with(&[]);
        state.set_enabled(true);
        assert_eq!(state.check_url("http://foo.com/"), Verdict::Allow);

        state.set_matcher(DomainMatcher::new(["foo.com".to_string()]));
        assert!(state.check_url("http://foo.com/").is_blocked());
    }
}
