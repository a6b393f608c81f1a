//! In-page deployment: approximates the extension-level protection from
//! inside a page that has no network-interception privileges.
//!
//! Signals, in order of precision: the install-time check of the page's own
//! URL, capture-phase click and form-submission hooks, the DOM-mutation
//! signal, and finally a bounded-frequency URL poll for history-API route
//! changes nothing else observed.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use url::Url;

use crate::engine::{FilterState, Verdict};
use crate::logger::{Surface, VerdictAction, VerdictEntry, VerdictLogger};

/// The page seam: read the current location, rewrite it on a block.
pub trait PageContext: Send + Sync {
    fn current_url(&self) -> Option<String>;
    fn navigate(&self, url: &str);
}

/// What the platform glue must do with the captured event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    /// Let the event proceed unmodified.
    Allow,
    /// Prevent default and stop propagation; the guard has already navigated
    /// the page to the blocked resource.
    Block,
}

pub struct PageGuard {
    state: FilterState,
    page: Arc<dyn PageContext>,
    logger: Arc<VerdictLogger>,
    blocked_page: String,
    poll_interval: Duration,
    installed: Mutex<Option<Installed>>,
}

struct Installed {
    poll_task: JoinHandle<()>,
}

impl PageGuard {
    pub fn new(
        state: FilterState,
        page: Arc<dyn PageContext>,
        logger: Arc<VerdictLogger>,
        blocked_page: String,
        poll_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            state,
            page,
            logger,
            blocked_page,
            poll_interval,
            installed: Mutex::new(None),
        })
    }

    /// Installs the guard: evaluates the current page immediately, then starts
    /// the route-change poll. Calling it on an installed guard is a no-op.
    pub fn install(self: &Arc<Self>) {
        let mut slot = self.installed.lock().unwrap();
        if slot.is_some() {
            return;
        }

        // Direct navigation to a blocked page may have loaded this very
        // script; catch it before anything else.
        self.check_current(Surface::PageLoad);

        // Baseline the URL now, not at the first tick: a route change landing
        // between this point and the first tick must still be evaluated.
        let mut last_url = self.page.current_url();
        let this = Arc::clone(self);
        let poll_task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(this.poll_interval);
            loop {
                interval.tick().await;
                let current = this.page.current_url();
                if current != last_url {
                    last_url = current;
                    this.check_current(Surface::Poll);
                }
            }
        });

        *slot = Some(Installed { poll_task });
    }

    /// Stops the poll task and forgets the installation. Idempotent: calling
    /// it twice (or before install) is a no-op, and no timer survives it.
    pub fn teardown(&self) {
        let mut slot = self.installed.lock().unwrap();
        if let Some(installed) = slot.take() {
            installed.poll_task.abort();
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.lock().unwrap().is_some()
    }

    /// Capture-phase click hook. The href is resolved against the current
    /// page URL, so relative links are covered; unparsable hrefs fail open.
    pub fn on_click(&self, href: &str) -> GuardAction {
        self.intercept(href, Surface::Click)
    }

    /// Form-submission hook, same contract as clicks: the action URL is
    /// resolved relative to the current origin if needed.
    pub fn on_submit(&self, action: &str) -> GuardAction {
        self.intercept(action, Surface::Submit)
    }

    /// DOM-mutation signal: re-check the current URL right away, catching
    /// client-side route swaps between poll ticks.
    pub fn on_mutation(&self) {
        self.check_current(Surface::Mutation);
    }

    fn intercept(&self, raw: &str, surface: Surface) -> GuardAction {
        let Some(target) = self.resolve(raw) else {
            // Invalid or unresolvable target: allow rather than break the page.
            return GuardAction::Allow;
        };

        match self.state.check_url(&target) {
            Verdict::Blocked { host, matched } => {
                self.log(&target, Some(host), surface, Some(matched));
                self.page.navigate(&self.blocked_page);
                GuardAction::Block
            }
            Verdict::Allow => {
                self.log(&target, None, surface, None);
                GuardAction::Allow
            }
        }
    }

    fn check_current(&self, surface: Surface) {
        let Some(current) = self.page.current_url() else {
            return;
        };
        if let Verdict::Blocked { host, matched } = self.state.check_url(&current) {
            self.log(&current, Some(host), surface, Some(matched));
            self.page.navigate(&self.blocked_page);
        }
    }

    fn resolve(&self, raw: &str) -> Option<String> {
        if let Ok(url) = Url::parse(raw) {
            return Some(url.to_string());
        }
        // Relative target: join against the page's own URL.
        let base = Url::parse(&self.page.current_url()?).ok()?;
        base.join(raw).ok().map(|u| u.to_string())
    }

    fn log(&self, url: &str, host: Option<String>, surface: Surface, matched: Option<String>) {
        let action = if matched.is_some() {
            VerdictAction::Blocked
        } else {
            VerdictAction::Allowed
        };
        self.logger.log(VerdictEntry {
            url: url.to_string(),
            host,
            surface,
            action,
            matched,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoggingConfig;
    use crate::engine::DomainMatcher;

    struct FakePage {
        url: Mutex<String>,
    }

    impl FakePage {
        fn at(url: &str) -> Arc<Self> {
            Arc::new(Self {
                url: Mutex::new(url.to_string()),
            })
        }

        fn current(&self) -> String {
            self.url.lock().unwrap().clone()
        }

        fn set(&self, url: &str) {
            *self.url.lock().unwrap() = url.to_string();
        }
    }

    impl PageContext for FakePage {
        fn current_url(&self) -> Option<String> {
            Some(self.current())
        }

        fn navigate(&self, url: &str) {
            self.set(url);
        }
    }

    const BLOCKED_PAGE: &str = "http://127.0.0.1:8943/blocked";

    fn guard_at(page: Arc<FakePage>, entries: &[&str], interval_ms: u64) -> Arc<PageGuard> {
        let state = FilterState::new(BLOCKED_PAGE);
        state.set_matcher(DomainMatcher::new(entries.iter().map(|s| s.to_string())));
        state.set_enabled(true);
        let logger = VerdictLogger::new(LoggingConfig::default(), vec![]);
        PageGuard::new(
            state,
            page,
            logger,
            BLOCKED_PAGE.to_string(),
            Duration::from_millis(interval_ms),
        )
    }

    #[tokio::test]
    async fn test_install_checks_current_page() {
        let page = FakePage::at("http://pornhub.com/landing");
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        guard.install();
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_click_blocked_and_allowed() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        guard.install();

        assert_eq!(guard.on_click("http://pornhub.com/x"), GuardAction::Block);
        assert_eq!(page.current(), BLOCKED_PAGE);

        page.set("http://app.example.com/home");
        assert_eq!(guard.on_click("http://example.com"), GuardAction::Allow);
        assert_eq!(page.current(), "http://app.example.com/home");
        guard.teardown();
    }

    #[tokio::test]
    async fn test_relative_href_resolves_against_page() {
        let page = FakePage::at("http://pornhub.com/section/");
        // Page itself not blocked here; only the link target matters.
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        // Relative link stays on the blocked host.
        assert_eq!(guard.on_click("video/123"), GuardAction::Block);
    }

    #[tokio::test]
    async fn test_invalid_href_fails_open() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        assert_eq!(guard.on_click("ht!tp:::bad"), GuardAction::Allow);
        assert_eq!(page.current(), "http://app.example.com/home");
    }

    #[tokio::test]
    async fn test_submit_resolves_form_action() {
        let page = FakePage::at("http://app.example.com/form");
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        assert_eq!(
            guard.on_submit("http://www.pornhub.com/search"),
            GuardAction::Block
        );
        assert_eq!(page.current(), BLOCKED_PAGE);
    }

    #[tokio::test]
    async fn test_poll_detects_route_change() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 10);
        guard.install();

        // Simulate a history-API navigation nothing else observed.
        page.set("http://pornhub.com/spa-route");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_route_change_before_first_tick_is_caught() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 10);
        guard.install();

        // Navigation squeezed in right after install, before any poll tick:
        // the first tick must compare against the install-time baseline.
        page.set("http://pornhub.com/instant");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_mutation_signal_checks_immediately() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 60_000);
        guard.install();

        page.set("http://pornhub.com/after-dom-swap");
        guard.on_mutation();
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_install_teardown_idempotent() {
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 10);

        guard.install();
        guard.install();
        assert!(guard.is_installed());

        guard.teardown();
        guard.teardown();
        assert!(!guard.is_installed());

        // No orphaned poll task: a route change after teardown goes unchecked.
        page.set("http://pornhub.com/after-teardown");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(page.current(), "http://pornhub.com/after-teardown");

        // Re-enable works after teardown.
        guard.install();
        assert!(guard.is_installed());
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_blocked_host_at_blocked_path_still_blocked() {
        // A listed host serving the blocked page's path name is not the
        // blocked resource; the click must still be stopped.
        let page = FakePage::at("http://app.example.com/home");
        let guard = guard_at(page.clone(), &["pornhub.com"], 1000);
        guard.install();
        assert_eq!(
            guard.on_click("http://pornhub.com/blocked"),
            GuardAction::Block
        );
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }

    #[tokio::test]
    async fn test_blocked_page_itself_is_not_reblocked() {
        let page = FakePage::at(BLOCKED_PAGE);
        let guard = guard_at(page.clone(), &["pornhub.com", "127.0.0.1"], 10);
        guard.install();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(page.current(), BLOCKED_PAGE);
        guard.teardown();
    }
}
