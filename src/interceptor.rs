//! Extension-context interception: the pre-request hook and the
//! tab-state-change hook. Both run the same decision routine against the same
//! live state; whichever observes a blocked navigation first redirects, and
//! the redirect target itself always checks as allowed, so the second
//! observation cannot loop.

use std::sync::Arc;

use crate::engine::{FilterState, Verdict};
use crate::logger::{Surface, VerdictAction, VerdictEntry, VerdictLogger};

/// Handle on a tab whose location can be rewritten in flight.
pub trait TabHandle {
    fn set_url(&self, url: &str);
}

/// Decision returned to the platform from the pre-request hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestDecision {
    Continue,
    Redirect(String),
}

pub struct NavigationInterceptor {
    state: FilterState,
    logger: Arc<VerdictLogger>,
    blocked_page: String,
}

impl NavigationInterceptor {
    pub fn new(state: FilterState, logger: Arc<VerdictLogger>, blocked_page: String) -> Self {
        Self {
            state,
            logger,
            blocked_page,
        }
    }

    /// Pre-request hook: fired before any network fetch for a top-level
    /// document load. Malformed URLs fail open inside `check_url`; nothing in
    /// here panics outward, so one bad navigation never unhooks the pipeline.
    pub fn on_before_request(&self, url: &str) -> RequestDecision {
        match self.state.check_url(url) {
            Verdict::Blocked { host, matched } => {
                self.log(url, Some(host), Surface::PreRequest, Some(matched));
                RequestDecision::Redirect(self.blocked_page.clone())
            }
            Verdict::Allow => {
                self.log(url, None, Surface::PreRequest, None);
                RequestDecision::Continue
            }
        }
    }

    /// Tab-state-change hook: catches URL changes already in flight that the
    /// pre-request hook's platform restrictions don't reach (client
    /// redirects). On a blocked verdict the tab location is rewritten.
    pub fn on_tab_updated(&self, tab: &dyn TabHandle, url: &str) {
        if let Verdict::Blocked { host, matched } = self.state.check_url(url) {
            self.log(url, Some(host), Surface::TabUpdate, Some(matched));
            tab.set_url(&self.blocked_page);
        }
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
