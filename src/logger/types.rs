use serde::Serialize;

/// Where a navigation signal was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Surface {
    /// Extension pre-request hook, before any network fetch.
    PreRequest,
    /// Extension tab-state-change hook (in-flight URL changes).
    TabUpdate,
    /// Page evaluated its own URL on guard install.
    PageLoad,
    /// In-page click capture.
    Click,
    /// In-page form-submission capture.
    Submit,
    /// URL-poll route-change detection.
    Poll,
    /// DOM-mutation signal.
    Mutation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerdictAction {
    Allowed,
    Blocked,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerdictEntry {
    pub url: String,
    /// Normalized hostname, when one could be extracted.
    pub host: Option<String>,
    pub surface: Surface,
    pub action: VerdictAction,
    /// The blocklist entry that matched, for blocked verdicts.
    pub matched: Option<String>,
}

pub trait VerdictSink: Send + Sync {
    fn log(&self, entry: &VerdictEntry);
}
