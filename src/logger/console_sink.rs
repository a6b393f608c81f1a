use tracing::info;

use crate::config::LoggingConfig;

use super::types::{VerdictAction, VerdictEntry, VerdictSink};

pub struct ConsoleSink {
    config: LoggingConfig,
}

impl ConsoleSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl VerdictSink for ConsoleSink {
    fn log(&self, entry: &VerdictEntry) {
        if !self.config.enable {
            return;
        }

        let should_log = match entry.action {
            VerdictAction::Blocked => true,
            VerdictAction::Allowed => self.config.log_allowed,
        };
        if !should_log {
            return;
        }

        if self.config.format == "json" {
            info!(
                target: "verdict",
                url = %entry.url,
                host = ?entry.host,
                surface = ?entry.surface,
                action = ?entry.action,
                matched = ?entry.matched,
            );
        } else {
            let action_str = match entry.action {
                VerdictAction::Blocked => match &entry.matched {
                    Some(m) => format!("BLOCKED (matched {})", m),
                    None => "BLOCKED".to_string(),
                },
                VerdictAction::Allowed => "allowed".to_string(),
            };
            info!(
                target: "verdict",
                "[{:?}] {} -> {}",
                entry.surface, entry.url, action_str
            );
        }
    }
}
