pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleSink;
pub use self::memory_sink::MemorySink;
pub use self::types::{Surface, VerdictAction, VerdictEntry, VerdictSink};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::LoggingConfig;

/// Fans verdict entries out to sinks over bounded channels. `log` never
/// blocks the hook path: a full channel drops the entry.
pub struct VerdictLogger {
    sinks: Vec<mpsc::Sender<VerdictEntry>>,
}

impl VerdictLogger {
    pub fn new(config: LoggingConfig, extra_sinks: Vec<Box<dyn VerdictSink>>) -> Arc<Self> {
        let mut senders = Vec::new();

        let console = ConsoleSink::new(config);
        senders.push(Self::spawn_sink(Box::new(console)));
        for sink in extra_sinks {
            senders.push(Self::spawn_sink(sink));
        }

        Arc::new(Self { sinks: senders })
    }

    fn spawn_sink(sink: Box<dyn VerdictSink>) -> mpsc::Sender<VerdictEntry> {
        let (tx, mut rx) = mpsc::channel(1000);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                sink.log(&entry);
            }
        });
        tx
    }

    pub fn log(&self, entry: VerdictEntry) {
        let len = self.sinks.len();
        for (i, sink) in self.sinks.iter().enumerate() {
            // Fire and forget, don't block the caller if a buffer is full.
            if i == len - 1 {
                let _ = sink.try_send(entry);
                break;
            }
            let _ = sink.try_send(entry.clone());
        }
    }
}
