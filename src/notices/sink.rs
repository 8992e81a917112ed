use std::io::{self, Result as IoResult, Write};
use std::sync::{Arc, Mutex};

use super::notice::Notice;

/// Delivery target for background notice forwarding.
pub trait NoticeSink: Send {
    fn handle(&mut self, notice: &Notice) -> IoResult<()>;
}

/// One line per notice on stderr; the headless default.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdErrSink;

impl NoticeSink for StdErrSink {
    fn handle(&mut self, notice: &Notice) -> IoResult<()> {
        let mut err = io::stderr().lock();
        writeln!(err, "{notice}")
    }
}

/// Captures delivered notices for test assertions.
#[derive(Clone, Default)]
pub struct MemorySink(Arc<Mutex<Vec<Notice>>>);

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything delivered so far, in arrival order.
    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.0.lock().unwrap().clone()
    }

    /// Message text only.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

impl NoticeSink for MemorySink {
    fn handle(&mut self, notice: &Notice) -> IoResult<()> {
        self.0.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
