//! Document loader printing records as JSON lines

use std::io::Write;

use morphline_core::{DocumentLoader, Record, Result, SinkLocator};

/// Buffers documents per transaction and writes them to stdout, one JSON
/// object per line, on commit or when a batch is full. Rolled back
/// documents are discarded.
pub struct StdoutLoader {
    batch_size: usize,
    pending: Vec<Record>,
}

impl StdoutLoader {
    /// Create a loader for the given sink
    pub fn new(locator: &SinkLocator) -> Self {
        Self {
            batch_size: locator.batch_size(),
            pending: Vec::new(),
        }
    }

    /// Loader factory for a morphline context
    pub fn factory(locator: &SinkLocator) -> Result<Box<dyn DocumentLoader>> {
        Ok(Box::new(Self::new(locator)))
    }

    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        for document in self.pending.drain(..) {
            serde_json::to_writer(&mut out, &document).map_err(morphline_core::Error::runtime)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }
}

impl DocumentLoader for StdoutLoader {
    fn begin_transaction(&mut self) -> Result<()> {
        self.pending.clear();
        Ok(())
    }

    fn load(&mut self, document: &Record) -> Result<()> {
        self.pending.push(document.clone());
        if self.pending.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn commit_transaction(&mut self) -> Result<()> {
        self.flush()
    }

    fn rollback_transaction(&mut self) -> Result<()> {
        tracing::debug!(discarded = self.pending.len(), "Rolling back documents");
        self.pending.clear();
        Ok(())
    }

    fn shutdown(&mut self) -> Result<()> {
        self.flush()
    }
}
