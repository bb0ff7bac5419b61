//! In-memory sink, mainly for tests

use crate::core::{Level, Record, Result, Sink};
use parking_lot::Mutex;

/// Keeps every encoded line, with the level of the record it came from.
#[derive(Default)]
pub struct MemorySink {
    name: String,
    entries: Mutex<Vec<(Level, String)>>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries.lock().iter().map(|(_, line)| line.clone()).collect()
    }

    pub fn levels(&self) -> Vec<Level> {
        self.entries.lock().iter().map(|(level, _)| *level).collect()
    }

    pub fn contents(&self) -> String {
        self.entries.lock().iter().map(|(_, line)| line.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Sink for MemorySink {
    fn write(&self, record: &Record, line: &str) -> Result<()> {
        self.entries.lock().push((record.level, line.to_string()));
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
