//! In-memory sinks, used by tests and by embedders that post-process rows.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::{OutputError, OutputResult, OutputSink, Schema, SinkFactory};

/// Everything one sink received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    pub fields: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Number of times the owning sink was closed.
    pub closes: usize,
}

/// Shared store of tables keyed by criterion name.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<FxHashMap<String, MemoryTable>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one table.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<MemoryTable> {
        self.tables.lock().get(name).cloned()
    }

    /// Rows written under `name`, empty if the table does not exist.
    #[must_use]
    pub fn rows(&self, name: &str) -> Vec<Vec<String>> {
        self.table(name).map(|t| t.rows).unwrap_or_default()
    }

    /// Names of all tables, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    /// Check if no table was created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }
}

/// Sink appending rows to a [`MemoryStore`] table.
#[derive(Debug)]
pub struct MemorySink {
    store: MemoryStore,
    name: Option<String>,
}

impl MemorySink {
    #[must_use]
    pub const fn new(store: MemoryStore) -> Self {
        Self { store, name: None }
    }
}

impl OutputSink for MemorySink {
    fn init(&mut self, schema: &Schema) -> OutputResult<()> {
        let table = MemoryTable {
            fields: schema.fields().iter().map(|f| (*f).to_string()).collect(),
            ..MemoryTable::default()
        };
        self.store
            .tables
            .lock()
            .insert(schema.name().to_string(), table);
        self.name = Some(schema.name().to_string());
        Ok(())
    }

    fn accept(&self, row: &[String]) {
        let Some(name) = &self.name else {
            return;
        };
        if let Some(table) = self.store.tables.lock().get_mut(name) {
            table.rows.push(row.to_vec());
        }
    }

    fn close(&mut self) -> OutputResult<()> {
        let name = self
            .name
            .as_ref()
            .ok_or_else(|| OutputError::NotInitialized(String::new()))?;
        if let Some(table) = self.store.tables.lock().get_mut(name) {
            table.closes += 1;
        }
        Ok(())
    }
}

/// Creates [`MemorySink`]s sharing one store.
#[derive(Debug, Clone, Default)]
pub struct MemorySinkFactory {
    store: MemoryStore,
}

impl MemorySinkFactory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to the shared store.
    #[must_use]
    pub fn store(&self) -> MemoryStore {
        self.store.clone()
    }
}

impl SinkFactory for MemorySinkFactory {
    fn create(&self) -> Box<dyn OutputSink> {
        Box::new(MemorySink::new(self.store.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Output, Record};

    struct Count(u32);

    impl Record for Count {
        const FIELDS: &'static [&'static str] = &["count"];

        fn field_values(&self) -> Vec<String> {
            vec![self.0.to_string()]
        }
    }

    #[test]
    fn test_rows_collected_per_name() {
        let factory = MemorySinkFactory::new();
        let a = Output::<Count>::open(factory.create(), "a").unwrap();
        let b = Output::<Count>::open(factory.create(), "b").unwrap();
        a.accept(&Count(1));
        b.accept(&Count(2));
        a.accept(&Count(3));
        a.close().unwrap();

        let store = factory.store();
        assert_eq!(store.names(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.rows("a"), vec![vec!["1".to_string()], vec!["3".to_string()]]);

        let table = store.table("a").unwrap();
        assert_eq!(table.fields, vec!["count".to_string()]);
        assert_eq!(table.closes, 1);
        assert_eq!(store.table("b").unwrap().closes, 0);
    }

    #[test]
    fn test_concurrent_accept() {
        let factory = MemorySinkFactory::new();
        let output = Output::<Count>::open(factory.create(), "n").unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for i in 0..100 {
                        output.accept(&Count(i));
                    }
                });
            }
        });

        assert_eq!(factory.store().rows("n").len(), 400);
    }
}
