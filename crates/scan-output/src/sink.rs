//! Sink contract and the typed output handle criteria hold.

use core::marker::PhantomData;

use crate::{OutputResult, Record, Schema};

/// Destination for the rows of one criterion.
///
/// `accept` is called concurrently from traversal workers and cannot fail:
/// a sink that hits a write error keeps the first one, drops further rows
/// and reports it from `close`.
pub trait OutputSink: Send + Sync {
    /// Prepare for rows of the given schema. Called once before any `accept`.
    fn init(&mut self, schema: &Schema) -> OutputResult<()>;

    /// Write one row. One value per schema field.
    fn accept(&self, row: &[String]);

    /// Flush and release resources, returning the first error seen.
    fn close(&mut self) -> OutputResult<()>;
}

/// Creates one fresh sink per criterion.
pub trait SinkFactory: Send + Sync {
    fn create(&self) -> Box<dyn OutputSink>;
}

/// Typed handle over an initialised sink.
pub struct Output<R> {
    sink: Box<dyn OutputSink>,
    _record: PhantomData<fn(&R)>,
}

impl<R: Record> Output<R> {
    /// Initialise `sink` with the schema of `R` under `name`.
    pub fn open(mut sink: Box<dyn OutputSink>, name: &str) -> OutputResult<Self> {
        sink.init(&Schema::of::<R>(name))?;
        Ok(Self {
            sink,
            _record: PhantomData,
        })
    }

    /// Write one record.
    pub fn accept(&self, record: &R) {
        self.sink.accept(&record.field_values());
    }

    /// Close the underlying sink. Consumes the handle so it cannot be closed twice.
    pub fn close(mut self) -> OutputResult<()> {
        self.sink.close()
    }
}

impl<R> core::fmt::Debug for Output<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}
