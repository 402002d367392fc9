//! Output layer for save scans.
//!
//! Every criterion writes its matches through its own [`OutputSink`]. A sink is
//! created by a [`SinkFactory`], initialised once with the [`Schema`] of the
//! record type it will receive, fed rows concurrently from the traversal
//! workers, and closed exactly once.
//!
//! ```text
//! criterion ──accept(R)──► Output<R> ──field_values()──► Box<dyn OutputSink>
//!                                                          ├── CsvSink     (.csv / .csv.gz)
//!                                                          └── MemorySink  (MemoryStore)
//! ```
//!
//! Record schemas are declared statically through [`Record::FIELDS`], so no
//! runtime introspection is involved.

mod accumulate;
mod csv_sink;
mod directory;
mod error;
mod format;
mod memory;
mod record;
mod sink;

pub use accumulate::MeanAccumulator;
pub use csv_sink::{CsvSink, CsvSinkFactory};
pub use directory::prepare_directory;
pub use error::{OutputError, OutputResult};
pub use format::OutputFormat;
pub use memory::{MemorySink, MemorySinkFactory, MemoryStore, MemoryTable};
pub use record::{Record, Schema};
pub use sink::{Output, OutputSink, SinkFactory};
