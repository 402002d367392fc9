//! CSV file sinks, optionally gzip-compressed.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::{OutputError, OutputResult, OutputSink, Schema, SinkFactory};

/// Underlying file stream.
enum Target {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl Target {
    /// Write the gzip trailer (if any) and flush to disk.
    fn finish(self) -> io::Result<()> {
        match self {
            Self::Plain(mut writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.finish()?.flush(),
        }
    }
}

impl Write for Target {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(writer) => writer.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(writer) => writer.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

#[derive(Default)]
struct State {
    name: String,
    writer: Option<csv::Writer<Target>>,
    rows: u64,
    /// First failure seen by `accept`.
    error: Option<OutputError>,
}

/// Writes one CSV file per criterion into an output directory.
///
/// The file is named after the criterion (`<name>.csv` or `<name>.csv.gz`)
/// and starts with a header row of the schema's field names.
pub struct CsvSink {
    dir: PathBuf,
    compressed: bool,
    state: Mutex<State>,
}

impl CsvSink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, compressed: bool) -> Self {
        Self {
            dir: dir.into(),
            compressed,
            state: Mutex::new(State::default()),
        }
    }

    /// Path of the file this sink writes for the given criterion name.
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        let suffix = if self.compressed { ".csv.gz" } else { ".csv" };
        let mut file_name = format!("{name}{suffix}").replace(['/', '\\'], "_");
        if cfg!(windows) {
            file_name = file_name.replace(':', "_");
        }
        self.dir.join(file_name)
    }

    fn open(&self, path: &Path) -> OutputResult<Target> {
        std::fs::create_dir_all(&self.dir)?;
        let file = BufWriter::new(File::create(path)?);
        Ok(if self.compressed {
            Target::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            Target::Plain(file)
        })
    }
}

impl OutputSink for CsvSink {
    fn init(&mut self, schema: &Schema) -> OutputResult<()> {
        let path = self.path_for(schema.name());
        let mut writer = csv::Writer::from_writer(self.open(&path)?);
        writer.write_record(schema.fields())?;

        debug!("Writing {} to {}", schema.name(), path.display());

        let state = self.state.get_mut();
        state.name = schema.name().to_string();
        state.writer = Some(writer);
        Ok(())
    }

    fn accept(&self, row: &[String]) {
        let mut state = self.state.lock();
        if state.error.is_some() {
            return;
        }

        let result = match state.writer.as_mut() {
            Some(writer) => writer.write_record(row).map_err(OutputError::from),
            None => Err(OutputError::NotInitialized(state.name.clone())),
        };

        match result {
            Ok(()) => state.rows += 1,
            Err(e) => {
                error!("Failed to write row for {}: {e}", state.name);
                state.error = Some(e);
            }
        }
    }

    fn close(&mut self) -> OutputResult<()> {
        let state = self.state.get_mut();
        let Some(mut writer) = state.writer.take() else {
            return Err(OutputError::NotInitialized(state.name.clone()));
        };

        let finished = writer
            .flush()
            .map_err(OutputError::from)
            .and_then(|()| writer.into_inner().map_err(|e| e.into_error().into()))
            .and_then(|target| target.finish().map_err(OutputError::from));

        debug!("Closed {} after {} rows", state.name, state.rows);

        match state.error.take() {
            Some(e) => Err(e),
            None => finished,
        }
    }
}

/// Creates [`CsvSink`]s writing into one directory.
#[derive(Debug, Clone)]
pub struct CsvSinkFactory {
    dir: PathBuf,
    compressed: bool,
}

impl CsvSinkFactory {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, compressed: bool) -> Self {
        Self {
            dir: dir.into(),
            compressed,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SinkFactory for CsvSinkFactory {
    fn create(&self) -> Box<dyn OutputSink> {
        Box::new(CsvSink::new(self.dir.clone(), self.compressed))
    }
}
