//! Chunked CSV loading with an explicit text encoding.
//!
//! The file is streamed through an `encoding_rs` decoder into the `csv`
//! reader, and records are accumulated `chunk_size` rows at a time into
//! per-chunk DataFrames that are stacked vertically. Every column is loaded
//! as `String` and empty cells become null. Progress is measured in bytes
//! read from disk.

use std::fs::File;
use std::io;
use std::path::Path;
use std::time::Instant;

use encoding_rs::Encoding;
use indicatif::{ProgressBar, ProgressStyle};
use polars::prelude::*;
use tracing::{debug, info, info_span};

use crate::decode::{DecodeReader, is_malformed};
use crate::error::{IngestError, Result};

/// Default number of records per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Options for [`load_csv`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Records accumulated before a chunk is stacked onto the table.
    pub chunk_size: usize,
    /// WHATWG encoding label, e.g. `utf-8` or `ISO-8859-1`.
    pub encoding: String,
    pub delimiter: u8,
    /// Draw a progress bar on stderr.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            encoding: "utf-8".to_string(),
            delimiter: b',',
            show_progress: false,
        }
    }
}

impl LoadOptions {
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

/// Resolve an encoding label.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
        label: label.to_string(),
    })
}

/// Load a delimited export file into a DataFrame.
pub fn load_csv(path: &Path, options: &LoadOptions) -> Result<DataFrame> {
    let span = info_span!("load_csv", path = %path.display(), encoding = %options.encoding);
    let _guard = span.enter();
    let start = Instant::now();

    let encoding = resolve_encoding(&options.encoding)?;
    let file = open_file(path)?;
    let total_bytes = file
        .metadata()
        .map_err(|source| IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let progress = progress_bar(total_bytes, options.show_progress);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(DecodeReader::new(progress.wrap_read(file), encoding));

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, encoding, e))?
        .iter()
        .map(str::to_string)
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let chunk_size = options.chunk_size.max(1);
    let mut buffer = ChunkBuffer::new(headers.len(), chunk_size);
    let mut table: Option<DataFrame> = None;
    let mut chunk_count = 0usize;

    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(path, encoding, e))?;
        if record.len() > headers.len() {
            return Err(IngestError::CsvParse {
                path: path.to_path_buf(),
                message: format!(
                    "record {} has {} fields, header has {}",
                    index + 1,
                    record.len(),
                    headers.len()
                ),
            });
        }
        buffer.push(&record);
        if buffer.len() == chunk_size {
            let rows = buffer.len();
            let chunk = buffer.take_frame(&headers)?;
            stack(&mut table, chunk)?;
            chunk_count += 1;
            debug!(chunk = chunk_count, rows, "chunk loaded");
        }
    }

    if !buffer.is_empty() || table.is_none() {
        let rows = buffer.len();
        let chunk = buffer.take_frame(&headers)?;
        stack(&mut table, chunk)?;
        if rows > 0 {
            chunk_count += 1;
            debug!(chunk = chunk_count, rows, "chunk loaded");
        }
    }
    progress.finish_and_clear();

    let df = table.unwrap_or_default();
    info!(
        rows = df.height(),
        columns = df.width(),
        chunks = chunk_count,
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(df)
}

/// Fail with every required column that is absent from `df`.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<()> {
    let present: Vec<String> = df
        .get_column_names_owned()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| (*name).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns { columns: missing })
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Split reader failures into decode, I/O and parse errors.
fn csv_error(path: &Path, encoding: &'static Encoding, err: csv::Error) -> IngestError {
    if !err.is_io_error() {
        return IngestError::CsvParse {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
    }
    match err.into_kind() {
        csv::ErrorKind::Io(source) if is_malformed(&source) => IngestError::Decode {
            path: path.to_path_buf(),
            encoding: encoding.name(),
        },
        csv::ErrorKind::Io(source) => IngestError::FileRead {
            path: path.to_path_buf(),
            source,
        },
        other => IngestError::CsvParse {
            path: path.to_path_buf(),
            message: format!("{other:?}"),
        },
    }
}

fn progress_bar(total: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(total);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
    {
        bar.set_style(style.progress_chars("=>-"));
    }
    bar
}

fn stack(table: &mut Option<DataFrame>, chunk: DataFrame) -> Result<()> {
    match table {
        Some(existing) => {
            existing.vstack_mut(&chunk)?;
        }
        None => *table = Some(chunk),
    }
    Ok(())
}

/// Column-major buffer for one chunk of records.
struct ChunkBuffer {
    columns: Vec<Vec<Option<String>>>,
    rows: usize,
    capacity: usize,
}

impl ChunkBuffer {
    fn new(width: usize, capacity: usize) -> Self {
        Self {
            columns: (0..width).map(|_| Vec::with_capacity(capacity)).collect(),
            rows: 0,
            capacity,
        }
    }

    fn len(&self) -> usize {
        self.rows
    }

    fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Short records are padded with nulls.
    fn push(&mut self, record: &csv::StringRecord) {
        for (idx, column) in self.columns.iter_mut().enumerate() {
            let value = record
                .get(idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string);
            column.push(value);
        }
        self.rows += 1;
    }

    fn take_frame(&mut self, headers: &[String]) -> Result<DataFrame> {
        let capacity = self.capacity;
        let columns: Vec<Column> = self
            .columns
            .iter_mut()
            .zip(headers)
            .map(|(values, name)| {
                let values = std::mem::replace(values, Vec::with_capacity(capacity));
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect();
        self.rows = 0;
        Ok(DataFrame::new(columns)?)
    }
}
