pub mod decode;
pub mod error;
pub mod loader;
pub mod polars_utils;

pub use error::{IngestError, Result};
pub use loader::{DEFAULT_CHUNK_SIZE, LoadOptions, load_csv, require_columns, resolve_encoding};
pub use polars_utils::{any_to_string, cell_string, column_as_strings, has_column, string_values};
