pub mod classifier;
pub mod csv_table;
pub mod discovery;
pub mod error;

pub use classifier::detect_module;
pub use csv_table::{read_table, read_table_from_reader};
pub use discovery::{
    DiscoveredFile, LoadFailure, LoadedBatch, discover_files, list_csv_files, load_batch,
};
pub use error::{IngestError, Result};
