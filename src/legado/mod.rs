pub mod blob_reader;
pub mod driver;
pub mod error;
pub mod executor;
pub mod row_processor;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use blob_reader::BlobReader;
pub use driver::{
    BlobHandle, BlobStream, ConnectionOptions, LegacyConnection, LegacyConnector,
    LegacyTransaction,
};
pub use error::LegacyError;
pub use executor::LegacyDatabase;
pub use row_processor::{process_row, process_rows};
pub use types::{FieldValue, ProcessedRow, RawField, RawRow, SqlParam};
