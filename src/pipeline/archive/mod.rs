pub mod format;
pub mod staging;
pub mod unpacker;

pub use format::*;
pub use staging::*;
pub use unpacker::*;

use thiserror::Error;

/// Archive could not be read or materialised. Never a business rejection.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}
