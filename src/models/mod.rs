pub mod enums;
pub mod envelope;
pub mod feed;
pub mod ocr;

pub use enums::*;
pub use envelope::*;
pub use feed::*;
pub use ocr::*;
