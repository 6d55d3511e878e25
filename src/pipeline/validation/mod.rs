pub mod ocr_outcome;
pub mod ocr_presence;
pub mod rules;
pub mod tables;

pub use ocr_outcome::*;
pub use ocr_presence::*;
pub use rules::*;
pub use tables::*;
