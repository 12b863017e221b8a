//! XML utilities: the document model the extraction rules navigate.

mod utils;

pub use utils::*;
