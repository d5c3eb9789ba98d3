//! CLI command implementations

pub mod gather;
pub mod output;
pub mod parse;

pub use gather::gather;
pub use parse::parse;
