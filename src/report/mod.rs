//! Report module - console tables, run summary and file exports

pub mod export;
pub mod summary;
pub mod tables;

pub use export::*;
pub use summary::*;
pub use tables::*;
