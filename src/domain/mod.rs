pub mod conversion;
pub mod error;

// CSV parsing, serialization and validation types
pub mod csv;
