//! # Sinks
//!
//! Destinations of the cleaned table: a CSV checkpoint on disk and a full
//! replace of a relational table, verified by counting its rows afterwards.
pub mod checkpoint;
pub mod database;

pub use checkpoint::{read_csv, write_csv};
pub use database::{load_table, LoadOutcome};
