//! # Import / Export
//!
//! Interoperability with other HTTP tools. Currently cURL command lines in
//! both directions.

mod curl;

pub use curl::{from_curl, to_curl};
