//! Dostman core: executes HTTP requests described by [`RequestData`] and
//! persists collections and a capped execution history as JSON records.
//!
//! The [`Executor`] and the [`Store`] never call each other; a front end
//! composes them.

pub mod collections;
pub mod config;
pub mod domain;
pub mod error;
pub mod history;
pub mod http;
pub mod import_export;
pub mod storage;

pub use config::Settings;
pub use domain::{Collection, HistoryItem, KeyValue, RequestData, ResponseData};
pub use error::{CollectionError, ConfigError, ExecutionError, ImportError, StorageError, UpdateError};
pub use http::{Executor, HttpMethod};
pub use storage::Store;
