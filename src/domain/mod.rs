mod types;

pub use types::{BODY_TYPE_JSON, BODY_TYPE_NONE, Collection, HistoryItem, KeyValue, RequestData, ResponseData};
