use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap};
use std::collections::HashMap;
use std::time::Duration;

use crate::domain::ResponseData;

/// Status line text, e.g. `200 OK`.
pub fn status_text(status: StatusCode) -> String {
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    )
}

/// Keeps only the first value the server sent for each header name.
pub fn first_header_values(headers: &HeaderMap) -> HashMap<String, String> {
    let mut first = HashMap::new();
    for (name, value) in headers {
        first
            .entry(name.to_string())
            .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
    }
    first
}

pub fn content_type(headers: &HeaderMap) -> String {
    headers
        .get(CONTENT_TYPE)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default()
}

pub fn build_response(status: StatusCode, headers: &HeaderMap, bytes: &[u8], elapsed: Duration) -> ResponseData {
    ResponseData {
        status: status.as_u16(),
        status_text: status_text(status),
        time_millis: i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX),
        size_label: ResponseData::size_label(bytes.len()),
        headers: first_header_values(headers),
        body: String::from_utf8_lossy(bytes).into_owned(),
        content_type: content_type(headers),
    }
}
