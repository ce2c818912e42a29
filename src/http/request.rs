use reqwest::Url;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::domain::{KeyValue, RequestData};
use crate::error::{ExecutionError, ExecutionResult};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Concrete request derived from a [`RequestData`], ready for dispatch.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

/// Applies the construction rules without touching the network.
pub fn build_outbound(request: &RequestData) -> ExecutionResult<OutboundRequest> {
    let mut url = Url::parse(&request.url).map_err(|source| ExecutionError::InvalidUrl {
        url: request.url.clone(),
        source,
    })?;
    append_params(&mut url, request.active_params());

    let body = request.sends_body().then(|| request.body.clone());

    let mut headers = build_headers(request.active_headers())?;
    // Forced after the user headers so an explicit Content-Type never wins.
    if request.is_json() {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
    }

    Ok(OutboundRequest {
        method: request.method.into(),
        url,
        headers,
        body,
    })
}

/// Appends to any query already present in the URL.
pub fn append_params<'a>(url: &mut Url, params: impl Iterator<Item = &'a KeyValue>) {
    let mut params = params.peekable();
    if params.peek().is_none() {
        return;
    }

    let mut query_pairs = url.query_pairs_mut();
    for param in params {
        query_pairs.append_pair(&param.key, &param.value);
    }
}

/// Headers are additive: repeated keys become repeated header lines.
pub fn build_headers<'a>(input: impl Iterator<Item = &'a KeyValue>) -> ExecutionResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    for header in input {
        let header_name =
            HeaderName::from_bytes(header.key.as_bytes()).map_err(|err| ExecutionError::InvalidHeader {
                name: header.key.clone(),
                reason: err.to_string(),
            })?;
        let header_value = HeaderValue::from_str(&header.value).map_err(|err| ExecutionError::InvalidHeader {
            name: header.key.clone(),
            reason: err.to_string(),
        })?;
        headers.append(header_name, header_value);
    }

    Ok(headers)
}
