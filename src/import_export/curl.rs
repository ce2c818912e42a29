use reqwest::Url;
use serde_json::Value;
use url::form_urlencoded;
use uuid::Uuid;

use crate::domain::{BODY_TYPE_JSON, BODY_TYPE_NONE, KeyValue, RequestData};
use crate::error::ImportError;
use crate::http::method::HttpMethod;

const LINE_BREAK: &str = " \\\n  ";
const FORM_URLENCODED: &str = "x-www-form-urlencoded";
const FORM_DATA: &str = "form-data";
const RAW: &str = "raw";

/// Options whose argument must not be mistaken for the URL.
const SKIPPED_WITH_VALUE: &[&str] = &[
    "-u", "--user", "-A", "--user-agent", "-e", "--referer", "-b", "--cookie", "-c", "--cookie-jar", "-o",
    "--output", "-D", "--dump-header", "-F", "--form", "--form-string", "-T", "--upload-file", "-w",
    "--write-out", "-m", "--max-time", "--connect-timeout", "--max-redirs", "--retry", "-x", "--proxy",
    "-U", "--proxy-user", "--noproxy", "--resolve", "--connect-to", "--interface", "-E", "--cert", "--key",
    "--cacert", "--capath", "-K", "--config", "-r", "--range", "-z", "--time-cond", "-Y", "--speed-limit",
    "-y", "--speed-time", "--limit-rate", "--oauth2-bearer", "--aws-sigv4", "-Q", "--quote",
];

/// Short options that take a value, which curl also accepts glued to the
/// flag (`-XPOST`, `-HAccept:*/*`).
const SHORT_WITH_VALUE: &[&str] = &[
    "-X", "-H", "-d", "-u", "-A", "-e", "-b", "-c", "-o", "-D", "-F", "-T", "-w", "-m", "-x", "-U", "-E",
    "-K", "-r", "-z", "-Y", "-y", "-Q",
];

/// Render a request as a multi-line `curl` invocation.
pub fn to_curl(request: &RequestData) -> String {
    let mut command = format!("curl -X {} {}", request.method, double_quote(&url_with_params(request)));

    for header in request.active_headers() {
        let line = format!("{}: {}", header.key, header.value);
        command.push_str(&format!("{LINE_BREAK}-H {}", double_quote(&line)));
    }

    if request.sends_body() && !request.body.is_empty() {
        let data = format!("{LINE_BREAK}-d {}", single_quote(&request.body));
        match request.body_type.as_str() {
            BODY_TYPE_JSON => {
                command.push_str(&format!("{LINE_BREAK}-H \"Content-Type: application/json\""));
                command.push_str(&data);
            }
            FORM_URLENCODED => {
                command.push_str(&format!(
                    "{LINE_BREAK}-H \"Content-Type: application/x-www-form-urlencoded\""
                ));
                command.push_str(&data);
            }
            FORM_DATA => match serde_json::from_str::<serde_json::Map<String, Value>>(&request.body) {
                Ok(fields) => {
                    for (key, value) in fields {
                        let value = match value {
                            Value::String(text) => text,
                            other => other.to_string(),
                        };
                        command.push_str(&format!("{LINE_BREAK}-F {}", double_quote(&format!("{key}={value}"))));
                    }
                }
                Err(_) => command.push_str(&data),
            },
            _ => command.push_str(&data),
        }
    }

    command
}

/// `'...'` with embedded single quotes written as `'\''`.
fn single_quote(text: &str) -> String {
    format!("'{}'", text.replace('\'', "'\\''"))
}

/// `"..."` with the characters a shell still interprets there escaped.
fn double_quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// URL with enabled params appended; falls back to the raw URL text when it
/// does not parse.
fn url_with_params(request: &RequestData) -> String {
    match Url::parse(&request.url) {
        Ok(mut url) => {
            crate::http::request::append_params(&mut url, request.active_params());
            url.to_string()
        }
        Err(_) => request.url.clone(),
    }
}

/// Parse a `curl` command line into a new request with a fresh id.
pub fn from_curl(command: &str) -> Result<RequestData, ImportError> {
    let tokens = tokenize(command)?;
    let mut tokens = tokens.into_iter();

    if tokens.next().as_deref() != Some("curl") {
        return Err(ImportError::NotCurl);
    }

    let mut url = None;
    let mut method = None;
    let mut headers = Vec::new();
    let mut extra_params = Vec::new();
    let mut body: Option<String> = None;
    let mut json = false;

    while let Some(token) = tokens.next() {
        let (flag, mut inline) = split_short_option(&token);
        let mut value_for = |flag: &str| match inline.take() {
            Some(value) => Ok(value),
            None => tokens.next().ok_or_else(|| ImportError::MissingValue(flag.to_string())),
        };
        match flag {
            "-X" | "--request" => {
                let raw = value_for(flag)?;
                method = Some(HttpMethod::parse(&raw).unwrap_or(HttpMethod::Get));
            }
            "-H" | "--header" => {
                let raw = value_for(flag)?;
                if let Some((key, value)) = raw.split_once(':') {
                    let key = key.trim();
                    if !key.is_empty() {
                        headers.push(KeyValue::new(key, value.trim()));
                    }
                }
            }
            "-d" | "--data" | "--data-raw" | "--data-binary" | "--data-ascii" => {
                append_data(&mut body, value_for(flag)?, "&");
            }
            "--data-urlencode" => append_data(&mut body, urlencode_data(&value_for(flag)?), "&"),
            "--json" => {
                append_data(&mut body, value_for(flag)?, "");
                json = true;
            }
            "--url" => url = Some(value_for(flag)?),
            "--url-query" => {
                let raw = value_for(flag)?;
                let (key, value) = raw.split_once('=').unwrap_or((raw.as_str(), ""));
                extra_params.push(KeyValue::new(key, value));
            }
            flag if SKIPPED_WITH_VALUE.contains(&flag) => {
                value_for(flag)?;
            }
            flag if flag.starts_with('-') => {}
            _ if url.is_none() => url = Some(token.clone()),
            _ => {}
        }
    }

    let url = url.filter(|url| !url.is_empty()).ok_or(ImportError::MissingUrl)?;
    let (url, mut params) = split_query(&url);
    params.extend(extra_params);

    // curl switches to POST when data is given without an explicit method.
    let method = method.unwrap_or(if body.is_some() { HttpMethod::Post } else { HttpMethod::Get });
    let body_type = match body.as_deref() {
        Some(_) if json => BODY_TYPE_JSON,
        Some(body) => detect_body_type(body),
        None => BODY_TYPE_NONE,
    };

    Ok(RequestData {
        id: format!("req-{}", Uuid::new_v4()),
        name: "Imported Request".into(),
        url,
        method,
        headers,
        params,
        body: body.unwrap_or_default(),
        body_type: body_type.to_string(),
    })
}

/// Split a glued short option such as `-XPOST` into flag and value.
fn split_short_option(token: &str) -> (&str, Option<String>) {
    if token.len() > 2 && !token.starts_with("--") {
        if let Some(flag) = SHORT_WITH_VALUE.iter().find(|flag| token.starts_with(**flag)) {
            return (*flag, Some(token[flag.len()..].to_string()));
        }
    }
    (token, None)
}

fn append_data(body: &mut Option<String>, data: String, separator: &str) {
    *body = Some(match body.take() {
        Some(existing) => format!("{existing}{separator}{data}"),
        None => data,
    });
}

/// `--data-urlencode` rules: `name=content` encodes only the content, a
/// leading `=` is dropped, and `@file` forms are kept as written.
fn urlencode_data(raw: &str) -> String {
    let encode = |text: &str| form_urlencoded::byte_serialize(text.as_bytes()).collect::<String>();
    match raw.split_once('=') {
        Some(("", content)) => encode(content),
        Some((name, content)) => format!("{name}={}", encode(content)),
        None if raw.contains('@') => raw.to_string(),
        None => encode(raw),
    }
}

fn detect_body_type(body: &str) -> &'static str {
    let trimmed = body.trim();
    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));

    if looks_like_json && serde_json::from_str::<Value>(trimmed).is_ok() {
        BODY_TYPE_JSON
    } else if trimmed.contains('=') {
        FORM_URLENCODED
    } else {
        RAW
    }
}

/// Move the query string of a parseable URL into editable params.
fn split_query(raw: &str) -> (String, Vec<KeyValue>) {
    let Ok(mut url) = Url::parse(raw) else {
        return (raw.to_string(), Vec::new());
    };
    if url.query().is_none() {
        return (raw.to_string(), Vec::new());
    }

    let params = url
        .query_pairs()
        .map(|(key, value)| KeyValue::new(key, value))
        .collect();
    url.set_query(None);
    (url.to_string(), params)
}

/// POSIX-ish shell word splitting: single quotes are literal, double quotes
/// honour backslash escapes, and backslash-newline continues a line.
fn tokenize(input: &str) -> Result<Vec<String>, ImportError> {
    #[derive(PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote = Quote::None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => {
                if c == '\'' {
                    quote = Quote::None;
                } else {
                    current.push(c);
                }
            }
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some('\n') => {}
                    Some(next @ ('"' | '\\' | '$' | '`')) => current.push(next),
                    Some(next) => {
                        current.push('\\');
                        current.push(next);
                    }
                    None => return Err(ImportError::UnterminatedQuote),
                },
                _ => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_token = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_token = true;
                }
                '\\' => match chars.next() {
                    Some('\n') | Some('\r') => {
                        if chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                    }
                    Some(next) => {
                        current.push(next);
                        in_token = true;
                    }
                    None => {}
                },
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if quote != Quote::None {
        return Err(ImportError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
