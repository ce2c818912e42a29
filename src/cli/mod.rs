//! # CLI
//!
//! Terminal front end over the core: send ad-hoc or saved requests, manage
//! collections and history, convert to and from cURL.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

use dostman::collections::{
    find_request, move_saved_request, rename_saved_collection, rename_saved_request, save_request,
};
use dostman::import_export::{from_curl, to_curl};
use dostman::{Collection, Executor, HistoryItem, HttpMethod, KeyValue, RequestData, ResponseData, Settings, Store};

/// Dostman: compose, send and organize HTTP requests
#[derive(Debug, Parser)]
#[command(name = "dostman")]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "DOSTMAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Send an ad-hoc request
    Send {
        url: String,
        #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
        method: HttpMethod,
        /// Header as `Key: Value`, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<KeyValue>,
        /// Query parameter as `key=value`, repeatable
        #[arg(short = 'q', long = "param", value_parser = parse_param)]
        params: Vec<KeyValue>,
        #[arg(short = 'd', long)]
        data: Option<String>,
        /// none, json, raw, form-data, x-www-form-urlencoded
        #[arg(long)]
        body_type: Option<String>,
        /// Do not record the execution in history
        #[arg(long)]
        no_history: bool,
    },
    /// Send a request saved in a collection
    Run {
        collection_id: String,
        request_id: String,
        #[arg(long)]
        no_history: bool,
    },
    /// Manage collections
    Collections {
        #[command(subcommand)]
        command: CollectionCommands,
    },
    /// Inspect or clear the execution history
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
    /// Convert between saved requests and cURL command lines
    Curl {
        #[command(subcommand)]
        command: CurlCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum CollectionCommands {
    List,
    Create { name: String },
    /// Move a saved request into another collection
    Move { request_id: String, from: String, to: String },
    /// Rename a collection, or one of its requests with `--request`
    Rename {
        collection_id: String,
        name: String,
        #[arg(long)]
        request: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum HistoryCommands {
    List {
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
    Clear,
}

#[derive(Debug, Subcommand)]
pub enum CurlCommands {
    /// Parse a cURL command and save it into a collection
    Import {
        command: String,
        #[arg(long)]
        collection: String,
        #[arg(long)]
        name: Option<String>,
    },
    Export { collection_id: String, request_id: String },
}

fn parse_method(raw: &str) -> Result<HttpMethod, String> {
    HttpMethod::parse(raw).ok_or_else(|| format!("unsupported method `{raw}`"))
}

fn parse_header(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("Invalid header format: `{raw}`"))?;
    Ok(KeyValue::new(key.trim(), value.trim()))
}

fn parse_param(raw: &str) -> Result<KeyValue, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("Invalid key/value format: `{raw}`"))?;
    Ok(KeyValue::new(key.trim(), value.trim()))
}

pub async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    settings.log_startup();

    let store = Store::from_settings(&settings);
    let executor = Executor::from_settings(&settings);

    match cli.command {
        Commands::Send {
            url,
            method,
            headers,
            params,
            data,
            body_type,
            no_history,
        } => {
            let mut request = RequestData::new(format!("temp-{}", Uuid::new_v4()), method, url);
            request.headers = headers;
            request.params = params;
            let default_body_type = if data.is_some() { "raw" } else { "none" };
            request.body_type = body_type.unwrap_or_else(|| default_body_type.to_string());
            request.body = data.unwrap_or_default();
            send(&executor, &store, &request, !no_history).await
        }
        Commands::Run {
            collection_id,
            request_id,
            no_history,
        } => {
            let collections = store.load_collections()?;
            let request = find_request(&collections, &collection_id, &request_id)?;
            send(&executor, &store, request, !no_history).await
        }
        Commands::Collections { command } => collections_command(&store, command),
        Commands::History { command } => history_command(&store, command),
        Commands::Curl { command } => curl_command(&store, command),
    }
}

async fn send(executor: &Executor, store: &Store, request: &RequestData, record: bool) -> Result<()> {
    let response = executor.execute(request).await?;
    print_response(&response);

    if record {
        store.save_history(&[HistoryItem::record(request, &response)])?;
    }
    Ok(())
}

fn print_response(response: &ResponseData) {
    println!("{}  ({} ms, {})", response.status_text, response.time_millis, response.size_label);

    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("{name}: {value}");
    }
    println!();
    println!("{}", response.body);
}

fn collections_command(store: &Store, command: CollectionCommands) -> Result<()> {
    match command {
        CollectionCommands::List => {
            let mut collections = store.load_collections()?;
            collections.sort_by(|a, b| a.name.cmp(&b.name));
            for collection in collections {
                println!("{}  {} ({} requests)", collection.id, collection.name, collection.requests.len());
                for request in &collection.requests {
                    println!("    {}  {:<7} {}  {}", request.id, request.method, request.url, request.name);
                }
            }
        }
        CollectionCommands::Create { name } => {
            let collection = Collection::new(format!("col-{}", Uuid::new_v4()), name);
            store.save_collections(std::slice::from_ref(&collection))?;
            println!("{}", collection.id);
        }
        CollectionCommands::Move { request_id, from, to } => {
            move_saved_request(store, &request_id, &from, &to)?;
        }
        CollectionCommands::Rename {
            collection_id,
            name,
            request,
        } => match request {
            Some(request_id) => rename_saved_request(store, &collection_id, &request_id, &name)?,
            None => rename_saved_collection(store, &collection_id, &name)?,
        },
    }
    Ok(())
}

fn history_command(store: &Store, command: HistoryCommands) -> Result<()> {
    match command {
        HistoryCommands::List { limit } => {
            for item in store.load_history()?.iter().take(limit) {
                let when = chrono::DateTime::from_timestamp_millis(item.timestamp_millis)
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| item.timestamp_millis.to_string());
                println!(
                    "{when}  {:<7} {}  {}",
                    item.request.method, item.request.url, item.response.status_text
                );
            }
        }
        HistoryCommands::Clear => store.delete_all_history()?,
    }
    Ok(())
}

fn curl_command(store: &Store, command: CurlCommands) -> Result<()> {
    match command {
        CurlCommands::Import {
            command,
            collection,
            name,
        } => {
            let mut request = from_curl(&command)?;
            if let Some(name) = name {
                request.name = name;
            }
            let id = request.id.clone();
            save_request(store, &collection, request)?;
            println!("{id}");
        }
        CurlCommands::Export {
            collection_id,
            request_id,
        } => {
            let collections = store.load_collections()?;
            println!("{}", to_curl(find_request(&collections, &collection_id, &request_id)?));
        }
    }
    Ok(())
}
