pub mod client;
pub mod method;
pub mod request;
pub mod response;

pub use client::Executor;
pub use method::HttpMethod;
