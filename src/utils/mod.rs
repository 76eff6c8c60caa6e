//! Utility modules.
//!
//! - [`HttpClient`]: shared HTTP client with configured timeouts, used by both
//!   the paper source and the LLM transport

mod http;

pub use http::HttpClient;
