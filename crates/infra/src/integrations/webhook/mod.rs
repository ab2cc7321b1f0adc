//! Webhook integration for batch analysis
//!
//! Flushed batches are POSTed as JSON to a workflow endpoint (for example an
//! n8n webhook) that runs the LLM extraction and calendar writes.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use chatcal_core::ConversationTracker;
//! use chatcal_infra::http::HttpClient;
//! use chatcal_infra::integrations::webhook::WebhookBatchAnalyzer;
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let http_client = HttpClient::builder().build()?;
//! let analyzer = WebhookBatchAnalyzer::new("http://localhost:5678/webhook/chatcal", http_client);
//! let tracker = ConversationTracker::new(Arc::new(analyzer));
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - **Network errors and 5xx**: retried by `HttpClient` with backoff
//! - **Other non-2xx**: returned as `ChatCalError::Network` on first attempt
//! - Errors reach the batch scheduler, which logs them and drops the batch

pub mod analyzer;
pub mod types;

pub use analyzer::WebhookBatchAnalyzer;
pub use types::BatchPayload;
