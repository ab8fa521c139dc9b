//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_api_client;
mod http_document_renderer;
mod http_status;
mod in_memory_directory_cache;
mod tracing_notification_sink;

pub use http_api_client::HttpApiClient;
pub use http_document_renderer::HttpDocumentRenderer;
pub use in_memory_directory_cache::InMemoryDirectoryCache;
pub use tracing_notification_sink::TracingNotificationSink;
