//! Shared HTTP clients for the Gemini API
//!
//! Global, lazy-initialized clients with connection pooling: one tuned for
//! the long-running analysis and comparison calls, one with a short timeout
//! for the quick validation pre-check. Reusing the pools avoids per-call
//! builder overhead and keeps TLS sessions warm across the workflow.

use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Client for analyze/compare/chat calls
///
/// Clause-by-clause analysis of a full PDF can take a while, so the timeout
/// is generous.
static ANALYSIS_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .tcp_nodelay(true)
        .build()
        .expect("Failed to create analysis HTTP client")
});

/// Client for the is-this-a-contract validation pre-check
///
/// Validation replies are short; a tighter timeout surfaces a dead service
/// before the user has waited two minutes.
static VALIDATION_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(45))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(30))
        .build()
        .expect("Failed to create validation HTTP client")
});

/// Get the shared analysis client
#[inline]
pub fn analysis_client() -> &'static Client {
    &ANALYSIS_CLIENT
}

/// Get the shared validation client
#[inline]
pub fn validation_client() -> &'static Client {
    &VALIDATION_CLIENT
}
