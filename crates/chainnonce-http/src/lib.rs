//! chainnonce-http — HTTP batch transport for ChainNonce.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chainnonce_core::{BatchCaller, BlockRef, NonceParams};
//! use chainnonce_http::HttpRpcClient;
//!
//! # async fn run() -> Result<(), chainnonce_core::TransportError> {
//! let client = Arc::new(HttpRpcClient::default_for("https://rpc.example.com")?);
//! let caller = BatchCaller::default_for(client);
//! let out = caller
//!     .transaction_counts(vec![NonceParams::new("0x00000000000000000000000000000000deadbeef", BlockRef::Latest)])
//!     .await?;
//! println!("{} ok, {} failed", out.successes.len(), out.errors.len());
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::{parse_batch_body, HttpClientConfig, HttpRpcClient};
