//! Saisei REST API Client
//!
//! A Rust client library for the REST API of Saisei network-management
//! appliances. Every operation on the running configuration (interfaces,
//! hosts, users, applications, flows, rate plans, commit) maps to one HTTP
//! request authenticated with Basic credentials.
//!
//! # Example
//!
//! ```no_run
//! use saisei_client::{SaiseiClient, SaiseiConfig};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Create a client
//! let config = SaiseiConfig::builder("https://saisei.example.net", "admin", "secret")
//!     .port(5000)
//!     .build()?;
//! let client = SaiseiClient::new(config)?;
//!
//! // Query users
//! let users = client.query_users(&[("limit", "50")]).await?;
//! println!("{} -> {}", users.status(), users.json()?);
//!
//! // Assign a rate plan and save the configuration
//! client.upsert_user("10.1.2.3", &json!({"rate_plan": "gold"})).await?;
//! client.commit().await?.error_for_status()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Resource Operations**: list/get/upsert/delete per resource
//! - **Raw Responses**: HTTP status and body are returned, never interpreted
//! - **Diagnostics**: per-call transport metadata in debug mode
//! - **Mocking**: `MockSaiseiClient` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod config;
pub mod error;
pub mod models;
pub mod request;
#[path = "trait.rs"]
pub mod saisei_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::SaiseiClient;
pub use config::{SaiseiConfig, SaiseiConfigBuilder};
pub use error::{SaiseiError, TransportErrorKind};
pub use models::{ApiResponse, CommitRequest, TransportDiagnostics};
pub use request::{RequestMethod, SaiseiRequest};
pub use saisei_trait::SaiseiClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockSaiseiClient;
