//! Glide verification API client
//!
//! Magic-link authentication, number verification, SIM-swap detection and
//! carrier lookup over OAuth2-protected endpoints. Sessions are acquired,
//! cached and renewed by `glide-auth`; this crate adds settings loading, the
//! authenticated request executor and the per-product clients.
//!
//! ```no_run
//! # async fn run() -> glide_sdk::Result<()> {
//! use glide_sdk::{GlideClient, Settings, UserIdentifier};
//! use glide_sdk::services::sim_swap::SimSwapCheckParams;
//!
//! let client = GlideClient::new(Settings::from_env())?;
//! let swapped = client
//!     .sim_swap()
//!     .for_identifier(UserIdentifier::phone("+15551234567"))
//!     .check(SimSwapCheckParams::default(), None)
//!     .await?
//!     .swapped;
//! # let _ = swapped;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod executor;
pub mod identifier;
pub mod metrics;
pub mod phone;
pub mod services;

pub use client::GlideClient;
pub use config::{ScopeSettings, Settings};
pub use error::{Error, ErrorKind, Result};
pub use executor::{ApiCall, Executor};
pub use identifier::UserIdentifier;
pub use phone::normalize_phone_number;

pub use glide_auth::{AuthorizationUrl, ScopeSet, Session};
