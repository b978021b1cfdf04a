//! # bulkmail-smtp
//!
//! A small async SMTP submission client: exactly what a bot needs to push
//! one message through an authenticated relay.
//!
//! ## Features
//!
//! - **Generic sessions**: one [`Connection`] type over TCP, TLS, or any
//!   in-memory stream
//! - **STARTTLS** via `tokio-rustls` with bundled web PKI roots
//! - **AUTH PLAIN** with initial response
//! - **DATA** with CRLF normalization and dot-stuffing
//!
//! ## Quick Start
//!
//! ```ignore
//! use bulkmail_smtp::{Address, connect};
//!
//! #[tokio::main]
//! async fn main() -> bulkmail_smtp::Result<()> {
//!     let mut conn = connect("smtp.gmail.com", 587).await?;
//!     conn.ehlo("localhost").await?;
//!
//!     let mut conn = conn.starttls("smtp.gmail.com", "localhost").await?;
//!     conn.auth_plain("user@gmail.com", "app-password").await?;
//!
//!     let from = Address::new("user@gmail.com")?;
//!     let to = Address::new("desk@example.com")?;
//!     conn.send_mail(&from, &[to], b"Subject: Test\r\n\r\nHello!\r\n").await?;
//!
//!     conn.quit().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
mod capability;
pub mod command;
mod connection;
mod error;
pub mod reply;

pub use address::Address;
pub use capability::Capabilities;
pub use connection::{Connection, connect};
pub use error::{Error, Result};
pub use reply::{Reply, ReplyCode};

/// Default submission port (STARTTLS).
pub const SUBMISSION_PORT: u16 = 587;
