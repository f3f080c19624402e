//! Public read paths of the link service.
//!
//! [`RedirectorService`] turns a random link taken from a request path into
//! the destination URL to redirect to, and [`KeepAliveProbe`] issues the
//! trivial query that keeps an idle-tiered database awake.
//!
//! ```rust
//! use qrbridge_redirector::{RedirectorError, RedirectorService};
//! use qrbridge_storage::InMemoryRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedirectorService::new(InMemoryRepository::new());
//!
//! match service.redirect(Some("ab12xy")).await {
//!     Ok(url) => println!("302 -> {url}"),
//!     Err(RedirectorError::NotFound(_)) => println!("404"),
//!     Err(e) => println!("{e}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod probe;
pub mod redirector;
pub mod service;

pub use error::{RedirectorError, Result};
pub use probe::{KeepAliveProbe, KeepAliveReport};
pub use redirector::Redirector;
pub use service::RedirectorService;
