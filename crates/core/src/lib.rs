//! # maybe-core
//!
//! Explicit success/failure values for code that would rather not panic.
//!
//! A [`Maybe`] is either a success carrying a payload, or a failure carrying
//! a [`Fault`]: an immutable token with a process-unique identity, a creation
//! timestamp, a [`Label`] derived from whatever described it, and an optional
//! diagnostic payload.
//!
//! ```
//! use maybe_core::{fail, succeed, Label, Maybe};
//!
//! fn parse_port(text: &str) -> Maybe<u16> {
//!     match text.parse() {
//!         Ok(port) => succeed(port),
//!         Err(_) => fail(text),
//!     }
//! }
//!
//! let (fault, port) = parse_port("8080").into_slots();
//! assert!(fault.is_none());
//! assert_eq!(port, Some(8080));
//!
//! let rejected = parse_port("eighty");
//! let port = rejected.failed(|fault| assert_eq!(fault.label(), Some(&Label::from("eighty"))));
//! assert_eq!(port, None);
//! ```
//!
//! ## Zero Panic Guarantee
//!
//! Nothing in this crate panics. Describing a fault is total: values that
//! cannot be serialized fall back to their `Debug` text, and values nested
//! too deeply (self-referential ones included) to their type name.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

mod bounded;
mod error;
pub mod fault;
pub mod label;
mod macros;
pub mod maybe;

pub use error::{Error, Result};
pub use fault::{Empty, Fault, FaultId};
pub use label::{Callable, Describe, Label, callable, displayed, normalize, structured};
pub use maybe::{Maybe, fail, fail_bare, fail_with, succeed, succeed_unit};

pub use maybe::{fail as failure, succeed as success};
