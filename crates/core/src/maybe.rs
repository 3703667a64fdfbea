//! The success/failure carrier and its constructors.
//!
//! A [`Maybe`] holds either a success payload or a [`Fault`], never both and
//! never neither. It can be read two ways:
//!
//! - positionally, as a pair of slots `(fault, value)` where exactly one is
//!   populated ([`Maybe::slots`], [`Maybe::into_slots`]);
//! - by handler dispatch ([`Maybe::succeeded`], [`Maybe::failed`]).
//!
//! # Examples
//!
//! ```
//! use maybe_core::{fail, succeed, Maybe};
//!
//! let (fault, value) = succeed::<_, maybe_core::Empty>(42).into_slots();
//! assert!(fault.is_none());
//! assert_eq!(value, Some(42));
//!
//! let parsed: Maybe<u16> = fail("port out of range");
//! let port = parsed.failed(|fault| eprintln!("{fault}"));
//! assert_eq!(port, None);
//! ```

use crate::fault::{Empty, Fault};
use crate::label::Describe;

#[derive(Debug)]
enum Slots<T, F> {
    Failure(Fault<F>),
    Success(T),
}

/// Either a success payload of type `T` or a [`Fault`] carrying `F`.
///
/// Built only by [`succeed`] and the `fail*` constructors; there are no
/// mutators.
#[derive(Debug)]
#[must_use = "a Maybe may hold a fault which should be handled"]
pub struct Maybe<T = (), F = Empty>(Slots<T, F>);

impl<T, F> Maybe<T, F> {
    /// Borrow both slots: `(fault, value)`.
    ///
    /// Exactly one of the two is `Some`.
    pub const fn slots(&self) -> (Option<&Fault<F>>, Option<&T>) {
        match &self.0 {
            Slots::Failure(fault) => (Some(fault), None),
            Slots::Success(value) => (None, Some(value)),
        }
    }

    /// Take both slots: `(fault, value)`.
    ///
    /// Exactly one of the two is `Some`.
    pub fn into_slots(self) -> (Option<Fault<F>>, Option<T>) {
        match self.0 {
            Slots::Failure(fault) => (Some(fault), None),
            Slots::Success(value) => (None, Some(value)),
        }
    }

    /// Run `on_success` with the payload if this is a success.
    ///
    /// On a success the callback runs once and `None` is returned, since
    /// there is no fault. On a failure the callback is skipped and the fault
    /// itself is returned.
    pub fn succeeded<C: FnOnce(&T)>(&self, on_success: C) -> Option<&Fault<F>> {
        match &self.0 {
            Slots::Success(value) => {
                on_success(value);
                None
            }
            Slots::Failure(fault) => Some(fault),
        }
    }

    /// Run `on_failure` with the fault if this is a failure.
    ///
    /// On a failure the callback runs once and `None` is returned, since
    /// there is no value. On a success the callback is skipped and the
    /// payload itself is returned, so
    /// `let value = maybe.failed(|fault| tracing::warn!(%fault))` reads as
    /// "the value, or nothing after logging the fault".
    pub fn failed<C: FnOnce(&Fault<F>)>(&self, on_failure: C) -> Option<&T> {
        match &self.0 {
            Slots::Failure(fault) => {
                on_failure(fault);
                None
            }
            Slots::Success(value) => Some(value),
        }
    }
}

impl<T, F> From<Maybe<T, F>> for (Option<Fault<F>>, Option<T>) {
    fn from(maybe: Maybe<T, F>) -> Self {
        maybe.into_slots()
    }
}

impl<T, F> From<Maybe<T, F>> for Result<T, Fault<F>> {
    fn from(maybe: Maybe<T, F>) -> Self {
        match maybe.0 {
            Slots::Success(value) => Ok(value),
            Slots::Failure(fault) => Err(fault),
        }
    }
}

/// Build a success carrying `value` verbatim.
pub const fn succeed<T, F>(value: T) -> Maybe<T, F> {
    Maybe(Slots::Success(value))
}

/// Build a success with no payload.
pub const fn succeed_unit<F>() -> Maybe<(), F> {
    succeed(())
}

/// Build a failure labelled from `description`, with an [`Empty`] payload.
pub fn fail<T, D: Describe>(description: D) -> Maybe<T> {
    fail_with(description, Empty {})
}

/// Build a failure labelled from `description`, carrying `data`.
pub fn fail_with<T, D: Describe, F>(description: D, data: F) -> Maybe<T, F> {
    Maybe(Slots::Failure(Fault::mint(description.describe(), data)))
}

/// Build an unlabelled failure with an [`Empty`] payload.
pub fn fail_bare<T>() -> Maybe<T> {
    fail(())
}
