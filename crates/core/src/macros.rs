//! Optional-argument forms of the constructors.

/// Build a success, with `()` as the payload when no value is given.
///
/// ```
/// use maybe_core::{succeed, Maybe};
///
/// let done: Maybe = succeed!();
/// assert_eq!(done.slots().1, Some(&()));
///
/// let answer: Maybe<i32> = succeed!(42);
/// assert_eq!(answer.slots().1, Some(&42));
/// ```
#[macro_export]
macro_rules! succeed {
    () => {
        $crate::succeed_unit()
    };
    ($value:expr $(,)?) => {
        $crate::succeed($value)
    };
}

/// Build a failure from an optional description and optional payload.
///
/// ```
/// use maybe_core::{fail, Label, Maybe};
///
/// let bare: Maybe = fail!();
/// assert_eq!(bare.slots().0.and_then(|fault| fault.label()), None);
///
/// let described: Maybe = fail!("timeout");
/// assert_eq!(described.slots().0.and_then(|fault| fault.label()), Some(&Label::from("timeout")));
///
/// let detailed: Maybe<(), u16> = fail!("http", 503);
/// assert_eq!(detailed.slots().0.map(|fault| *fault.data()), Some(503));
/// ```
#[macro_export]
macro_rules! fail {
    () => {
        $crate::fail_bare()
    };
    ($description:expr $(,)?) => {
        $crate::fail($description)
    };
    ($description:expr, $data:expr $(,)?) => {
        $crate::fail_with($description, $data)
    };
}
