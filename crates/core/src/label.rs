//! Identity labels for faults.
//!
//! A fault is tagged with a [`Label`] derived from whatever the caller used to
//! describe it. The [`Describe`] trait maps each kind of description onto a
//! label:
//!
//! | description | label |
//! |---|---|
//! | `str`, `String`, `char` | the text itself |
//! | `i8`..`i32`, `u8`..`u32`, `f32`, `f64` | [`Label::Number`] |
//! | `()`, `None` | no label |
//! | [`callable`] | the declared name of the function |
//! | `i64`, `u64`, `i128`, `u128`, `isize`, `usize` | decimal text |
//! | [`Fault`] | that fault's own label |
//! | [`structured`], [`serde_json::Value`] | compact JSON, see [`structured`] for the fallbacks |
//! | `bool`, [`displayed`] | the `Display` text |
//!
//! Describing never fails.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::bounded;
use crate::error::Error;
use crate::fault::Fault;

/// Human-readable tag attached to a fault.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Text(String),
    Number(f64),
}

impl Label {
    /// The label text, if this is a text label.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// The label number, if this is a numeric label.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Label {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for Label {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for Label {
    fn from(number: f64) -> Self {
        Self::Number(number)
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.as_text() == Some(other)
    }
}

impl PartialEq<&str> for Label {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

/// Something that can describe a fault.
pub trait Describe {
    /// Produce the identity label for this description, if it has one.
    fn describe(&self) -> Option<Label>;
}

/// Normalize a description into a label.
pub fn normalize<D: Describe + ?Sized>(description: &D) -> Option<Label> {
    description.describe()
}

macro_rules! describe_as_number {
    ($($t:ty),* $(,)?) => {
        $(
            impl Describe for $t {
                fn describe(&self) -> Option<Label> {
                    Some(Label::Number(f64::from(*self)))
                }
            }
        )*
    };
}

// Integers that do not fit losslessly in an f64 are labelled by their digits.
macro_rules! describe_as_text {
    ($($t:ty),* $(,)?) => {
        $(
            impl Describe for $t {
                fn describe(&self) -> Option<Label> {
                    Some(Label::Text(self.to_string()))
                }
            }
        )*
    };
}

describe_as_number!(i8, i16, i32, u8, u16, u32, f32, f64);
describe_as_text!(i64, u64, i128, u128, isize, usize, bool, char, str, String);

impl Describe for Cow<'_, str> {
    fn describe(&self) -> Option<Label> {
        Some(Label::Text(self.to_string()))
    }
}

impl Describe for () {
    fn describe(&self) -> Option<Label> {
        None
    }
}

impl<D: Describe> Describe for Option<D> {
    fn describe(&self) -> Option<Label> {
        self.as_ref().and_then(Describe::describe)
    }
}

impl<D: Describe + ?Sized> Describe for &D {
    fn describe(&self) -> Option<Label> {
        (**self).describe()
    }
}

impl<D: Describe + ?Sized> Describe for Box<D> {
    fn describe(&self) -> Option<Label> {
        (**self).describe()
    }
}

impl<F> Describe for Fault<F> {
    fn describe(&self) -> Option<Label> {
        self.label().cloned()
    }
}

impl Describe for Value {
    fn describe(&self) -> Option<Label> {
        match self {
            Self::String(text) => Some(Label::Text(text.clone())),
            Self::Number(number) => Some(describe_number(number)),
            other => structured(other).describe(),
        }
    }
}

/// Largest integer magnitude an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

// JSON integers are numbers while exact in an f64; wider ones keep their digits.
fn describe_number(number: &Number) -> Label {
    if let Some(integer) = number.as_i64() {
        return safe_integer(integer)
            .map_or_else(|| Label::Text(integer.to_string()), Label::Number);
    }
    if let Some(integer) = number.as_u64() {
        return Label::Text(integer.to_string());
    }
    number
        .as_f64()
        .map_or_else(|| Label::Text(number.to_string()), Label::Number)
}

#[allow(clippy::cast_precision_loss)]
const fn safe_integer(integer: i64) -> Option<f64> {
    if integer.unsigned_abs() <= MAX_SAFE_INTEGER {
        Some(integer as f64)
    } else {
        None
    }
}

/// A function described by its declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    name: String,
}

impl Callable {
    /// The declared name of the function.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Describe for Callable {
    fn describe(&self) -> Option<Label> {
        Some(Label::Text(self.name.clone()))
    }
}

/// Describe a function or closure by its declared name.
///
/// Function items yield their own name (`parse_config`), including methods
/// reached through a generic type (`Vec::<u8>::new` is `new`) or a trait
/// (`<String as Clone>::clone` is `clone`). Closures yield `{{closure}}`.
pub fn callable<C: ?Sized>(_function: &C) -> Callable {
    Callable {
        name: declared_name(type_name::<C>()),
    }
}

// Drops every `<...>` group (generic arguments, `<T as Trait>` qualifiers)
// and keeps the last path segment of what is left.
fn declared_name(path: &str) -> String {
    let mut depth = 0_usize;
    let mut previous = None;
    let mut outer = String::with_capacity(path.len());
    for ch in path.chars() {
        match ch {
            '<' => depth = depth.saturating_add(1),
            '>' if depth > 0 && previous != Some('-') => depth = depth.saturating_sub(1),
            _ if depth == 0 => outer.push(ch),
            _ => {}
        }
        previous = Some(ch);
    }
    outer
        .trim_end_matches(':')
        .rsplit("::")
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(path)
        .to_owned()
}

/// A composite value described by its JSON form.
#[derive(Debug, Clone, Copy)]
pub struct Structured<'a, S: ?Sized>(&'a S);

/// Largest `Debug` text used when serialization fails.
const DEBUG_TEXT_LIMIT: usize = 1024;

/// Describe a composite value by serializing it.
///
/// The label is the compact JSON text. Values nested deeper than 128 levels,
/// including structures that refer back to themselves, are labelled with
/// their type name. Values that fail to serialize for any other reason use
/// their `Debug` text, or the type name when that runs past 1 KiB.
pub const fn structured<S: Serialize + fmt::Debug + ?Sized>(value: &S) -> Structured<'_, S> {
    Structured(value)
}

impl<S: Serialize + fmt::Debug + ?Sized> Describe for Structured<'_, S> {
    fn describe(&self) -> Option<Label> {
        let text = bounded::to_json(self.0, bounded::MAX_DEPTH)
            .or_else(|error| match error {
                Error::NestingTooDeep { .. } => Err(error),
                _ => {
                    tracing::debug!(%error, "description is not serializable, using debug text");
                    bounded::to_debug(self.0, DEBUG_TEXT_LIMIT)
                }
            })
            .unwrap_or_else(|error| {
                tracing::debug!(%error, "description cannot be rendered, using its type name");
                type_name::<S>().to_owned()
            });
        Some(Label::Text(text))
    }
}

/// A value described by its `Display` text.
#[derive(Debug, Clone, Copy)]
pub struct Displayed<'a, T: ?Sized>(&'a T);

/// Describe any displayable value by its text.
pub const fn displayed<T: fmt::Display + ?Sized>(value: &T) -> Displayed<'_, T> {
    Displayed(value)
}

impl<T: fmt::Display + ?Sized> Describe for Displayed<'_, T> {
    fn describe(&self) -> Option<Label> {
        Some(Label::Text(self.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::net::Ipv4Addr;
    use std::rc::Rc;

    use serde::Serializer;
    use serde_json::json;

    use super::*;
    use crate::maybe::fail;

    fn parse_config() {}

    #[derive(Debug, Serialize)]
    struct Request {
        method: &'static str,
        retries: u8,
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[derive(Debug)]
    struct Node {
        next: RefCell<Option<Rc<Node>>>,
    }

    impl Serialize for Node {
        fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
            use serde::ser::SerializeStruct;

            let mut node = serializer.serialize_struct("Node", 1)?;
            node.serialize_field("next", &self.next.borrow().as_deref())?;
            node.end()
        }
    }

    struct Verbose;

    impl fmt::Debug for Verbose {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&"v".repeat(4096))
        }
    }

    impl Serialize for Verbose {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn test_text_is_unchanged() {
        assert_eq!(normalize("error"), Some(Label::from("error")));
        assert_eq!(normalize(&String::from("boom")), Some(Label::from("boom")));
        assert_eq!(normalize(&'x'), Some(Label::from("x")));
        assert_eq!(normalize(&Cow::Borrowed("cow")), Some(Label::from("cow")));
    }

    #[test]
    fn test_numbers_are_unchanged() {
        assert_eq!(normalize(&42_i32), Some(Label::Number(42.0)));
        assert_eq!(normalize(&7_u8), Some(Label::Number(7.0)));
        assert_eq!(normalize(&1.5_f64), Some(Label::Number(1.5)));
    }

    #[test]
    fn test_absent_has_no_label() {
        assert_eq!(normalize(&()), None);
        assert_eq!(normalize(&None::<&str>), None);
        assert_eq!(normalize(&Some("present")), Some(Label::from("present")));
    }

    #[test]
    fn test_large_integers_become_decimal_text() {
        assert_eq!(normalize(&9_007_199_254_740_993_i64), Some(Label::from("9007199254740993")));
        assert_eq!(normalize(&u128::MAX), Some(Label::Text(u128::MAX.to_string())));
        assert_eq!(normalize(&-5_isize), Some(Label::from("-5")));
    }

    #[test]
    fn test_callable_uses_declared_name() {
        assert_eq!(callable(&parse_config).name(), "parse_config");
        assert_eq!(normalize(&callable(&parse_config)), Some(Label::from("parse_config")));
    }

    #[test]
    fn test_closure_has_placeholder_name() {
        let closure = || 1;
        assert_eq!(callable(&closure).name(), "{{closure}}");
    }

    #[test]
    fn test_callable_through_generic_type_uses_method_name() {
        assert_eq!(callable(&Vec::<u8>::new).name(), "new");
        assert_eq!(callable(&Option::<i32>::is_some).name(), "is_some");
    }

    #[test]
    fn test_callable_through_trait_uses_method_name() {
        assert_eq!(callable(&<String as Clone>::clone).name(), "clone");
        assert_eq!(
            normalize(&callable(&<u8 as ToString>::to_string)),
            Some(Label::from("to_string"))
        );
    }

    #[test]
    fn test_declared_name_strips_generics() {
        assert_eq!(declared_name("app::parse::<i32>"), "parse");
        assert_eq!(declared_name("alloc::vec::Vec<u8>::new"), "new");
        assert_eq!(
            declared_name("std::collections::HashMap<alloc::string::String, alloc::vec::Vec<u8>>::insert"),
            "insert"
        );
        assert_eq!(declared_name("bare"), "bare");
    }

    #[test]
    fn test_declared_name_strips_qualified_self() {
        assert_eq!(
            declared_name("<alloc::string::String as core::clone::Clone>::clone"),
            "clone"
        );
        assert_eq!(
            declared_name("<app::Job<u8> as app::Run<fn() -> u8>>::run"),
            "run"
        );
    }

    #[test]
    fn test_fault_reuses_its_label() {
        let (fault, _) = fail::<(), _>("original").into_slots();
        let fault = fault.expect("fail yields a fault");
        assert_eq!(normalize(&fault), Some(Label::from("original")));

        let (unlabelled, _) = fail::<(), _>(()).into_slots();
        let unlabelled = unlabelled.expect("fail yields a fault");
        assert_eq!(normalize(&unlabelled), None);
    }

    #[test]
    fn test_structured_serializes_as_json() {
        let request = Request {
            method: "GET",
            retries: 3,
        };
        assert_eq!(
            normalize(&structured(&request)),
            Some(Label::from(r#"{"method":"GET","retries":3}"#))
        );
    }

    #[test]
    fn test_structured_falls_back_to_debug_text() {
        assert_eq!(
            normalize(&structured(&Unserializable)),
            Some(Label::from("Unserializable"))
        );

        let mut keyed = BTreeMap::new();
        keyed.insert((1, 2), "pair");
        assert_eq!(
            normalize(&structured(&keyed)),
            Some(Label::from(r#"{(1, 2): "pair"}"#))
        );
    }

    #[test]
    fn test_structured_cycle_uses_type_name() {
        let node = Rc::new(Node {
            next: RefCell::new(None),
        });
        *node.next.borrow_mut() = Some(Rc::clone(&node));

        let label = normalize(&structured(&*node));

        node.next.borrow_mut().take();
        assert_eq!(label, Some(Label::Text(type_name::<Node>().to_owned())));
    }

    #[test]
    fn test_structured_depth_limit() {
        let nest = |levels: usize| (0..levels).fold(json!(0), |inner, _| Value::Array(vec![inner]));

        let shallow = nest(64);
        assert_eq!(
            normalize(&shallow),
            Some(Label::Text(serde_json::to_string(&shallow).unwrap()))
        );
        assert_eq!(normalize(&nest(500)), Some(Label::from("serde_json::value::Value")));
    }

    #[test]
    fn test_structured_long_debug_text_uses_type_name() {
        assert_eq!(
            normalize(&structured(&Verbose)),
            Some(Label::Text(type_name::<Verbose>().to_owned()))
        );
    }

    #[test]
    fn test_json_integers_within_safe_range_are_numbers() {
        assert_eq!(normalize(&json!(5_000_000_000_i64)), Some(Label::Number(5e9)));
        assert_eq!(
            normalize(&json!(9_007_199_254_740_991_i64)),
            Some(Label::Number(9_007_199_254_740_991.0))
        );
        assert_eq!(
            normalize(&json!(-9_007_199_254_740_991_i64)),
            Some(Label::Number(-9_007_199_254_740_991.0))
        );
        assert_eq!(
            normalize(&json!(9_007_199_254_740_992_i64)),
            Some(Label::from("9007199254740992"))
        );
        assert_eq!(
            normalize(&json!(i64::MIN)),
            Some(Label::Text(i64::MIN.to_string()))
        );
    }

    #[test]
    fn test_json_values_follow_their_category() {
        assert_eq!(normalize(&json!("text")), Some(Label::from("text")));
        assert_eq!(normalize(&json!(12)), Some(Label::Number(12.0)));
        assert_eq!(normalize(&json!(2.5)), Some(Label::Number(2.5)));
        assert_eq!(
            normalize(&json!(9_007_199_254_740_993_u64)),
            Some(Label::from("9007199254740993"))
        );
        assert_eq!(normalize(&json!(null)), Some(Label::from("null")));
        assert_eq!(normalize(&json!({"a": [1, 2]})), Some(Label::from(r#"{"a":[1,2]}"#)));
    }

    #[test]
    fn test_anything_else_uses_display_text() {
        assert_eq!(normalize(&true), Some(Label::from("true")));
        assert_eq!(
            normalize(&displayed(&Ipv4Addr::LOCALHOST)),
            Some(Label::from("127.0.0.1"))
        );
    }

    #[test]
    fn test_label_display() {
        assert_eq!(Label::from("error").to_string(), "error");
        assert_eq!(Label::Number(42.0).to_string(), "42");
        assert_eq!(Label::Number(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_label_accessors() {
        assert_eq!(Label::from("x").as_text(), Some("x"));
        assert_eq!(Label::from("x").as_number(), None);
        assert_eq!(Label::Number(3.0).as_number(), Some(3.0));
        assert!(Label::from("x") == "x");
    }
}
