//! Nesting-limited JSON rendering.
//!
//! `serde_json` follows a value as deep as its `Serialize` impl goes, which
//! never ends for a structure that refers back to itself. [`to_json`] wraps
//! the serializer so every nested value passes through a depth check and the
//! whole render fails once `limit` levels are exceeded.

use std::cell::Cell;
use std::fmt;

use serde::ser::{self, Error as _, Serialize, Serializer};

use crate::error::{Error, Result};

/// Deepest nesting rendered before giving up.
pub const MAX_DEPTH: usize = 128;

/// Render `value` as compact JSON, refusing to nest deeper than `limit`.
///
/// # Errors
///
/// [`Error::NestingTooDeep`] past `limit`, [`Error::SerializeFailed`] when
/// `value` itself fails to serialize.
pub fn to_json<S: Serialize + ?Sized>(value: &S, limit: usize) -> Result<String> {
    let tripped = Cell::new(false);
    let budget = Budget {
        depth: 0,
        limit,
        tripped: &tripped,
    };
    let mut out = Vec::new();
    let rendered = Guard { value, budget }.serialize(&mut serde_json::Serializer::new(&mut out));
    match rendered {
        Err(_) if tripped.get() => Err(Error::nesting_too_deep(limit)),
        Err(e) => Err(Error::serialize_failed(e.to_string())),
        Ok(()) => String::from_utf8(out).map_err(|e| Error::serialize_failed(e.to_string())),
    }
}

/// Render `value` with `{:?}`, refusing to write more than `limit` bytes.
///
/// # Errors
///
/// [`Error::SerializeFailed`] once the text would exceed `limit`.
pub fn to_debug<T: fmt::Debug + ?Sized>(value: &T, limit: usize) -> Result<String> {
    use fmt::Write as _;

    let mut capped = Capped {
        text: String::new(),
        remaining: limit,
    };
    write!(capped, "{value:?}")
        .map(|()| capped.text)
        .map_err(|_| Error::serialize_failed(format!("debug text exceeds {limit} bytes")))
}

struct Capped {
    text: String,
    remaining: usize,
}

impl fmt::Write for Capped {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let rest = self.remaining.checked_sub(s.len()).ok_or(fmt::Error)?;
        self.remaining = rest;
        self.text.push_str(s);
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Budget<'a> {
    depth: usize,
    limit: usize,
    tripped: &'a Cell<bool>,
}

impl Budget<'_> {
    const fn nested(self) -> Self {
        Self {
            depth: self.depth.saturating_add(1),
            ..self
        }
    }
}

/// A value about to be rendered one level further down.
struct Guard<'a, 'b, T: ?Sized> {
    value: &'a T,
    budget: Budget<'b>,
}

impl<T: Serialize + ?Sized> Serialize for Guard<'_, '_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.budget.depth > self.budget.limit {
            self.budget.tripped.set(true);
            return Err(S::Error::custom(format!(
                "nesting exceeds {} levels",
                self.budget.limit
            )));
        }
        self.value.serialize(Bounded {
            inner: serializer,
            budget: self.budget,
        })
    }
}

struct Bounded<'b, S> {
    inner: S,
    budget: Budget<'b>,
}

impl<'b, S> Bounded<'b, S> {
    const fn child<'a, T: ?Sized>(&self, value: &'a T) -> Guard<'a, 'b, T> {
        Guard {
            value,
            budget: self.budget.nested(),
        }
    }
}

struct Compound<'b, C> {
    inner: C,
    budget: Budget<'b>,
}

impl<'b, C> Compound<'b, C> {
    const fn child<'a, T: ?Sized>(&self, value: &'a T) -> Guard<'a, 'b, T> {
        Guard {
            value,
            budget: self.budget.nested(),
        }
    }
}

macro_rules! forward_primitive {
    ($($method:ident($t:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $t) -> std::result::Result<Self::Ok, Self::Error> {
                self.inner.$method(v)
            }
        )*
    };
}

impl<'b, S: Serializer> Serializer for Bounded<'b, S> {
    type Ok = S::Ok;
    type Error = S::Error;
    type SerializeSeq = Compound<'b, S::SerializeSeq>;
    type SerializeTuple = Compound<'b, S::SerializeTuple>;
    type SerializeTupleStruct = Compound<'b, S::SerializeTupleStruct>;
    type SerializeTupleVariant = Compound<'b, S::SerializeTupleVariant>;
    type SerializeMap = Compound<'b, S::SerializeMap>;
    type SerializeStruct = Compound<'b, S::SerializeStruct>;
    type SerializeStructVariant = Compound<'b, S::SerializeStructVariant>;

    forward_primitive!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    );

    fn serialize_none(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.serialize_none()
    }

    fn serialize_some<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> std::result::Result<Self::Ok, Self::Error> {
        let child = self.child(value);
        self.inner.serialize_some(&child)
    }

    fn serialize_unit(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit()
    }

    fn serialize_unit_struct(
        self,
        name: &'static str,
    ) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit_struct(name)
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
    ) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.serialize_unit_variant(name, variant_index, variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> std::result::Result<Self::Ok, Self::Error> {
        let child = self.child(value);
        self.inner.serialize_newtype_struct(name, &child)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> std::result::Result<Self::Ok, Self::Error> {
        let child = self.child(value);
        self.inner
            .serialize_newtype_variant(name, variant_index, variant, &child)
    }

    fn serialize_seq(
        self,
        len: Option<usize>,
    ) -> std::result::Result<Self::SerializeSeq, Self::Error> {
        Ok(Compound {
            inner: self.inner.serialize_seq(len)?,
            budget: self.budget,
        })
    }

    fn serialize_tuple(self, len: usize) -> std::result::Result<Self::SerializeTuple, Self::Error> {
        Ok(Compound {
            inner: self.inner.serialize_tuple(len)?,
            budget: self.budget,
        })
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> std::result::Result<Self::SerializeTupleStruct, Self::Error> {
        Ok(Compound {
            inner: self.inner.serialize_tuple_struct(name, len)?,
            budget: self.budget,
        })
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> std::result::Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(Compound {
            inner: self
                .inner
                .serialize_tuple_variant(name, variant_index, variant, len)?,
            budget: self.budget,
        })
    }

    fn serialize_map(
        self,
        len: Option<usize>,
    ) -> std::result::Result<Self::SerializeMap, Self::Error> {
        Ok(Compound {
            inner: self.inner.serialize_map(len)?,
            budget: self.budget,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> std::result::Result<Self::SerializeStruct, Self::Error> {
        Ok(Compound {
            inner: self.inner.serialize_struct(name, len)?,
            budget: self.budget,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> std::result::Result<Self::SerializeStructVariant, Self::Error> {
        Ok(Compound {
            inner: self
                .inner
                .serialize_struct_variant(name, variant_index, variant, len)?,
            budget: self.budget,
        })
    }

    fn is_human_readable(&self) -> bool {
        self.inner.is_human_readable()
    }
}

impl<C: ser::SerializeSeq> ser::SerializeSeq for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_element(&child)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTuple> ser::SerializeTuple for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_element<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_element(&child)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleStruct> ser::SerializeTupleStruct for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_field(&child)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeTupleVariant> ser::SerializeTupleVariant for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_field(&child)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeMap> ser::SerializeMap for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_key<T: Serialize + ?Sized>(
        &mut self,
        key: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(key);
        self.inner.serialize_key(&child)
    }

    fn serialize_value<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_value(&child)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStruct> ser::SerializeStruct for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_field(key, &child)
    }

    fn skip_field(&mut self, key: &'static str) -> std::result::Result<(), Self::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}

impl<C: ser::SerializeStructVariant> ser::SerializeStructVariant for Compound<'_, C> {
    type Ok = C::Ok;
    type Error = C::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> std::result::Result<(), Self::Error> {
        let child = self.child(value);
        self.inner.serialize_field(key, &child)
    }

    fn skip_field(&mut self, key: &'static str) -> std::result::Result<(), Self::Error> {
        self.inner.skip_field(key)
    }

    fn end(self) -> std::result::Result<Self::Ok, Self::Error> {
        self.inner.end()
    }
}
