//! Runtime scalar values and their static types.
//!
//! Every value that ends up in a query tree is stored as a [`Bindable`]: the
//! [`Scalar`] that is sent to SQLite plus the [`TypeTag`] of the Rust value it
//! came from. Keeping the static type next to the scalar lets type inference
//! see `Option<i64>` even when the value is `None`.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::types::TypeTag;

/// An opaque value passed through SQLite's pointer-passing interface.
///
/// The tag names the pointer type; functions declaring a pointer argument
/// slot only accept pointers carrying the same tag.
#[derive(Clone)]
pub struct PointerValue {
    tag: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl PointerValue {
    /// Wraps `value` under the pointer type `tag`.
    pub fn new<T: Any + Send + Sync>(tag: &'static str, value: T) -> Self {
        Self {
            tag,
            value: Arc::new(value),
        }
    }

    /// Returns the pointer type tag.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        self.tag
    }

    /// Returns the pointee, if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns the shared pointee.
    #[must_use]
    pub fn shared(&self) -> Arc<dyn Any + Send + Sync> {
        Arc::clone(&self.value)
    }
}

impl fmt::Debug for PointerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerValue")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl PartialEq for PointerValue {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && Arc::ptr_eq(&self.value, &other.value)
    }
}

/// A SQL value that can be bound to a statement slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// NULL value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Float value.
    Double(f64),
    /// Text value.
    Text(String),
    /// Binary blob value.
    Blob(Vec<u8>),
    /// Tagged pointer value.
    Pointer(PointerValue),
}

impl Scalar {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// Pointers have no textual form and render as `NULL`.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null | Self::Pointer(_) => String::from("NULL"),
            Self::Bool(b) => {
                if *b {
                    String::from("TRUE")
                } else {
                    String::from("FALSE")
                }
            }
            Self::Int(n) => format!("{n}"),
            Self::Double(f) => double_literal(*f),
            Self::Text(s) => {
                // Escape single quotes by doubling them
                let escaped = s.replace('\'', "''");
                format!("'{escaped}'")
            }
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Returns true for `NULL`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the pointer tag when this is a pointer value.
    #[must_use]
    pub const fn pointer_tag(&self) -> Option<&'static str> {
        match self {
            Self::Pointer(p) => Some(p.tag()),
            _ => None,
        }
    }

    /// Returns the dynamic type of the scalar, ignoring any static type.
    #[must_use]
    pub fn dynamic_type(&self) -> TypeTag {
        match self {
            Self::Null => TypeTag::Null,
            Self::Bool(_) => TypeTag::Bool,
            Self::Int(_) => TypeTag::Int,
            Self::Double(_) => TypeTag::Double,
            Self::Text(_) => TypeTag::Text,
            Self::Blob(_) => TypeTag::Blob,
            Self::Pointer(p) => TypeTag::Pointer(p.tag()),
        }
    }
}

fn double_literal(f: f64) -> String {
    if f.is_nan() {
        return String::from("NULL");
    }
    if f.is_infinite() {
        return String::from(if f > 0.0 { "9e999" } else { "-9e999" });
    }
    // `{:?}` always keeps a decimal point or exponent, so SQLite reads a REAL.
    format!("{f:?}")
}

/// A scalar together with the static type of the value it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Bindable {
    /// The runtime value.
    pub value: Scalar,
    /// The static type of the source value.
    pub ty: TypeTag,
}

impl Bindable {
    /// Converts a Rust value, recording its static type.
    pub fn new<T: ToScalar>(value: T) -> Self {
        Self {
            ty: value.static_type(),
            value: value.to_scalar(),
        }
    }

    /// Wraps a scalar using its dynamic type.
    #[must_use]
    pub fn from_scalar(value: Scalar) -> Self {
        Self {
            ty: value.dynamic_type(),
            value,
        }
    }
}

/// Trait for types that can be converted to SQL values.
pub trait ToScalar {
    /// The static type of values of this Rust type.
    fn type_tag() -> TypeTag
    where
        Self: Sized;

    /// The static type of this particular value.
    ///
    /// Only dynamically typed values (`Scalar`, `PointerValue`) override this.
    fn static_type(&self) -> TypeTag
    where
        Self: Sized,
    {
        Self::type_tag()
    }

    /// Converts the value to a `Scalar`.
    fn to_scalar(self) -> Scalar;
}

impl ToScalar for Scalar {
    fn type_tag() -> TypeTag {
        TypeTag::Null
    }

    fn static_type(&self) -> TypeTag {
        self.dynamic_type()
    }

    fn to_scalar(self) -> Scalar {
        self
    }
}

impl ToScalar for bool {
    fn type_tag() -> TypeTag {
        TypeTag::Bool
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Bool(self)
    }
}

macro_rules! impl_to_scalar_int {
    ($($ty:ty),+) => {
        $(
            impl ToScalar for $ty {
                fn type_tag() -> TypeTag {
                    TypeTag::Int
                }

                fn to_scalar(self) -> Scalar {
                    Scalar::Int(i64::from(self))
                }
            }
        )+
    };
}

impl_to_scalar_int!(i64, i32, i16, i8, u32, u16, u8);

impl ToScalar for f64 {
    fn type_tag() -> TypeTag {
        TypeTag::Double
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Double(self)
    }
}

impl ToScalar for f32 {
    fn type_tag() -> TypeTag {
        TypeTag::Double
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Double(f64::from(self))
    }
}

impl ToScalar for String {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Text(self)
    }
}

impl ToScalar for &str {
    fn type_tag() -> TypeTag {
        TypeTag::Text
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Text(String::from(self))
    }
}

impl<T: ToScalar> ToScalar for Option<T> {
    fn type_tag() -> TypeTag {
        TypeTag::optional(T::type_tag())
    }

    fn to_scalar(self) -> Scalar {
        match self {
            Some(v) => v.to_scalar(),
            None => Scalar::Null,
        }
    }
}

impl ToScalar for Vec<u8> {
    fn type_tag() -> TypeTag {
        TypeTag::Blob
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Blob(self)
    }
}

impl ToScalar for &[u8] {
    fn type_tag() -> TypeTag {
        TypeTag::Blob
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Blob(self.to_vec())
    }
}

impl ToScalar for PointerValue {
    fn type_tag() -> TypeTag {
        TypeTag::Null
    }

    fn static_type(&self) -> TypeTag {
        TypeTag::Pointer(self.tag)
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Pointer(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_inline_null() {
        assert_eq!(Scalar::Null.to_sql_inline(), "NULL");
    }

    #[test]
    fn test_scalar_inline_bool() {
        assert_eq!(Scalar::Bool(true).to_sql_inline(), "TRUE");
        assert_eq!(Scalar::Bool(false).to_sql_inline(), "FALSE");
    }

    #[test]
    fn test_scalar_inline_numbers() {
        assert_eq!(Scalar::Int(-100).to_sql_inline(), "-100");
        assert_eq!(Scalar::Double(2.0).to_sql_inline(), "2.0");
        assert_eq!(Scalar::Double(0.25).to_sql_inline(), "0.25");
        assert_eq!(Scalar::Double(f64::NAN).to_sql_inline(), "NULL");
    }

    #[test]
    fn test_scalar_inline_text_escaping() {
        assert_eq!(
            Scalar::Text(String::from("O'Brien")).to_sql_inline(),
            "'O''Brien'"
        );
        let malicious = "'; DROP TABLE users; --";
        assert_eq!(
            Scalar::Text(String::from(malicious)).to_sql_inline(),
            "'''; DROP TABLE users; --'"
        );
    }

    #[test]
    fn test_scalar_inline_blob() {
        assert_eq!(
            Scalar::Blob(vec![0x48, 0x45, 0x4C, 0x4C, 0x4F]).to_sql_inline(),
            "X'48454C4C4F'"
        );
    }

    #[test]
    fn test_bindable_keeps_static_type() {
        let none = Bindable::new(None::<i64>);
        assert_eq!(none.value, Scalar::Null);
        assert_eq!(none.ty, TypeTag::optional(TypeTag::Int));

        let text = Bindable::new("hello");
        assert_eq!(text.ty, TypeTag::Text);
        assert_eq!(text.value, Scalar::Text(String::from("hello")));
    }

    #[test]
    fn test_pointer_equality_is_identity() {
        let a = PointerValue::new("carray", vec![1_i64, 2, 3]);
        let b = a.clone();
        let c = PointerValue::new("carray", vec![1_i64, 2, 3]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast_ref::<Vec<i64>>(), Some(&vec![1, 2, 3]));
        assert_eq!(Scalar::Pointer(a).pointer_tag(), Some("carray"));
    }
}
