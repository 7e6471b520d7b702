//! Static result types of query expressions.

use core::fmt;

/// The inferred type of an expression or the row shape of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// No result (INSERT, UPDATE, DELETE).
    Unit,
    /// The type of a bare `NULL` value.
    Null,
    /// Boolean.
    Bool,
    /// 64-bit integer.
    Int,
    /// Double precision float.
    Double,
    /// Text.
    Text,
    /// Binary blob.
    Blob,
    /// A pointer passed through SQLite's pointer interface, with its tag.
    Pointer(&'static str),
    /// A nullable value.
    Optional(Box<TypeTag>),
    /// An ordered product of types (a row).
    Tuple(Vec<TypeTag>),
}

impl TypeTag {
    /// Wraps `inner` in `Optional`, never nesting two levels.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        match inner {
            Self::Optional(_) | Self::Null => inner,
            other => Self::Optional(Box::new(other)),
        }
    }

    /// Returns the type without any `Optional` wrapper.
    #[must_use]
    pub fn non_null(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    /// Returns true when the type admits `NULL`.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Null)
    }

    /// Returns true for `Bool`, `Int` and `Double`.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self.non_null(), Self::Bool | Self::Int | Self::Double)
    }

    /// Flattens nested tuples into the column-by-column list a row decoder
    /// reads.
    #[must_use]
    pub fn leaf_columns(&self) -> Vec<&Self> {
        let mut out = Vec::new();
        self.push_leaves(&mut out);
        out
    }

    fn push_leaves<'a>(&'a self, out: &mut Vec<&'a Self>) {
        match self {
            Self::Tuple(items) => {
                for item in items {
                    item.push_leaves(out);
                }
            }
            Self::Unit => {}
            other => out.push(other),
        }
    }

    /// Returns the SQLite type name used in `CAST(.. AS ..)`.
    #[must_use]
    pub fn sql_type(&self) -> &'static str {
        match self.non_null() {
            Self::Bool | Self::Int => "INTEGER",
            Self::Double => "REAL",
            Self::Text => "TEXT",
            Self::Blob | Self::Pointer(_) => "BLOB",
            Self::Unit | Self::Null | Self::Optional(_) | Self::Tuple(_) => "NUMERIC",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("()"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Double => f.write_str("double"),
            Self::Text => f.write_str("string"),
            Self::Blob => f.write_str("blob"),
            Self::Pointer(tag) => write!(f, "pointer<{tag}>"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// Deduces the common type of `types`, as used by `coalesce`, `ifnull`,
/// `nullif`, `min` and `max`.
///
/// `Optional` wrappers are stripped and `Null` is absorbed. Equal types unify
/// to themselves; a numeric mix unifies to `Double` when any member is a
/// `Double`, else to `Int`. Returns `None` when no common type exists.
#[must_use]
pub fn common_type(types: &[TypeTag]) -> Option<TypeTag> {
    let mut result: Option<TypeTag> = None;
    for ty in types {
        let ty = ty.non_null();
        if *ty == TypeTag::Null {
            continue;
        }
        result = Some(match result {
            None => ty.clone(),
            Some(current) if current == *ty => current,
            Some(current) if current.is_numeric() && ty.is_numeric() => {
                if current == TypeTag::Double || *ty == TypeTag::Double {
                    TypeTag::Double
                } else {
                    TypeTag::Int
                }
            }
            Some(_) => return None,
        });
    }
    Some(result.unwrap_or(TypeTag::Null))
}
