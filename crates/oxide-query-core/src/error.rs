//! Error types for schema registration, compilation and binding.

use thiserror::Error;

use crate::types::TypeTag;

/// Errors raised while building or querying the schema registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The mapped type was never registered.
    #[error("type `{type_name}` is not mapped to a table")]
    UnmappedType {
        /// Rust name of the unmapped type.
        type_name: String,
    },

    /// The member is not a registered column of the table.
    #[error("member `{member}` is not a column of table `{table}`")]
    ColumnNotFound {
        /// Table name.
        table: String,
        /// Member identity that was looked up.
        member: String,
    },

    /// Two registrations share a table name or a mapped type.
    #[error("table `{0}` is registered more than once")]
    DuplicateTable(String),

    /// A table declares the same member or column name twice.
    #[error("table `{table}` declares column `{column}` more than once")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Duplicated member or column name.
        column: String,
    },

    /// Primary-key statements were requested for a table without a primary key.
    #[error("table `{0}` has no primary key")]
    MissingPrimaryKey(String),

    /// A record UPDATE was requested for a table whose columns are all
    /// primary key or generated.
    #[error("table `{0}` has no column an UPDATE can set")]
    NoUpdatableColumns(String),

    /// A primary-key lookup supplied the wrong number of key values.
    #[error("table `{table}` has {expected} primary key column(s), {found} value(s) supplied")]
    PrimaryKeyArity {
        /// Table name.
        table: String,
        /// Number of primary key columns.
        expected: usize,
        /// Number of supplied key values.
        found: usize,
    },
}

/// Errors detected while type-checking or serializing a query tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A schema lookup failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A function was called with the wrong number of arguments.
    #[error("function `{function}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        /// Function name.
        function: String,
        /// Declared arity.
        expected: usize,
        /// Supplied argument count.
        found: usize,
    },

    /// A pointer argument carries a different tag than the declared slot.
    #[error("argument {position} of `{function}` expects pointer `{expected}`, found {found}")]
    PointerTypeMismatch {
        /// Function name.
        function: String,
        /// Zero-based argument position.
        position: usize,
        /// Declared pointer tag.
        expected: &'static str,
        /// Description of the supplied argument.
        found: String,
    },

    /// The arms of a compound SELECT have different result types.
    #[error("{operator} arms have different types: {left} vs {right}")]
    CompoundTypeMismatch {
        /// Compound operator keyword.
        operator: &'static str,
        /// Left arm type.
        left: TypeTag,
        /// Right arm type.
        right: TypeTag,
    },

    /// No common type exists for the arguments of a unifying function.
    #[error("function `{function}` has no common type for its arguments")]
    NoCommonType {
        /// Function name.
        function: String,
    },

    /// A common table expression name is referenced outside its WITH clause.
    #[error("common table expression `{0}` is not in scope")]
    UnknownMoniker(String),

    /// A SELECT projects no columns.
    #[error("SELECT must project at least one column")]
    EmptySelect,

    /// An UPDATE or upsert `DO UPDATE` sets no columns.
    #[error("SET must assign at least one column")]
    EmptyAssignments,
}

/// Errors raised while binding parameter values to a statement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    /// The number of supplied values differs from the number of parameters.
    #[error("statement has {expected} parameter(s), {found} value(s) supplied")]
    BindCountMismatch {
        /// Parameters found by the walker.
        expected: usize,
        /// Values supplied by the caller.
        found: usize,
    },

    /// The executor rejected a value.
    #[error("cannot bind parameter {index}: {message}")]
    BindValueError {
        /// One-based parameter index.
        index: usize,
        /// Executor message.
        message: String,
    },
}

impl BindError {
    /// Creates a value error for slot `index`.
    #[must_use]
    pub fn value(index: usize, message: impl Into<String>) -> Self {
        Self::BindValueError {
            index,
            message: message.into(),
        }
    }
}

/// Any error produced by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Schema registration or lookup error.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Type-checking or serialization error.
    #[error("type error: {0}")]
    Type(#[from] TypeError),

    /// Binding error.
    #[error("bind error: {0}")]
    Bind(#[from] BindError),
}

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
