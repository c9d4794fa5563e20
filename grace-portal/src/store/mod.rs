//! Schema-discovering adapter over the hotel's users table.
//!
//! Nothing here assumes a fixed schema: the users table, its columns and the
//! role lookup table are found at runtime through the information schema and
//! every statement is built from what was actually discovered.

pub mod password;
pub mod pg;
pub mod roles;
pub mod schema;
pub mod statement;

use diesel::result::QueryResult;

pub use pg::PgUserStore;
pub use roles::Role;
pub use schema::{ColumnMap, LogicalField, Payload, ResolvedSchema, RoleTable};
pub use statement::{AccountQuery, InsertStatement, StatementError};

pub use crate::models::AccountRow;

/// A value bound into a dynamically built statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Integer(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
        }
    }
}

/// One column as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogColumn {
    pub name: String,
    /// `information_schema.columns.data_type`, e.g. `bigint` or `character varying`.
    pub data_type: Option<String>,
}

impl CatalogColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: Some(data_type.into()),
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }
}

/// The database operations the account flows need.
///
/// `PgUserStore` runs them against PostgreSQL through diesel; tests drive
/// the same flows through an in-memory catalog.
pub trait UserStore {
    /// Names of the base tables visible in the current schema, as stored.
    fn table_names(&mut self) -> QueryResult<Vec<String>>;

    /// Columns of `table` in ordinal order, names as stored.
    fn columns(&mut self, table: &str) -> QueryResult<Vec<CatalogColumn>>;

    /// Every row of the role lookup table that has an id.
    fn roles(&mut self, table: &RoleTable) -> QueryResult<Vec<Role>>;

    /// Runs a single parameterized insert, returning the affected row count.
    fn insert(&mut self, statement: &InsertStatement) -> QueryResult<usize>;

    /// First account matching the query, if any.
    fn find_account(&mut self, query: &AccountQuery) -> QueryResult<Option<AccountRow>>;

    /// Runs `f` inside one transaction: committed when it returns `Ok`,
    /// rolled back otherwise.
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<diesel::result::Error>;

    /// Runs `f` inside a savepoint of the current transaction. A failure
    /// rolls back to the savepoint and leaves the enclosing transaction
    /// usable.
    fn savepoint<T, F>(&mut self, f: F) -> QueryResult<T>
    where
        F: FnOnce(&mut Self) -> QueryResult<T>;
}
