//! SQL text for statements whose identifiers come from the discovered
//! schema. Identifiers are always taken from the catalog and quoted; values
//! are always bound as parameters.

use super::schema::{LogicalField, Payload, ResolvedSchema, RoleTable};
use super::SqlValue;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatementError {
    #[error("no recognised columns to insert")]
    Empty,
    #[error("column {0} is not part of the discovered schema")]
    UnknownColumn(String),
}

/// Quotes an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL type a bound value is cast to before it reaches a column of the
/// given catalog type. Text columns, and types with no safe literal form,
/// take the parameter as is.
pub fn cast_type(data_type: &str) -> Option<&'static str> {
    match data_type.trim().to_ascii_lowercase().as_str() {
        "smallint" => Some("SMALLINT"),
        "integer" => Some("INTEGER"),
        "bigint" => Some("BIGINT"),
        "numeric" => Some("NUMERIC"),
        "real" => Some("REAL"),
        "double precision" => Some("DOUBLE PRECISION"),
        "boolean" => Some("BOOLEAN"),
        "date" => Some("DATE"),
        "timestamp without time zone" => Some("TIMESTAMP"),
        "timestamp with time zone" => Some("TIMESTAMPTZ"),
        "uuid" => Some("UUID"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InsertValue {
    column: String,
    cast: Option<&'static str>,
    value: SqlValue,
}

/// A single-row insert restricted to discovered columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    table: String,
    values: Vec<InsertValue>,
}

impl InsertStatement {
    /// Validates every payload key against the schema's columns and picks
    /// the cast for each from its catalog type.
    pub fn new(schema: &ResolvedSchema, payload: Payload) -> Result<Self, StatementError> {
        if payload.is_empty() {
            return Err(StatementError::Empty);
        }
        if let Some(unknown) = payload.keys().find(|k| !schema.columns.contains_real(k)) {
            return Err(StatementError::UnknownColumn(unknown.clone()));
        }
        let values = payload
            .into_iter()
            .map(|(column, value)| InsertValue {
                cast: schema.columns.data_type(&column).and_then(cast_type),
                column,
                value,
            })
            .collect();
        Ok(Self {
            table: schema.table.clone(),
            values,
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.column.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.values.iter().map(|v| &v.value)
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values.iter().find(|v| v.column == column).map(|v| &v.value)
    }

    /// Cast applied to `column`'s parameter, if any.
    pub fn cast(&self, column: &str) -> Option<&'static str> {
        self.values.iter().find(|v| v.column == column).and_then(|v| v.cast)
    }

    pub fn to_sql(&self) -> String {
        let columns: Vec<String> = self.columns().map(quote_ident).collect();
        let params: Vec<String> = self
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| match v.cast {
                Some(sql_type) => format!("CAST(${} AS {sql_type})", i + 1),
                None => format!("${}", i + 1),
            })
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            columns.join(", "),
            params.join(", ")
        )
    }
}

/// Looks up one account by exact match on a single column, pulling the
/// role name through the role table when both sides of the join exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountQuery {
    pub table: String,
    pub id_column: Option<String>,
    pub email_column: Option<String>,
    pub display_name_column: Option<String>,
    pub password_column: Option<String>,
    pub status_column: Option<String>,
    pub role_column: Option<String>,
    pub role_join: Option<RoleTable>,
    pub match_column: String,
    pub value: String,
}

impl AccountQuery {
    /// `None` when the schema has no column for `field`.
    pub fn by_field(schema: &ResolvedSchema, field: LogicalField, value: &str) -> Option<Self> {
        let owned = |f: LogicalField| schema.column(f).map(str::to_string);
        let match_column = owned(field)?;
        let role_column = owned(LogicalField::Role);
        let role_join = role_column.as_ref().and(schema.role_table.clone());

        Some(Self {
            table: schema.table.clone(),
            id_column: owned(LogicalField::Id),
            email_column: owned(LogicalField::Email),
            display_name_column: owned(LogicalField::DisplayName),
            password_column: owned(LogicalField::PasswordHash),
            status_column: owned(LogicalField::Status),
            role_column,
            role_join,
            match_column,
            value: value.to_string(),
        })
    }

    pub fn to_sql(&self) -> String {
        let user_col = |column: &Option<String>, sql_type: &str, alias: &str| match column {
            Some(c) => format!("CAST(u.{} AS {sql_type}) AS {alias}", quote_ident(c)),
            None => format!("CAST(NULL AS {sql_type}) AS {alias}"),
        };

        let mut select = vec![
            user_col(&self.id_column, "BIGINT", "user_id"),
            user_col(&self.email_column, "TEXT", "email"),
            user_col(&self.display_name_column, "TEXT", "display_name"),
            user_col(&self.password_column, "TEXT", "password_hash"),
            user_col(&self.status_column, "TEXT", "status"),
        ];

        let join = match (&self.role_join, &self.role_column) {
            (Some(role), Some(role_column)) => {
                select.push(format!("CAST(r.{} AS TEXT) AS role_name", quote_ident(&role.name_column)));
                format!(
                    " LEFT JOIN {} r ON r.{} = u.{}",
                    quote_ident(&role.table),
                    quote_ident(&role.id_column),
                    quote_ident(role_column)
                )
            }
            _ => {
                select.push("CAST(NULL AS TEXT) AS role_name".to_string());
                String::new()
            }
        };

        format!(
            "SELECT {} FROM {} u{} WHERE u.{} = $1 LIMIT 1",
            select.join(", "),
            quote_ident(&self.table),
            join,
            quote_ident(&self.match_column)
        )
    }
}

/// Every role with a usable id.
pub fn role_select_sql(role: &RoleTable) -> String {
    format!(
        "SELECT CAST({id} AS BIGINT) AS id, CAST({name} AS TEXT) AS name FROM {table} WHERE {id} IS NOT NULL",
        id = quote_ident(&role.id_column),
        name = quote_ident(&role.name_column),
        table = quote_ident(&role.table),
    )
}

pub const TABLE_NAMES_SQL: &str = "SELECT CAST(table_name AS TEXT) AS table_name \
     FROM information_schema.tables \
     WHERE table_schema = current_schema() AND table_type = 'BASE TABLE' \
     ORDER BY table_name";

pub const COLUMNS_SQL: &str = "SELECT CAST(column_name AS TEXT) AS column_name, \
     CAST(data_type AS TEXT) AS data_type \
     FROM information_schema.columns \
     WHERE table_schema = current_schema() AND table_name = $1 \
     ORDER BY ordinal_position";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CatalogColumn, ColumnMap};

    fn schema(columns: &[&str], role_table: Option<RoleTable>) -> ResolvedSchema {
        ResolvedSchema {
            table: "Usuario".into(),
            columns: ColumnMap::from_names(columns.iter().copied()),
            role_table,
        }
    }

    fn rol() -> RoleTable {
        RoleTable {
            table: "Rol".into(),
            id_column: "Codigo_Rol".into(),
            name_column: "Nombre".into(),
        }
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("Usuario"), "\"Usuario\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn insert_binds_every_value() {
        let schema = schema(&["Correo", "Nombre", "Estado"], None);
        let mut payload = Payload::new();
        payload.insert("Correo".into(), SqlValue::text("a@b.com"));
        payload.insert("Estado".into(), SqlValue::text("Activo"));

        let stmt = InsertStatement::new(&schema, payload).unwrap();
        assert_eq!(
            stmt.to_sql(),
            "INSERT INTO \"Usuario\" (\"Correo\", \"Estado\") VALUES ($1, $2)"
        );
        assert_eq!(stmt.values().count(), 2);
        assert_eq!(stmt.get("Estado"), Some(&SqlValue::text("Activo")));
    }

    #[test]
    fn insert_casts_to_discovered_column_types() {
        let schema = ResolvedSchema {
            table: "usuarios".into(),
            columns: ColumnMap::from_catalog([
                CatalogColumn::new("correo", "character varying"),
                CatalogColumn::new("documento", "bigint"),
                CatalogColumn::new("estado", "USER-DEFINED"),
            ]),
            role_table: None,
        };
        let mut payload = Payload::new();
        payload.insert("correo".into(), SqlValue::text("a@b.com"));
        payload.insert("documento".into(), SqlValue::text("1020"));
        payload.insert("estado".into(), SqlValue::text("Activo"));

        let stmt = InsertStatement::new(&schema, payload).unwrap();
        assert_eq!(
            stmt.to_sql(),
            "INSERT INTO \"usuarios\" (\"correo\", \"documento\", \"estado\") VALUES ($1, CAST($2 AS BIGINT), $3)"
        );
        assert_eq!(stmt.cast("documento"), Some("BIGINT"));
        assert_eq!(stmt.cast("correo"), None);
    }

    #[test]
    fn cast_types_are_a_closed_list() {
        assert_eq!(cast_type("integer"), Some("INTEGER"));
        assert_eq!(cast_type("Timestamp With Time Zone"), Some("TIMESTAMPTZ"));
        assert_eq!(cast_type("text"), None);
        assert_eq!(cast_type("bigint); DROP TABLE x; --"), None);
    }

    #[test]
    fn insert_rejects_empty_and_unknown() {
        let schema = schema(&["Correo"], None);
        assert_eq!(InsertStatement::new(&schema, Payload::new()), Err(StatementError::Empty));

        let mut payload = Payload::new();
        payload.insert("correo; DROP TABLE x".into(), SqlValue::text("x"));
        assert!(matches!(
            InsertStatement::new(&schema, payload),
            Err(StatementError::UnknownColumn(_))
        ));
    }

    #[test]
    fn account_query_joins_role_table() {
        let schema = schema(&["Codigo_Usuario", "Correo", "Contrasena", "Estado", "Rol_Id"], Some(rol()));
        let query = AccountQuery::by_field(&schema, LogicalField::Email, "a@b.com").unwrap();
        let sql = query.to_sql();

        assert!(sql.contains("CAST(u.\"Codigo_Usuario\" AS BIGINT) AS user_id"));
        assert!(sql.contains("CAST(NULL AS TEXT) AS display_name"));
        assert!(sql.contains("LEFT JOIN \"Rol\" r ON r.\"Codigo_Rol\" = u.\"Rol_Id\""));
        assert!(sql.ends_with("WHERE u.\"Correo\" = $1 LIMIT 1"));
        assert!(!sql.contains("a@b.com"));
    }

    #[test]
    fn account_query_without_role_column_skips_join() {
        let schema = schema(&["Correo", "Contrasena"], Some(rol()));
        let query = AccountQuery::by_field(&schema, LogicalField::Email, "a@b.com").unwrap();
        assert!(query.role_join.is_none());
        assert!(query.to_sql().contains("CAST(NULL AS TEXT) AS role_name"));
    }

    #[test]
    fn account_query_needs_match_column() {
        let schema = schema(&["Correo", "Contrasena"], None);
        assert!(AccountQuery::by_field(&schema, LogicalField::DisplayName, "Ana").is_none());
    }

    #[test]
    fn role_select_filters_null_ids() {
        assert_eq!(
            role_select_sql(&rol()),
            "SELECT CAST(\"Codigo_Rol\" AS BIGINT) AS id, CAST(\"Nombre\" AS TEXT) AS name FROM \"Rol\" WHERE \"Codigo_Rol\" IS NOT NULL"
        );
    }
}
