#![allow(dead_code)]

use std::collections::BTreeMap;

use diesel::result::{DatabaseErrorKind, Error as DieselError, QueryResult};

use grace_portal::store::{
    AccountQuery, AccountRow, CatalogColumn, InsertStatement, Role, RoleTable, SqlValue, UserStore,
};

pub type Row = BTreeMap<String, SqlValue>;

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    pub unique: Vec<String>,
    pub not_null: Vec<String>,
    pub serial: Option<String>,
    /// Catalog type per column; untyped columns are `text`.
    pub types: BTreeMap<String, String>,
}

impl Table {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unique(mut self, column: &str) -> Self {
        self.unique.push(column.to_string());
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.not_null.push(column.to_string());
        self
    }

    pub fn typed(mut self, column: &str, data_type: &str) -> Self {
        self.types.insert(column.to_string(), data_type.to_string());
        self
    }

    fn data_type(&self, column: &str) -> &str {
        self.types.get(column).map(String::as_str).unwrap_or("text")
    }

    /// Column filled with the next integer on insert.
    pub fn serial(mut self, column: &str) -> Self {
        self.serial = Some(column.to_string());
        self
    }

    pub fn row(mut self, values: &[(&str, SqlValue)]) -> Self {
        self.rows
            .push(values.iter().map(|(k, v)| (k.to_string(), v.clone())).collect());
        self
    }

    fn next_serial(&self, column: &str) -> i64 {
        self.rows
            .iter()
            .filter_map(|r| r.get(column).and_then(SqlValue::as_integer))
            .max()
            .unwrap_or(0)
            + 1
    }
}

/// In-memory catalog implementing `UserStore` with PostgreSQL-like
/// constraint and type errors, transactional rollback, savepoints, and
/// transactions that refuse every statement after one has failed.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub tables: Vec<Table>,
    pub calls: Vec<&'static str>,
    pub commits: usize,
    pub rollbacks: usize,
    pub savepoint_rollbacks: usize,
    depth: usize,
    aborted: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn table(&self, name: &str) -> &Table {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("no table {name}"))
    }

    pub fn rows(&self, name: &str) -> &[Row] {
        &self.table(name).rows
    }

    fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name == name)
    }

    fn find(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    fn ensure_open(&self) -> QueryResult<()> {
        if self.aborted {
            return Err(db_error(
                DatabaseErrorKind::Unknown,
                "current transaction is aborted, commands ignored until end of transaction block".into(),
            ));
        }
        Ok(())
    }

    /// A failed statement inside a transaction poisons it.
    fn track<T>(&mut self, result: QueryResult<T>) -> QueryResult<T> {
        if result.is_err() && self.depth > 0 {
            self.aborted = true;
        }
        result
    }

    fn load_roles(&self, role: &RoleTable) -> QueryResult<Vec<Role>> {
        let table = self
            .find(&role.table)
            .ok_or_else(|| db_error(DatabaseErrorKind::Unknown, format!("relation \"{}\" does not exist", role.table)))?;
        table
            .rows
            .iter()
            .filter_map(|r| r.get(&role.id_column).map(|id| (r, id)))
            .map(|(r, id)| -> QueryResult<Role> {
                let id = id.as_integer().ok_or_else(|| {
                    db_error(
                        DatabaseErrorKind::Unknown,
                        format!("invalid input syntax for type bigint: \"{id}\""),
                    )
                })?;
                let name = r.get(&role.name_column).map(|v| v.to_string()).unwrap_or_default();
                Ok(Role { id, name })
            })
            .collect()
    }

    fn insert_row(&mut self, statement: &InsertStatement) -> QueryResult<usize> {
        let table = self
            .table_mut(statement.table())
            .ok_or_else(|| db_error(DatabaseErrorKind::Unknown, format!("relation \"{}\" does not exist", statement.table())))?;

        let mut row = Row::new();
        for (column, value) in statement.columns().zip(statement.values()) {
            row.insert(column.to_string(), coerce(table, statement, column, value)?);
        }

        if let Some(missing) = table.not_null.iter().find(|c| !row.contains_key(*c)) {
            return Err(db_error(
                DatabaseErrorKind::NotNullViolation,
                format!("null value in column \"{missing}\" violates not-null constraint"),
            ));
        }
        for column in &table.unique {
            if let Some(value) = row.get(column) {
                if table.rows.iter().any(|r| r.get(column) == Some(value)) {
                    return Err(db_error(
                        DatabaseErrorKind::UniqueViolation,
                        format!("duplicate key value violates unique constraint on \"{column}\""),
                    ));
                }
            }
        }
        if let Some(serial) = table.serial.clone() {
            let id = table.next_serial(&serial);
            row.insert(serial, SqlValue::Integer(id));
        }

        table.rows.push(row);
        Ok(1)
    }
}

fn is_integer_type(data_type: &str) -> bool {
    matches!(data_type, "smallint" | "integer" | "bigint")
}

/// Applies PostgreSQL's rules for a bound parameter reaching an integer
/// column: text needs an explicit cast, and the cast needs a number.
fn coerce(table: &Table, statement: &InsertStatement, column: &str, value: &SqlValue) -> QueryResult<SqlValue> {
    let data_type = table.data_type(column);
    if !is_integer_type(data_type) {
        return Ok(value.clone());
    }
    match value {
        SqlValue::Integer(_) => Ok(value.clone()),
        SqlValue::Text(_) if statement.cast(column).is_none() => Err(db_error(
            DatabaseErrorKind::Unknown,
            format!("column \"{column}\" is of type {data_type} but expression is of type text"),
        )),
        SqlValue::Text(text) => text.trim().parse().map(SqlValue::Integer).map_err(|_| {
            db_error(
                DatabaseErrorKind::Unknown,
                format!("invalid input syntax for type {data_type}: \"{text}\""),
            )
        }),
    }
}

fn db_error(kind: DatabaseErrorKind, message: String) -> DieselError {
    DieselError::DatabaseError(kind, Box::new(message))
}

fn text(row: &Row, column: Option<&String>) -> Option<String> {
    column.and_then(|c| row.get(c)).map(|v| v.to_string())
}

impl UserStore for MemoryStore {
    fn table_names(&mut self) -> QueryResult<Vec<String>> {
        self.calls.push("table_names");
        self.ensure_open()?;
        let mut names: Vec<String> = self.tables.iter().map(|t| t.name.clone()).collect();
        names.sort();
        Ok(names)
    }

    fn columns(&mut self, table: &str) -> QueryResult<Vec<CatalogColumn>> {
        self.calls.push("columns");
        self.ensure_open()?;
        Ok(self
            .find(table)
            .map(|t| {
                t.columns
                    .iter()
                    .map(|c| CatalogColumn::new(c.as_str(), t.data_type(c)))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn roles(&mut self, role: &RoleTable) -> QueryResult<Vec<Role>> {
        self.calls.push("roles");
        self.ensure_open()?;
        let result = self.load_roles(role);
        self.track(result)
    }

    fn insert(&mut self, statement: &InsertStatement) -> QueryResult<usize> {
        self.calls.push("insert");
        self.ensure_open()?;
        let result = self.insert_row(statement);
        self.track(result)
    }

    fn find_account(&mut self, query: &AccountQuery) -> QueryResult<Option<AccountRow>> {
        self.calls.push("find_account");
        self.ensure_open()?;
        let Some(table) = self.find(&query.table) else {
            return Ok(None);
        };
        let Some(row) = table
            .rows
            .iter()
            .find(|r| r.get(&query.match_column).map(|v| v.to_string()).as_deref() == Some(query.value.as_str()))
        else {
            return Ok(None);
        };

        let role_name = match (&query.role_join, &query.role_column) {
            (Some(join), Some(role_column)) => {
                let role_id = row.get(role_column).and_then(SqlValue::as_integer);
                self.find(&join.table).and_then(|roles| {
                    roles
                        .rows
                        .iter()
                        .find(|r| role_id.is_some() && r.get(&join.id_column).and_then(SqlValue::as_integer) == role_id)
                        .and_then(|r| r.get(&join.name_column))
                        .map(|v| v.to_string())
                })
            }
            _ => None,
        };

        Ok(Some(AccountRow {
            user_id: query
                .id_column
                .as_ref()
                .and_then(|c| row.get(c))
                .and_then(SqlValue::as_integer),
            email: text(row, query.email_column.as_ref()),
            display_name: text(row, query.display_name_column.as_ref()),
            password_hash: text(row, query.password_column.as_ref()),
            status: text(row, query.status_column.as_ref()),
            role_name,
        }))
    }

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<DieselError>,
    {
        self.calls.push("begin");
        let snapshot = self.tables.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        let aborted = std::mem::take(&mut self.aborted);

        match result {
            Ok(value) if !aborted => {
                self.commits += 1;
                Ok(value)
            }
            Ok(_) => {
                self.tables = snapshot;
                self.rollbacks += 1;
                Err(DieselError::RollbackTransaction.into())
            }
            Err(e) => {
                self.tables = snapshot;
                self.rollbacks += 1;
                Err(e)
            }
        }
    }

    fn savepoint<T, F>(&mut self, f: F) -> QueryResult<T>
    where
        F: FnOnce(&mut Self) -> QueryResult<T>,
    {
        self.calls.push("savepoint");
        self.ensure_open()?;
        let snapshot = self.tables.clone();
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;

        if result.is_err() {
            self.tables = snapshot;
            self.aborted = false;
            self.savepoint_rollbacks += 1;
        }
        result
    }
}

/// Roles as seeded in the hotel database.
pub fn rol_table() -> Table {
    Table::new("Rol", &["Codigo_Rol", "Nombre"])
        .row(&[("Codigo_Rol", SqlValue::Integer(1)), ("Nombre", SqlValue::text("Administrador"))])
        .row(&[("Codigo_Rol", SqlValue::Integer(2)), ("Nombre", SqlValue::text("Recepcionista"))])
        .row(&[("Codigo_Rol", SqlValue::Integer(3)), ("Nombre", SqlValue::text("Cliente"))])
}

/// The `Usuario` table from the hotel schema.
pub fn usuario_table() -> Table {
    Table::new("Usuario", &["Correo", "Contrasena", "Nombre", "Telefono", "Estado", "Rol_Id"]).unique("Correo")
}

pub fn hotel_store() -> MemoryStore {
    MemoryStore::new().with_table(usuario_table()).with_table(rol_table())
}
