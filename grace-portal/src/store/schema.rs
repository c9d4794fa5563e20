use std::collections::BTreeMap;

use super::{CatalogColumn, SqlValue, UserStore};

/// Fallback names for the users table, tried after the configured hint.
/// Matching is case-insensitive, so `Usuarios` or `USERS` match too.
pub const USER_TABLE_CANDIDATES: &[&str] = &["users", "user", "usuarios", "usuario"];

pub const ROLE_TABLE_CANDIDATES: &[&str] = &["rol", "roles", "role"];
pub const ROLE_ID_CANDIDATES: &[&str] = &["codigo_rol", "id_rol", "rol_id", "id"];
pub const ROLE_NAME_CANDIDATES: &[&str] = &["nombre", "name", "nombre_rol"];

/// A semantic account attribute whose real column name depends on the
/// discovered schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogicalField {
    Id,
    DisplayName,
    Email,
    Phone,
    PasswordHash,
    Role,
    Status,
    Document,
    CustomerCode,
}

impl LogicalField {
    /// Acceptable column names, most preferred first, lower-cased.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Id => &["codigo_usuario", "id_usuario", "usuario_id", "id"],
            Self::DisplayName => &["nombre", "name", "nombre_completo", "full_name", "nombres"],
            Self::Email => &["correo", "email", "correo_electronico", "mail"],
            Self::Phone => &["telefono", "phone", "celular", "tel"],
            Self::PasswordHash => &[
                "contrasena",
                "password",
                "password_hash",
                "contrasena_hash",
                "clave",
                "hash",
            ],
            Self::Role => &["codigo_rol", "rol_id", "id_rol", "role_id", "rol"],
            Self::Status => &["estado", "status", "estado_usuario"],
            Self::Document => &[
                "documento",
                "numero_documento",
                "dni",
                "cedula",
                "identificacion",
                "document",
            ],
            Self::CustomerCode => &["codigo_cliente", "cliente_id", "customer_code"],
        }
    }
}

/// Column values keyed by the real (stored) column name.
pub type Payload = BTreeMap<String, SqlValue>;

/// Lower-cased column name mapped to the column as stored in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: BTreeMap<String, CatalogColumn>,
}

impl ColumnMap {
    pub fn from_catalog<I>(columns: I) -> Self
    where
        I: IntoIterator<Item = CatalogColumn>,
    {
        let columns = columns
            .into_iter()
            .map(|column| (column.name.to_lowercase(), column))
            .collect();
        Self { columns }
    }

    /// Columns with no type information.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_catalog(names.into_iter().map(CatalogColumn::untyped))
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Real name of the first candidate present in the table.
    pub fn resolve(&self, candidates: &[&str]) -> Option<&str> {
        candidates
            .iter()
            .find_map(|candidate| self.columns.get(&candidate.to_lowercase()))
            .map(|column| column.name.as_str())
    }

    /// True when `name` is a column of the table with exactly this casing.
    pub fn contains_real(&self, name: &str) -> bool {
        self.columns
            .get(&name.to_lowercase())
            .is_some_and(|column| column.name == name)
    }

    /// Catalog type of the column stored exactly as `name`.
    pub fn data_type(&self, name: &str) -> Option<&str> {
        self.columns
            .get(&name.to_lowercase())
            .filter(|column| column.name == name)
            .and_then(|column| column.data_type.as_deref())
    }

    /// Writes `value` under the real name of the first matching candidate.
    /// No-op when the value is absent or no candidate exists.
    pub fn put(&self, payload: &mut Payload, candidates: &[&str], value: Option<SqlValue>) {
        let Some(value) = value else { return };
        if let Some(column) = self.resolve(candidates) {
            payload.insert(column.to_string(), value);
        }
    }
}

/// First candidate matching one of `names` case-insensitively, returned with
/// its stored casing.
pub fn match_table<'a>(candidates: &[&str], names: &'a [String]) -> Option<&'a str> {
    candidates.iter().find_map(|candidate| {
        names
            .iter()
            .find(|name| name.eq_ignore_ascii_case(candidate))
            .map(String::as_str)
    })
}

/// Users table candidates in lookup order: the configured hint (if any)
/// followed by the fixed fallbacks.
pub fn user_table_candidates(hint: Option<&str>) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(USER_TABLE_CANDIDATES.len() + 1);
    if let Some(hint) = hint.map(str::trim).filter(|h| !h.is_empty()) {
        candidates.push(hint);
    }
    candidates.extend(USER_TABLE_CANDIDATES.iter().copied());
    candidates
}

/// Finds the users table. `Ok(None)` when no candidate exists.
pub fn discover_table<S: UserStore>(store: &mut S, hint: Option<&str>) -> diesel::QueryResult<Option<String>> {
    let names = store.table_names()?;
    Ok(match_table(&user_table_candidates(hint), &names).map(str::to_string))
}

/// Columns of a resolved table keyed by lower-cased name.
pub fn discover_columns<S: UserStore>(store: &mut S, table: &str) -> diesel::QueryResult<ColumnMap> {
    Ok(ColumnMap::from_catalog(store.columns(table)?))
}

/// Finds the role lookup table, skipping `users_table` itself. `Ok(None)`
/// when no candidate exists or it lacks an id or name column.
pub fn discover_role_table<S: UserStore>(store: &mut S, users_table: &str) -> diesel::QueryResult<Option<RoleTable>> {
    let names = store.table_names()?;
    match match_table(ROLE_TABLE_CANDIDATES, &names) {
        Some(table) if table != users_table => {
            let columns = discover_columns(store, table)?;
            Ok(RoleTable::from_columns(table, &columns))
        }
        _ => Ok(None),
    }
}

/// The role lookup table with its id and name columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    pub table: String,
    pub id_column: String,
    pub name_column: String,
}

impl RoleTable {
    pub fn from_columns(table: impl Into<String>, columns: &ColumnMap) -> Option<Self> {
        Some(Self {
            table: table.into(),
            id_column: columns.resolve(ROLE_ID_CANDIDATES)?.to_string(),
            name_column: columns.resolve(ROLE_NAME_CANDIDATES)?.to_string(),
        })
    }
}

/// Everything one account operation knows about the live schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub table: String,
    pub columns: ColumnMap,
    pub role_table: Option<RoleTable>,
}

impl ResolvedSchema {
    /// Discovers the users table, its columns and the role table.
    ///
    /// Returns `None` when the user store is unavailable: no table matches,
    /// the table has no columns, or the catalog could not be read. Catalog
    /// errors are logged here and never surface to the caller.
    pub fn discover<S: UserStore>(store: &mut S, hint: Option<&str>) -> Option<Self> {
        match Self::try_discover(store, hint) {
            Ok(schema) => schema,
            Err(e) => {
                tracing::error!(error = %e, "schema discovery failed");
                None
            }
        }
    }

    fn try_discover<S: UserStore>(store: &mut S, hint: Option<&str>) -> diesel::QueryResult<Option<Self>> {
        let Some(table) = discover_table(store, hint)? else {
            tracing::warn!(hint = ?hint, "no users table found");
            return Ok(None);
        };

        let columns = discover_columns(store, &table)?;
        if columns.is_empty() {
            tracing::warn!(table = %table, "users table has no columns");
            return Ok(None);
        }

        let role_table = discover_role_table(store, &table)?;

        tracing::debug!(
            table = %table,
            columns = columns.len(),
            role_table = role_table.as_ref().map(|r| r.table.as_str()),
            "user store schema discovered"
        );

        Ok(Some(Self { table, columns, role_table }))
    }

    pub fn column(&self, field: LogicalField) -> Option<&str> {
        self.columns.resolve(field.candidates())
    }

    pub fn has(&self, field: LogicalField) -> bool {
        self.column(field).is_some()
    }

    /// Writes `value` into the payload under `field`'s real column.
    pub fn put(&self, payload: &mut Payload, field: LogicalField, value: Option<SqlValue>) {
        self.columns.put(payload, field.candidates(), value);
    }
}
