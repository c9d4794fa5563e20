use std::collections::HashMap;

use diesel::result::DatabaseErrorKind;

use grace_shared::errors::ErrorCode;
use grace_shared::types::auth::{LandingPage, SessionClaims};

use crate::store::schema::{LogicalField, Payload, ResolvedSchema};
use crate::store::{password, roles, AccountQuery, AccountRow, InsertStatement, SqlValue, StatementError, UserStore};

/// Status written on new accounts.
pub const DEFAULT_STATUS: &str = "Activo";
/// Status a row must carry (case-insensitive) to log in.
pub const ACTIVE_STATUS: &str = "activo";
/// Phone written when none is supplied.
pub const DEFAULT_PHONE: &str = "00000000";
/// Display name of last resort.
pub const DEFAULT_DISPLAY_NAME: &str = "Usuario";

const FIRST_NAME: &[&str] = &["first_name", "firstname", "nombre", "nombres"];
const LAST_NAME: &[&str] = &["last_name", "lastname", "apellido", "apellidos"];
const EMAIL: &[&str] = &["email", "correo", "mail"];
const USERNAME: &[&str] = &["username", "usuario", "user"];
const PHONE: &[&str] = &["phone", "telefono", "celular", "tel"];
const PASSWORD: &[&str] = &["password", "contrasena", "clave", "pass"];
const DOCUMENT: &[&str] = &["document", "documento", "dni", "cedula", "identificacion"];
const ROLE: &[&str] = &["role", "rol", "role_id", "codigo_rol"];
const CUSTOMER_CODE: &[&str] = &["customer_code", "codigo_cliente"];
const IDENTIFIER: &[&str] = &["identifier", "email", "correo", "username", "usuario"];

#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("{0}")]
    Validation(String),

    #[error("user store unavailable")]
    StoreUnavailable,

    #[error("account already exists")]
    Duplicate,

    #[error("user not found")]
    NotFound,

    #[error("account is not active")]
    Inactive,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("database error: {0}")]
    Database(diesel::result::Error),
}

impl From<diesel::result::Error> for AccountError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => Self::Duplicate,
            other => Self::Database(other),
        }
    }
}

impl From<StatementError> for AccountError {
    fn from(err: StatementError) -> Self {
        match err {
            StatementError::Empty => Self::Validation("No se reconoció ningún campo del formulario.".into()),
            StatementError::UnknownColumn(column) => {
                tracing::error!(column = %column, "insert built with an undiscovered column");
                Self::StoreUnavailable
            }
        }
    }
}

impl AccountError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::StoreUnavailable => ErrorCode::UserStoreUnavailable,
            Self::Duplicate => ErrorCode::AccountAlreadyExists,
            Self::NotFound | Self::Inactive | Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::Hashing(_) | Self::Internal(_) | Self::Database(_) => ErrorCode::InternalError,
        }
    }

    /// True for the three login rejections that share one public message.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, Self::NotFound | Self::Inactive | Self::InvalidCredentials)
    }

    /// Text shown to the visitor. Authentication failures are deliberately
    /// indistinguishable; database detail is never echoed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::StoreUnavailable => "El servicio de usuarios no está disponible. Intente más tarde.".into(),
            Self::Duplicate => "Ya existe una cuenta registrada con esos datos.".into(),
            Self::NotFound | Self::Inactive | Self::InvalidCredentials => "Usuario o contraseña incorrectos.".into(),
            Self::Hashing(_) | Self::Internal(_) | Self::Database(_) => "No se pudo completar la operación. Intente más tarde.".into(),
        }
    }
}

/// Submitted form fields keyed by lower-cased name.
#[derive(Debug, Clone, Default)]
pub struct FormFields(HashMap<String, String>);

impl FormFields {
    pub fn new(fields: HashMap<String, String>) -> Self {
        Self(
            fields
                .into_iter()
                .map(|(k, v)| (k.trim().to_lowercase(), v))
                .collect(),
        )
    }

    /// First alias carrying a non-blank value, trimmed.
    pub fn first(&self, aliases: &[&str]) -> Option<String> {
        self.first_raw(aliases).map(|v| v.trim().to_string())
    }

    /// First alias carrying a non-blank value, untouched.
    pub fn first_raw(&self, aliases: &[&str]) -> Option<String> {
        aliases
            .iter()
            .filter_map(|alias| self.0.get(*alias))
            .find(|value| !value.trim().is_empty())
            .cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub document: Option<String>,
    pub role: Option<String>,
    pub customer_code: Option<String>,
}

impl RegistrationForm {
    pub fn from_fields(fields: &FormFields) -> Self {
        Self {
            first_name: fields.first(FIRST_NAME),
            last_name: fields.first(LAST_NAME),
            email: fields.first(EMAIL),
            username: fields.first(USERNAME),
            phone: fields.first(PHONE),
            password: fields.first_raw(PASSWORD),
            document: fields.first(DOCUMENT),
            role: fields.first(ROLE),
            customer_code: fields.first(CUSTOMER_CODE),
        }
    }

    /// Checks what can be checked without a database and returns the
    /// password to hash.
    pub fn validate(&self) -> Result<&str, AccountError> {
        let password = self
            .password
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AccountError::Validation("La contraseña es obligatoria.".into()))?;

        if let Some(email) = self.email.as_deref() {
            if !validator::validate_email(email) {
                return Err(AccountError::Validation("El correo electrónico no es válido.".into()));
            }
        }
        Ok(password)
    }

    /// "First Last", else the first of first name, last name, username or
    /// email, else "Usuario".
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            _ => [&self.first_name, &self.last_name, &self.username, &self.email]
                .into_iter()
                .flatten()
                .next()
                .cloned()
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub identifier: String,
    pub password: String,
}

impl LoginForm {
    pub fn from_fields(fields: &FormFields) -> Result<Self, AccountError> {
        match (fields.first(IDENTIFIER), fields.first_raw(PASSWORD)) {
            (Some(identifier), Some(password)) => Ok(Self { identifier, password }),
            _ => Err(AccountError::Validation("Ingrese su usuario y contraseña.".into())),
        }
    }
}

/// Keeps a leading `+` and the digits; anything else is dropped. Falls back
/// to `00000000` when nothing usable remains.
pub fn normalize_phone(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_PHONE.to_string();
    };
    let mut phone = String::with_capacity(raw.len());
    if raw.starts_with('+') {
        phone.push('+');
    }
    phone.extend(raw.chars().filter(char::is_ascii_digit));

    if phone.trim_start_matches('+').is_empty() {
        DEFAULT_PHONE.to_string()
    } else {
        phone
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredAccount {
    pub table: String,
    pub display_name: String,
    pub email: Option<String>,
    pub role_id: Option<i64>,
}

/// Identity handed back to the HTTP layer after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub id: Option<i64>,
    pub email: Option<String>,
    pub display_name: String,
    pub role_name: Option<String>,
}

impl AuthenticatedAccount {
    pub fn landing(&self) -> LandingPage {
        LandingPage::for_role(self.role_name.as_deref())
    }

    pub fn to_claims(&self, ttl_secs: i64) -> SessionClaims {
        SessionClaims::new(
            self.id,
            self.email.clone(),
            self.display_name.clone(),
            self.role_name.clone(),
            ttl_secs,
        )
    }
}

/// Creates an account in whatever users table the database has.
///
/// The password is checked and hashed before the database is touched;
/// discovery, role resolution and the insert then share one transaction.
pub fn register<S: UserStore>(
    store: &mut S,
    form: &RegistrationForm,
    table_hint: Option<&str>,
) -> Result<RegisteredAccount, AccountError> {
    let password = form.validate()?;
    let display_name = form.display_name();
    let password_hash = password::hash_password(password).map_err(|e| AccountError::Hashing(e.to_string()))?;

    store.transaction(|store| {
        let schema = ResolvedSchema::discover(store, table_hint).ok_or(AccountError::StoreUnavailable)?;
        if !schema.has(LogicalField::PasswordHash) {
            tracing::warn!(table = %schema.table, "users table has no password column");
            return Err(AccountError::StoreUnavailable);
        }

        let mut payload = Payload::new();
        schema.put(&mut payload, LogicalField::DisplayName, Some(SqlValue::text(&display_name)));
        schema.put(&mut payload, LogicalField::Email, form.email.clone().map(SqlValue::Text));
        schema.put(
            &mut payload,
            LogicalField::Phone,
            Some(SqlValue::Text(normalize_phone(form.phone.as_deref()))),
        );
        schema.put(&mut payload, LogicalField::PasswordHash, Some(SqlValue::Text(password_hash)));
        schema.put(&mut payload, LogicalField::Status, Some(SqlValue::text(DEFAULT_STATUS)));
        schema.put(&mut payload, LogicalField::Document, form.document.clone().map(SqlValue::Text));
        schema.put(&mut payload, LogicalField::CustomerCode, form.customer_code.clone().map(SqlValue::Text));

        let role_id = if schema.has(LogicalField::Role) {
            roles::resolve(store, schema.role_table.as_ref(), form.role.as_deref())
        } else {
            None
        };
        schema.put(&mut payload, LogicalField::Role, role_id.map(SqlValue::Integer));

        let statement = InsertStatement::new(&schema, payload)?;
        tracing::debug!(
            table = %schema.table,
            columns = ?statement.columns().collect::<Vec<_>>(),
            "inserting account"
        );
        store.insert(&statement)?;

        tracing::info!(table = %schema.table, email = ?form.email, role_id, "account registered");

        Ok(RegisteredAccount {
            table: schema.table.clone(),
            display_name,
            email: form.email.clone(),
            role_id,
        })
    })
}

/// Checks credentials against the discovered users table.
///
/// The identifier is matched exactly against the email column, then against
/// the display-name column. Each rejection keeps its own variant so it can
/// be logged; callers show all of them the same way.
pub fn login<S: UserStore>(
    store: &mut S,
    form: &LoginForm,
    table_hint: Option<&str>,
) -> Result<AuthenticatedAccount, AccountError> {
    let schema = ResolvedSchema::discover(store, table_hint).ok_or(AccountError::StoreUnavailable)?;
    if !schema.has(LogicalField::PasswordHash) {
        tracing::warn!(table = %schema.table, "users table has no password column");
        return Err(AccountError::StoreUnavailable);
    }

    let row = match lookup(store, &schema, LogicalField::Email, &form.identifier)? {
        Some(row) => row,
        None => match lookup(store, &schema, LogicalField::DisplayName, &form.identifier)? {
            Some(row) => row,
            None => {
                tracing::info!(identifier = %form.identifier, outcome = "not_found", "login rejected");
                return Err(AccountError::NotFound);
            }
        },
    };

    if schema.has(LogicalField::Status) && !is_active(row.status.as_deref()) {
        tracing::info!(identifier = %form.identifier, status = ?row.status, outcome = "inactive", "login rejected");
        return Err(AccountError::Inactive);
    }

    if !password::verify(row.password_hash.as_deref(), Some(&form.password)) {
        tracing::info!(identifier = %form.identifier, outcome = "invalid_credentials", "login rejected");
        return Err(AccountError::InvalidCredentials);
    }

    let display_name = row
        .display_name
        .clone()
        .or_else(|| row.email.clone())
        .unwrap_or_else(|| form.identifier.clone());

    tracing::info!(user_id = ?row.user_id, role = ?row.role_name, "user logged in");

    Ok(AuthenticatedAccount {
        id: row.user_id,
        email: row.email,
        display_name,
        role_name: row.role_name,
    })
}

fn lookup<S: UserStore>(
    store: &mut S,
    schema: &ResolvedSchema,
    field: LogicalField,
    value: &str,
) -> Result<Option<AccountRow>, AccountError> {
    match AccountQuery::by_field(schema, field, value) {
        Some(query) => store.find_account(&query).map_err(AccountError::Database),
        None => Ok(None),
    }
}

fn is_active(status: Option<&str>) -> bool {
    status.is_some_and(|s| s.trim().eq_ignore_ascii_case(ACTIVE_STATUS))
}
