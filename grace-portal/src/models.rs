use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Nullable, Text};

// --- Catalog ---

#[derive(Debug, QueryableByName)]
pub struct TableNameRow {
    #[diesel(sql_type = Text)]
    pub table_name: String,
}

#[derive(Debug, QueryableByName)]
pub struct ColumnRow {
    #[diesel(sql_type = Text)]
    pub column_name: String,
    #[diesel(sql_type = Nullable<Text>)]
    pub data_type: Option<String>,
}

// --- Roles ---

#[derive(Debug, QueryableByName)]
pub struct RoleRow {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Nullable<Text>)]
    pub name: Option<String>,
}

// --- Accounts ---

/// One account as read through `AccountQuery`. Columns the live table
/// lacks come back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, QueryableByName)]
pub struct AccountRow {
    #[diesel(sql_type = Nullable<BigInt>)]
    pub user_id: Option<i64>,
    #[diesel(sql_type = Nullable<Text>)]
    pub email: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub display_name: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub password_hash: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub status: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub role_name: Option<String>,
}

// --- Health ---

#[derive(Debug, QueryableByName)]
pub struct PingRow {
    #[diesel(sql_type = Integer)]
    pub value: i32,
}
