use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Text};

use crate::models::{AccountRow, ColumnRow, RoleRow, TableNameRow};

use super::statement::{role_select_sql, COLUMNS_SQL, TABLE_NAMES_SQL};
use super::{AccountQuery, CatalogColumn, InsertStatement, Role, RoleTable, SqlValue, UserStore};

/// `UserStore` over one borrowed PostgreSQL connection.
pub struct PgUserStore<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> PgUserStore<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    /// Begin, then commit on `Ok` or roll back on `Err`. Nested calls open
    /// a savepoint instead of a new transaction.
    fn scoped<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<diesel::result::Error>,
    {
        <AnsiTransactionManager as TransactionManager<PgConnection>>::begin_transaction(&mut *self.conn)?;
        match f(self) {
            Ok(value) => {
                <AnsiTransactionManager as TransactionManager<PgConnection>>::commit_transaction(&mut *self.conn)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) =
                    <AnsiTransactionManager as TransactionManager<PgConnection>>::rollback_transaction(&mut *self.conn)
                {
                    tracing::error!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

impl UserStore for PgUserStore<'_> {
    fn table_names(&mut self) -> QueryResult<Vec<String>> {
        let rows = diesel::sql_query(TABLE_NAMES_SQL).load::<TableNameRow>(&mut *self.conn)?;
        Ok(rows.into_iter().map(|r| r.table_name).collect())
    }

    fn columns(&mut self, table: &str) -> QueryResult<Vec<CatalogColumn>> {
        let rows = diesel::sql_query(COLUMNS_SQL)
            .bind::<Text, _>(table)
            .load::<ColumnRow>(&mut *self.conn)?;
        Ok(rows
            .into_iter()
            .map(|r| CatalogColumn {
                name: r.column_name,
                data_type: r.data_type,
            })
            .collect())
    }

    fn roles(&mut self, table: &RoleTable) -> QueryResult<Vec<Role>> {
        let rows = diesel::sql_query(role_select_sql(table)).load::<RoleRow>(&mut *self.conn)?;
        Ok(rows
            .into_iter()
            .map(|r| Role {
                id: r.id,
                name: r.name.unwrap_or_default(),
            })
            .collect())
    }

    fn insert(&mut self, statement: &InsertStatement) -> QueryResult<usize> {
        let mut query = diesel::sql_query(statement.to_sql()).into_boxed::<Pg>();
        for value in statement.values() {
            query = match value {
                SqlValue::Text(text) => query.bind::<Text, _>(text.clone()),
                SqlValue::Integer(n) => query.bind::<BigInt, _>(*n),
            };
        }
        query.execute(&mut *self.conn)
    }

    fn find_account(&mut self, query: &AccountQuery) -> QueryResult<Option<AccountRow>> {
        diesel::sql_query(query.to_sql())
            .bind::<Text, _>(query.value.as_str())
            .get_result::<AccountRow>(&mut *self.conn)
            .optional()
    }

    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<diesel::result::Error>,
    {
        self.scoped(f)
    }

    fn savepoint<T, F>(&mut self, f: F) -> QueryResult<T>
    where
        F: FnOnce(&mut Self) -> QueryResult<T>,
    {
        self.scoped(f)
    }
}
