// Marketplace
// Copyright 2023 Julio Merino
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Database abstraction in terms of the operations needed by the marketplace.
//!
//! All record types share one set of persistence operations.  Each type describes how it maps to
//! its table via the `Table` trait and the operations in this module build the SQL for it.

#[cfg(feature = "postgres")]
use marketplace_core::db::postgres;
#[cfg(feature = "sqlite")]
use marketplace_core::db::sqlite;
use marketplace_core::db::{DbError, DbResult, Executor};
#[cfg(any(feature = "postgres", feature = "sqlite"))]
use sqlx::Row;
use std::str::FromStr;

mod tables;
pub(crate) use tables::{Table, Value};

/// Statements to remove all tables, in reverse dependency order.
const DROP_SCHEMA: &str = include_str!("drop.sql");

/// How to treat existing tables when initializing the schema.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchemaMode {
    /// Drops all tables and their contents before recreating them.
    Reset,

    /// Creates the tables that are missing and keeps the contents of the existing ones.
    Preserve,
}

impl FromStr for SchemaMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset" => Ok(SchemaMode::Reset),
            "preserve" => Ok(SchemaMode::Preserve),
            s => Err(format!("Invalid schema mode '{}'; must be reset or preserve", s)),
        }
    }
}

/// Initializes the database schema according to `mode`.
pub(crate) async fn init_schema(ex: &mut Executor, mode: SchemaMode) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            if mode == SchemaMode::Reset {
                postgres::run_schema(ex, DROP_SCHEMA).await?;
            }
            postgres::run_schema(ex, include_str!("postgres.sql")).await
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => {
            if mode == SchemaMode::Reset {
                sqlite::run_schema(ex, DROP_SCHEMA).await?;
            }
            sqlite::run_schema(ex, include_str!("sqlite.sql")).await
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Returns the placeholders for `count` query parameters in the syntax of the backend behind `ex`.
fn params(ex: &Executor, count: usize) -> Vec<String> {
    let prefix = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(_) => '$',

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(_) => '?',

        #[allow(unused)]
        _ => unreachable!(),
    };
    (1..=count).map(|i| format!("{}{}", prefix, i)).collect()
}

/// Returns the list of columns to select to read back a full record of type `T`.
fn select_list<T: Table>() -> String {
    let mut columns = vec!["id"];
    columns.extend_from_slice(T::COLUMNS);
    columns.join(", ")
}

/// Binds all `values` in order to a `query`.
macro_rules! bind_values [
    ( $query:expr, $values:expr ) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                Value::Int(i) => query.bind(i),
                Value::Text(s) => query.bind(s),
            };
        }
        query
    }}
];

/// Gets the record of type `T` identified by `id`.
pub(crate) async fn get_record<T: Table>(ex: &mut Executor, id: i32) -> DbResult<T> {
    let query_str = format!(
        "SELECT {} FROM {} WHERE id = {}",
        select_list::<T>(),
        T::TABLE,
        params(ex, 1).join(", ")
    );
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query(&query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            T::from_row(&row)
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => {
            let row = sqlx::query(&query_str)
                .bind(id)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            T::from_row(&row)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Gets all records of type `T` sorted by their identifier.
pub(crate) async fn get_records<T: Table>(ex: &mut Executor) -> DbResult<Vec<T>> {
    let query_str = format!("SELECT {} FROM {} ORDER BY id", select_list::<T>(), T::TABLE);
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let rows = sqlx::query(&query_str)
                .fetch_all(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            rows.iter().map(T::from_row).collect()
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => {
            let rows =
                sqlx::query(&query_str).fetch_all(ex.conn()).await.map_err(sqlite::map_sqlx_error)?;
            rows.iter().map(T::from_row).collect()
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Checks if a record of type `T` identified by `id` exists.
pub(crate) async fn record_exists<T: Table>(ex: &mut Executor, id: i32) -> DbResult<bool> {
    let query_str = format!("SELECT id FROM {} WHERE id = {}", T::TABLE, params(ex, 1).join(", "));
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = sqlx::query(&query_str)
                .bind(id)
                .fetch_optional(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            Ok(row.is_some())
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => {
            let row = sqlx::query(&query_str)
                .bind(id)
                .fetch_optional(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            Ok(row.is_some())
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Inserts a new `record` and returns its identifier.
///
/// If the record carries an identifier, it is stored as is.  Otherwise, the database assigns a
/// new one.  Callers that insert explicit identifiers should call `sync_id_sequence` afterwards.
pub(crate) async fn insert_record<T: Table>(ex: &mut Executor, record: &T) -> DbResult<i32> {
    let mut columns = vec![];
    let mut values = vec![];
    if let Some(id) = record.record_id() {
        columns.push("id");
        values.push(Value::Int(Some(id)));
    }
    columns.extend_from_slice(T::COLUMNS);
    values.extend(record.values());

    let query_str = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
        T::TABLE,
        columns.join(", "),
        params(ex, values.len()).join(", ")
    );
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let row = bind_values!(sqlx::query(&query_str), values)
                .fetch_one(ex.conn())
                .await
                .map_err(postgres::map_sqlx_error)?;
            row.try_get("id").map_err(postgres::map_sqlx_error)
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => {
            let row = bind_values!(sqlx::query(&query_str), values)
                .fetch_one(ex.conn())
                .await
                .map_err(sqlite::map_sqlx_error)?;
            row.try_get("id").map_err(sqlite::map_sqlx_error)
        }

        #[allow(unused)]
        _ => unreachable!(),
    }
}

/// Replaces all fields of the record of type `T` identified by `id` with those in `record`.
///
/// The identifier carried by `record`, if any, is ignored.
pub(crate) async fn update_record<T: Table>(
    ex: &mut Executor,
    id: i32,
    record: &T,
) -> DbResult<()> {
    let mut values = record.values();
    values.push(Value::Int(Some(id)));
    let placeholders = params(ex, values.len());
    let assignments = T::COLUMNS
        .iter()
        .zip(placeholders.iter())
        .map(|(column, param)| format!("{} = {}", column, param))
        .collect::<Vec<String>>();

    let query_str = format!(
        "UPDATE {} SET {} WHERE id = {}",
        T::TABLE,
        assignments.join(", "),
        placeholders[T::COLUMNS.len()]
    );
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => bind_values!(sqlx::query(&query_str), values)
            .execute(ex.conn())
            .await
            .map_err(postgres::map_sqlx_error)?
            .rows_affected(),

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => bind_values!(sqlx::query(&query_str), values)
            .execute(ex.conn())
            .await
            .map_err(sqlite::map_sqlx_error)?
            .rows_affected(),

        #[allow(unused)]
        _ => unreachable!(),
    };
    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Deletes the record of type `T` identified by `id`.
pub(crate) async fn delete_record<T: Table>(ex: &mut Executor, id: i32) -> DbResult<()> {
    let query_str = format!("DELETE FROM {} WHERE id = {}", T::TABLE, params(ex, 1).join(", "));
    let rows_affected = match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => sqlx::query(&query_str)
            .bind(id)
            .execute(ex.conn())
            .await
            .map_err(postgres::map_sqlx_error)?
            .rows_affected(),

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(ex) => sqlx::query(&query_str)
            .bind(id)
            .execute(ex.conn())
            .await
            .map_err(sqlite::map_sqlx_error)?
            .rows_affected(),

        #[allow(unused)]
        _ => unreachable!(),
    };
    if rows_affected == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// Makes sure that the next identifier assigned by the database for table `T` does not collide
/// with identifiers that were inserted explicitly.
///
/// SQLite always picks the next identifier after the largest one in use, so this is only needed
/// for PostgreSQL.
pub(crate) async fn sync_id_sequence<T: Table>(ex: &mut Executor) -> DbResult<()> {
    match ex {
        #[cfg(feature = "postgres")]
        Executor::Postgres(ex) => {
            let query_str = format!(
                "SELECT setval(pg_get_serial_sequence('{table}', 'id'),
                    COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)",
                table = T::TABLE
            );
            sqlx::query(&query_str).execute(ex.conn()).await.map_err(postgres::map_sqlx_error)?;
            Ok(())
        }

        #[cfg(feature = "sqlite")]
        Executor::Sqlite(_) => Ok(()),

        #[allow(unused)]
        _ => unreachable!(),
    }
}
