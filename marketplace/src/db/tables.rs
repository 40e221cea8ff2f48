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

//! Mapping of the record types to their tables.

use crate::model::{Offer, Order, OrderDate, User, UserRole};
#[cfg(feature = "postgres")]
use marketplace_core::db::postgres;
#[cfg(feature = "sqlite")]
use marketplace_core::db::sqlite;
use marketplace_core::db::DbResult;
use marketplace_core::model::{ModelError, ModelResult};
use sqlx::Row;
#[cfg(feature = "postgres")]
use sqlx::postgres::PgRow;
#[cfg(feature = "sqlite")]
use sqlx::sqlite::SqliteRow;

/// A value to bind to a query parameter.
#[derive(Debug, PartialEq)]
pub(crate) enum Value {
    /// An integer column.
    Int(Option<i32>),

    /// A text column.
    Text(Option<String>),
}

/// Typed access to the columns of a row, regardless of the backend that returned it.
pub(crate) trait RowExt {
    /// Gets the integer value of `column`.
    fn int(&self, column: &str) -> DbResult<Option<i32>>;

    /// Gets the textual value of `column`.
    fn text(&self, column: &str) -> DbResult<Option<String>>;
}

#[cfg(feature = "postgres")]
impl RowExt for PgRow {
    fn int(&self, column: &str) -> DbResult<Option<i32>> {
        self.try_get(column).map_err(postgres::map_sqlx_error)
    }

    fn text(&self, column: &str) -> DbResult<Option<String>> {
        self.try_get(column).map_err(postgres::map_sqlx_error)
    }
}

#[cfg(feature = "sqlite")]
impl RowExt for SqliteRow {
    fn int(&self, column: &str) -> DbResult<Option<i32>> {
        self.try_get(column).map_err(sqlite::map_sqlx_error)
    }

    fn text(&self, column: &str) -> DbResult<Option<String>> {
        self.try_get(column).map_err(sqlite::map_sqlx_error)
    }
}

/// Mapping between a record type and the table that stores it.
///
/// Every table has an integer `id` primary key, which is not part of `COLUMNS`.
pub(crate) trait Table: Sized + Send + Sync {
    /// Name of the table.
    const TABLE: &'static str;

    /// Names of all columns other than `id`, in the same order as returned by `values`.
    const COLUMNS: &'static [&'static str];

    /// Returns the identifier of the record, if known.
    fn record_id(&self) -> Option<i32>;

    /// Returns the values of all columns other than `id`.
    fn values(&self) -> Vec<Value>;

    /// Builds a record from a `row` that contains `id` and all `COLUMNS`.
    fn from_row<R: RowExt>(row: &R) -> DbResult<Self>;
}

/// Ensures that a non-nullable `column` actually had a `value`.
fn required<T>(value: Option<T>, column: &str) -> ModelResult<T> {
    value.ok_or_else(|| ModelError(format!("Unexpected NULL in {}", column)))
}

impl Table for UserRole {
    const TABLE: &'static str = "user_roles";
    const COLUMNS: &'static [&'static str] = &["user_role"];

    fn record_id(&self) -> Option<i32> {
        *self.id()
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Text(self.user_role().clone())]
    }

    fn from_row<R: RowExt>(row: &R) -> DbResult<Self> {
        let id = required(row.int("id")?, "id")?;
        Ok(UserRole::from_parts(Some(id), row.text("user_role")?))
    }
}

impl Table for User {
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] =
        &["first_name", "last_name", "age", "email", "role_id", "phone"];

    fn record_id(&self) -> Option<i32> {
        *self.id()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(Some(self.first_name().clone())),
            Value::Text(Some(self.last_name().clone())),
            Value::Int(*self.age()),
            Value::Text(self.email().clone()),
            Value::Int(*self.role_id()),
            Value::Text(self.phone().clone()),
        ]
    }

    fn from_row<R: RowExt>(row: &R) -> DbResult<Self> {
        let id = required(row.int("id")?, "id")?;
        let first_name = required(row.text("first_name")?, "first_name")?;
        let last_name = required(row.text("last_name")?, "last_name")?;

        let mut user = User::new(first_name, last_name).with_id(id);
        if let Some(age) = row.int("age")? {
            user = user.with_age(age);
        }
        if let Some(email) = row.text("email")? {
            user = user.with_email(email);
        }
        if let Some(role_id) = row.int("role_id")? {
            user = user.with_role_id(role_id);
        }
        if let Some(phone) = row.text("phone")? {
            user = user.with_phone(phone);
        }
        Ok(user)
    }
}

impl Table for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "start_date",
        "end_date",
        "address",
        "price",
        "customer_id",
        "executor_id",
    ];

    fn record_id(&self) -> Option<i32> {
        *self.id()
    }

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(Some(self.name().clone())),
            Value::Text(Some(self.description().clone())),
            Value::Text(self.start_date().as_ref().map(OrderDate::to_string)),
            Value::Text(self.end_date().as_ref().map(OrderDate::to_string)),
            Value::Text(self.address().clone()),
            Value::Int(Some(*self.price())),
            Value::Int(*self.customer_id()),
            Value::Int(*self.executor_id()),
        ]
    }

    fn from_row<R: RowExt>(row: &R) -> DbResult<Self> {
        let id = required(row.int("id")?, "id")?;
        let name = required(row.text("name")?, "name")?;
        let description = required(row.text("description")?, "description")?;
        let price = required(row.int("price")?, "price")?;

        let mut order = Order::new(name, description, price)
            .with_id(id)
            .with_dates(
                row.text("start_date")?.map(OrderDate::from_stored),
                row.text("end_date")?.map(OrderDate::from_stored),
            )
            .with_parties(row.int("customer_id")?, row.int("executor_id")?);
        if let Some(address) = row.text("address")? {
            order = order.with_address(address);
        }
        Ok(order)
    }
}

impl Table for Offer {
    const TABLE: &'static str = "offers";
    const COLUMNS: &'static [&'static str] = &["order_id", "executor_id"];

    fn record_id(&self) -> Option<i32> {
        *self.id()
    }

    fn values(&self) -> Vec<Value> {
        vec![Value::Int(*self.order_id()), Value::Int(*self.executor_id())]
    }

    fn from_row<R: RowExt>(row: &R) -> DbResult<Self> {
        let id = required(row.int("id")?, "id")?;
        Ok(Offer::from_parts(Some(id), row.int("order_id")?, row.int("executor_id")?))
    }
}
