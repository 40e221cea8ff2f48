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

//! Test utilities for the business layer.

use crate::db::{self, SchemaMode, Table, init_schema};
use crate::driver::{Driver, DriverOptions};
use crate::model::{Offer, Order, OrderDate, User, UserRole};
use marketplace_core::db::{Db, DbError, Executor};
use std::sync::Arc;

/// State of a running test.
pub(crate) struct TestContext {
    /// The database backing the driver.
    db: Arc<dyn Db + Send + Sync>,

    /// The driver under test.
    driver: Driver,
}

impl TestContext {
    /// Initializes the driver using an in-memory database and default options.
    pub(crate) async fn setup() -> Self {
        Self::setup_with(DriverOptions::default()).await
    }

    /// Initializes the driver using an in-memory database and the given `opts`.
    pub(crate) async fn setup_with(opts: DriverOptions) -> Self {
        let db = Arc::new(marketplace_core::db::sqlite::testutils::setup().await);
        Self::setup_with_db(db, opts).await
    }

    /// Initializes the driver on top of an existing `db` and the given `opts`.
    pub(crate) async fn setup_with_db(db: Arc<dyn Db + Send + Sync>, opts: DriverOptions) -> Self {
        init_schema(&mut db.ex().await.unwrap(), SchemaMode::Reset).await.unwrap();
        let driver = Driver::new(db.clone(), opts);
        Self { db, driver }
    }

    /// Closes the database once all outstanding connections are returned.
    pub(crate) async fn close(self) {
        self.db.close().await
    }

    /// Gets a copy of the driver in this test context.
    pub(crate) fn driver(&self) -> Driver {
        self.driver.clone()
    }

    /// Gets a direct executor against the database.
    pub(crate) async fn ex(&self) -> Executor {
        self.db.ex().await.unwrap()
    }

    /// Inserts `record` directly into the database and returns its identifier.
    pub(crate) async fn insert<T: Table>(&self, record: T) -> i32 {
        db::insert_record(&mut self.ex().await, &record).await.unwrap()
    }

    /// Gets the record of type `T` identified by `id` directly from the database.
    pub(crate) async fn get<T: Table>(&self, id: i32) -> Option<T> {
        match db::get_record::<T>(&mut self.ex().await, id).await {
            Ok(record) => Some(record),
            Err(DbError::NotFound) => None,
            Err(e) => panic!("{:?}", e),
        }
    }

    /// Gets all records of type `T` directly from the database.
    pub(crate) async fn all<T: Table>(&self) -> Vec<T> {
        db::get_records::<T>(&mut self.ex().await).await.unwrap()
    }

    /// Populates the database with a small consistent data set:
    ///
    /// * Roles 1 (customer) and 2 (executor).
    /// * Users 1 (Alice, a customer) and 2 (Bob, an executor).
    /// * Order 1 created by Alice and assigned to Bob.
    /// * Offer 1 by Bob on order 1.
    pub(crate) async fn populate(&self) {
        self.insert(UserRole::new("customer").with_id(1)).await;
        self.insert(UserRole::new("executor").with_id(2)).await;
        self.insert(alice()).await;
        self.insert(bob()).await;
        self.insert(fence_order()).await;
        self.insert(Offer::new(1, 2).with_id(1)).await;
    }
}

/// The first user created by `TestContext::populate`.
pub(crate) fn alice() -> User {
    User::new("Alice", "Smith")
        .with_id(1)
        .with_age(34)
        .with_email("alice@example.com")
        .with_role_id(1)
        .with_phone("555-0101")
}

/// The second user created by `TestContext::populate`.
pub(crate) fn bob() -> User {
    User::new("Bob", "Jones")
        .with_id(2)
        .with_age(41)
        .with_email("bob@example.com")
        .with_role_id(2)
        .with_phone("555-0102")
}

/// The order created by `TestContext::populate`.
pub(crate) fn fence_order() -> Order {
    Order::new("Fence", "Paint the fence", 5000)
        .with_id(1)
        .with_dates(
            Some(OrderDate::from_input("04/08/2021")),
            Some(OrderDate::from_input("05/01/2021")),
        )
        .with_address("1 Main St")
        .with_parties(Some(1), Some(2))
}
