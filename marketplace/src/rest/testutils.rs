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

//! Test utilities for the REST API.

use crate::db::Table;
use crate::driver::DriverOptions;
use crate::rest::app;
use axum::Router;

pub(crate) use crate::driver::testutils::{alice, bob, fence_order};

pub(crate) struct TestContext {
    /// Direct access to the records behind the app.
    records: crate::driver::testutils::TestContext,

    app: Router,
}

impl TestContext {
    pub(crate) async fn setup() -> Self {
        Self::setup_with(DriverOptions::default()).await
    }

    pub(crate) async fn setup_with(opts: DriverOptions) -> Self {
        let records = crate::driver::testutils::TestContext::setup_with(opts).await;
        let app = app(records.driver());
        Self { records, app }
    }

    /// Creates a test context with the records inserted by `populate`.
    pub(crate) async fn setup_populated() -> Self {
        let context = Self::setup().await;
        context.populate().await;
        context
    }

    pub(crate) fn app(&self) -> Router {
        self.app.clone()
    }

    pub(crate) fn into_app(self) -> Router {
        self.app
    }

    /// Inserts two roles, the users `alice` and `bob`, the `fence_order` and an offer by Bob on
    /// that order.
    pub(crate) async fn populate(&self) {
        self.records.populate().await
    }

    pub(crate) async fn insert<T: Table>(&self, record: T) -> i32 {
        self.records.insert(record).await
    }

    pub(crate) async fn get<T: Table>(&self, id: i32) -> Option<T> {
        self.records.get::<T>(id).await
    }

    pub(crate) async fn count<T: Table>(&self) -> usize {
        self.records.all::<T>().await.len()
    }
}
