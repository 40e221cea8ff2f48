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

//! Per-entity behavior of the generic record operations.

use crate::db::{self, Table};
use crate::driver::DriverOptions;
use crate::model::{Offer, Order, User, UserRole};
use async_trait::async_trait;
use derive_getters::Getters;
use marketplace_core::db::Executor;
use marketplace_core::driver::{DriverError, DriverResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// A record type that the driver knows how to manage.
#[async_trait]
pub(crate) trait Entity: Table + Serialize + DeserializeOwned + 'static {
    /// Name of the entity as shown in messages to the user.
    const NAME: &'static str;

    /// Representation of the entity returned to callers.
    type View: Serialize + Send;

    /// Fields present in the view but not in the record.  Updates ignore them so that callers can
    /// send back what they got.
    const VIEW_ONLY_FIELDS: &'static [&'static str] = &[];

    /// Checks the business rules that apply to new or modified records.
    fn validate(&self, _opts: &DriverOptions) -> DriverResult<()> {
        Ok(())
    }

    /// Converts the stored `records` into the representation returned to callers.
    async fn into_views(ex: &mut Executor, records: Vec<Self>) -> DriverResult<Vec<Self::View>>;
}

#[async_trait]
impl Entity for UserRole {
    const NAME: &'static str = "user role";

    type View = Self;

    async fn into_views(_ex: &mut Executor, records: Vec<Self>) -> DriverResult<Vec<Self::View>> {
        Ok(records)
    }
}

/// A user as returned to callers, with the name of its role resolved.
#[derive(Debug, Getters, PartialEq, Serialize)]
pub(crate) struct UserView {
    /// The stored user.
    #[serde(flatten)]
    user: User,

    /// Name of the role referenced by the user's `role_id`.
    role: Option<String>,
}

#[async_trait]
impl Entity for User {
    const NAME: &'static str = "user";

    type View = UserView;

    const VIEW_ONLY_FIELDS: &'static [&'static str] = &["role"];

    async fn into_views(ex: &mut Executor, records: Vec<Self>) -> DriverResult<Vec<Self::View>> {
        let roles = db::get_records::<UserRole>(ex)
            .await?
            .into_iter()
            .filter_map(|role| role.id().map(|id| (id, role.user_role().clone())))
            .collect::<HashMap<i32, Option<String>>>();

        Ok(records
            .into_iter()
            .map(|user| {
                let role = user.role_id().and_then(|id| roles.get(&id).cloned().flatten());
                UserView { user, role }
            })
            .collect())
    }
}

#[async_trait]
impl Entity for Order {
    const NAME: &'static str = "order";

    type View = Self;

    fn validate(&self, opts: &DriverOptions) -> DriverResult<()> {
        if opts.enforce_distinct_parties && !self.has_distinct_parties() {
            return Err(DriverError::InvalidInput(
                "The customer and the executor of an order must be different users".to_owned(),
            ));
        }
        Ok(())
    }

    async fn into_views(_ex: &mut Executor, records: Vec<Self>) -> DriverResult<Vec<Self::View>> {
        Ok(records)
    }
}

#[async_trait]
impl Entity for Offer {
    const NAME: &'static str = "offer";

    type View = Self;

    async fn into_views(_ex: &mut Executor, records: Vec<Self>) -> DriverResult<Vec<Self::View>> {
        Ok(records)
    }
}
