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

//! Idempotent loader of seed data.

use crate::db;
use crate::driver::records::map_write_error;
use crate::driver::{Driver, Entity};
use crate::model::{Offer, Order, User, UserRole};
use log::info;
use marketplace_core::driver::{DriverError, DriverResult};
use serde_json::Value;
use std::path::Path;

/// Counts of what happened while loading a seed source.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SeedSummary {
    /// Number of records that were inserted.
    pub(crate) inserted: usize,

    /// Number of records that were skipped because their identifier already existed.
    pub(crate) skipped: usize,
}

/// Extracts the identifier of the seed `record` of type `T`.
fn seed_id<T: Entity>(record: &Value) -> DriverResult<i32> {
    let id = match record.get("id") {
        Some(id) => id,
        None => {
            return Err(DriverError::InvalidInput(format!(
                "Seed {} lacks an id: {}",
                T::NAME,
                record
            )));
        }
    };
    match id.as_i64().map(i32::try_from) {
        Some(Ok(id)) => Ok(id),
        Some(Err(_)) => {
            Err(DriverError::InvalidInput(format!("Seed {} id {} is out of range", T::NAME, id)))
        }
        None => Err(DriverError::InvalidInput(format!(
            "Seed {} id must be an integer but got {}",
            T::NAME,
            id
        ))),
    }
}

impl Driver {
    /// Loads the seed `records` of type `T`, skipping those whose identifier already exists.
    ///
    /// All records are written in a single transaction: any failure leaves the database as it
    /// was before the call.  Business rules do not apply to seed data.
    pub(crate) async fn seed<T: Entity>(self, records: Vec<Value>) -> DriverResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        let mut tx = self.db.begin().await?;
        for record in records {
            let id = seed_id::<T>(&record)?;
            if db::record_exists::<T>(tx.ex(), id).await? {
                summary.skipped += 1;
                continue;
            }

            let record: T = serde_json::from_value(record).map_err(|e| {
                DriverError::InvalidInput(format!("Invalid seed {} {}: {}", T::NAME, id, e))
            })?;
            db::insert_record(tx.ex(), &record).await.map_err(map_write_error::<T>)?;
            summary.inserted += 1;
        }
        db::sync_id_sequence::<T>(tx.ex()).await?;
        tx.commit().await?;

        info!(
            "Seeded {} records: {} inserted, {} skipped",
            T::NAME,
            summary.inserted,
            summary.skipped
        );
        Ok(summary)
    }

    /// Loads the seed file `name` from `dir` as records of type `T`.
    async fn seed_file<T: Entity>(self, dir: &Path, name: &str) -> DriverResult<SeedSummary> {
        let path = dir.join(name);
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            DriverError::BackendError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let records: Vec<Value> = serde_json::from_str(&content).map_err(|e| {
            DriverError::InvalidInput(format!("Invalid seed file {}: {}", path.display(), e))
        })?;
        self.seed::<T>(records).await
    }

    /// Loads all seed files from `dir` in the order required by their references.
    pub(crate) async fn seed_from_dir(self, dir: &Path) -> DriverResult<()> {
        self.clone().seed_file::<UserRole>(dir, "user_roles.json").await?;
        self.clone().seed_file::<User>(dir, "users.json").await?;
        self.clone().seed_file::<Order>(dir, "orders.json").await?;
        self.seed_file::<Offer>(dir, "offers.json").await?;
        Ok(())
    }
}
