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

//! Business logic for the service.

use marketplace_core::db::Db;
use marketplace_core::env::get_optional_var;
use std::sync::Arc;

mod entities;
pub(crate) use entities::Entity;
mod records;
mod seed;
#[cfg(test)]
pub(crate) mod testutils;

/// Configuration options for the business logic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DriverOptions {
    /// Whether to reject orders whose customer and executor are the same user.
    pub enforce_distinct_parties: bool,
}

impl DriverOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_ENFORCE_DISTINCT_PARTIES`.
    pub fn from_env(prefix: &str) -> Result<Self, String> {
        Ok(Self {
            enforce_distinct_parties: get_optional_var::<bool>(prefix, "ENFORCE_DISTINCT_PARTIES")?
                .unwrap_or(false),
        })
    }
}

/// Business logic.
///
/// The public operations exposed by the driver are all "one shot": they start and commit a
/// transaction, so it's incorrect for the caller to use two separate calls.  For this reason,
/// these operations consume the driver in an attempt to minimize the possibility of executing
/// two operations.
#[derive(Clone)]
pub(crate) struct Driver {
    /// The database that the driver uses for persistence.
    db: Arc<dyn Db + Send + Sync>,

    /// Configuration options.
    opts: DriverOptions,
}

impl Driver {
    /// Creates a new driver backed by the given injected components.
    pub(crate) fn new(db: Arc<dyn Db + Send + Sync>, opts: DriverOptions) -> Self {
        Self { db, opts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_options_from_env_default() {
        temp_env::with_var_unset("DRVTEST_ENFORCE_DISTINCT_PARTIES", || {
            assert_eq!(DriverOptions::default(), DriverOptions::from_env("DRVTEST").unwrap());
        });
    }

    #[test]
    fn test_driver_options_from_env_enabled() {
        temp_env::with_var("DRVTEST_ENFORCE_DISTINCT_PARTIES", Some("true"), || {
            let opts = DriverOptions::from_env("DRVTEST").unwrap();
            assert!(opts.enforce_distinct_parties);
        });
    }

    #[test]
    fn test_driver_options_from_env_invalid() {
        temp_env::with_var("DRVTEST_ENFORCE_DISTINCT_PARTIES", Some("sometimes"), || {
            let err = DriverOptions::from_env("DRVTEST").unwrap_err();
            assert!(err.contains("DRVTEST_ENFORCE_DISTINCT_PARTIES"));
        });
    }
}
