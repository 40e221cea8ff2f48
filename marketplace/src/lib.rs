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

//! REST service to keep track of the users, orders and offers of a services marketplace.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use derivative::Derivative;
use log::{info, warn};
use marketplace_core::db::{Db, DbError};
use marketplace_core::driver::DriverError;
use marketplace_core::env::get_optional_var;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

pub(crate) mod db;
pub use db::SchemaMode;
pub(crate) mod driver;
use driver::Driver;
pub use driver::DriverOptions;
pub mod model;
mod rest;
use rest::app;

/// Errors that prevent the service from starting or running.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    /// The configuration is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The database could not be prepared.
    #[error("Cannot initialize database: {0}")]
    Db(#[from] DbError),

    /// The seed data could not be loaded.
    #[error("Cannot load seed data: {0}")]
    Seed(#[from] DriverError),

    /// The HTTP server failed.
    #[error("Server failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Options that control how the service starts.
#[derive(Debug, Derivative, PartialEq)]
#[derivative(Default)]
pub struct ServeOptions {
    /// How to treat the tables that already exist in the database.
    #[derivative(Default(value = "SchemaMode::Preserve"))]
    pub schema: SchemaMode,

    /// Directory from which to load the seed data, if any.
    pub seed_dir: Option<PathBuf>,

    /// Options for the business logic.
    pub driver: DriverOptions,
}

impl ServeOptions {
    /// Creates a new set of options from environment variables whose name is prefixed with the
    /// given `prefix`.
    ///
    /// This will use variables such as `<prefix>_SCHEMA` and `<prefix>_SEED_DIR`.
    pub fn from_env(prefix: &str) -> Result<Self, ServeError> {
        let schema = get_optional_var::<String>(prefix, "SCHEMA").map_err(ServeError::Config)?;
        let schema = match schema {
            Some(s) => s.parse::<SchemaMode>().map_err(ServeError::Config)?,
            None => SchemaMode::Preserve,
        };
        let seed_dir =
            get_optional_var::<String>(prefix, "SEED_DIR").map_err(ServeError::Config)?;
        Ok(Self {
            schema,
            seed_dir: seed_dir.map(PathBuf::from),
            driver: DriverOptions::from_env(prefix).map_err(ServeError::Config)?,
        })
    }
}

/// Waits until the process is asked to terminate.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => {
            warn!("Cannot listen for the shutdown signal: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Instantiates all resources to serve the application on `bind_addr` backed by `db`.
///
/// While it'd be nice to push this responsibility to `main`, doing so would force us to expose many
/// crate-internal types to the public, which in turn would make dead code detection harder.
pub async fn serve(
    bind_addr: impl Into<SocketAddr>,
    db: Arc<dyn Db + Send + Sync>,
    opts: ServeOptions,
) -> Result<(), ServeError> {
    info!("Initializing database schema in {:?} mode", opts.schema);
    db::init_schema(&mut db.ex().await?, opts.schema).await?;

    let driver = Driver::new(db, opts.driver);
    if let Some(seed_dir) = opts.seed_dir {
        info!("Loading seed data from {}", seed_dir.display());
        driver.clone().seed_from_dir(&seed_dir).await?;
    }

    let bind_addr = bind_addr.into();
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app(driver)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}
