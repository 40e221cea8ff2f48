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

//! Entry point to the marketplace service.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

use log::{error, info};
use marketplace::{ServeOptions, serve};
use marketplace_core::db::Db;
use marketplace_core::env::get_optional_var;
use std::net::Ipv4Addr;
use std::process;
use std::sync::Arc;

/// Prefix of all environment variables that configure the service.
const PREFIX: &str = "MARKETPLACE";

/// Connects to the database backend selected in the environment.
async fn connect_db() -> Result<Arc<dyn Db + Send + Sync>, String> {
    let backend =
        get_optional_var::<String>(PREFIX, "BACKEND")?.unwrap_or_else(|| "sqlite".to_owned());
    info!("Using the {} database backend", backend);
    match backend.as_str() {
        #[cfg(feature = "postgres")]
        "postgres" => {
            use marketplace_core::db::postgres::{PostgresDb, PostgresOptions};
            let opts = PostgresOptions::from_env("PGSQL_PROD")?;
            let db = PostgresDb::connect(opts).map_err(|e| e.to_string())?;
            Ok(Arc::new(db))
        }

        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = get_optional_var::<String>(PREFIX, "SQLITE_PATH")?
                .unwrap_or_else(|| "sqlite://marketplace.db?mode=rwc".to_owned());
            let db =
                marketplace_core::db::sqlite::connect(&path).await.map_err(|e| e.to_string())?;
            Ok(Arc::new(db))
        }

        backend => Err(format!("Unsupported database backend '{}'", backend)),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let port = match get_optional_var::<u16>(PREFIX, "PORT") {
        Ok(port) => port.unwrap_or(3000),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    let addr = (Ipv4Addr::LOCALHOST, port);

    let opts = match ServeOptions::from_env(PREFIX) {
        Ok(opts) => opts,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let db = match connect_db().await {
        Ok(db) => db,
        Err(e) => {
            error!("Cannot connect to the database: {}", e);
            process::exit(1);
        }
    };

    let result = serve(addr, db.clone(), opts).await;
    db.close().await;
    if let Err(e) = result {
        error!("{}", e);
        process::exit(1);
    }
}
