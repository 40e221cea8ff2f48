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

//! Entry point to the REST server.

use crate::driver::{Driver, Entity};
use crate::model::{Offer, Order, User};
use axum::Router;

mod record_delete;
mod record_get;
mod record_post;
mod record_put;
mod records_get;
#[cfg(test)]
mod testutils;

/// Creates the routes to manage the records of type `T` under the `base` path.
fn entity_router<T: Entity>(base: &str) -> Router<Driver> {
    use axum::routing::get;
    Router::new()
        .route(base, get(records_get::handler::<T>).post(record_post::handler::<T>))
        .route(
            &format!("{}/:id", base),
            get(record_get::handler::<T>)
                .put(record_put::handler::<T>)
                .delete(record_delete::handler::<T>),
        )
}

/// Creates the router for the application.
pub(crate) fn app(driver: Driver) -> Router {
    Router::new()
        .merge(entity_router::<User>("/users"))
        .merge(entity_router::<Order>("/orders"))
        .merge(entity_router::<Offer>("/offers"))
        .with_state(driver)
}
