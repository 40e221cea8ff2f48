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

//! API to update some fields of an existing record of an entity.

use crate::driver::{Driver, Entity};
use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use marketplace_core::rest::RestError;
use serde_json::{Map, Value};

/// API handler.
///
/// The body may be a full record as returned by the GET APIs: its `id` and any fields that only
/// exist in the rendered view, such as the `role` of a user, are ignored.
pub(crate) async fn handler<T: Entity>(
    State(driver): State<Driver>,
    Path(id): Path<i32>,
    Json(patch): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, RestError> {
    let view = driver.update::<T>(id, patch).await?;
    Ok(Json(view))
}
