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

//! The `Offer` data type.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A bid by an executor to carry out an order.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Offer {
    /// Identifier of the offer.
    id: Option<i32>,

    /// Identifier of the order this offer bids on.
    order_id: Option<i32>,

    /// Identifier of the user that offers to carry out the order.
    executor_id: Option<i32>,
}

impl Offer {
    /// Creates a new offer by `executor_id` on `order_id`.
    pub fn new(order_id: i32, executor_id: i32) -> Self {
        Self { id: None, order_id: Some(order_id), executor_id: Some(executor_id) }
    }

    /// Creates an offer from its raw parts as stored in the database.
    pub(crate) fn from_parts(
        id: Option<i32>,
        order_id: Option<i32>,
        executor_id: Option<i32>,
    ) -> Self {
        Self { id, order_id, executor_id }
    }

    /// Sets the identifier of the offer.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }
}
