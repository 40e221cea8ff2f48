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

//! The `UserRole` data type.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A role that users can have, such as customer or executor.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UserRole {
    /// Identifier of the role.
    id: Option<i32>,

    /// Name of the role.
    user_role: Option<String>,
}

impl UserRole {
    /// Creates a new role named `user_role` without an assigned identifier.
    pub fn new<S: Into<String>>(user_role: S) -> Self {
        Self { id: None, user_role: Some(user_role.into()) }
    }

    /// Creates a role from its raw parts as stored in the database.
    pub(crate) fn from_parts(id: Option<i32>, user_role: Option<String>) -> Self {
        Self { id, user_role }
    }

    /// Sets the identifier of the role.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }
}
