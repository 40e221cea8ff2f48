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

//! The `User` data type.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A person registered in the marketplace.  Users act as customers when they create orders and
/// as executors when they bid on them.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct User {
    /// Identifier of the user.
    id: Option<i32>,

    /// First name of the user.
    first_name: String,

    /// Last name of the user.
    last_name: String,

    /// Age of the user, in years.
    age: Option<i32>,

    /// Email address of the user.  Unique across all users.
    email: Option<String>,

    /// Identifier of the role of this user.
    role_id: Option<i32>,

    /// Phone number of the user.  Unique across all users.
    phone: Option<String>,
}

impl User {
    /// Creates a new user with the given names and no other details.
    pub fn new<S1: Into<String>, S2: Into<String>>(first_name: S1, last_name: S2) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            age: None,
            email: None,
            role_id: None,
            phone: None,
        }
    }

    /// Sets the identifier of the user.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the age of the user.
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the email address of the user.
    pub fn with_email<S: Into<String>>(mut self, email: S) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the role of the user.
    pub fn with_role_id(mut self, role_id: i32) -> Self {
        self.role_id = Some(role_id);
        self
    }

    /// Sets the phone number of the user.
    pub fn with_phone<S: Into<String>>(mut self, phone: S) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_missing_optional_fields() {
        let user: User =
            serde_json::from_value(json!({"first_name": "Ann", "last_name": "Lee"})).unwrap();
        assert_eq!(User::new("Ann", "Lee"), user);
    }

    #[test]
    fn test_user_missing_names() {
        let err = serde_json::from_value::<User>(json!({"first_name": "Ann"})).unwrap_err();
        assert!(err.to_string().contains("missing field `last_name`"));
    }

    #[test]
    fn test_user_unknown_field() {
        let err = serde_json::from_value::<User>(
            json!({"first_name": "Ann", "last_name": "Lee", "nickname": "al"}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown field `nickname`"));
    }
}
