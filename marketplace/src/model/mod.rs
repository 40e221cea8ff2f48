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

//! Data types to represent the marketplace records.
//!
//! Every record type maps one-to-one to a database table and serializes to JSON using its column
//! names as keys.  The `id` of a record is `None` until the database assigns one, unless the
//! caller provides it explicitly.

mod date;
pub use date::OrderDate;
mod offer;
pub use offer::Offer;
mod order;
pub use order::Order;
mod role;
pub use role::UserRole;
mod user;
pub use user::User;
