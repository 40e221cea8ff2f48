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

//! Foundations to build the marketplace web service.
//!
//! The service is structured in layers, and every crate that builds on this one should define the
//! same modules:
//!
//! 1.  `model`: High-level data types that represent concepts in the domain of the application.
//!     There should be no logic in here other than construction and validation.
//!
//! 1.  `db`: The persistence layer.  Operations are free functions that take an `Executor`, which
//!     can be backed by a pooled connection or by an open transaction.
//!
//! 1.  `driver`: The business logic layer.  Services provide their own `Driver` type to hold the
//!     in-memory state required by the app and to coordinate access to the database.
//!
//! 1.  `rest`: The HTTP layer, offering the REST APIs via an `axum::Router` backed by a `Driver`.
//!
//! 1.  `main`: The app launcher.  Its sole purpose is to gather configuration data from
//!     environment variables and call into the library to start the application.
//!
//! Every layer has its own result and error types, such as `DbResult` and `DbError`.  Errors
//! float to the top of the app using the `?` operator and are translated to HTTP status codes
//! once returned from the REST layer.

// Keep these in sync with other top-level files.
#![warn(anonymous_parameters, bad_style, clippy::missing_docs_in_private_items, missing_docs)]
#![warn(unused, unused_extern_crates, unused_import_braces, unused_qualifications)]
#![warn(unsafe_code)]

pub mod db;
pub mod driver;
pub mod env;
pub mod model;
pub mod rest;
