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

//! The `OrderDate` data type.

use log::warn;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Format of the dates we accept from callers and normalize.
const INPUT_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[month padding:none]/[day padding:none]/[year]");

/// Format in which normalized dates are rendered and stored.
const STORED_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// A start or end date attached to an order.
///
/// Strings in `MM/DD/YYYY` form are normalized into real dates when they come in.  Anything else
/// is kept verbatim, as the service does not attempt general date parsing.
#[derive(Clone, Debug)]
pub enum OrderDate {
    /// A date that was recognized and normalized.
    Date(Date),

    /// A string that does not look like a date we know how to parse.
    Raw(String),
}

impl OrderDate {
    /// Interprets a date string provided by a caller.
    ///
    /// Only strings with exactly two `/` separators are considered dates, and they are parsed
    /// with month/day/year ordering.  Everything else is passed through unchanged.
    pub fn from_input<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        if s.matches('/').count() != 2 {
            return OrderDate::Raw(s);
        }
        match Date::parse(&s, INPUT_FORMAT) {
            Ok(date) => OrderDate::Date(date),
            Err(e) => {
                warn!("Keeping unparseable date '{}' as is: {}", s, e);
                OrderDate::Raw(s)
            }
        }
    }

    /// Interprets a date string read back from the database.
    pub fn from_stored<S: Into<String>>(s: S) -> Self {
        let s = s.into();
        match Date::parse(&s, STORED_FORMAT) {
            Ok(date) => OrderDate::Date(date),
            Err(_) => OrderDate::Raw(s),
        }
    }

    /// Returns the textual form of this date as it is stored and rendered.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            OrderDate::Date(date) => match date.format(STORED_FORMAT) {
                Ok(s) => Cow::Owned(s),
                // Only years beyond 9999 fail to format and they cannot be parsed in.
                Err(_) => Cow::Owned(date.to_string()),
            },
            OrderDate::Raw(s) => Cow::Borrowed(s),
        }
    }
}

/// Two dates are equal when they render to the same stored text.
impl PartialEq for OrderDate {
    fn eq(&self, other: &Self) -> bool {
        self.as_text() == other.as_text()
    }
}

impl fmt::Display for OrderDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl Serialize for OrderDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_text())
    }
}

/// Visitor to deserialize an `OrderDate` from a string.
struct OrderDateVisitor;

impl Visitor<'_> for OrderDateVisitor {
    type Value = OrderDate;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a date string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(OrderDate::from_input(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(OrderDate::from_input(v))
    }
}

impl<'de> Deserialize<'de> for OrderDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_string(OrderDateVisitor)
    }
}
