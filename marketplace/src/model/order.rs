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

//! The `Order` data type.

use crate::model::OrderDate;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A work request created by a customer.
#[derive(Clone, Debug, Deserialize, Getters, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Order {
    /// Identifier of the order.
    id: Option<i32>,

    /// Short title of the order.
    name: String,

    /// Detailed description of the work to do.
    description: String,

    /// Date on which the work should start.
    start_date: Option<OrderDate>,

    /// Date by which the work should be done.
    end_date: Option<OrderDate>,

    /// Address where the work happens.
    address: Option<String>,

    /// Price offered for the work.
    price: i32,

    /// Identifier of the user that created the order.
    customer_id: Option<i32>,

    /// Identifier of the user that will carry out the order.
    executor_id: Option<i32>,
}

impl Order {
    /// Creates a new order with the mandatory fields only.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, description: S2, price: i32) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: description.into(),
            start_date: None,
            end_date: None,
            address: None,
            price,
            customer_id: None,
            executor_id: None,
        }
    }

    /// Sets the identifier of the order.
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the start and end dates of the order.
    pub fn with_dates(
        mut self,
        start_date: Option<OrderDate>,
        end_date: Option<OrderDate>,
    ) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    /// Sets the address of the order.
    pub fn with_address<S: Into<String>>(mut self, address: S) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Sets the customer and the executor of the order.
    pub fn with_parties(mut self, customer_id: Option<i32>, executor_id: Option<i32>) -> Self {
        self.customer_id = customer_id;
        self.executor_id = executor_id;
        self
    }

    /// Returns true unless the customer and the executor are known to be the same user.
    pub fn has_distinct_parties(&self) -> bool {
        match (self.customer_id, self.executor_id) {
            (Some(customer_id), Some(executor_id)) => customer_id != executor_id,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    #[test]
    fn test_order_normalizes_dates() {
        let order: Order = serde_json::from_value(json!({
            "name": "Paint",
            "description": "Paint the fence",
            "start_date": "04/08/2021",
            "end_date": "2021-05-01",
            "price": 5000,
        }))
        .unwrap();
        assert!(matches!(
            order.start_date(),
            Some(OrderDate::Date(d)) if *d == date!(2021 - 04 - 08)
        ));
        assert!(matches!(order.end_date(), Some(OrderDate::Raw(s)) if s == "2021-05-01"));
    }

    #[test]
    fn test_order_null_dates() {
        let order: Order = serde_json::from_value(json!({
            "name": "Paint",
            "description": "Paint the fence",
            "start_date": null,
            "price": 5000,
        }))
        .unwrap();
        assert_eq!(Order::new("Paint", "Paint the fence", 5000), order);
    }

    #[test]
    fn test_order_rejects_numeric_dates() {
        let err = serde_json::from_value::<Order>(json!({
            "name": "Paint",
            "description": "Paint the fence",
            "start_date": 20210408,
            "price": 5000,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("expected a date string"));
    }

    #[test]
    fn test_order_serializes_dates_as_text() {
        let order = Order::new("Paint", "Paint the fence", 5000)
            .with_id(3)
            .with_dates(Some(OrderDate::from_input("4/8/2021")), None);
        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(json!("2021-04-08"), value["start_date"]);
        assert_eq!(json!(null), value["end_date"]);
        assert_eq!(json!(3), value["id"]);
    }

    #[test]
    fn test_order_has_distinct_parties() {
        let order = Order::new("a", "b", 1);
        assert!(order.clone().has_distinct_parties());
        assert!(order.clone().with_parties(Some(1), None).has_distinct_parties());
        assert!(order.clone().with_parties(Some(1), Some(2)).has_distinct_parties());
        assert!(!order.with_parties(Some(2), Some(2)).has_distinct_parties());
    }
}
