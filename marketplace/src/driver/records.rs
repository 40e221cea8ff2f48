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

//! Generic operations to manage the records of any entity.

use crate::db::{self, Table};
use crate::driver::{Driver, Entity};
use marketplace_core::db::{DbError, Executor};
use marketplace_core::driver::{DriverError, DriverResult};
use serde_json::{Map, Value};

/// Builds the error to return when the `T` identified by `id` does not exist.
pub(super) fn not_found<T: Entity>(id: i32) -> DriverError {
    DriverError::NotFound(format!("No such {}: {}", T::NAME, id))
}

/// Converts a database error `e` from a write of a `T` into a driver error.
pub(super) fn map_write_error<T: Entity>(e: DbError) -> DriverError {
    match e {
        DbError::AlreadyExists => DriverError::AlreadyExists(format!(
            "A {} with the same identifier, email or phone already exists",
            T::NAME
        )),
        e => e.into(),
    }
}

/// Converts a single stored `record` into its view.
async fn into_view<T: Entity>(ex: &mut Executor, record: T) -> DriverResult<T::View> {
    match T::into_views(ex, vec![record]).await?.pop() {
        Some(view) => Ok(view),
        None => Err(DriverError::BackendError(format!("Lost {} while rendering it", T::NAME))),
    }
}

/// Merges the fields in `patch` on top of `record`, ignoring its `id` and any view-only fields.
fn apply_patch<T: Entity>(record: &T, patch: Map<String, Value>) -> DriverResult<T> {
    let mut fields = match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => fields,
        Ok(_) => {
            return Err(DriverError::BackendError(format!(
                "Stored {} is not representable as an object",
                T::NAME
            )));
        }
        Err(e) => return Err(DriverError::BackendError(e.to_string())),
    };
    for (key, value) in patch {
        if key != "id" && !T::VIEW_ONLY_FIELDS.contains(&key.as_str()) {
            fields.insert(key, value);
        }
    }
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| DriverError::InvalidInput(format!("Invalid {}: {}", T::NAME, e)))
}

impl Driver {
    /// Gets the `T` identified by `id`.
    pub(crate) async fn get<T: Entity>(self, id: i32) -> DriverResult<T::View> {
        let mut ex = self.db.ex().await?;
        let record = match db::get_record::<T>(&mut ex, id).await {
            Ok(record) => record,
            Err(DbError::NotFound) => return Err(not_found::<T>(id)),
            Err(e) => return Err(e.into()),
        };
        into_view(&mut ex, record).await
    }

    /// Gets all records of type `T` sorted by identifier.
    pub(crate) async fn list<T: Entity>(self) -> DriverResult<Vec<T::View>> {
        let mut ex = self.db.ex().await?;
        let records = db::get_records::<T>(&mut ex).await?;
        T::into_views(&mut ex, records).await
    }

    /// Creates a new `record` and returns it as stored.
    ///
    /// The record keeps its identifier if it has one.  Otherwise, a new one is assigned.
    pub(crate) async fn create<T: Entity>(self, record: T) -> DriverResult<T::View> {
        record.validate(&self.opts)?;

        let mut tx = self.db.begin().await?;
        let id = db::insert_record(tx.ex(), &record).await.map_err(map_write_error::<T>)?;
        if record.record_id().is_some() {
            db::sync_id_sequence::<T>(tx.ex()).await?;
        }
        let record = db::get_record::<T>(tx.ex(), id).await?;
        let view = into_view(tx.ex(), record).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Updates the `T` identified by `id` with the fields present in `patch` and returns the
    /// record as stored.
    ///
    /// Fields not present in `patch` keep their current values.
    pub(crate) async fn update<T: Entity>(
        self,
        id: i32,
        patch: Map<String, Value>,
    ) -> DriverResult<T::View> {
        let mut tx = self.db.begin().await?;
        let record = match db::get_record::<T>(tx.ex(), id).await {
            Ok(record) => record,
            Err(DbError::NotFound) => return Err(not_found::<T>(id)),
            Err(e) => return Err(e.into()),
        };

        let record = apply_patch(&record, patch)?;
        record.validate(&self.opts)?;

        db::update_record(tx.ex(), id, &record).await.map_err(map_write_error::<T>)?;
        let record = db::get_record::<T>(tx.ex(), id).await?;
        let view = into_view(tx.ex(), record).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Deletes the `T` identified by `id`.
    pub(crate) async fn delete<T: Entity>(self, id: i32) -> DriverResult<()> {
        let mut tx = self.db.begin().await?;
        match db::delete_record::<T>(tx.ex(), id).await {
            Ok(()) => (),
            Err(DbError::NotFound) => return Err(not_found::<T>(id)),
            Err(e) => return Err(e.into()),
        }
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DriverOptions;
    use crate::driver::testutils::*;
    use crate::model::{Offer, Order, OrderDate, User, UserRole};
    use serde_json::json;
    use std::sync::Arc;

    /// Converts a JSON object literal into a patch.
    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            v => panic!("Not an object: {}", v),
        }
    }

    #[tokio::test]
    async fn test_get_user_resolves_role() {
        let context = TestContext::setup().await;
        context.populate().await;

        let view = context.driver().get::<User>(2).await.unwrap();
        assert_eq!(&bob(), view.user());
        assert_eq!(&Some("executor".to_owned()), view.role());

        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(json!("executor"), value["role"]);
        assert_eq!(json!(2), value["role_id"]);
        assert_eq!(json!("Bob"), value["first_name"]);
    }

    #[tokio::test]
    async fn test_get_user_without_role() {
        let context = TestContext::setup().await;
        let id = context.insert(User::new("No", "Role")).await;

        let view = context.driver().get::<User>(id).await.unwrap();
        assert_eq!(&None, view.role());
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let context = TestContext::setup().await;
        context.populate().await;

        assert_eq!(
            DriverError::NotFound("No such user: 999999".to_owned()),
            context.driver().get::<User>(999999).await.unwrap_err()
        );
        assert_eq!(
            DriverError::NotFound("No such order: 999999".to_owned()),
            context.driver().get::<Order>(999999).await.unwrap_err()
        );
        assert_eq!(
            DriverError::NotFound("No such offer: 999999".to_owned()),
            context.driver().get::<Offer>(999999).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_list_empty() {
        let context = TestContext::setup().await;

        assert!(context.driver().list::<Order>().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_users() {
        let context = TestContext::setup().await;
        context.populate().await;

        let views = context.driver().list::<User>().await.unwrap();
        assert_eq!(2, views.len());
        assert_eq!(&alice(), views[0].user());
        assert_eq!(&Some("customer".to_owned()), views[0].role());
        assert_eq!(&bob(), views[1].user());
        assert_eq!(&Some("executor".to_owned()), views[1].role());
    }

    #[tokio::test]
    async fn test_create_assigns_id() {
        let context = TestContext::setup().await;
        context.populate().await;

        let user = User::new("Carol", "White").with_email("carol@example.com").with_role_id(1);
        let view = context.driver().create(user.clone()).await.unwrap();
        assert_eq!(&user.with_id(3), view.user());
        assert_eq!(&Some("customer".to_owned()), view.role());

        let stored = context.driver().get::<User>(3).await.unwrap();
        assert_eq!(view, stored);
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let context = TestContext::setup().await;

        let role = UserRole::new("admin").with_id(40);
        assert_eq!(role, context.driver().create(role.clone()).await.unwrap());

        let next = context.driver().create(UserRole::new("guest")).await.unwrap();
        assert_eq!(&Some(41), next.id());
    }

    #[tokio::test]
    async fn test_create_order_normalizes_dates() {
        let context = TestContext::setup().await;

        let order: Order = serde_json::from_value(json!({
            "name": "Roof",
            "description": "Fix the roof",
            "start_date": "04/08/2021",
            "end_date": "2021-04-09",
            "price": 9000,
        }))
        .unwrap();
        let order = context.driver().create(order).await.unwrap();

        let stored = context.get::<Order>(*order.id().as_ref().unwrap()).await.unwrap();
        match stored.start_date() {
            Some(OrderDate::Date(d)) => assert_eq!("2021-04-08", d.to_string()),
            e => panic!("Expected a normalized date but got {:?}", e),
        }
        assert_eq!(&Some(OrderDate::Raw("2021-04-09".to_owned())), stored.end_date());
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let context = TestContext::setup().await;
        context.populate().await;

        let user = User::new("Fake", "Alice").with_email("alice@example.com");
        match context.driver().create(user).await {
            Err(DriverError::AlreadyExists(msg)) => assert!(msg.contains("user")),
            e => panic!("{:?}", e),
        }
        assert_eq!(2, context.all::<User>().await.len());
    }

    #[tokio::test]
    async fn test_create_duplicate_phone() {
        let context = TestContext::setup().await;
        context.populate().await;

        let user = User::new("Fake", "Bob").with_phone("555-0102");
        match context.driver().create(user).await {
            Err(DriverError::AlreadyExists(_)) => (),
            e => panic!("{:?}", e),
        }
        assert_eq!(2, context.all::<User>().await.len());
    }

    #[tokio::test]
    async fn test_create_missing_reference() {
        let context = TestContext::setup().await;
        context.populate().await;

        match context.driver().create(Offer::new(1, 77)).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Constraint")),
            e => panic!("{:?}", e),
        }
        assert_eq!(1, context.all::<Offer>().await.len());
    }

    #[tokio::test]
    async fn test_create_order_same_parties_allowed_by_default() {
        let context = TestContext::setup().await;
        context.populate().await;

        let order = Order::new("Self", "Do it myself", 1).with_parties(Some(1), Some(1));
        context.driver().create(order).await.unwrap();
        assert_eq!(2, context.all::<Order>().await.len());
    }

    #[tokio::test]
    async fn test_create_order_same_parties_rejected_when_enforced() {
        let context =
            TestContext::setup_with(DriverOptions { enforce_distinct_parties: true }).await;
        context.populate().await;

        let order = Order::new("Self", "Do it myself", 1).with_parties(Some(1), Some(1));
        match context.driver().create(order).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("must be different")),
            e => panic!("{:?}", e),
        }
        assert_eq!(1, context.all::<Order>().await.len());
    }

    #[tokio::test]
    async fn test_update_only_changes_given_fields() {
        let context = TestContext::setup().await;
        context.populate().await;

        let order =
            context.driver().update::<Order>(1, patch(json!({"price": 7000}))).await.unwrap();

        let exp_order = Order::new("Fence", "Paint the fence", 7000)
            .with_id(1)
            .with_dates(
                Some(OrderDate::from_input("04/08/2021")),
                Some(OrderDate::from_input("05/01/2021")),
            )
            .with_address("1 Main St")
            .with_parties(Some(1), Some(2));
        assert_eq!(exp_order, order);
        assert_eq!(Some(exp_order), context.get::<Order>(1).await);
    }

    #[tokio::test]
    async fn test_update_normalizes_dates() {
        let context = TestContext::setup().await;
        context.populate().await;

        let order = context
            .driver()
            .update::<Order>(1, patch(json!({"end_date": "12/31/2021"})))
            .await
            .unwrap();
        assert_eq!("2021-12-31", order.end_date().as_ref().unwrap().to_string());
        assert_eq!(fence_order().start_date(), order.start_date());
    }

    #[tokio::test]
    async fn test_update_can_clear_optional_fields() {
        let context = TestContext::setup().await;
        context.populate().await;

        let view =
            context.driver().update::<User>(1, patch(json!({"phone": null}))).await.unwrap();
        assert_eq!(&None, view.user().phone());
        assert_eq!(&Some("alice@example.com".to_owned()), view.user().email());
    }

    #[tokio::test]
    async fn test_update_ignores_id() {
        let context = TestContext::setup().await;
        context.populate().await;

        let view = context
            .driver()
            .update::<User>(1, patch(json!({"id": 50, "age": 35})))
            .await
            .unwrap();
        assert_eq!(&alice().with_age(35), view.user());
        assert_eq!(None, context.get::<User>(50).await);
    }

    #[tokio::test]
    async fn test_update_user_with_own_view() {
        let context = TestContext::setup().await;
        context.populate().await;

        let view = context.driver().get::<User>(2).await.unwrap();
        let mut fields = patch(serde_json::to_value(&view).unwrap());
        fields.insert("age".to_owned(), json!(42));
        fields.insert("role".to_owned(), json!("customer"));

        let view = context.driver().update::<User>(2, fields).await.unwrap();
        assert_eq!(&bob().with_age(42), view.user());
        assert_eq!(&Some("executor".to_owned()), view.role());
    }

    #[tokio::test]
    async fn test_update_unknown_field() {
        let context = TestContext::setup().await;
        context.populate().await;

        match context.driver().update::<Offer>(1, patch(json!({"price": 3}))).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("unknown field `price`")),
            e => panic!("{:?}", e),
        }
    }

    #[tokio::test]
    async fn test_update_bad_type() {
        let context = TestContext::setup().await;
        context.populate().await;

        match context.driver().update::<Order>(1, patch(json!({"price": "cheap"}))).await {
            Err(DriverError::InvalidInput(msg)) => assert!(msg.contains("Invalid order")),
            e => panic!("{:?}", e),
        }
        assert_eq!(Some(fence_order()), context.get::<Order>(1).await);
    }

    #[tokio::test]
    async fn test_update_duplicate_email() {
        let context = TestContext::setup().await;
        context.populate().await;

        match context
            .driver()
            .update::<User>(2, patch(json!({"email": "alice@example.com"})))
            .await
        {
            Err(DriverError::AlreadyExists(_)) => (),
            e => panic!("{:?}", e),
        }
        assert_eq!(Some(bob()), context.get::<User>(2).await);
    }

    #[tokio::test]
    async fn test_update_not_found() {
        let context = TestContext::setup().await;
        context.populate().await;

        assert_eq!(
            DriverError::NotFound("No such order: 999999".to_owned()),
            context.driver().update::<Order>(999999, patch(json!({"price": 1}))).await.unwrap_err()
        );
        assert_eq!(vec![fence_order()], context.all::<Order>().await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_update_concurrently_on_file_database() {
        let path =
            std::env::temp_dir().join(format!("marketplace-updates-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let conn_str = format!("sqlite://{}?mode=rwc", path.display());
        let db = marketplace_core::db::sqlite::connect(&conn_str).await.unwrap();
        let context = TestContext::setup_with_db(Arc::new(db), DriverOptions::default()).await;
        context.populate().await;

        let mut handles = vec![];
        for price in 0..20 {
            let driver = context.driver();
            handles.push(tokio::spawn(async move {
                driver.update::<Order>(1, patch(json!({"price": price}))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let order = context.get::<Order>(1).await.unwrap();
        assert!((0..20).contains(order.price()));
        assert_eq!(fence_order().name(), order.name());

        context.close().await;
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_update_order_same_parties_rejected_when_enforced() {
        let context =
            TestContext::setup_with(DriverOptions { enforce_distinct_parties: true }).await;
        context.populate().await;

        match context.driver().update::<Order>(1, patch(json!({"executor_id": 1}))).await {
            Err(DriverError::InvalidInput(_)) => (),
            e => panic!("{:?}", e),
        }
        assert_eq!(Some(fence_order()), context.get::<Order>(1).await);
    }

    #[tokio::test]
    async fn test_delete_ok() {
        let context = TestContext::setup().await;
        context.populate().await;

        context.driver().delete::<Offer>(1).await.unwrap();
        assert_eq!(None, context.get::<Offer>(1).await);
        assert_eq!(
            DriverError::NotFound("No such offer: 1".to_owned()),
            context.driver().get::<Offer>(1).await.unwrap_err()
        );
    }

    #[tokio::test]
    async fn test_delete_not_found() {
        let context = TestContext::setup().await;
        context.populate().await;

        assert_eq!(
            DriverError::NotFound("No such user: 999999".to_owned()),
            context.driver().delete::<User>(999999).await.unwrap_err()
        );
        assert_eq!(2, context.all::<User>().await.len());
    }

    #[tokio::test]
    async fn test_delete_referenced() {
        let context = TestContext::setup().await;
        context.populate().await;

        match context.driver().delete::<Order>(1).await {
            Err(DriverError::InvalidInput(_)) => (),
            e => panic!("{:?}", e),
        }
        assert_eq!(Some(fence_order()), context.get::<Order>(1).await);
    }
}
