//! Integration tests for the stock projector and its alerts.

mod common;

use kontor_core::inventory::{NewCategory, NewMovement, NewProduct};
use kontor_db::entities::sea_orm_active_enums::AlertType;
use kontor_db::repositories::{CategoryError, ProductError};
use kontor_db::{
    AlertRepository, CategoryRepository, MovementRepository, ProductRepository, ReportRepository,
};
use uuid::Uuid;

fn movement(product_id: Uuid, movement_type: &str, quantity: i64) -> NewMovement {
    NewMovement {
        movement_type: Some(movement_type.into()),
        quantity: Some(quantity),
        reason: Some("Test".into()),
        product_id: Some(product_id),
        reference: None,
    }
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_in_10_out_8_opens_one_low_stock_alert() {
    let t = common::setup().await;
    let widget = common::product(&t.db, "WID-001", 5, None).await;
    let repo = MovementRepository::new(t.db.clone());

    let received = repo
        .create(movement(widget, "IN", 10).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    assert_eq!(received.stock, 10);
    assert!(received.alerts.is_empty());

    let issued = repo
        .create(movement(widget, "OUT", 8).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    assert_eq!(issued.stock, 2);
    assert_eq!(issued.alerts.len(), 1);
    assert_eq!(issued.alerts[0].alert_type, AlertType::LowStock);
    assert_eq!(
        issued.alerts[0].message,
        "Low stock for Product WID-001. Current stock: 2, minimum: 5"
    );

    let detail = ProductRepository::new(t.db.clone()).get(widget).await.unwrap();
    assert_eq!(detail.product.stock, 2);
    assert_eq!(detail.movements.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_open_alert_is_not_duplicated_until_resolved() {
    let t = common::setup().await;
    let widget = common::product(&t.db, "WID-002", 5, None).await;
    let movements = MovementRepository::new(t.db.clone());
    let alerts = AlertRepository::new(t.db.clone());

    movements
        .create(movement(widget, "IN", 3).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    let second = movements
        .create(movement(widget, "OUT", 1).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    assert!(second.alerts.is_empty());

    let open = alerts.list(Some(false)).await.unwrap();
    assert_eq!(open.len(), 1);

    let resolved = alerts.resolve(open[0].alert.id).await.unwrap();
    assert!(resolved.is_resolved);
    assert!(resolved.resolved_at.is_some());

    let third = movements
        .create(movement(widget, "OUT", 1).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    assert_eq!(third.alerts.len(), 1);
    assert_eq!(alerts.list(None).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_restock_does_not_resolve_alert() {
    let t = common::setup().await;
    let widget = common::product(&t.db, "WID-003", 5, Some(20)).await;
    let movements = MovementRepository::new(t.db.clone());

    movements
        .create(movement(widget, "IN", 1).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    let over = movements
        .create(movement(widget, "IN", 30).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    assert_eq!(over.alerts.len(), 1);
    assert_eq!(over.alerts[0].alert_type, AlertType::OverStock);

    let open = AlertRepository::new(t.db.clone()).list(Some(false)).await.unwrap();
    assert_eq!(open.len(), 2);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_duplicate_sku_and_category_name_rejected() {
    let t = common::setup().await;
    let widget = common::product(&t.db, "WID-004", 0, None).await;
    let products = ProductRepository::new(t.db.clone());
    let existing = products.find(widget).await.unwrap();

    let result = products
        .create(
            NewProduct {
                sku: Some("WID-004".into()),
                name: Some("Clone".into()),
                price: Some(existing.price),
                cost: Some(existing.cost),
                category_id: Some(existing.category_id),
                ..NewProduct::default()
            }
            .validate()
            .unwrap(),
        )
        .await;
    assert!(matches!(result, Err(ProductError::DuplicateSku(_))));

    let result = CategoryRepository::new(t.db.clone())
        .create(
            NewCategory {
                name: Some("Category WID-004".into()),
                description: None,
            }
            .validate()
            .unwrap(),
        )
        .await;
    assert!(matches!(result, Err(CategoryError::DuplicateName(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_concurrent_category_names_yield_one_winner() {
    let t = common::setup().await;
    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..8 {
        let repo = CategoryRepository::new(t.db.clone());
        tasks.spawn(async move {
            let input = NewCategory {
                name: Some("Hardware".into()),
                description: None,
            }
            .validate()
            .unwrap();
            repo.create(input).await
        });
    }

    let results = tasks.join_all().await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        results
            .iter()
            .filter(|r| r.is_err())
            .all(|r| matches!(r, Err(CategoryError::DuplicateName(_))))
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_product_with_unknown_category_rejected() {
    let t = common::setup().await;
    let result = ProductRepository::new(t.db.clone())
        .create(
            NewProduct {
                sku: Some("GHOST".into()),
                name: Some("Ghost".into()),
                price: Some(rust_decimal::Decimal::ONE),
                cost: Some(rust_decimal::Decimal::ONE),
                category_id: Some(Uuid::new_v4()),
                ..NewProduct::default()
            }
            .validate()
            .unwrap(),
        )
        .await;
    assert!(matches!(result, Err(ProductError::CategoryNotFound(_))));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_stock_reports() {
    let t = common::setup().await;
    let low = common::product(&t.db, "LOW-001", 5, None).await;
    let fine = common::product(&t.db, "OK-001", 5, None).await;
    let movements = MovementRepository::new(t.db.clone());
    movements
        .create(movement(low, "IN", 2).validate().unwrap(), t.user_id)
        .await
        .unwrap();
    movements
        .create(movement(fine, "IN", 50).validate().unwrap(), t.user_id)
        .await
        .unwrap();

    let reports = ReportRepository::new(t.db.clone());
    let low_stock = reports.low_stock().await.unwrap();
    assert_eq!(low_stock.len(), 1);
    assert_eq!(low_stock[0].sku, "LOW-001");

    let dashboard = reports.inventory_dashboard().await.unwrap();
    assert_eq!(dashboard.totals.total_products, 2);
    assert_eq!(dashboard.totals.low_stock_items, 1);
    assert_eq!(dashboard.active_alerts.len(), 1);
    assert_eq!(dashboard.recent_movements.len(), 2);
    assert_eq!(dashboard.categories.len(), 2);
}
