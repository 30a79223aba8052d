//! Catalog routes: categories, suppliers and products.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::{DateTime, FixedOffset};
use kontor_core::{
    auth::Capability,
    inventory::{
        CategoryChanges, NewCategory, NewProduct, NewSupplier, ProductChanges, SupplierChanges,
    },
};
use kontor_db::{
    CategoryRepository, ProductRepository, SupplierRepository,
    entities::{categories, suppliers},
    repositories::{ProductDetail, ProductFilter},
};
use kontor_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::views::{MovementResponse, ProductResponse};
use crate::{
    AppState,
    error::ApiResult,
    extractors::{ApiJson, ApiPath, ApiQuery},
    middleware::AuthUser,
};

/// Default page size for the product list.
const PRODUCTS_PAGE_SIZE: u64 = 20;

/// Creates the catalog routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/inventory/categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/inventory/categories/{id}",
            get(get_category).put(update_category),
        )
        .route(
            "/inventory/suppliers",
            get(list_suppliers).post(create_supplier),
        )
        .route(
            "/inventory/suppliers/{id}",
            get(get_supplier).put(update_supplier),
        )
        .route("/inventory/products", get(list_products).post(create_product))
        .route(
            "/inventory/products/{id}",
            get(get_product).put(update_product),
        )
}

// ============================================================================
// Categories
// ============================================================================

/// Category, with a product count on lists and products on the detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    /// Category ID.
    pub id: Uuid,
    /// Unique name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
    /// Active products in the category.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_count: Option<i64>,
    /// Active products with stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductResponse>>,
}

impl From<categories::Model> for CategoryResponse {
    fn from(c: categories::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            description: c.description,
            is_active: c.is_active,
            created_at: c.created_at,
            updated_at: c.updated_at,
            products_count: None,
            products: None,
        }
    }
}

/// Request body for creating a category.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    /// Unique name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
}

/// Request body for updating a category.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    /// Unique name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: Option<bool>,
}

/// GET /inventory/categories
async fn list_categories(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<CategoryResponse>>> {
    auth.require(Capability::InventoryRead)?;

    let categories = CategoryRepository::new((*state.db).clone()).list().await?;
    Ok(Json(
        categories
            .into_iter()
            .map(|c| CategoryResponse {
                products_count: Some(c.product_count),
                ..CategoryResponse::from(c.category)
            })
            .collect(),
    ))
}

/// GET /inventory/categories/{id}
async fn get_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<CategoryResponse>> {
    auth.require(Capability::InventoryRead)?;

    let detail = CategoryRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(CategoryResponse {
        products: Some(detail.products.into_iter().map(ProductResponse::from).collect()),
        ..CategoryResponse::from(detail.category)
    }))
}

/// POST /inventory/categories
async fn create_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<CategoryResponse>)> {
    auth.require(Capability::InventoryWrite)?;

    let input = NewCategory {
        name: payload.name,
        description: payload.description,
    }
    .validate()?;
    let category = CategoryRepository::new((*state.db).clone())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(category.into())))
}

/// PUT /inventory/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateCategoryRequest>,
) -> ApiResult<Json<CategoryResponse>> {
    auth.require(Capability::InventoryWrite)?;

    let changes = CategoryChanges {
        name: payload.name,
        description: payload.description,
        is_active: payload.is_active,
    }
    .validate()?;
    let category = CategoryRepository::new((*state.db).clone())
        .update(id, changes)
        .await?;
    Ok(Json(category.into()))
}

// ============================================================================
// Suppliers
// ============================================================================

/// Supplier, with a product count on lists and products on the detail view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierResponse {
    /// Supplier ID.
    pub id: Uuid,
    /// Name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
    /// Active flag.
    pub is_active: bool,
    /// Creation time.
    pub created_at: DateTime<FixedOffset>,
    /// Last update.
    pub updated_at: DateTime<FixedOffset>,
    /// Active products supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products_count: Option<i64>,
    /// Active products with stock.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductResponse>>,
}

impl From<suppliers::Model> for SupplierResponse {
    fn from(s: suppliers::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            email: s.email,
            phone: s.phone,
            address: s.address,
            tax_id: s.tax_id,
            is_active: s.is_active,
            created_at: s.created_at,
            updated_at: s.updated_at,
            products_count: None,
            products: None,
        }
    }
}

/// Request body for creating or updating a supplier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierRequest {
    /// Name.
    pub name: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Tax identifier.
    pub tax_id: Option<String>,
    /// Active flag. Ignored on create.
    pub is_active: Option<bool>,
}

/// GET /inventory/suppliers
async fn list_suppliers(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<SupplierResponse>>> {
    auth.require(Capability::InventoryRead)?;

    let suppliers = SupplierRepository::new((*state.db).clone()).list().await?;
    Ok(Json(
        suppliers
            .into_iter()
            .map(|s| SupplierResponse {
                products_count: Some(s.product_count),
                ..SupplierResponse::from(s.supplier)
            })
            .collect(),
    ))
}

/// GET /inventory/suppliers/{id}
async fn get_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<SupplierResponse>> {
    auth.require(Capability::InventoryRead)?;

    let detail = SupplierRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(SupplierResponse {
        products: Some(detail.products.into_iter().map(ProductResponse::from).collect()),
        ..SupplierResponse::from(detail.supplier)
    }))
}

/// POST /inventory/suppliers
async fn create_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<SupplierRequest>,
) -> ApiResult<(StatusCode, Json<SupplierResponse>)> {
    auth.require(Capability::InventoryWrite)?;

    let input = NewSupplier {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        tax_id: payload.tax_id,
    }
    .validate()?;
    let supplier = SupplierRepository::new((*state.db).clone())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(supplier.into())))
}

/// PUT /inventory/suppliers/{id}
async fn update_supplier(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SupplierRequest>,
) -> ApiResult<Json<SupplierResponse>> {
    auth.require(Capability::InventoryWrite)?;

    let changes = SupplierChanges {
        name: payload.name,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        tax_id: payload.tax_id,
        is_active: payload.is_active,
    }
    .validate()?;
    let supplier = SupplierRepository::new((*state.db).clone())
        .update(id, changes)
        .await?;
    Ok(Json(supplier.into()))
}

// ============================================================================
// Products
// ============================================================================

/// Product with its latest movements.
#[derive(Debug, Serialize)]
pub struct ProductDetailResponse {
    /// Product with stock.
    #[serde(flatten)]
    pub product: ProductResponse,
    /// Latest movements, newest first.
    pub movements: Vec<MovementResponse>,
}

impl From<ProductDetail> for ProductDetailResponse {
    fn from(d: ProductDetail) -> Self {
        Self {
            product: d.product.into(),
            movements: d
                .movements
                .into_iter()
                .map(|m| MovementResponse::new(m, None))
                .collect(),
        }
    }
}

/// Query parameters for listing products.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProductsQuery {
    /// Page number (1-indexed).
    pub page: Option<u64>,
    /// Page size.
    pub limit: Option<u64>,
    /// Only products in this category.
    pub category_id: Option<Uuid>,
    /// Only products from this supplier.
    pub supplier_id: Option<Uuid>,
    /// Defaults to active products only.
    pub is_active: Option<bool>,
}

/// Request body for creating a product.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    /// Unique SKU.
    pub sku: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Sale price.
    pub price: Option<Decimal>,
    /// Unit cost.
    pub cost: Option<Decimal>,
    /// Owning category.
    pub category_id: Option<Uuid>,
    /// Preferred supplier.
    pub supplier_id: Option<Uuid>,
    /// Minimum stock.
    pub min_stock: Option<i64>,
    /// Maximum stock.
    pub max_stock: Option<i64>,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(r: CreateProductRequest) -> Self {
        Self {
            sku: r.sku,
            name: r.name,
            description: r.description,
            price: r.price,
            cost: r.cost,
            category_id: r.category_id,
            supplier_id: r.supplier_id,
            min_stock: r.min_stock,
            max_stock: r.max_stock,
        }
    }
}

/// Request body for updating a product. `supplierId` and `maxStock` may be
/// sent as `null` to clear them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    /// Unique SKU.
    pub sku: Option<String>,
    /// Name.
    pub name: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Sale price.
    pub price: Option<Decimal>,
    /// Unit cost.
    pub cost: Option<Decimal>,
    /// Owning category.
    pub category_id: Option<Uuid>,
    /// Preferred supplier.
    #[serde(default, deserialize_with = "serde_with::rust::double_option::deserialize")]
    pub supplier_id: Option<Option<Uuid>>,
    /// Minimum stock.
    pub min_stock: Option<i64>,
    /// Maximum stock.
    #[serde(default, deserialize_with = "serde_with::rust::double_option::deserialize")]
    pub max_stock: Option<Option<i64>>,
    /// Active flag.
    pub is_active: Option<bool>,
}

impl From<UpdateProductRequest> for ProductChanges {
    fn from(r: UpdateProductRequest) -> Self {
        Self {
            sku: r.sku,
            name: r.name,
            description: r.description,
            price: r.price,
            cost: r.cost,
            category_id: r.category_id,
            supplier_id: r.supplier_id,
            min_stock: r.min_stock,
            max_stock: r.max_stock,
            is_active: r.is_active,
        }
    }
}

/// GET /inventory/products
async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiQuery(query): ApiQuery<ListProductsQuery>,
) -> ApiResult<Json<PageResponse<ProductResponse>>> {
    auth.require(Capability::InventoryRead)?;

    let page = PageRequest::from_query(query.page, query.limit, PRODUCTS_PAGE_SIZE);
    let filter = ProductFilter {
        category_id: query.category_id,
        supplier_id: query.supplier_id,
        is_active: query.is_active,
    };
    let products = ProductRepository::new((*state.db).clone())
        .list(page, filter)
        .await?;
    Ok(Json(products.map(ProductResponse::from)))
}

/// GET /inventory/products/{id}
async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ProductDetailResponse>> {
    auth.require(Capability::InventoryRead)?;

    let detail = ProductRepository::new((*state.db).clone()).get(id).await?;
    Ok(Json(detail.into()))
}

/// POST /inventory/products
async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(payload): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ProductResponse>)> {
    auth.require(Capability::InventoryWrite)?;

    let input = NewProduct::from(payload).validate()?;

    let repo = ProductRepository::new((*state.db).clone());
    let product = repo.create(input).await?;
    let detail = repo.get(product.id).await?;
    Ok((StatusCode::CREATED, Json(detail.product.into())))
}

/// PUT /inventory/products/{id}
async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<ProductResponse>> {
    auth.require(Capability::InventoryWrite)?;

    let changes = ProductChanges::from(payload).validate()?;
    let repo = ProductRepository::new((*state.db).clone());
    repo.update(id, changes).await?;
    let detail = repo.get(id).await?;
    Ok(Json(detail.product.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_clears_max_stock() {
        let request: UpdateProductRequest =
            serde_json::from_value(json!({ "maxStock": null, "minStock": 3 })).unwrap();
        let changes = ProductChanges::from(request).validate().unwrap();

        assert_eq!(changes.max_stock, Some(None));
        assert_eq!(changes.min_stock, Some(3));
        assert_eq!(changes.supplier_id, None);
    }

    #[test]
    fn test_supplier_absent_null_and_set_are_distinct() {
        let supplier = Uuid::new_v4();
        let parse = |body| serde_json::from_value::<UpdateProductRequest>(body).unwrap();

        assert_eq!(parse(json!({})).supplier_id, None);
        assert_eq!(parse(json!({ "supplierId": null })).supplier_id, Some(None));
        assert_eq!(
            parse(json!({ "supplierId": supplier })).supplier_id,
            Some(Some(supplier))
        );
    }

    #[test]
    fn test_product_request_requires_category() {
        let request: CreateProductRequest = serde_json::from_value(json!({
            "sku": "WID-001",
            "name": "Widget",
            "price": 9.99,
            "cost": 4.5,
        }))
        .unwrap();

        assert!(NewProduct::from(request).validate().is_err());
    }
}
