use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

use crate::{
    audit,
    catalog::normalize::slugify,
    dto::{
        audit::AuditLogList,
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        contact::ContactMessageList,
        orders::{OrderList, OrderWithItems, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, SetActiveRequest, UpdateProductRequest},
    },
    entity::{
        audit_logs::{Column as AuditCol, Entity as AuditLogs, Model as AuditLogModel},
        categories::{
            ActiveModel as CategoryActive, Column as CategoryCol, Entity as Categories,
            Model as CategoryModel,
        },
        contact_messages::{
            ActiveModel as MessageActive, Column as MessageCol, Entity as ContactMessages,
            Model as MessageModel,
        },
        order_items::{Column as OrderItemCol, Entity as OrderItems},
        orders::{ActiveModel as OrderActive, Column as OrderCol, Entity as Orders},
        products::{
            ActiveModel as ProductActive, Column as ProdCol, Entity as Products,
            Model as ProductModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::AdminUser,
    models::{Availability, AuditLog, Category, CategoryRef, ContactMessage, Order, Product},
    response::{ApiResponse, Meta},
    routes::params::{MessageListQuery, OrderListQuery, Pagination, SortOrder},
    services::{
        catalog_service::category_from_entity,
        order_service::{order_from_entity, order_item_from_entity},
    },
    state::AppState,
};

pub const ORDER_STATUSES: [&str; 5] = ["pending", "confirmed", "shipped", "delivered", "cancelled"];

const MAX_SECONDARY_IMAGES: usize = 3;

// ---- products ----

pub async fn list_products(
    state: &AppState,
    query: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = query.normalize();

    let total = Products::find().count(&state.orm).await? as i64;

    let items = Products::find()
        .find_also_related(Categories)
        .order_by_desc(ProdCol::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(product, category)| product_from_entity(product, category))
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Products",
        ProductList { items },
        Some(meta),
    ))
}

pub async fn create_product(
    state: &AppState,
    actor: &AdminUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let name = required_text(&payload.name, "name")?;
    let previous_price = payload.previous_price.filter(|p| !p.is_zero());
    validate_pricing(
        payload.price,
        previous_price,
        payload.discount_percent,
        payload.on_offer,
    )?;
    let category = find_category(state, payload.category_id).await?;
    let [image_2, image_3, image_4] = secondary_images(payload.images)?;

    let model = ProductActive {
        id: NotSet,
        category_id: Set(category.id),
        name: Set(name),
        description: Set(clean(payload.description)),
        price: Set(payload.price),
        previous_price: Set(previous_price),
        discount_percent: Set(payload.discount_percent.filter(|d| !d.is_zero())),
        on_offer: Set(payload.on_offer),
        availability: Set(payload.availability.as_db_str().into()),
        size: Set(clean(payload.size)),
        color: Set(clean(payload.color)),
        image: Set(clean(payload.image)),
        image_2: Set(image_2),
        image_3: Set(image_3),
        image_4: Set(image_4),
        active: Set(true),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        actor,
        "product_create",
        "products",
        serde_json::json!({ "product_id": model.id, "name": model.name }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product created",
        product_from_entity(model, Some(category)),
        Some(Meta::empty()),
    ))
}

pub async fn update_product(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    // Merge first so the pricing rules see the resulting row, not the patch.
    let price = payload.price.unwrap_or(existing.price);
    let previous_price = match payload.previous_price {
        Some(p) if p.is_zero() => None,
        Some(p) => Some(p),
        None => existing.previous_price,
    };
    let discount_percent = match payload.discount_percent {
        Some(d) if d.is_zero() => None,
        Some(d) => Some(d),
        None => existing.discount_percent,
    };
    let on_offer = payload.on_offer.unwrap_or(existing.on_offer);
    validate_pricing(price, previous_price, discount_percent, on_offer)?;

    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let category = find_category(state, category_id).await?;

    let mut active: ProductActive = existing.into();
    if let Some(name) = payload.name.as_deref() {
        active.name = Set(required_text(name, "name")?);
    }
    if payload.description.is_some() {
        active.description = Set(clean(payload.description));
    }
    if payload.size.is_some() {
        active.size = Set(clean(payload.size));
    }
    if payload.color.is_some() {
        active.color = Set(clean(payload.color));
    }
    if payload.image.is_some() {
        active.image = Set(clean(payload.image));
    }
    if let Some(images) = payload.images {
        let [image_2, image_3, image_4] = secondary_images(images)?;
        active.image_2 = Set(image_2);
        active.image_3 = Set(image_3);
        active.image_4 = Set(image_4);
    }
    if let Some(availability) = payload.availability {
        active.availability = Set(availability.as_db_str().into());
    }
    active.category_id = Set(category.id);
    active.price = Set(price);
    active.previous_price = Set(previous_price);
    active.discount_percent = Set(discount_percent);
    active.on_offer = Set(on_offer);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        "product_update",
        "products",
        serde_json::json!({ "product_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(model, Some(category)),
        Some(Meta::empty()),
    ))
}

/// Soft delete (`active = false`) or restore. Inactive products disappear
/// from the public catalog but stay referenced by past orders.
pub async fn set_product_active(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
    payload: SetActiveRequest,
) -> AppResult<ApiResponse<Product>> {
    let existing = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ProductActive = existing.into();
    active.active = Set(payload.active);
    active.updated_at = Set(Utc::now());
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        if payload.active {
            "product_restore"
        } else {
            "product_deactivate"
        },
        "products",
        serde_json::json!({ "product_id": model.id }),
    )
    .await;

    let category = Categories::find_by_id(model.category_id)
        .one(&state.orm)
        .await?;
    Ok(ApiResponse::success(
        "Product updated",
        product_from_entity(model, category),
        Some(Meta::empty()),
    ))
}

pub async fn delete_product(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = Products::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        actor,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Product deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

// ---- categories ----

pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items = Categories::find()
        .order_by_asc(CategoryCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(Meta::empty()),
    ))
}

pub async fn create_category(
    state: &AppState,
    actor: &AdminUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let name = required_text(&payload.name, "name")?;
    let slug = category_slug(payload.slug.as_deref(), &name)?;
    ensure_slug_free(state, &slug, None).await?;

    let model = CategoryActive {
        id: NotSet,
        name: Set(name),
        slug: Set(slug),
        active: Set(true),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.pool,
        actor,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": model.id, "slug": model.slug }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category created",
        category_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_category(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let name = match payload.name.as_deref() {
        Some(name) => required_text(name, "name")?,
        None => existing.name.clone(),
    };
    let slug = match payload.slug.as_deref() {
        Some(slug) => category_slug(Some(slug), &name)?,
        None => existing.slug.clone(),
    };
    if slug != existing.slug {
        ensure_slug_free(state, &slug, Some(id)).await?;
    }

    let mut active: CategoryActive = existing.into();
    active.name = Set(name);
    active.slug = Set(slug);
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(model),
        Some(Meta::empty()),
    ))
}

/// Deactivating a category hides all of its products from the catalog.
pub async fn set_category_active(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
    payload: SetActiveRequest,
) -> AppResult<ApiResponse<Category>> {
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: CategoryActive = existing.into();
    active.active = Set(payload.active);
    let model = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        if payload.active {
            "category_restore"
        } else {
            "category_deactivate"
        },
        "categories",
        serde_json::json!({ "category_id": model.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Category updated",
        category_from_entity(model),
        Some(Meta::empty()),
    ))
}

// ---- orders ----

pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(status) = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        condition = condition.add(OrderCol::Status.eq(status.to_lowercase()));
    }

    let mut finder = Orders::find().filter(condition);

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(OrderCol::CreatedAt).order_by_asc(OrderCol::Id),
        SortOrder::Desc => finder
            .order_by_desc(OrderCol::CreatedAt)
            .order_by_desc(OrderCol::Id),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let orders: Vec<Order> = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Orders",
        OrderList { items: orders },
        Some(meta),
    ))
}

pub async fn get_order(state: &AppState, id: i64) -> AppResult<ApiResponse<OrderWithItems>> {
    let order = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(order_from_entity)
        .ok_or(AppError::NotFound)?;

    let items = OrderItems::find()
        .filter(OrderItemCol::OrderId.eq(order.id))
        .order_by_asc(OrderItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(order_item_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Order found",
        OrderWithItems { order, items },
        Some(Meta::empty()),
    ))
}

pub async fn update_order_status(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
    payload: UpdateOrderStatusRequest,
) -> AppResult<ApiResponse<Order>> {
    let status = validate_order_status(&payload.status)?;

    let existing = Orders::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let previous = existing.status.clone();

    let mut active: OrderActive = existing.into();
    active.status = Set(status);
    active.updated_at = Set(Utc::now());
    let order = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        actor,
        "order_status_update",
        "orders",
        serde_json::json!({ "order_id": order.id, "from": previous, "to": order.status }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order updated",
        order_from_entity(order),
        Some(Meta::empty()),
    ))
}

// ---- contact messages ----

pub async fn list_messages(
    state: &AppState,
    query: MessageListQuery,
) -> AppResult<ApiResponse<ContactMessageList>> {
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = ContactMessages::find();
    if query.unread == Some(true) {
        finder = finder.filter(MessageCol::IsRead.eq(false));
    }
    let finder = finder.order_by_desc(MessageCol::Id);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(message_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Messages",
        ContactMessageList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn mark_message_read(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
) -> AppResult<ApiResponse<ContactMessage>> {
    let existing = ContactMessages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let model = if existing.is_read {
        existing
    } else {
        let mut active: MessageActive = existing.into();
        active.is_read = Set(true);
        let model = active.update(&state.orm).await?;
        audit::record(
            &state.pool,
            actor,
            "message_read",
            "contact_messages",
            serde_json::json!({ "message_id": model.id }),
        )
        .await;
        model
    };

    Ok(ApiResponse::success(
        "Message updated",
        message_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_message(
    state: &AppState,
    actor: &AdminUser,
    id: i64,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let result = ContactMessages::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        actor,
        "message_delete",
        "contact_messages",
        serde_json::json!({ "message_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Message deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

// ---- audit ----

pub async fn list_audit_logs(
    state: &AppState,
    query: Pagination,
) -> AppResult<ApiResponse<AuditLogList>> {
    let (page, limit, offset) = query.normalize();

    let total = AuditLogs::find().count(&state.orm).await? as i64;
    let items = AuditLogs::find()
        .order_by_desc(AuditCol::Id)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(audit_log_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Audit logs",
        AuditLogList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

// ---- helpers ----

async fn find_category(state: &AppState, id: i64) -> AppResult<CategoryModel> {
    Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("category {id} not found")))
}

async fn ensure_slug_free(state: &AppState, slug: &str, except: Option<i64>) -> AppResult<()> {
    let mut finder = Categories::find().filter(CategoryCol::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(CategoryCol::Id.ne(id));
    }
    if finder.one(&state.orm).await?.is_some() {
        return Err(AppError::BadRequest(format!("slug `{slug}` already in use")));
    }
    Ok(())
}

fn category_slug(requested: Option<&str>, name: &str) -> AppResult<String> {
    let slug = match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slugify(slug),
        None => slugify(name),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug cannot be empty".into()));
    }
    Ok(slug)
}

fn validate_pricing(
    price: Decimal,
    previous_price: Option<Decimal>,
    discount_percent: Option<Decimal>,
    on_offer: bool,
) -> AppResult<()> {
    if price < Decimal::ZERO {
        return Err(AppError::BadRequest("price must not be negative".into()));
    }
    if previous_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(AppError::BadRequest(
            "previous_price must not be negative".into(),
        ));
    }
    if discount_percent.is_some_and(|d| d < Decimal::ZERO || d > Decimal::ONE_HUNDRED) {
        return Err(AppError::BadRequest(
            "discount_percent must be between 0 and 100".into(),
        ));
    }
    if on_offer && previous_price.is_some_and(|p| p < price) {
        return Err(AppError::BadRequest(
            "previous_price must not be below price for a product on offer".into(),
        ));
    }
    Ok(())
}

fn secondary_images(images: Vec<String>) -> AppResult<[Option<String>; MAX_SECONDARY_IMAGES]> {
    let mut present = images.into_iter().filter_map(|i| clean(Some(i)));
    let slots = [present.next(), present.next(), present.next()];
    if present.next().is_some() {
        return Err(AppError::BadRequest(format!(
            "at most {MAX_SECONDARY_IMAGES} secondary images"
        )));
    }
    Ok(slots)
}

fn required_text(value: &str, field: &str) -> AppResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_order_status(status: &str) -> AppResult<String> {
    let status = status.trim().to_lowercase();
    if ORDER_STATUSES.contains(&status.as_str()) {
        Ok(status)
    } else {
        Err(AppError::BadRequest("Invalid order status".into()))
    }
}

fn product_from_entity(model: ProductModel, category: Option<CategoryModel>) -> Product {
    let images = [model.image_2, model.image_3, model.image_4]
        .into_iter()
        .filter_map(clean)
        .collect();

    Product {
        id: model.id,
        name: model.name,
        description: model.description,
        price: model.price,
        previous_price: model.previous_price,
        discount_percent: model.discount_percent,
        on_offer: model.on_offer,
        availability: Availability::parse(&model.availability).unwrap_or_default(),
        category: category.map(|c| CategoryRef {
            id: c.id,
            name: c.name,
            slug: c.slug,
        }),
        size: model.size,
        color: model.color,
        image: model.image,
        images,
        active: model.active,
    }
}

fn message_from_entity(model: MessageModel) -> ContactMessage {
    ContactMessage {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        message: model.message,
        read: model.is_read,
        created_at: model.created_at,
    }
}

fn audit_log_from_entity(model: AuditLogModel) -> AuditLog {
    AuditLog {
        id: model.id,
        user_id: model.user_id,
        action: model.action,
        resource: model.resource,
        metadata: model.metadata,
        created_at: model.created_at,
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(v: &str) -> Decimal {
        Decimal::from_str(v).expect("decimal literal")
    }

    #[test]
    fn pricing_rules() {
        assert!(validate_pricing(dec("45000"), Some(dec("60000")), None, true).is_ok());
        assert!(validate_pricing(dec("45000"), Some(dec("30000")), None, false).is_ok());
        assert!(validate_pricing(dec("45000"), Some(dec("30000")), None, true).is_err());
        assert!(validate_pricing(dec("-1"), None, None, false).is_err());
        assert!(validate_pricing(dec("1000"), None, Some(dec("120")), false).is_err());
        assert!(validate_pricing(Decimal::ZERO, None, None, true).is_ok());
    }

    #[test]
    fn secondary_images_fill_slots_in_order() {
        let slots = secondary_images(vec!["a.jpg".into(), " ".into(), "b.jpg".into()])
            .expect("two images fit");
        assert_eq!(
            slots,
            [Some("a.jpg".to_string()), Some("b.jpg".to_string()), None]
        );

        let too_many = (0..4).map(|i| format!("{i}.jpg")).collect();
        assert!(secondary_images(too_many).is_err());
    }

    #[test]
    fn order_status_is_normalized_and_checked() {
        assert_eq!(validate_order_status(" Shipped ").ok().as_deref(), Some("shipped"));
        assert!(validate_order_status("paid").is_err());
    }

    #[test]
    fn category_slug_prefers_explicit_value() {
        assert_eq!(category_slug(None, "Ropa Niños").ok().as_deref(), Some("ropa-ninos"));
        assert_eq!(
            category_slug(Some("Kids"), "Ropa Niños").ok().as_deref(),
            Some("kids")
        );
        assert!(category_slug(Some("  "), "¿?").is_err());
    }
}
