use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set, Statement};
use storefront_api::{
    cart::{
        checkout::CustomerInfo,
        shipping::{ShippingPolicy, ShippingStatus},
    },
    config::AppConfig,
    db::{create_pool, run_migrations},
    dto::{
        cart::{AddToCartRequest, CartCheckoutRequest, CheckoutChannel, SetCityRequest},
        categories::CreateCategoryRequest,
        contact::ContactRequest,
        orders::{OrderLineRequest, PlaceOrderRequest, UpdateOrderStatusRequest},
        products::{CreateProductRequest, SetActiveRequest},
    },
    entity::users::ActiveModel as UserActive,
    error::AppError,
    middleware::auth::{ADMIN_ROLE, AdminUser},
    models::{Availability, Product},
    routes::params::{CatalogQuery, MessageListQuery, OrderListQuery, Pagination},
    services::{admin_service, cart_service, catalog_service, contact_service, order_service},
    state::AppState,
};

fn dec(v: &str) -> Decimal {
    Decimal::from_str(v).expect("decimal literal")
}

// Catalog -> order intake -> cart checkout -> admin follow-up, against a real MySQL.
#[tokio::test]
async fn catalog_orders_and_admin_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url = match std::env::var("TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
    {
        Ok(url) => url,
        Err(_) => {
            eprintln!(
                "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
            );
            return Ok(());
        }
    };

    let state = setup_state(&database_url).await?;
    let admin = create_admin(&state).await?;

    let category = admin_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Camisetas".into(),
            slug: None,
        },
    )
    .await?
    .data
    .expect("category");
    assert_eq!(category.slug, "camisetas");

    let available = Availability::Available;
    let shirt = create_product(&state, &admin, category.id, "Camiseta", "50000", available).await?;
    let cap = create_product(&state, &admin, category.id, "Gorra", "30000", available).await?;
    let jogger =
        create_product(&state, &admin, category.id, "Jogger", "85000", Availability::SoldOut)
            .await?;

    // Catalog: newest first, filters by category name or slug and availability.
    let listed = catalog_service::list_products(&state, catalog_query(Some("Camisetas"), None))
        .await?
        .data
        .expect("products")
        .items;
    let ids: Vec<i64> = listed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![jogger.id, cap.id, shirt.id]);

    let sold_out_query = catalog_query(Some("camisetas"), Some("agotado"));
    let sold_out = catalog_service::list_products(&state, sold_out_query)
        .await?
        .data
        .expect("products")
        .items;
    assert_eq!(sold_out.len(), 1);
    assert_eq!(sold_out[0].availability, Availability::SoldOut);

    // Order intake: A x1 + B x2 to Medellín.
    let placed = order_service::place_order(
        &state,
        PlaceOrderRequest {
            customer: customer("Medellín"),
            items: vec![
                OrderLineRequest { product_id: shirt.id, quantity: 1 },
                OrderLineRequest { product_id: cap.id, quantity: 1 },
                OrderLineRequest { product_id: cap.id, quantity: 1 },
            ],
            channel: CheckoutChannel::Backend,
        },
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(placed.payload.subtotal, dec("110000"));
    assert_eq!(placed.payload.shipping_cost, dec("16000"));
    assert_eq!(placed.payload.total, dec("126000"));
    assert!(placed.whatsapp_url.is_none());
    let order_id = placed.order_id.expect("order id");

    let stored = admin_service::get_order(&state, order_id).await?.data.expect("order");
    assert_eq!(stored.order.status, "pending");
    assert_eq!(stored.order.total, dec("126000"));
    assert_eq!(stored.items.len(), 2);

    // Sold-out products cannot be ordered.
    let rejected = order_service::place_order(
        &state,
        PlaceOrderRequest {
            customer: customer("Cali"),
            items: vec![OrderLineRequest { product_id: jogger.id, quantity: 1 }],
            channel: CheckoutChannel::Backend,
        },
    )
    .await;
    assert!(matches!(rejected, Err(AppError::BadRequest(_))));

    // Session cart: six shirts ship free, checkout clears the cart.
    let cart_id = cart_service::create_cart(&state).await?.data.expect("cart").id;
    cart_service::add_item(&state, cart_id, AddToCartRequest { product_id: shirt.id }).await?;
    for _ in 0..5 {
        cart_service::increase_quantity(&state, cart_id, shirt.id).await?;
    }
    cart_service::set_city(&state, cart_id, SetCityRequest { city: Some("Cali".into()) }).await?;
    let view = cart_service::get_cart(&state, cart_id).await?.data.expect("cart");
    assert_eq!(view.subtotal, dec("300000"));
    assert_eq!(view.shipping_status, ShippingStatus::Free);

    // Blank city on the form falls back to the session destination.
    let checkout = cart_service::checkout(
        &state,
        cart_id,
        CartCheckoutRequest {
            customer: customer(""),
            channel: CheckoutChannel::Whatsapp,
        },
    )
    .await?
    .data
    .expect("checkout");
    assert_eq!(checkout.payload.customer.city, "Cali");
    assert_eq!(checkout.payload.total, dec("300000"));
    let url = checkout.whatsapp_url.expect("whatsapp link");
    assert!(url.starts_with("https://wa.me/573001234567?text="));
    let after = cart_service::get_cart(&state, cart_id).await?.data.expect("cart");
    assert!(after.items.is_empty());

    // Admin order workflow.
    let updated = admin_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateOrderStatusRequest { status: "shipped".into() },
    )
    .await?
    .data
    .expect("order");
    assert_eq!(updated.status, "shipped");

    let invalid = admin_service::update_order_status(
        &state,
        &admin,
        order_id,
        UpdateOrderStatusRequest { status: "paid".into() },
    )
    .await;
    assert!(matches!(invalid, Err(AppError::BadRequest(_))));

    let shipped = admin_service::list_orders(
        &state,
        OrderListQuery {
            status: Some("shipped".into()),
            ..OrderListQuery::default()
        },
    )
    .await?;
    assert_eq!(shipped.meta.and_then(|m| m.total), Some(1));

    // Soft delete hides the product from the public catalog only.
    let hide = SetActiveRequest { active: false };
    admin_service::set_product_active(&state, &admin, shirt.id, hide).await?;
    let missing = catalog_service::get_product(&state, shirt.id).await;
    assert!(matches!(missing, Err(AppError::NotFound)));
    let all = admin_service::list_products(&state, Pagination::default())
        .await?
        .data
        .expect("products");
    assert!(all.items.iter().any(|p: &Product| p.id == shirt.id && !p.active));

    // Contact inbox.
    contact_service::submit_message(
        &state.pool,
        ContactRequest {
            name: "Andrés".into(),
            email: "andres@correo.co".into(),
            phone: None,
            message: "¿Tienen talla XL?".into(),
        },
    )
    .await?;
    let unread = admin_service::list_messages(
        &state,
        MessageListQuery { unread: Some(true), ..MessageListQuery::default() },
    )
    .await?
    .data
    .expect("messages");
    assert_eq!(unread.items.len(), 1);
    admin_service::mark_message_read(&state, &admin, unread.items[0].id).await?;
    let unread = admin_service::list_messages(
        &state,
        MessageListQuery { unread: Some(true), ..MessageListQuery::default() },
    )
    .await?
    .data
    .expect("messages");
    assert!(unread.items.is_empty());

    let audit = admin_service::list_audit_logs(&state, Pagination::default())
        .await?
        .data
        .expect("logs");
    assert!(audit.items.iter().any(|log| log.action == "order_status_update"));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let config = AppConfig {
        database_url: database_url.to_string(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret".into(),
        whatsapp_number: "+57 300 123 4567".into(),
        shipping: ShippingPolicy::default(),
        cart_ttl_minutes: 120,
    };
    let pool = create_pool(database_url).await?;
    let state = AppState::new(pool, config);
    run_migrations(&state.orm).await?;

    // Clean tables between runs, children first.
    let backend = state.orm.get_database_backend();
    for table in [
        "order_items",
        "orders",
        "products",
        "categories",
        "contact_messages",
        "audit_logs",
        "users",
    ] {
        state
            .orm
            .execute(Statement::from_string(backend, format!("DELETE FROM {table}")))
            .await?;
    }

    Ok(state)
}

async fn create_admin(state: &AppState) -> anyhow::Result<AdminUser> {
    let user = UserActive {
        id: NotSet,
        email: Set("admin@example.com".into()),
        password_hash: Set("dummy".into()),
        role: Set(ADMIN_ROLE.into()),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(AdminUser {
        user_id: user.id,
        role: user.role,
    })
}

async fn create_product(
    state: &AppState,
    admin: &AdminUser,
    category_id: i64,
    name: &str,
    price: &str,
    availability: Availability,
) -> anyhow::Result<Product> {
    let product = admin_service::create_product(
        state,
        admin,
        CreateProductRequest {
            category_id,
            name: name.into(),
            description: None,
            price: dec(price),
            previous_price: None,
            discount_percent: None,
            on_offer: false,
            availability,
            size: None,
            color: None,
            image: Some(format!("{name}.jpg")),
            images: Vec::new(),
        },
    )
    .await?
    .data
    .expect("product");
    Ok(product)
}

fn catalog_query(category: Option<&str>, availability: Option<&str>) -> CatalogQuery {
    CatalogQuery {
        category: category.map(str::to_string),
        availability: availability.map(str::to_string),
        ..CatalogQuery::default()
    }
}

fn customer(city: &str) -> CustomerInfo {
    CustomerInfo {
        name: "Laura Gómez".into(),
        phone: "3001234567".into(),
        email: None,
        address: "Calle 5 # 38-25".into(),
        city: city.into(),
        notes: None,
    }
}
