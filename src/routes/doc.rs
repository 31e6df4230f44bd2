use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::{
        CartLineItem,
        checkout::{CheckoutLine, CheckoutPayload, CustomerInfo},
        shipping::ShippingStatus,
    },
    dto::{
        audit::AuditLogList,
        auth::{LoginRequest, LoginResponse},
        cart::{
            AddToCartRequest, CartCheckoutRequest, CartView, CheckoutChannel, CheckoutResponse,
            SetCityRequest,
        },
        categories::{CategoryList, CreateCategoryRequest, UpdateCategoryRequest},
        contact::{ContactMessageList, ContactRequest},
        orders::{OrderLineRequest, OrderList, OrderWithItems, PlaceOrderRequest, UpdateOrderStatusRequest},
        products::{CreateProductRequest, ProductList, SetActiveRequest, UpdateProductRequest},
    },
    models::{AuditLog, Availability, Category, CategoryRef, ContactMessage, Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{admin, auth, carts, categories, contact, health, orders, params, products},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        products::list_products,
        products::get_product,
        categories::list_categories,
        carts::create_cart,
        carts::get_cart,
        carts::set_city,
        carts::add_item,
        carts::increase_quantity,
        carts::decrease_quantity,
        carts::remove_item,
        carts::clear_cart,
        carts::checkout,
        orders::place_order,
        contact::submit_message,
        auth::login,
        admin::list_products,
        admin::create_product,
        admin::update_product,
        admin::set_product_active,
        admin::delete_product,
        admin::list_categories,
        admin::create_category,
        admin::update_category,
        admin::set_category_active,
        admin::list_orders,
        admin::get_order,
        admin::update_order_status,
        admin::list_messages,
        admin::mark_message_read,
        admin::delete_message,
        admin::list_audit_logs
    ),
    components(
        schemas(
            Availability,
            CategoryRef,
            Product,
            Category,
            Order,
            OrderItem,
            ContactMessage,
            AuditLog,
            CartLineItem,
            CustomerInfo,
            CheckoutLine,
            CheckoutPayload,
            ShippingStatus,
            CheckoutChannel,
            AddToCartRequest,
            SetCityRequest,
            CartCheckoutRequest,
            CartView,
            CheckoutResponse,
            OrderLineRequest,
            PlaceOrderRequest,
            UpdateOrderStatusRequest,
            OrderWithItems,
            OrderList,
            ProductList,
            CreateProductRequest,
            UpdateProductRequest,
            SetActiveRequest,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            ContactRequest,
            ContactMessageList,
            AuditLogList,
            LoginRequest,
            LoginResponse,
            params::Pagination,
            params::SortOrder,
            params::CatalogQuery,
            params::OrderListQuery,
            params::MessageListQuery,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<CartView>,
            ApiResponse<CheckoutResponse>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Products", description = "Public catalog"),
        (name = "Cart", description = "Cart sessions and checkout"),
        (name = "Orders", description = "Order intake"),
        (name = "Contact", description = "Contact form"),
        (name = "Auth", description = "Admin authentication"),
        (name = "Admin", description = "Back-office endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
