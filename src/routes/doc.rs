use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    models::{CartItem, Order, OrderStatus, Product, Review, ReviewComment, Store},
    routes::{admin, cart, health, orders, products, reviews, stores},
    services::cart_service::CartItemWithProduct,
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "admin_secret",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Admin-Secret"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        cart::cart_list,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::place_order,
        orders::list_all_orders,
        orders::update_order_status,
        products::list_products,
        products::get_product,
        products::create_product,
        products::update_product,
        products::delete_product,
        stores::list_stores,
        stores::store_products,
        stores::create_store,
        stores::update_store,
        stores::delete_store,
        reviews::list_reviews,
        reviews::create_review,
        reviews::create_comment,
        admin::verify
    ),
    components(
        schemas(
            Store,
            Product,
            CartItem,
            Order,
            OrderStatus,
            Review,
            ReviewComment,
            CartItemWithProduct,
            cart::AddToCartRequest,
            orders::PlaceOrderRequest,
            orders::UpdateOrderStatusRequest,
            products::CreateProductRequest,
            products::UpdateProductRequest,
            stores::CreateStoreRequest,
            stores::UpdateStoreRequest,
            reviews::CreateReviewRequest,
            reviews::CreateCommentRequest,
            reviews::ReviewWithComments,
            health::HealthData
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Stores", description = "Store catalog endpoints"),
        (name = "Products", description = "Product catalog endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order and checkout endpoints"),
        (name = "Reviews", description = "Review and comment endpoints"),
        (name = "Admin", description = "Admin endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
