use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes for any user with a valid session: the catalog pages and the
/// product API. The auth middleware layered above this module guarantees a
/// resolvable session before any handler runs; handlers that need the
/// identity or roles take the `AuthUser` extractor themselves.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Pages ---
        // GET /
        // Home page view descriptor.
        .route("/", get(handlers::home_page))
        // GET /edit-product/{id}
        // Edit view for one product, carrying the product id for form binding.
        .route("/edit-product/{id}", get(handlers::edit_product_page))
        // GET /new-product
        // Submission view for a new product.
        .route("/new-product", get(handlers::new_product_page))
        // GET /categories
        // Category listing view, seeded with all categories from the store.
        .route("/categories", get(handlers::categories_page))
        // GET /histogram
        // Delivery-date histogram view; its data comes from /api/products/stats.
        .route("/histogram", get(handlers::histogram_page))
        // --- Session & Profile ---
        // GET /me
        // The authenticated user's account summary, resolved from the session.
        .route("/me", get(handlers::get_me))
        // POST /logout
        // Ends the presented session. Idempotent for already-gone tokens.
        .route("/logout", post(handlers::logout))
        // --- Product API ---
        // GET /api/products?keyword=...
        // Full product set, or the keyword-filtered subset when the parameter
        // is present and non-empty.
        // POST /api/products
        // Persists a product. A new embedded category is persisted first and
        // its generated id attached before the product row is written.
        .route(
            "/api/products",
            get(handlers::get_products).post(handlers::create_product),
        )
        // GET /api/products/stats
        // Quantity totals per delivery date over the last 14 days.
        .route("/api/products/stats", get(handlers::delivery_stats))
        // GET /api/products/{id}
        // Single product lookup, 404 on a miss.
        // DELETE /api/products/{id}
        // Removal is restricted to the ADMIN role; the check lives in the
        // handler after the extractor has established the identity.
        .route(
            "/api/products/{id}",
            get(handlers::get_product).delete(handlers::delete_product),
        )
}
