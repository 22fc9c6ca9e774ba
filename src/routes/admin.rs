use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes exclusively for users carrying the ADMIN role, nested under
/// `/admin`. Every handler here takes the `AuthUser` extractor (rejecting
/// unauthenticated requests with 401) and then checks `is_admin()` itself,
/// returning 403 for authenticated non-admins.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /admin/users
        // Lists every account with its role names. Password hashes are not
        // part of the response shape.
        .route("/users", get(handlers::list_users))
}
