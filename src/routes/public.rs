use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session: the liveness probe, the login and
/// registration flow, and the author page. Everything else in the catalog
/// sits behind the auth middleware.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated endpoint for monitoring and load balancer checks.
        .route("/health", get(|| async { "ok" }))
        // POST /login
        // Credential check; opens a session and sets the SESSION cookie.
        // Failures are a bare 401, never distinguishing unknown-user from
        // wrong-password.
        .route("/login", post(handlers::login))
        // GET /register
        // Registration page, seeded with a blank form object.
        // POST /register
        // Creates the account and attaches the default USER role.
        .route(
            "/register",
            get(handlers::register_page).post(handlers::register_user),
        )
        // GET /author
        // Static about-the-author page.
        .route("/author", get(handlers::author_page))
}
