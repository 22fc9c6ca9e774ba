use crate::{
    AppState,
    auth::{AuthUser, SESSION_COOKIE, session_token},
    error::ApiError,
    models::{
        CategoriesPage, EditProductPage, LoginRequest, PageView, Product, ProductPayload,
        RegisterPage, RegisterRequest, SessionResponse, UserSummary,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::BTreeMap;

// --- Filter Structs ---

/// ProductFilter
///
/// Query parameters accepted by the product listing endpoint
/// (GET /api/products). Bound safely by Axum's Query extractor.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct ProductFilter {
    /// Optional substring filter matched against a product's id, name,
    /// artist, and creation date rendered as text.
    pub keyword: Option<String>,
}

// --- Product API Handlers ---

/// get_products
///
/// [Authenticated Route] Lists all products, or the keyword-filtered subset
/// when a non-empty `keyword` parameter is present.
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductFilter),
    responses((status = 200, description = "List products", body = [Product]))
)]
pub async fn get_products(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = match filter.keyword.as_deref() {
        None | Some("") => state.products.get_all().await?,
        Some(keyword) => state.products.search(keyword).await?,
    };
    Ok(Json(products))
}

/// get_product
///
/// [Authenticated Route] Retrieves a single product by id.
/// A miss is a 404 with an empty body.
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Found", body = Product),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ApiError> {
    match state.products.get(id).await? {
        Some(product) => Ok(Json(product)),
        None => Err(ApiError::NotFound("product")),
    }
}

/// create_product
///
/// [Authenticated Route] Persists a product from the submitted payload.
///
/// When the embedded category carries no id, the service persists the
/// category first and attaches its generated id before storing the product.
/// Any failure along this sequence surfaces as a status-only 500; the cause
/// is logged, never echoed.
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Created", body = Product),
        (status = 500, description = "Validation or store failure")
    )
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductPayload>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = state.products.save(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// delete_product
///
/// [Admin Route] Removes a product from the catalog.
///
/// *RBAC*: strict enforcement of the ADMIN role before calling the service.
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not Admin"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden);
    }
    if state.products.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound("product"))
    }
}

/// delivery_stats
///
/// [Authenticated Route] Per-date quantity totals for products delivered in
/// the last 14 days, keyed by date in ascending order. Feeds the histogram
/// page. The window is anchored at the current date, so the result shifts
/// with the calendar.
#[utoipa::path(
    get,
    path = "/api/products/stats",
    responses((status = 200, description = "Quantity totals keyed by delivery date"))
)]
pub async fn delivery_stats(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<NaiveDate, i64>>, ApiError> {
    Ok(Json(state.products.count_by_delivery_date().await?))
}

// --- Auth & Account Handlers ---

/// login
///
/// [Public Route] Verifies credentials and opens a session. The token is
/// returned in the body and mirrored as an HttpOnly `SESSION` cookie.
///
/// Failure is always a bare 401: the response never distinguishes an unknown
/// username from a wrong password.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .users
        .authenticate(&payload.username, &payload.password)
        .await?;
    let session = state.users.start_session(user.id).await?;

    let cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}",
        SESSION_COOKIE,
        session.token,
        state.config.session_ttl_minutes * 60
    );

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(SessionResponse {
            token: session.token,
            expires_at: session.expires_at,
        }),
    ))
}

/// logout
///
/// [Authenticated Route] Ends the presented session. Idempotent: a token
/// that is already gone still yields 204.
#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 204, description = "Session ended"),
        (status = 401, description = "No session token presented")
    )
)]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = session_token(&headers).ok_or(ApiError::Unauthorized)?;
    state.users.end_session(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// register_user
///
/// [Public Route] Creates a new account with the default USER role. The
/// password is bcrypt-hashed before it reaches the store; a duplicate
/// username is a 409.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered", body = UserSummary),
        (status = 409, description = "Username taken")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserSummary>), ApiError> {
    let summary = state.users.register(payload).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// get_me
///
/// [Authenticated Route] The authenticated user's own account summary,
/// resolved entirely from the `AuthUser` extractor.
#[utoipa::path(
    get,
    path = "/me",
    responses((status = 200, description = "Profile", body = UserSummary))
)]
pub async fn get_me(auth: AuthUser) -> Json<UserSummary> {
    Json(UserSummary {
        id: auth.id,
        username: auth.username,
        roles: auth.roles,
    })
}

/// list_users
///
/// [Admin Route] Lists every account with its role names. Password hashes
/// never appear in the response shape.
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All accounts", body = [UserSummary]),
        (status = 403, description = "Not Admin")
    )
)]
pub async fn list_users(
    auth: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    if !auth.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(Json(state.users.accounts().await?))
}

// --- Page Handlers ---
//
// Stateless route-to-view mapping; rendering is an external collaborator.
// Pages that seed a model for form binding or display return it alongside
// the view name.

/// [Authenticated Route] Home page.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home view", body = PageView))
)]
pub async fn home_page() -> Json<PageView> {
    Json(PageView::new("index"))
}

/// [Authenticated Route] Edit page for an existing product.
#[utoipa::path(
    get,
    path = "/edit-product/{id}",
    params(("id" = i64, Path, description = "Product ID")),
    responses((status = 200, description = "Edit view", body = EditProductPage))
)]
pub async fn edit_product_page(Path(id): Path<i64>) -> Json<EditProductPage> {
    Json(EditProductPage {
        view: "edit_product".to_string(),
        product_id: id,
    })
}

/// [Authenticated Route] Submission page for a new product.
#[utoipa::path(
    get,
    path = "/new-product",
    responses((status = 200, description = "New product view", body = PageView))
)]
pub async fn new_product_page() -> Json<PageView> {
    Json(PageView::new("new_product"))
}

/// [Authenticated Route] Category listing page, seeded with all categories.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories view", body = CategoriesPage))
)]
pub async fn categories_page(
    State(state): State<AppState>,
) -> Result<Json<CategoriesPage>, ApiError> {
    Ok(Json(CategoriesPage {
        view: "categories".to_string(),
        categories: state.categories.get_all().await?,
    }))
}

/// [Authenticated Route] Delivery-date histogram page; the page's script
/// fetches its data from GET /api/products/stats.
#[utoipa::path(
    get,
    path = "/histogram",
    responses((status = 200, description = "Histogram view", body = PageView))
)]
pub async fn histogram_page() -> Json<PageView> {
    Json(PageView::new("histogram"))
}

/// [Public Route] About-the-author page.
#[utoipa::path(
    get,
    path = "/author",
    responses((status = 200, description = "Author view", body = PageView))
)]
pub async fn author_page() -> Json<PageView> {
    Json(PageView::new("author"))
}

/// [Public Route] Registration page, seeded with a fresh, unpersisted form
/// object for binding.
#[utoipa::path(
    get,
    path = "/register",
    responses((status = 200, description = "Register view", body = RegisterPage))
)]
pub async fn register_page() -> Json<RegisterPage> {
    Json(RegisterPage {
        view: "register".to_string(),
        user: RegisterRequest::default(),
    })
}
