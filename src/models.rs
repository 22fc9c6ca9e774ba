use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Core Application Schemas (Mapped to Database) ---

/// Category
///
/// A classification grouping for exhibits, stored in the `categories` table.
/// Categories have an independent lifecycle: they are created standalone or
/// implicitly when a product payload references a not-yet-persisted category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

/// Product
///
/// A museum exhibit from the `products` table, returned with its category
/// embedded. This is the primary data structure of the catalog API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Product {
    pub id: i64,
    pub name: String,
    // Artist/manufacturer of the exhibit.
    pub artist: String,
    // Delivery date of the exhibit. Nullable; products without a date are
    // excluded from the delivery-date statistics.
    #[ts(type = "string | null")]
    pub creation_date: Option<NaiveDate>,
    // Quantity on hand, summed per date by the histogram statistics.
    pub quantity: i32,
    // Every product belongs to exactly one persisted category.
    pub category: Category,
}

/// Role
///
/// A named authorization grant ("USER", "ADMIN") from the `roles` table.
/// Read-only from the application's perspective; seeded by migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// User
///
/// Canonical identity record from the `users` table. Used exclusively for
/// authentication and authorization; deliberately not `Serialize` so the
/// password hash can never leak through a response body.
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

/// Session
///
/// One row of the `sessions` table: an opaque token bound to a user with an
/// absolute expiry. The token travels as a Bearer header or `SESSION` cookie.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// True once the session's expiry has passed. Expired sessions are
    /// deleted the next time they are presented.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

// --- Request Payloads (Input Schemas) ---

/// CategoryPayload
///
/// Category reference embedded in a product payload, or the body of a
/// standalone category save. An absent `id` means "persist me first"; the
/// service assigns the generated id before the product is stored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// ProductPayload
///
/// Input payload for `POST /api/products`: insert when `id` is absent,
/// update when present (the gateway's save contract).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProductPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub artist: String,
    #[ts(type = "string | null")]
    pub creation_date: Option<NaiveDate>,
    #[serde(default)]
    pub quantity: i32,
    pub category: CategoryPayload,
}

/// RegisterRequest
///
/// Input payload for `POST /register`. The password is hashed with bcrypt
/// before it touches the database and is never logged or echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// LoginRequest
///
/// Credentials submitted to `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

// --- Output Schemas ---

/// SessionResponse
///
/// Body of a successful login. The same token is also set as an `HttpOnly`
/// `SESSION` cookie for browser clients.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionResponse {
    pub token: String,
    #[ts(type = "string")]
    pub expires_at: DateTime<Utc>,
}

/// UserSummary
///
/// Public shape of a user account: identity plus role names, never the hash.
/// Returned by `GET /me`, `POST /register`, and the admin account listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub roles: Vec<String>,
}

// --- Page View Descriptors ---
//
// Page handlers map routes to view names; template rendering itself is an
// external collaborator. Handlers that seed a model for the view return it
// alongside the view name.

/// PageView
///
/// Bare route-to-view mapping for pages without a seeded model.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PageView {
    pub view: String,
}

impl PageView {
    pub fn new(view: &str) -> Self {
        Self {
            view: view.to_string(),
        }
    }
}

/// CategoriesPage
///
/// The categories page is seeded with the full category list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CategoriesPage {
    pub view: String,
    pub categories: Vec<Category>,
}

/// RegisterPage
///
/// The registration page seeds a fresh, unpersisted form object for binding.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterPage {
    pub view: String,
    pub user: RegisterRequest,
}

/// EditProductPage
///
/// The edit page carries the id of the product being edited; the page's
/// script fetches the product itself from `GET /api/products/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct EditProductPage {
    pub view: String,
    pub product_id: i64,
}
