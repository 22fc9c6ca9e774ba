use crate::{
    error::ApiError,
    models::{
        Category, CategoryPayload, Product, ProductPayload, RegisterRequest, Role, Session,
        User, UserSummary,
    },
    repository::{NewProduct, RepositoryState},
};
use chrono::{Duration, NaiveDate, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

// Name and artist share the column width of the store.
const MAX_FIELD_LEN: usize = 255;

// Statistics window: the inclusive range [today - 14 days, today].
const DELIVERY_WINDOW_DAYS: i64 = 14;

/// CategoryService
///
/// Thin orchestration over the category gateway: listing, insert-or-update
/// save, and a null-on-miss lookup.
#[derive(Clone)]
pub struct CategoryService {
    repo: RepositoryState,
}

impl CategoryService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// All categories in store default order.
    pub async fn get_all(&self) -> Result<Vec<Category>, ApiError> {
        Ok(self.repo.find_all_categories().await?)
    }

    /// Saves a category: insert when the payload carries no id (identity is
    /// assigned by the store), update when it does.
    pub async fn save(&self, payload: CategoryPayload) -> Result<Category, ApiError> {
        let name = payload.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ApiError::Validation("category name must not be empty".into()));
        }
        if name.chars().count() > MAX_FIELD_LEN {
            return Err(ApiError::Validation(format!(
                "category name exceeds {MAX_FIELD_LEN} characters"
            )));
        }

        match payload.id {
            None => Ok(self.repo.insert_category(name).await?),
            Some(id) => self
                .repo
                .update_category(id, name)
                .await?
                .ok_or(ApiError::NotFound("category")),
        }
    }

    /// Lookup by id; a miss is `None`, not an error.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Category>, ApiError> {
        Ok(self.repo.find_category(id).await?)
    }
}

/// ProductService
///
/// Business logic for exhibits: validation, explicit category-before-product
/// save ordering, and the delivery-date statistics. The category collaborator
/// is injected through the constructor.
#[derive(Clone)]
pub struct ProductService {
    repo: RepositoryState,
    categories: CategoryService,
}

impl ProductService {
    pub fn new(repo: RepositoryState, categories: CategoryService) -> Self {
        Self { repo, categories }
    }

    pub async fn get_all(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.repo.find_all_products().await?)
    }

    pub async fn search(&self, keyword: &str) -> Result<Vec<Product>, ApiError> {
        Ok(self.repo.search_products(keyword).await?)
    }

    /// Lookup by id; a miss is `None`, not an error.
    pub async fn get(&self, id: i64) -> Result<Option<Product>, ApiError> {
        Ok(self.repo.find_product(id).await?)
    }

    /// Saves a product after validating its invariants and resolving its
    /// category reference.
    ///
    /// Save order is explicit: a payload category without an id is persisted
    /// first and the generated id is attached before the product itself is
    /// stored. A payload category id that does not resolve to a persisted row
    /// is a validation failure; products never reference phantom categories.
    /// A payload id that no longer resolves to a product row fails the same
    /// way, keeping every failure on this path a status-only 500.
    pub async fn save(&self, payload: ProductPayload) -> Result<Product, ApiError> {
        validate_product(&payload)?;

        let category = match payload.category.id {
            Some(id) => self
                .categories
                .find_by_id(id)
                .await?
                .ok_or_else(|| {
                    ApiError::Validation(format!("category {id} is not persisted"))
                })?,
            None => self.categories.save(payload.category.clone()).await?,
        };

        let new_product = NewProduct {
            name: payload.name.trim().to_string(),
            artist: payload.artist.trim().to_string(),
            creation_date: payload.creation_date,
            quantity: payload.quantity,
            category_id: category.id,
        };

        match payload.id {
            None => Ok(self.repo.insert_product(&new_product).await?),
            Some(id) => self
                .repo
                .update_product(id, &new_product)
                .await?
                .ok_or_else(|| ApiError::Validation(format!("product {id} is not persisted"))),
        }
    }

    /// Deletes a product; true when a row was removed.
    pub async fn delete(&self, id: i64) -> Result<bool, ApiError> {
        Ok(self.repo.delete_product(id).await?)
    }

    /// Sums on-hand quantity per delivery date over the last 14 days.
    ///
    /// The window is anchored at the current date, so the result shifts with
    /// the calendar. Products without a date are excluded.
    pub async fn count_by_delivery_date(&self) -> Result<BTreeMap<NaiveDate, i64>, ApiError> {
        let products = self.repo.find_all_products().await?;
        Ok(delivery_date_totals(&products, Utc::now().date_naive()))
    }
}

/// Buckets quantity totals by delivery date over the inclusive window
/// `[today - 14 days, today]`. Pure over its inputs; the service anchors
/// `today` at call time. The BTreeMap keeps dates in ascending order.
pub fn delivery_date_totals(products: &[Product], today: NaiveDate) -> BTreeMap<NaiveDate, i64> {
    let start = today - Duration::days(DELIVERY_WINDOW_DAYS);
    let mut totals = BTreeMap::new();

    for product in products {
        if let Some(date) = product.creation_date {
            if date >= start && date <= today {
                *totals.entry(date).or_insert(0) += i64::from(product.quantity);
            }
        }
    }

    totals
}

/// Checks the product invariants: name and artist non-empty and length
/// bounded, quantity non-negative.
pub fn validate_product(payload: &ProductPayload) -> Result<(), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::Validation("product name must not be empty".into()));
    }
    if name.chars().count() > MAX_FIELD_LEN {
        return Err(ApiError::Validation(format!(
            "product name exceeds {MAX_FIELD_LEN} characters"
        )));
    }

    let artist = payload.artist.trim();
    if artist.is_empty() {
        return Err(ApiError::Validation("artist must not be empty".into()));
    }
    if artist.chars().count() > MAX_FIELD_LEN {
        return Err(ApiError::Validation(format!(
            "artist exceeds {MAX_FIELD_LEN} characters"
        )));
    }

    if payload.quantity < 0 {
        return Err(ApiError::Validation("quantity must not be negative".into()));
    }

    Ok(())
}

/// RoleService
///
/// Lookup of authorization grants. Unlike the Category/Product lookups this
/// one fails on a miss: roles are seeded by migration, so a missing role id
/// is a deployment fault rather than an expected absence.
#[derive(Clone)]
pub struct RoleService {
    repo: RepositoryState,
}

impl RoleService {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: i64) -> Result<Role, ApiError> {
        self.repo
            .find_role(id)
            .await?
            .ok_or(ApiError::NotFound("role"))
    }
}

/// UserService
///
/// Account registration, credential verification, and session lifecycle.
/// Passwords are bcrypt-hashed with the default cost factor; plaintext is
/// never stored or compared directly.
#[derive(Clone)]
pub struct UserService {
    repo: RepositoryState,
    session_ttl_minutes: i64,
}

/// Role name attached to every freshly registered account.
pub const DEFAULT_ROLE: &str = "USER";

/// Role name required for administrative operations.
pub const ADMIN_ROLE: &str = "ADMIN";

impl UserService {
    pub fn new(repo: RepositoryState, session_ttl_minutes: i64) -> Self {
        Self {
            repo,
            session_ttl_minutes,
        }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self.repo.find_user_by_username(username).await?)
    }

    /// Registers a new account: rejects duplicates, hashes the password, and
    /// attaches the seeded default role.
    pub async fn register(&self, req: RegisterRequest) -> Result<UserSummary, ApiError> {
        let username = req.username.trim();
        if username.is_empty() {
            return Err(ApiError::Validation("username must not be empty".into()));
        }
        if username.chars().count() > MAX_FIELD_LEN {
            return Err(ApiError::Validation(format!(
                "username exceeds {MAX_FIELD_LEN} characters"
            )));
        }
        if req.password.is_empty() {
            return Err(ApiError::Validation("password must not be empty".into()));
        }

        if self.repo.find_user_by_username(username).await?.is_some() {
            return Err(ApiError::Conflict("username is already taken"));
        }

        let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;
        let user = self.repo.insert_user(username, &hash).await?;

        let role = self
            .repo
            .find_role_by_name(DEFAULT_ROLE)
            .await?
            .ok_or(ApiError::NotFound("role"))?;
        self.repo.attach_role(user.id, role.id).await?;

        Ok(UserSummary {
            id: user.id,
            username: user.username,
            roles: vec![role.name],
        })
    }

    /// Verifies credentials for the login flow.
    ///
    /// Every failure mode collapses into the same `Unauthorized` error: the
    /// caller never learns whether the username exists.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, ApiError> {
        let user = self
            .repo
            .find_user_by_username(username)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let verified =
            bcrypt::verify(password, &user.password_hash).map_err(|_| ApiError::Unauthorized)?;
        if !verified {
            return Err(ApiError::Unauthorized);
        }

        Ok(user)
    }

    /// Opens a fresh session for the user: random opaque token, expiry at
    /// now + configured TTL.
    pub async fn start_session(&self, user_id: i64) -> Result<Session, ApiError> {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            expires_at: Utc::now() + Duration::minutes(self.session_ttl_minutes),
        };
        self.repo
            .insert_session(&session.token, session.user_id, session.expires_at)
            .await?;
        Ok(session)
    }

    /// Resolves a presented token into the user and role names behind it.
    /// Unknown tokens yield `None`; expired ones are deleted and also yield
    /// `None`.
    pub async fn resolve_session(
        &self,
        token: &str,
    ) -> Result<Option<(User, Vec<String>)>, ApiError> {
        let Some(session) = self.repo.find_session(token).await? else {
            return Ok(None);
        };

        if session.is_expired(Utc::now()) {
            self.repo.delete_session(token).await?;
            return Ok(None);
        }

        let Some(user) = self.repo.find_user(session.user_id).await? else {
            // The account was removed after the session was issued.
            self.repo.delete_session(token).await?;
            return Ok(None);
        };

        let roles = self.role_names(user.id).await?;
        Ok(Some((user, roles)))
    }

    /// Ends a session; true when a row was removed.
    pub async fn end_session(&self, token: &str) -> Result<bool, ApiError> {
        Ok(self.repo.delete_session(token).await?)
    }

    /// Role names of a user, verbatim authority strings.
    pub async fn role_names(&self, user_id: i64) -> Result<Vec<String>, ApiError> {
        let roles = self.repo.find_user_roles(user_id).await?;
        Ok(roles.into_iter().map(|r| r.name).collect())
    }

    /// Admin listing of every account with its role names.
    pub async fn accounts(&self) -> Result<Vec<UserSummary>, ApiError> {
        let users = self.repo.find_all_users().await?;
        let mut summaries = Vec::with_capacity(users.len());
        for user in users {
            let roles = self.role_names(user.id).await?;
            summaries.push(UserSummary {
                id: user.id,
                username: user.username,
                roles,
            });
        }
        Ok(summaries)
    }
}
