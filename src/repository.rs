use crate::models::{Category, Product, Role, Session, User};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

/// NewProduct
///
/// Column values for a product insert or update, produced by the service
/// layer after validation and category resolution. The category id here must
/// already reference a persisted row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub artist: String,
    pub creation_date: Option<NaiveDate>,
    pub quantity: i32,
    pub category_id: i64,
}

/// Repository Trait
///
/// The abstract contract for all persistence operations, grouped by entity.
/// Handlers and services interact with the data layer through this trait
/// without knowing the concrete implementation (Postgres, mock, ...).
///
/// Every method is a single atomic statement against the store; no
/// transaction spans multiple calls. Lookup misses are `Ok(None)`, store
/// failures are `Err`; nothing is swallowed here.
///
/// **Send + Sync + async_trait** make the trait object (`Arc<dyn Repository>`)
/// shareable across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Products ---
    async fn find_all_products(&self) -> Result<Vec<Product>, sqlx::Error>;
    // Case-sensitive substring match over the textual concatenation of
    // id, name, artist, and creation date.
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, sqlx::Error>;
    async fn find_product(&self, id: i64) -> Result<Option<Product>, sqlx::Error>;
    async fn insert_product(&self, product: &NewProduct) -> Result<Product, sqlx::Error>;
    // Returns None when no row with that id exists.
    async fn update_product(
        &self,
        id: i64,
        product: &NewProduct,
    ) -> Result<Option<Product>, sqlx::Error>;
    // True when a row was actually removed.
    async fn delete_product(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Categories ---
    async fn find_all_categories(&self) -> Result<Vec<Category>, sqlx::Error>;
    async fn find_category(&self, id: i64) -> Result<Option<Category>, sqlx::Error>;
    async fn insert_category(&self, name: &str) -> Result<Category, sqlx::Error>;
    async fn update_category(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error>;

    // --- Roles ---
    async fn find_role(&self, id: i64) -> Result<Option<Role>, sqlx::Error>;
    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, sqlx::Error>;

    // --- Users ---
    async fn find_user(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error>;
    async fn find_all_users(&self) -> Result<Vec<User>, sqlx::Error>;
    async fn find_user_roles(&self, user_id: i64) -> Result<Vec<Role>, sqlx::Error>;
    async fn attach_role(&self, user_id: i64, role_id: i64) -> Result<(), sqlx::Error>;

    // --- Sessions ---
    async fn insert_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;
    async fn find_session(&self, token: &str) -> Result<Option<Session>, sqlx::Error>;
    async fn delete_session(&self, token: &str) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by the
/// PostgreSQL connection pool.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat product row as selected from the store; products are always fetched
/// joined with their category and mapped into the nested `Product` shape.
#[derive(FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    artist: String,
    creation_date: Option<NaiveDate>,
    quantity: i32,
    category_id: i64,
    category_name: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            artist: row.artist,
            creation_date: row.creation_date,
            quantity: row.quantity,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
        }
    }
}

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.name, p.artist, p.creation_date, p.quantity,
           c.id AS category_id, c.name AS category_name
    FROM products p
    JOIN categories c ON c.id = p.category_id
"#;

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_all_products(&self) -> Result<Vec<Product>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} ORDER BY p.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Matches the keyword as a case-sensitive substring against the
    /// concatenation of id, name, artist, and the creation date rendered as
    /// text (Postgres `LIKE` is case-sensitive).
    async fn search_products(&self, keyword: &str) -> Result<Vec<Product>, sqlx::Error> {
        let pattern = format!("%{}%", keyword);
        let query = format!(
            "{PRODUCT_SELECT} \
             WHERE CONCAT(p.id, ' ', p.name, ' ', p.artist, ' ', COALESCE(p.creation_date::TEXT, '')) LIKE $1 \
             ORDER BY p.id"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Product::from))
    }

    async fn insert_product(&self, product: &NewProduct) -> Result<Product, sqlx::Error> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO products (name, artist, creation_date, quantity, category_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(&product.name)
        .bind(&product.artist)
        .bind(product.creation_date)
        .bind(product.quantity)
        .bind(product.category_id)
        .fetch_one(&self.pool)
        .await?;

        // The row was just inserted; a miss here means the store lied.
        self.find_product(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    async fn update_product(
        &self,
        id: i64,
        product: &NewProduct,
    ) -> Result<Option<Product>, sqlx::Error> {
        let updated: Option<i64> = sqlx::query_scalar(
            "UPDATE products \
             SET name = $2, artist = $3, creation_date = $4, quantity = $5, category_id = $6 \
             WHERE id = $1 RETURNING id",
        )
        .bind(id)
        .bind(&product.name)
        .bind(&product.artist)
        .bind(product.creation_date)
        .bind(product.quantity)
        .bind(product.category_id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.find_product(id).await,
            None => Ok(None),
        }
    }

    async fn delete_product(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_all_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_category(&self, id: i64) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>("SELECT id, name FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_category(&self, name: &str) -> Result<Category, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_category(
        &self,
        id: i64,
        name: &str,
    ) -> Result<Option<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING id, name",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_role(&self, id: i64) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    async fn find_all_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT id, username, password_hash FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
    }

    async fn find_user_roles(&self, user_id: i64) -> Result<Vec<Role>, sqlx::Error> {
        sqlx::query_as::<_, Role>(
            "SELECT r.id, r.name FROM roles r \
             JOIN user_roles ur ON ur.role_id = r.id \
             WHERE ur.user_id = $1 ORDER BY r.id",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn attach_role(&self, user_id: i64, role_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_session(
        &self,
        token: &str,
        user_id: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_session(&self, token: &str) -> Result<Option<Session>, sqlx::Error> {
        sqlx::query_as::<_, Session>(
            "SELECT token, user_id, expires_at FROM sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_session(&self, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
