use chrono::NaiveDate;
use museum_catalog::{
    models::{Category, Product},
    repository::{NewProduct, PostgresRepository, Repository},
};
use sqlx::PgPool;
use tokio::test;
use uuid::Uuid;

// --- Test Context and Setup ---

/// Holds the live database pool. These tests run against a real Postgres
/// store and are skipped when DATABASE_URL is not set.
struct DbTestContext {
    pool: PgPool,
}

impl DbTestContext {
    async fn setup() -> Option<Self> {
        dotenv::dotenv().ok();

        let Ok(db_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping repository integration test");
            return None;
        };

        let pool = PgPool::connect(&db_url)
            .await
            .expect("Failed to connect to database for integration tests.");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run database migrations.");

        Some(DbTestContext { pool })
    }

    fn repository(&self) -> PostgresRepository {
        PostgresRepository::new(self.pool.clone())
    }
}

// --- Test Data Helpers ---

/// Unique fragment woven into test data so runs against a shared database
/// do not collide with earlier rows.
fn marker() -> String {
    Uuid::new_v4().simple().to_string()
}

async fn create_test_category(repo: &PostgresRepository, name: &str) -> Category {
    repo.insert_category(name)
        .await
        .expect("Failed to create test category")
}

async fn create_test_product(
    repo: &PostgresRepository,
    category_id: i64,
    name: &str,
    artist: &str,
    creation_date: Option<NaiveDate>,
) -> Product {
    repo.insert_product(&NewProduct {
        name: name.to_string(),
        artist: artist.to_string(),
        creation_date,
        quantity: 1,
        category_id,
    })
    .await
    .expect("Failed to create test product")
}

// --- Tests ---

#[test]
async fn test_category_save_and_find_round_trip() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    // 1. Insert assigns a store id.
    let created = create_test_category(&repo, &format!("Ceramics-{m}")).await;
    assert!(created.id > 0);

    // 2. Find returns an equal category.
    let fetched = repo
        .find_category(created.id)
        .await
        .expect("find_category failed");
    assert_eq!(fetched, Some(created.clone()));

    // 3. Update in place, visible on the next find.
    let renamed = repo
        .update_category(created.id, &format!("Arms-{m}"))
        .await
        .expect("update_category failed");
    assert_eq!(renamed.as_ref().map(|c| c.id), Some(created.id));

    let refetched = repo
        .find_category(created.id)
        .await
        .expect("find_category failed");
    assert_eq!(refetched.map(|c| c.name), Some(format!("Arms-{m}")));

    // 4. Updating an id no row carries yields None, not an error.
    let missing = repo
        .update_category(i64::MAX, "ghost")
        .await
        .expect("update_category failed");
    assert!(missing.is_none());
}

#[test]
async fn test_insert_product_returns_the_joined_category() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    let category = create_test_category(&repo, &format!("Paintings-{m}")).await;
    let date = NaiveDate::from_ymd_opt(2021, 7, 19);
    let product =
        create_test_product(&repo, category.id, &format!("Vase-{m}"), "Unknown", date).await;

    // The insert result already carries the nested category.
    assert_eq!(product.category, category);
    assert_eq!(product.creation_date, date);

    // And so does a fresh lookup.
    let fetched = repo
        .find_product(product.id)
        .await
        .expect("find_product failed");
    assert_eq!(fetched, Some(product));

    let missing = repo.find_product(i64::MAX).await.expect("find_product failed");
    assert!(missing.is_none());
}

#[test]
async fn test_search_matches_id_name_artist_and_date_fragments() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    let category = create_test_category(&repo, &format!("Sculpture-{m}")).await;
    let product = create_test_product(
        &repo,
        category.id,
        &format!("Bust-{m}"),
        &format!("Rodin-{m}"),
        NaiveDate::from_ymd_opt(2021, 7, 19),
    )
    .await;

    // 1. Name fragment.
    let by_name = repo
        .search_products(&format!("Bust-{m}"))
        .await
        .expect("search failed");
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, product.id);

    // 2. Artist fragment.
    let by_artist = repo
        .search_products(&format!("Rodin-{m}"))
        .await
        .expect("search failed");
    assert!(by_artist.iter().any(|p| p.id == product.id));

    // 3. The id rendered as text is searchable too.
    let by_id = repo
        .search_products(&product.id.to_string())
        .await
        .expect("search failed");
    assert!(by_id.iter().any(|p| p.id == product.id));

    // 4. Date fragment, rendered as text by the store.
    let by_date = repo.search_products("2021-07-19").await.expect("search failed");
    assert!(by_date.iter().any(|p| p.id == product.id));
}

#[test]
async fn test_search_is_case_sensitive() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    let category = create_test_category(&repo, &format!("Mosaics-{m}")).await;
    let product = create_test_product(
        &repo,
        category.id,
        &format!("Marble-{m}"),
        "Unknown",
        None,
    )
    .await;

    let lowered = repo
        .search_products(&format!("marble-{m}"))
        .await
        .expect("search failed");
    assert!(!lowered.iter().any(|p| p.id == product.id));
}

#[test]
async fn test_search_matches_products_without_a_date() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    // A NULL date must not swallow the concatenated haystack.
    let category = create_test_category(&repo, &format!("Relics-{m}")).await;
    let product =
        create_test_product(&repo, category.id, &format!("Relic-{m}"), "Unknown", None).await;

    let found = repo
        .search_products(&format!("Relic-{m}"))
        .await
        .expect("search failed");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, product.id);
    assert_eq!(found[0].creation_date, None);
}

#[test]
async fn test_delete_product_reports_removal() {
    let Some(ctx) = DbTestContext::setup().await else {
        return;
    };
    let repo = ctx.repository();
    let m = marker();

    let category = create_test_category(&repo, &format!("Coins-{m}")).await;
    let product =
        create_test_product(&repo, category.id, &format!("Denarius-{m}"), "Unknown", None).await;

    assert!(repo.delete_product(product.id).await.expect("delete failed"));

    let gone = repo.find_product(product.id).await.expect("find failed");
    assert!(gone.is_none());

    // A second delete removes nothing.
    assert!(!repo.delete_product(product.id).await.expect("delete failed"));
}
