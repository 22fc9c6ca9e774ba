use chrono::NaiveDate;
use museum_catalog::models::{
    Category, PageView, Product, ProductPayload, SessionResponse, UserSummary,
};

// --- Serialization Shapes ---

#[test]
fn product_serializes_with_nested_category() {
    let product = Product {
        id: 3,
        name: "Amphora".to_string(),
        artist: "Unknown".to_string(),
        creation_date: NaiveDate::from_ymd_opt(2024, 3, 1),
        quantity: 2,
        category: Category {
            id: 1,
            name: "Ceramics".to_string(),
        },
    };

    let json = serde_json::to_value(&product).unwrap();

    assert_eq!(json["id"], 3);
    assert_eq!(json["creation_date"], "2024-03-01");
    assert_eq!(json["category"]["id"], 1);
    assert_eq!(json["category"]["name"], "Ceramics");
}

#[test]
fn product_with_null_date_round_trips() {
    let product = Product {
        creation_date: None,
        category: Category::default(),
        ..Product::default()
    };

    let json = serde_json::to_string(&product).unwrap();
    let back: Product = serde_json::from_str(&json).unwrap();

    assert_eq!(back.creation_date, None);
}

// --- Payload Binding ---

#[test]
fn product_payload_accepts_a_category_without_id() {
    let json = r#"{
        "name": "The Ninth Wave",
        "artist": "Aivazovsky",
        "creation_date": "2024-03-01",
        "quantity": 1,
        "category": { "name": "Paintings" }
    }"#;

    let payload: ProductPayload = serde_json::from_str(json).unwrap();

    assert_eq!(payload.id, None);
    assert_eq!(payload.category.id, None);
    assert_eq!(payload.category.name.as_deref(), Some("Paintings"));
}

#[test]
fn product_payload_accepts_a_category_reference_by_id() {
    let json = r#"{
        "name": "Bust",
        "artist": "Unknown",
        "creation_date": null,
        "category": { "id": 5 }
    }"#;

    let payload: ProductPayload = serde_json::from_str(json).unwrap();

    assert_eq!(payload.category.id, Some(5));
    assert_eq!(payload.creation_date, None);
    // quantity defaults when the form omits it.
    assert_eq!(payload.quantity, 0);
}

#[test]
fn product_payload_with_id_marks_an_update() {
    let json = r#"{
        "id": 12,
        "name": "Bust",
        "artist": "Unknown",
        "creation_date": "2024-01-15",
        "quantity": 4,
        "category": { "id": 5 }
    }"#;

    let payload: ProductPayload = serde_json::from_str(json).unwrap();

    assert_eq!(payload.id, Some(12));
}

// --- Output Shapes ---

#[test]
fn user_summary_exposes_roles_but_never_a_hash() {
    let summary = UserSummary {
        id: 1,
        username: "curator".to_string(),
        roles: vec!["USER".to_string(), "ADMIN".to_string()],
    };

    let json = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["username"], "curator");
    assert_eq!(json["roles"][1], "ADMIN");
    assert!(json.get("password").is_none());
    assert!(json.get("password_hash").is_none());
}

#[test]
fn session_response_carries_token_and_expiry() {
    let response = SessionResponse {
        token: "tok-1".to_string(),
        expires_at: chrono::Utc::now(),
    };

    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["token"], "tok-1");
    assert!(json["expires_at"].is_string());
}

#[test]
fn page_view_serializes_the_view_name() {
    let json = serde_json::to_value(PageView::new("index")).unwrap();

    assert_eq!(json["view"], "index");
}
