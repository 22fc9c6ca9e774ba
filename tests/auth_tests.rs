use axum::http::{HeaderMap, header};
use chrono::{Duration, Utc};
use museum_catalog::{auth::session_token, models::Session};

// --- Token Resolution ---

#[test]
fn bearer_header_yields_the_token() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Bearer abc-123".parse().unwrap());

    assert_eq!(session_token(&headers), Some("abc-123".to_string()));
}

#[test]
fn session_cookie_yields_the_token() {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::COOKIE,
        "theme=dark; SESSION=tok-456; lang=en".parse().unwrap(),
    );

    assert_eq!(session_token(&headers), Some("tok-456".to_string()));
}

#[test]
fn bearer_takes_precedence_over_the_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Bearer from-header".parse().unwrap());
    headers.insert(header::COOKIE, "SESSION=from-cookie".parse().unwrap());

    assert_eq!(session_token(&headers), Some("from-header".to_string()));
}

#[test]
fn malformed_authorization_falls_back_to_the_cookie() {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, "Basic dXNlcg==".parse().unwrap());
    headers.insert(header::COOKIE, "SESSION=tok-789".parse().unwrap());

    assert_eq!(session_token(&headers), Some("tok-789".to_string()));
}

#[test]
fn no_credentials_yields_none() {
    assert_eq!(session_token(&HeaderMap::new()), None);
}

#[test]
fn unrelated_cookies_yield_none() {
    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, "theme=dark; lang=en".parse().unwrap());

    assert_eq!(session_token(&headers), None);
}

// --- Session Expiry ---

#[test]
fn future_expiry_is_not_expired() {
    let session = Session {
        token: "t".to_string(),
        user_id: 1,
        expires_at: Utc::now() + Duration::hours(1),
    };

    assert!(!session.is_expired(Utc::now()));
}

#[test]
fn past_expiry_is_expired() {
    let now = Utc::now();
    let session = Session {
        token: "t".to_string(),
        user_id: 1,
        expires_at: now - Duration::seconds(1),
    };

    assert!(session.is_expired(now));
}

#[test]
fn expiry_instant_itself_counts_as_expired() {
    let now = Utc::now();
    let session = Session {
        token: "t".to_string(),
        user_id: 1,
        expires_at: now,
    };

    assert!(session.is_expired(now));
}

// --- Password Hashing ---

#[test]
fn bcrypt_round_trip_verifies() {
    // Low cost keeps the test fast; production hashing uses DEFAULT_COST.
    let hash = bcrypt::hash("curator-passphrase", 4).unwrap();

    assert!(bcrypt::verify("curator-passphrase", &hash).unwrap());
    assert!(!bcrypt::verify("other-passphrase", &hash).unwrap());
}

#[test]
fn bcrypt_hashes_are_salted() {
    let first = bcrypt::hash("same-input", 4).unwrap();
    let second = bcrypt::hash("same-input", 4).unwrap();

    assert_ne!(first, second);
}
