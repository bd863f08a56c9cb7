//! Integration tests for the update (PUT) rule chain

use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use user_guard::prelude::*;

struct Fixture {
    validations: UserValidations,
    existing: User,
    other: User,
}

async fn fixture() -> Fixture {
    let store = InMemoryUserStore::new();
    let existing = store
        .insert(User::new("Ada", "Lovelace", "ada@example.com"))
        .await
        .unwrap();
    let other = store
        .insert(User::new("Grace", "Hopper", "grace@example.com"))
        .await
        .unwrap();
    let validations = UserValidations::new(Arc::new(store), &ValidationConfig::default()).unwrap();

    Fixture {
        validations,
        existing,
        other,
    }
}

impl Fixture {
    async fn run(&self, body: Value) -> Result<(), GuardError> {
        let ctx = ValidationContext::from_body(body).unwrap();
        self.validations.put.run(&ctx).await
    }
}

fn failure_fields(err: &GuardError) -> Vec<String> {
    err.field_errors()
        .expect("expected an aggregated validation error")
        .iter()
        .map(|f| f.field.clone())
        .collect()
}

fn failure_messages(err: &GuardError) -> Vec<String> {
    err.field_errors()
        .expect("expected an aggregated validation error")
        .iter()
        .map(|f| f.message.clone())
        .collect()
}

#[tokio::test]
async fn test_existing_id_alone_passes() {
    let f = fixture().await;
    assert!(f.run(json!({ "id": f.existing.id })).await.is_ok());
}

#[tokio::test]
async fn test_unknown_id_rejected() {
    let f = fixture().await;
    let err = f
        .run(json!({ "id": "507f1f77bcf86cd799439011" }))
        .await
        .unwrap_err();

    assert_eq!(failure_messages(&err), vec![messages::ID_NOT_FOUND]);
}

#[tokio::test]
async fn test_unknown_id_rejected_even_with_valid_fields() {
    let f = fixture().await;
    let err = f
        .run(json!({
            "id": "507f1f77bcf86cd799439011",
            "email": "fresh@example.com",
            "role": "USER_ROLE",
            "birthdate": "01-02-2003"
        }))
        .await
        .unwrap_err();

    assert_eq!(failure_messages(&err), vec![messages::ID_NOT_FOUND]);
}

#[tokio::test]
async fn test_missing_id_reports_required_format_and_existence() {
    let f = fixture().await;
    let err = f.run(json!({})).await.unwrap_err();

    assert_eq!(failure_fields(&err), vec!["id", "id", "id"]);
    let reported = failure_messages(&err);
    assert!(reported[0].contains("required"));
    assert!(reported[1].contains("hexadecimal"));
    assert_eq!(reported[2], messages::ID_NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_id_rejected() {
    let f = fixture().await;
    let err = f.run(json!({ "id": "42" })).await.unwrap_err();

    let reported = failure_messages(&err);
    assert_eq!(reported.len(), 2);
    assert!(reported[0].contains("hexadecimal"));
    assert_eq!(reported[1], messages::ID_NOT_FOUND);
}

#[tokio::test]
async fn test_id_from_path_params() {
    let f = fixture().await;
    let params = HashMap::from([("id".to_string(), f.existing.id.clone())]);
    let ctx = ValidationContext::from_body(json!({ "email": "fresh@example.com" }))
        .unwrap()
        .with_params(params);

    assert!(f.validations.put.run(&ctx).await.is_ok());
}

#[tokio::test]
async fn test_invalid_email_rejected() {
    let f = fixture().await;
    let err = f
        .run(json!({ "id": f.existing.id, "email": "not-an-email" }))
        .await
        .unwrap_err();

    assert_eq!(failure_messages(&err), vec![messages::EMAIL_INVALID]);
}

#[tokio::test]
async fn test_email_of_another_user_rejected() {
    let f = fixture().await;
    let err = f
        .run(json!({ "id": f.existing.id, "email": f.other.email }))
        .await
        .unwrap_err();

    assert_eq!(failure_messages(&err), vec![messages::EMAIL_TAKEN]);
}

#[tokio::test]
async fn test_fresh_email_accepted() {
    let f = fixture().await;
    assert!(
        f.run(json!({ "id": f.existing.id, "email": "fresh@example.com" }))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_role_and_birthdate_checks_apply() {
    let f = fixture().await;
    let err = f
        .run(json!({
            "id": f.existing.id,
            "role": "SUPERUSER",
            "birthdate": "31-12-1999"
        }))
        .await
        .unwrap_err();

    assert_eq!(failure_fields(&err), vec!["role", "birthdate"]);
    assert_eq!(failure_messages(&err)[0], messages::INVALID_ROLE);
}

#[tokio::test]
async fn test_valid_role_and_birthdate_accepted() {
    let f = fixture().await;
    assert!(
        f.run(json!({
            "id": f.existing.id,
            "role": "ADMIN_ROLE",
            "birthdate": "12/31/1999"
        }))
        .await
        .is_ok()
    );
}

#[tokio::test]
async fn test_missing_id_skips_lookup_when_disabled() {
    let store = InMemoryUserStore::new();
    let config = ValidationConfig::default().with_lookup_absent_fields(false);
    let validations = UserValidations::new(Arc::new(store), &config).unwrap();

    let ctx = ValidationContext::from_body(json!({})).unwrap();
    let err = validations.put.run(&ctx).await.unwrap_err();

    assert_eq!(failure_fields(&err), vec!["id", "id"]);
    assert!(!failure_messages(&err).contains(&messages::ID_NOT_FOUND.to_string()));
}
