use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_new_ids_are_time_ordered() {
    let first = ProductId::new();
    let second = ProductId::new();
    assert_ne!(first, second);
    assert_eq!(first.into_inner().get_version_num(), 7);
}

#[test]
fn test_id_round_trips_through_string() {
    let uuid = Uuid::new_v4();
    let id = AccountId::from_str(&uuid.to_string()).unwrap();
    assert_eq!(id, AccountId::from_uuid(uuid));
    assert_eq!(id.to_string(), uuid.to_string());
}

#[test]
fn test_id_rejects_garbage() {
    assert!(CategoryId::from_str("not-a-uuid").is_err());
}

#[test]
fn test_id_serializes_as_plain_uuid() {
    let uuid = Uuid::new_v4();
    let json = serde_json::to_string(&UserId::from_uuid(uuid)).unwrap();
    assert_eq!(json, format!("\"{uuid}\""));

    let back: UserId = serde_json::from_str(&json).unwrap();
    assert_eq!(back.into_inner(), uuid);
}
