use super::*;

#[test]
fn user_accepts_numeric_id() {
    let user: User = serde_json::from_value(serde_json::json!({
        "id": 42,
        "name": "Ada",
        "email": "ada@example.com",
        "avatar": "ignored"
    }))
    .unwrap();
    assert_eq!(user.id, "42");
    assert_eq!(user.email, "ada@example.com");
}

#[test]
fn user_accepts_string_id() {
    let user: User = serde_json::from_value(serde_json::json!({ "id": "u1", "name": "Ada" })).unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email, "");
}

#[test]
fn user_rejects_fractional_id() {
    let result = serde_json::from_value::<User>(serde_json::json!({ "id": 1.5, "name": "Ada" }));
    assert!(result.is_err());
}

#[test]
fn registration_defaults_missing_metadata() {
    let registration: Registration = serde_json::from_value(serde_json::json!({})).unwrap();
    assert!(registration.metadata.is_empty());
    assert!(registration.created_at.is_none());
}

#[test]
fn metadata_datatype_maps_unknown_values_to_other() {
    let fields: Vec<MetadataField> = serde_json::from_value(serde_json::json!([
        { "name": "newsletter", "datatype": "boolean", "required": true },
        { "name": "country", "datatype": "string" },
        { "name": "age", "datatype": "integer" }
    ]))
    .unwrap();
    assert_eq!(fields[0].datatype, MetadataDatatype::Boolean);
    assert!(fields[0].required);
    assert_eq!(fields[1].datatype, MetadataDatatype::String);
    assert!(!fields[1].required);
    assert_eq!(fields[2].datatype, MetadataDatatype::Other);
}

#[test]
fn user_update_omits_unset_email() {
    assert_eq!(serde_json::to_value(UserUpdate::default()).unwrap(), serde_json::json!({}));
    let update = UserUpdate { email: Some("new@example.com".to_owned()) };
    assert_eq!(serde_json::to_value(update).unwrap(), serde_json::json!({ "email": "new@example.com" }));
}
