use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A user as seen outside the server. Has no password field by construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_user_has_no_password() {
        let user = UserResponse {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@x.com".to_string(),
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };

        let value = serde_json::to_value(&user).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("password"));
        assert!(object.contains_key("createdAt"));
        assert_eq!(object["name"], "Alice");
    }
}
