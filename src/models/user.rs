use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::medical::MedicalCondition;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub age: i32,
    pub gender: Gender,
    pub contact_no: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "gender", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

/// Personal details plus the medical conditions the chatbot is grounded in.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub age: i32,
    pub gender: Gender,
    pub contact_no: String,
    pub conditions: Vec<MedicalCondition>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: User, conditions: Vec<MedicalCondition>) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            age: user.age,
            gender: user.gender,
            contact_no: user.contact_no,
            conditions,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_never_serialized() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            full_name: "Ana Lopez".into(),
            age: 34,
            gender: Gender::PreferNotToSay,
            contact_no: "555-0100".into(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["gender"], "prefer_not_to_say");

        let profile = serde_json::to_value(UserProfile::new(user, Vec::new())).unwrap();
        assert_eq!(profile["conditions"], serde_json::json!([]));
    }
}
