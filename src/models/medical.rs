use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicalCondition {
    pub id: Uuid,
    pub user_id: Uuid,
    pub condition_name: String,
    pub condition_type: ConditionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "condition_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    Standard,
    Custom,
}

/// The four checkbox conditions offered on the profile form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StandardConditions {
    #[serde(default)]
    pub diabetes: bool,
    #[serde(default)]
    pub hypertension: bool,
    #[serde(default)]
    pub asthma: bool,
    #[serde(default)]
    pub heart_disease: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionsInput {
    #[serde(default)]
    pub standard: StandardConditions,
    /// Free-text conditions, one per entry. Blank entries are ignored.
    #[serde(default)]
    pub custom: Vec<String>,
}

impl ConditionsInput {
    /// Flatten into (name, type) pairs ready to be stored.
    pub fn entries(&self) -> Vec<(String, ConditionType)> {
        let standard = [
            ("diabetes", self.standard.diabetes),
            ("hypertension", self.standard.hypertension),
            ("asthma", self.standard.asthma),
            ("heart_disease", self.standard.heart_disease),
        ];

        let mut entries: Vec<(String, ConditionType)> = standard
            .into_iter()
            .filter(|(_, checked)| *checked)
            .map(|(name, _)| (name.to_string(), ConditionType::Standard))
            .collect();

        entries.extend(
            self.custom
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(|c| (c.to_string(), ConditionType::Custom)),
        );

        entries
    }
}

/// Render conditions for a prompt: names joined by ", ".
pub fn describe_conditions(conditions: &[MedicalCondition]) -> String {
    if conditions.is_empty() {
        return "None specified".to_string();
    }
    conditions
        .iter()
        .map(|c| c.condition_name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
