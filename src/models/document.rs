use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A processed upload. `medicines` is stored as a Postgres text array and
/// holds no duplicates; its order carries no meaning.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExtractedDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub file_name: String,
    #[serde(skip_serializing)]
    pub extracted_text: String,
    pub summary: String,
    pub medicines: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Document with its full extracted text, for the detail view.
#[derive(Debug, Serialize)]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: ExtractedDocument,
    pub extracted_text: String,
}

impl From<ExtractedDocument> for DocumentDetail {
    fn from(document: ExtractedDocument) -> Self {
        let extracted_text = document.extracted_text.clone();
        Self {
            document,
            extracted_text,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub file_name: String,
    pub extracted_text: String,
    pub summary: String,
    pub medicines: Vec<String>,
}
