//! Persistence seams used by the chat, diary and document services.
//!
//! Services only see these traits; `PgStore` backs them in production and
//! `MemoryStore` in tests.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::chat::ChatMessage;
use crate::models::diary::DiaryEntry;
use crate::models::document::{ExtractedDocument, NewDocument};
use crate::models::medical::{ConditionType, MedicalCondition};

mod pg;

#[cfg(test)]
pub mod memory;

pub use pg::PgStore;

pub type StoreResult<T> = Result<T, sqlx::Error>;

#[async_trait]
pub trait DiaryStore: Send + Sync {
    async fn create_entry(
        &self,
        user_id: Uuid,
        entry_text: &str,
        response_text: &str,
        mood_label: &str,
    ) -> StoreResult<DiaryEntry>;

    /// All entries of a user, oldest first.
    async fn list_entries(&self, user_id: Uuid) -> StoreResult<Vec<DiaryEntry>>;

    /// The newest `limit` entries, returned oldest first.
    async fn recent_entries(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<DiaryEntry>>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn create_document(&self, document: NewDocument) -> StoreResult<ExtractedDocument>;

    /// Newest first.
    async fn list_documents(&self, user_id: Uuid) -> StoreResult<Vec<ExtractedDocument>>;

    async fn get_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ExtractedDocument>>;

    /// Returns false when nothing owned by `user_id` matched.
    async fn delete_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn save_chat(&self, user_id: Uuid, question: &str, answer: &str)
        -> StoreResult<ChatMessage>;

    /// Oldest first.
    async fn chat_history(&self, user_id: Uuid) -> StoreResult<Vec<ChatMessage>>;
}

#[async_trait]
pub trait ConditionStore: Send + Sync {
    async fn conditions(&self, user_id: Uuid) -> StoreResult<Vec<MedicalCondition>>;

    /// Drop every stored condition of the user and insert `entries`.
    async fn replace_conditions(
        &self,
        user_id: Uuid,
        entries: &[(String, ConditionType)],
    ) -> StoreResult<Vec<MedicalCondition>>;
}
