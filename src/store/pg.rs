use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ChatStore, ConditionStore, DiaryStore, DocumentStore, StoreResult};
use crate::models::chat::ChatMessage;
use crate::models::diary::DiaryEntry;
use crate::models::document::{ExtractedDocument, NewDocument};
use crate::models::medical::{ConditionType, MedicalCondition};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiaryStore for PgStore {
    async fn create_entry(
        &self,
        user_id: Uuid,
        entry_text: &str,
        response_text: &str,
        mood_label: &str,
    ) -> StoreResult<DiaryEntry> {
        sqlx::query_as::<_, DiaryEntry>(
            r#"
            INSERT INTO diary_entries (id, user_id, entry_text, response_text, mood_label)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(entry_text)
        .bind(response_text)
        .bind(mood_label)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_entries(&self, user_id: Uuid) -> StoreResult<Vec<DiaryEntry>> {
        sqlx::query_as::<_, DiaryEntry>(
            "SELECT * FROM diary_entries WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn recent_entries(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<DiaryEntry>> {
        let mut entries = sqlx::query_as::<_, DiaryEntry>(
            r#"
            SELECT * FROM diary_entries
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        entries.reverse();
        Ok(entries)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn create_document(&self, document: NewDocument) -> StoreResult<ExtractedDocument> {
        sqlx::query_as::<_, ExtractedDocument>(
            r#"
            INSERT INTO documents (id, user_id, file_name, extracted_text, summary, medicines)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(document.user_id)
        .bind(&document.file_name)
        .bind(&document.extracted_text)
        .bind(&document.summary)
        .bind(&document.medicines)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_documents(&self, user_id: Uuid) -> StoreResult<Vec<ExtractedDocument>> {
        sqlx::query_as::<_, ExtractedDocument>(
            "SELECT * FROM documents WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ExtractedDocument>> {
        sqlx::query_as::<_, ExtractedDocument>(
            "SELECT * FROM documents WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ChatStore for PgStore {
    async fn save_chat(
        &self,
        user_id: Uuid,
        question: &str,
        answer: &str,
    ) -> StoreResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_history (id, user_id, question, answer)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(question)
        .bind(answer)
        .fetch_one(&self.pool)
        .await
    }

    async fn chat_history(&self, user_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_history WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl ConditionStore for PgStore {
    async fn conditions(&self, user_id: Uuid) -> StoreResult<Vec<MedicalCondition>> {
        sqlx::query_as::<_, MedicalCondition>(
            "SELECT * FROM medical_info WHERE user_id = $1 ORDER BY created_at ASC, condition_name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn replace_conditions(
        &self,
        user_id: Uuid,
        entries: &[(String, ConditionType)],
    ) -> StoreResult<Vec<MedicalCondition>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM medical_info WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let mut stored = Vec::with_capacity(entries.len());
        for (name, condition_type) in entries {
            let condition = sqlx::query_as::<_, MedicalCondition>(
                r#"
                INSERT INTO medical_info (id, user_id, condition_name, condition_type)
                VALUES ($1, $2, $3, $4)
                RETURNING *
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(name)
            .bind(condition_type)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(condition);
        }

        tx.commit().await?;
        Ok(stored)
    }
}
