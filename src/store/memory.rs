use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::{ChatStore, ConditionStore, DiaryStore, DocumentStore, StoreResult};
use crate::models::chat::ChatMessage;
use crate::models::diary::DiaryEntry;
use crate::models::document::{ExtractedDocument, NewDocument};
use crate::models::medical::{ConditionType, MedicalCondition};

/// In-process store for service tests.
#[derive(Default)]
pub struct MemoryStore {
    diary: Mutex<Vec<DiaryEntry>>,
    documents: Mutex<Vec<ExtractedDocument>>,
    chats: Mutex<Vec<ChatMessage>>,
    conditions: Mutex<Vec<MedicalCondition>>,
}

impl MemoryStore {
    /// Seed a diary entry with an explicit timestamp.
    pub fn push_diary(&self, user_id: Uuid, created_at: DateTime<Utc>, text: &str, mood: &str) {
        self.diary.lock().unwrap().push(DiaryEntry {
            id: Uuid::new_v4(),
            user_id,
            entry_text: text.into(),
            response_text: format!("reply to {}", text),
            mood_label: mood.into(),
            created_at,
        });
    }

    // Strictly increasing timestamps so ordering is stable within a test.
    fn next_timestamp<T>(items: &[T], created_at: impl Fn(&T) -> DateTime<Utc>) -> DateTime<Utc> {
        let now = Utc::now();
        match items.iter().map(created_at).max() {
            Some(last) if last >= now => last + Duration::milliseconds(1),
            _ => now,
        }
    }
}

#[async_trait]
impl DiaryStore for MemoryStore {
    async fn create_entry(
        &self,
        user_id: Uuid,
        entry_text: &str,
        response_text: &str,
        mood_label: &str,
    ) -> StoreResult<DiaryEntry> {
        let mut diary = self.diary.lock().unwrap();
        let entry = DiaryEntry {
            id: Uuid::new_v4(),
            user_id,
            entry_text: entry_text.into(),
            response_text: response_text.into(),
            mood_label: mood_label.into(),
            created_at: Self::next_timestamp(diary.as_slice(), |e| e.created_at),
        };
        diary.push(entry.clone());
        Ok(entry)
    }

    async fn list_entries(&self, user_id: Uuid) -> StoreResult<Vec<DiaryEntry>> {
        let mut entries: Vec<DiaryEntry> = self
            .diary
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }

    async fn recent_entries(&self, user_id: Uuid, limit: i64) -> StoreResult<Vec<DiaryEntry>> {
        let entries = self.list_entries(user_id).await?;
        let skip = entries.len().saturating_sub(limit.max(0) as usize);
        Ok(entries.into_iter().skip(skip).collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn create_document(&self, document: NewDocument) -> StoreResult<ExtractedDocument> {
        let mut documents = self.documents.lock().unwrap();
        let stored = ExtractedDocument {
            id: Uuid::new_v4(),
            user_id: document.user_id,
            file_name: document.file_name,
            extracted_text: document.extracted_text,
            summary: document.summary,
            medicines: document.medicines,
            created_at: Self::next_timestamp(documents.as_slice(), |d| d.created_at),
        };
        documents.push(stored.clone());
        Ok(stored)
    }

    async fn list_documents(&self, user_id: Uuid) -> StoreResult<Vec<ExtractedDocument>> {
        let mut documents: Vec<ExtractedDocument> = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.user_id == user_id)
            .cloned()
            .collect();
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    async fn get_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<Option<ExtractedDocument>> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id && d.user_id == user_id)
            .cloned())
    }

    async fn delete_document(&self, user_id: Uuid, id: Uuid) -> StoreResult<bool> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| !(d.id == id && d.user_id == user_id));
        Ok(documents.len() < before)
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn save_chat(
        &self,
        user_id: Uuid,
        question: &str,
        answer: &str,
    ) -> StoreResult<ChatMessage> {
        let mut chats = self.chats.lock().unwrap();
        let message = ChatMessage {
            id: Uuid::new_v4(),
            user_id,
            question: question.into(),
            answer: answer.into(),
            created_at: Self::next_timestamp(chats.as_slice(), |c| c.created_at),
        };
        chats.push(message.clone());
        Ok(message)
    }

    async fn chat_history(&self, user_id: Uuid) -> StoreResult<Vec<ChatMessage>> {
        Ok(self
            .chats
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ConditionStore for MemoryStore {
    async fn conditions(&self, user_id: Uuid) -> StoreResult<Vec<MedicalCondition>> {
        Ok(self
            .conditions
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn replace_conditions(
        &self,
        user_id: Uuid,
        entries: &[(String, ConditionType)],
    ) -> StoreResult<Vec<MedicalCondition>> {
        let mut conditions = self.conditions.lock().unwrap();
        conditions.retain(|c| c.user_id != user_id);
        let stored: Vec<MedicalCondition> = entries
            .iter()
            .map(|(name, condition_type)| MedicalCondition {
                id: Uuid::new_v4(),
                user_id,
                condition_name: name.clone(),
                condition_type: *condition_type,
                created_at: Utc::now(),
            })
            .collect();
        conditions.extend(stored.iter().cloned());
        Ok(stored)
    }
}
