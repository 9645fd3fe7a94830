use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::llm::{Prompt, TextGenerator};
use crate::analysis::mood::{self, Timeline};
use crate::analysis::mood_scale::MoodGroup;
use crate::analysis::{MoodRecord, MoodSummary, MoodTrend, WeeklyHeatmap};
use crate::error::{AppError, AppResult};
use crate::models::diary::{group_by_date, DiaryDay, DiaryEntry};
use crate::store::DiaryStore;

/// Previous entries fed back to the model as context.
const CONTEXT_ENTRIES: i64 = 3;

const FALLBACK_MOOD: &str = "neutral";

#[derive(Debug, Serialize)]
pub struct MoodAnalytics {
    pub timeline: Timeline,
    pub distribution: BTreeMap<MoodGroup, usize>,
    pub heatmap: WeeklyHeatmap,
}

#[derive(Clone)]
pub struct DiaryService {
    store: Arc<dyn DiaryStore>,
    generator: Arc<dyn TextGenerator>,
}

impl DiaryService {
    pub fn new(store: Arc<dyn DiaryStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { store, generator }
    }

    /// Reply to a new entry, classify its mood and store it.
    pub async fn write_entry(&self, user_id: Uuid, entry: &str) -> AppResult<DiaryEntry> {
        let entry = entry.trim();
        if entry.is_empty() {
            return Err(AppError::Validation("Diary entry cannot be empty".into()));
        }

        let previous = self.store.recent_entries(user_id, CONTEXT_ENTRIES).await?;
        let context = build_context(&previous);

        let reply = self
            .generator
            .generate(&Prompt::new(
                "You are a supportive and empathetic diary companion. Respond warmly to the \
                 user's diary entry in a few sentences, acknowledging their feelings.",
                format!("Previous conversation:\n{}\n\nToday's entry:\n{}", context, entry),
            ))
            .await?;

        let mood_label = self.classify_mood(entry).await;

        let stored = self
            .store
            .create_entry(user_id, entry, &reply, &mood_label)
            .await?;

        tracing::info!(user_id = %user_id, entry_id = %stored.id, mood = %mood_label, "Diary entry stored");
        Ok(stored)
    }

    async fn classify_mood(&self, entry: &str) -> String {
        let prompt = Prompt::new(
            "Classify the emotion of the diary entry. Answer with a single lowercase word such \
             as happy, sad, anxious, angry, calm or neutral.",
            entry,
        )
        .max_tokens(10);

        match self.generator.generate(&prompt).await {
            Ok(reply) => mood_from_reply(&reply),
            Err(e) => {
                tracing::warn!(error = %e, "Mood classification failed, defaulting to neutral");
                FALLBACK_MOOD.to_string()
            }
        }
    }

    /// Newest first.
    pub async fn entries(&self, user_id: Uuid) -> AppResult<Vec<DiaryEntry>> {
        let mut entries = self.store.list_entries(user_id).await?;
        entries.reverse();
        Ok(entries)
    }

    pub async fn entries_by_date(&self, user_id: Uuid) -> AppResult<Vec<DiaryDay>> {
        Ok(group_by_date(self.entries(user_id).await?))
    }

    async fn mood_records(&self, user_id: Uuid) -> AppResult<Vec<MoodRecord>> {
        Ok(self
            .store
            .list_entries(user_id)
            .await?
            .iter()
            .map(DiaryEntry::mood_record)
            .collect())
    }

    pub async fn analytics(&self, user_id: Uuid) -> AppResult<MoodAnalytics> {
        let records = self.mood_records(user_id).await?;
        Ok(MoodAnalytics {
            timeline: mood::timeline(&records),
            distribution: mood::distribution(&records),
            heatmap: mood::weekly_heatmap(&records),
        })
    }

    pub async fn trend(&self, user_id: Uuid, window_days: i64) -> AppResult<MoodTrend> {
        let records = self.mood_records(user_id).await?;
        Ok(mood::recent_trend(&records, window_days, Utc::now()))
    }

    pub async fn summary(&self, user_id: Uuid) -> AppResult<MoodSummary> {
        let records = self.mood_records(user_id).await?;
        Ok(mood::summary(&records, Utc::now()))
    }
}

fn build_context(previous: &[DiaryEntry]) -> String {
    if previous.is_empty() {
        return "No previous context".to_string();
    }
    previous
        .iter()
        .map(|e| format!("User entry: {}\nAssistant response: {}", e.entry_text, e.response_text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// First word of the reply, lowercased, without punctuation.
fn mood_from_reply(reply: &str) -> String {
    let word: String = reply
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    if word.is_empty() {
        FALLBACK_MOOD.to_string()
    } else {
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mood::{DominantMood, Trend};
    use crate::services::llm::testing::ScriptedGenerator;
    use crate::store::memory::MemoryStore;
    use chrono::Duration;

    #[test]
    fn test_mood_from_reply() {
        assert_eq!(mood_from_reply("Happy! The writer sounds upbeat."), "happy");
        assert_eq!(mood_from_reply("  ANXIOUS."), "anxious");
        assert_eq!(mood_from_reply(""), "neutral");
        assert_eq!(mood_from_reply("..."), "neutral");
    }

    #[test]
    fn test_context_without_history() {
        assert_eq!(build_context(&[]), "No previous context");
    }

    #[tokio::test]
    async fn test_write_entry_uses_recent_context() {
        let store = Arc::new(MemoryStore::default());
        let user = Uuid::new_v4();
        let now = Utc::now();
        for (i, text) in ["first", "second", "third", "fourth"].iter().enumerate() {
            store.push_diary(user, now - Duration::hours(10 - i as i64), text, "calm");
        }

        let generator = Arc::new(ScriptedGenerator::new([
            Some("That sounds like a good day."),
            Some("Happy."),
        ]));
        let service = DiaryService::new(store.clone(), generator.clone());

        let entry = service.write_entry(user, "Went for a long walk").await.unwrap();
        assert_eq!(entry.mood_label, "happy");
        assert_eq!(entry.response_text, "That sounds like a good day.");

        let prompts = generator.seen();
        assert!(!prompts[0].user.contains("first"));
        assert!(prompts[0].user.contains(
            "User entry: second\nAssistant response: reply to second\n\n\
             User entry: third\nAssistant response: reply to third\n\n\
             User entry: fourth\nAssistant response: reply to fourth"
        ));
        assert_eq!(store.list_entries(user).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_mood_defaults_to_neutral_when_classifier_fails() {
        let store = Arc::new(MemoryStore::default());
        let generator = Arc::new(ScriptedGenerator::new([Some("I hear you."), None]));
        let service = DiaryService::new(store, generator);

        let entry = service.write_entry(Uuid::new_v4(), "Long day").await.unwrap();
        assert_eq!(entry.mood_label, "neutral");
    }

    #[tokio::test]
    async fn test_failed_reply_is_upstream_error() {
        let store = Arc::new(MemoryStore::default());
        let service = DiaryService::new(store.clone(), Arc::new(ScriptedGenerator::failing()));
        let user = Uuid::new_v4();

        let err = service.write_entry(user, "Hello").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        assert!(store.list_entries(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_entry_rejected() {
        let service = DiaryService::new(
            Arc::new(MemoryStore::default()),
            Arc::new(ScriptedGenerator::failing()),
        );
        assert!(matches!(
            service.write_entry(Uuid::new_v4(), "   ").await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_entries_newest_first() {
        let store = Arc::new(MemoryStore::default());
        let user = Uuid::new_v4();
        let now = Utc::now();
        store.push_diary(user, now - Duration::days(2), "older", "sad");
        store.push_diary(user, now, "newer", "happy");

        let service = DiaryService::new(store, Arc::new(ScriptedGenerator::failing()));
        let entries = service.entries(user).await.unwrap();
        assert_eq!(entries[0].entry_text, "newer");

        let days = service.entries_by_date(user).await.unwrap();
        assert_eq!(days.len(), 2);
        assert!(days[0].date > days[1].date);
    }

    #[tokio::test]
    async fn test_trend_and_analytics() {
        let store = Arc::new(MemoryStore::default());
        let user = Uuid::new_v4();
        let now = Utc::now();
        store.push_diary(user, now - Duration::days(3), "rough", "sad");
        store.push_diary(user, now - Duration::days(2), "meh", "sad");
        store.push_diary(user, now - Duration::days(1), "better", "happy");
        store.push_diary(user, now - Duration::hours(1), "great", "excited");

        let service = DiaryService::new(store, Arc::new(ScriptedGenerator::failing()));

        let trend = service.trend(user, 7).await.unwrap();
        assert_eq!(trend.trend, Trend::Improving);

        let analytics = service.analytics(user).await.unwrap();
        assert_eq!(analytics.distribution.get(&MoodGroup::Sad), Some(&2));

        let summary = service.summary(user).await.unwrap();
        assert_eq!(summary.recent_entries, 4);
        assert_ne!(summary.trend.dominant_mood, DominantMood::VeryNegative);
    }
}
