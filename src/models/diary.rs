use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::{mood_scale, MoodRecord};

/// One diary submission with the assistant's reply. Never updated.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_text: String,
    pub response_text: String,
    pub mood_label: String,
    pub created_at: DateTime<Utc>,
}

impl DiaryEntry {
    pub fn mood_record(&self) -> MoodRecord {
        MoodRecord::new(self.created_at, &self.mood_label)
    }
}

// Serialized with the mood badge the diary page shows next to each entry.
impl Serialize for DiaryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DiaryEntry", 7)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("user_id", &self.user_id)?;
        s.serialize_field("entry_text", &self.entry_text)?;
        s.serialize_field("response_text", &self.response_text)?;
        s.serialize_field("mood_label", &self.mood_label)?;
        s.serialize_field("mood_emoji", mood_scale::emoji(&self.mood_label))?;
        s.serialize_field("created_at", &self.created_at)?;
        s.end()
    }
}

#[derive(Debug, Serialize)]
pub struct DiaryDay {
    pub date: NaiveDate,
    pub entries: Vec<DiaryEntry>,
}

/// Group entries by calendar date, newest date first. Entries keep their
/// input order within a day.
pub fn group_by_date(entries: Vec<DiaryEntry>) -> Vec<DiaryDay> {
    let mut days: BTreeMap<NaiveDate, Vec<DiaryEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(entry.created_at.date_naive()).or_default().push(entry);
    }
    days.into_iter()
        .rev()
        .map(|(date, entries)| DiaryDay { date, entries })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(day: u32, hour: u32, mood: &str) -> DiaryEntry {
        DiaryEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            entry_text: "text".into(),
            response_text: "reply".into(),
            mood_label: mood.into(),
            created_at: Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_group_by_date_newest_first() {
        let days = group_by_date(vec![entry(1, 9, "calm"), entry(3, 8, "sad"), entry(1, 20, "happy")]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2026, 4, 3).unwrap());
        assert_eq!(days[1].entries.len(), 2);
        assert_eq!(days[1].entries[1].mood_label, "happy");
    }

    #[test]
    fn test_entry_json_carries_mood_emoji() {
        let json = serde_json::to_value(entry(2, 10, "sad")).unwrap();
        assert_eq!(json["mood_emoji"], "😢");
        assert_eq!(json["mood_label"], "sad");
        assert_eq!(json["response_text"], "reply");

        let json = serde_json::to_value(entry(2, 10, "meh")).unwrap();
        assert_eq!(json["mood_emoji"], "📝");
    }

    #[test]
    fn test_mood_record_projection() {
        let record = entry(2, 10, "Anxious").mood_record();
        assert_eq!(record.mood_value, 2);
        assert_eq!(record.mood_label, "anxious");
    }
}
