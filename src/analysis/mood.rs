use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use serde::Serialize;

use super::mood_scale::{self, MoodGroup};

/// Default look-back for the recent trend, in days.
pub const DEFAULT_TREND_WINDOW_DAYS: i64 = 7;
/// Look-back for the dashboard mini timeline, in days.
pub const SUMMARY_TIMELINE_DAYS: i64 = 14;

const TREND_THRESHOLD: f64 = 0.5;
const MIN_RECORDS_FOR_TREND: usize = 3;

/// A diary entry projected onto the mood scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodRecord {
    pub timestamp: DateTime<Utc>,
    pub mood_label: String,
    pub mood_value: i32,
}

impl MoodRecord {
    pub fn new(timestamp: DateTime<Utc>, mood_label: &str) -> Self {
        let mood_label = mood_label.trim().to_lowercase();
        Self {
            timestamp,
            mood_value: mood_scale::score(&mood_label),
            mood_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub mood_value: i32,
    pub mood_label: String,
}

/// Plot series, or an explicit marker when there is nothing to plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum Timeline {
    InsufficientData,
    Series(Vec<TimelinePoint>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DominantMood {
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    VeryNegative,
}

impl DominantMood {
    fn from_mean(mean: f64) -> Self {
        if mean >= 4.5 {
            DominantMood::VeryPositive
        } else if mean >= 3.5 {
            DominantMood::Positive
        } else if mean >= 2.5 {
            DominantMood::Neutral
        } else if mean >= 1.5 {
            DominantMood::Negative
        } else {
            DominantMood::VeryNegative
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Steady,
    Declining,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodTrend {
    pub dominant_mood: DominantMood,
    pub trend: Trend,
}

impl Default for MoodTrend {
    fn default() -> Self {
        Self {
            dominant_mood: DominantMood::Neutral,
            trend: Trend::Steady,
        }
    }
}

/// Time-of-day buckets used by the weekly heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeBucket {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl TimeBucket {
    pub const ALL: [TimeBucket; 4] = [
        TimeBucket::Morning,
        TimeBucket::Afternoon,
        TimeBucket::Evening,
        TimeBucket::Night,
    ];

    /// Night wraps past midnight: 21-23 and 0-4.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeBucket::Morning,
            12..=16 => TimeBucket::Afternoon,
            17..=20 => TimeBucket::Evening,
            _ => TimeBucket::Night,
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeBucket::Morning => "Morning (5-11am)",
            TimeBucket::Afternoon => "Afternoon (12-4pm)",
            TimeBucket::Evening => "Evening (5-8pm)",
            TimeBucket::Night => "Night (9pm-4am)",
        }
    }
}

const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Mean mood per weekday (Mon-Sun) and time bucket. `None` marks a cell
/// with no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyHeatmap {
    pub days: [&'static str; 7],
    pub buckets: [&'static str; 4],
    pub cells: [[Option<f64>; 4]; 7],
}

impl WeeklyHeatmap {
    #[cfg(test)]
    pub fn cell(&self, weekday: chrono::Weekday, bucket: TimeBucket) -> Option<f64> {
        self.cells[weekday.num_days_from_monday() as usize][bucket.index()]
    }
}

/// Dashboard view of recent mood.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodSummary {
    #[serde(flatten)]
    pub trend: MoodTrend,
    pub recent_entries: usize,
    pub recent_timeline: Timeline,
}

fn mean(records: &[&MoodRecord]) -> f64 {
    let total: i32 = records.iter().map(|r| r.mood_value).sum();
    f64::from(total) / records.len() as f64
}

fn chronological(records: &[MoodRecord]) -> Vec<&MoodRecord> {
    let mut sorted: Vec<&MoodRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);
    sorted
}

/// Chronological plot series.
pub fn timeline(records: &[MoodRecord]) -> Timeline {
    if records.is_empty() {
        return Timeline::InsufficientData;
    }

    Timeline::Series(
        chronological(records)
            .into_iter()
            .map(|r| TimelinePoint {
                timestamp: r.timestamp,
                mood_value: r.mood_value,
                mood_label: r.mood_label.clone(),
            })
            .collect(),
    )
}

/// Count records per semantic group. Labels outside every group are
/// dropped, and groups with no records are omitted.
pub fn distribution(records: &[MoodRecord]) -> BTreeMap<MoodGroup, usize> {
    let mut counts = BTreeMap::new();
    for group in records.iter().filter_map(|r| MoodGroup::of(&r.mood_label)) {
        *counts.entry(group).or_insert(0) += 1;
    }
    counts
}

pub fn weekly_heatmap(records: &[MoodRecord]) -> WeeklyHeatmap {
    let mut sums = [[(0i32, 0u32); 4]; 7];
    for record in records {
        let day = record.timestamp.weekday().num_days_from_monday() as usize;
        let bucket = TimeBucket::from_hour(record.timestamp.hour()).index();
        let cell = &mut sums[day][bucket];
        cell.0 += record.mood_value;
        cell.1 += 1;
    }

    let mut cells = [[None; 4]; 7];
    for (day, row) in sums.iter().enumerate() {
        for (bucket, &(total, count)) in row.iter().enumerate() {
            if count > 0 {
                cells[day][bucket] = Some(f64::from(total) / f64::from(count));
            }
        }
    }

    WeeklyHeatmap {
        days: WEEKDAYS,
        buckets: TimeBucket::ALL.map(TimeBucket::label),
        cells,
    }
}

/// Dominant mood and direction over the last `window_days` before `now`.
///
/// With three or more records the window is split chronologically at
/// `len / 2` and the second half's mean is compared against the first's.
pub fn recent_trend(records: &[MoodRecord], window_days: i64, now: DateTime<Utc>) -> MoodTrend {
    // A window reaching past the representable range covers everything.
    let start = Duration::try_days(window_days).and_then(|w| now.checked_sub_signed(w));
    let recent: Vec<&MoodRecord> = chronological(records)
        .into_iter()
        .filter(|r| start.map_or(true, |s| r.timestamp >= s))
        .collect();

    if recent.is_empty() {
        return MoodTrend::default();
    }

    let dominant_mood = DominantMood::from_mean(mean(&recent));

    let trend = if recent.len() >= MIN_RECORDS_FOR_TREND {
        let (first, second) = recent.split_at(recent.len() / 2);
        let (avg_first, avg_second) = (mean(first), mean(second));
        if avg_second > avg_first + TREND_THRESHOLD {
            Trend::Improving
        } else if avg_second < avg_first - TREND_THRESHOLD {
            Trend::Declining
        } else {
            Trend::Steady
        }
    } else {
        Trend::Steady
    };

    MoodTrend {
        dominant_mood,
        trend,
    }
}

/// Trend over the default window plus the recent entry count and a short
/// timeline for the dashboard.
pub fn summary(records: &[MoodRecord], now: DateTime<Utc>) -> MoodSummary {
    let trend = recent_trend(records, DEFAULT_TREND_WINDOW_DAYS, now);

    let week_start = now - Duration::days(DEFAULT_TREND_WINDOW_DAYS);
    let recent_entries = records.iter().filter(|r| r.timestamp >= week_start).count();

    let timeline_start = now - Duration::days(SUMMARY_TIMELINE_DAYS);
    let windowed: Vec<MoodRecord> = records
        .iter()
        .filter(|r| r.timestamp >= timeline_start)
        .cloned()
        .collect();

    MoodSummary {
        trend,
        recent_entries,
        recent_timeline: timeline(&windowed),
    }
}
