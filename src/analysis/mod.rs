//! Deterministic text and mood analysis. Nothing in here performs I/O.

pub mod medicine;
pub mod mood;
pub mod mood_scale;
pub mod patterns;

pub use medicine::extract_medicines;
pub use mood::{MoodRecord, MoodSummary, MoodTrend, Timeline, WeeklyHeatmap};
