use serde::Serialize;

/// Score given to any label missing from the table.
pub const NEUTRAL_SCORE: i32 = 3;

const MOOD_SCORES: &[(&str, i32)] = &[
    ("happy", 5),
    ("excited", 5),
    ("joyful", 5),
    ("content", 4),
    ("peaceful", 4),
    ("grateful", 4),
    ("calm", 3),
    ("neutral", 3),
    ("reflective", 3),
    ("confused", 2),
    ("worried", 2),
    ("anxious", 2),
    ("tired", 2),
    ("sad", 1),
    ("angry", 1),
    ("frustrated", 1),
    ("lonely", 1),
    ("overwhelmed", 1),
    ("stressed", 1),
    ("disappointed", 1),
];

/// Map a free-text mood label onto the 1-5 sentiment scale.
///
/// Lookup is case-insensitive. Unknown labels are neutral, not an error.
pub fn score(mood_label: &str) -> i32 {
    let label = mood_label.trim().to_lowercase();
    MOOD_SCORES
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, value)| *value)
        .unwrap_or(NEUTRAL_SCORE)
}

/// Badge shown next to an entry whose label is not in the table.
pub const DEFAULT_EMOJI: &str = "📝";

const MOOD_EMOJI: &[(&str, &str)] = &[
    ("happy", "😊"),
    ("sad", "😢"),
    ("angry", "😠"),
    ("anxious", "😰"),
    ("calm", "😌"),
    ("excited", "😃"),
    ("neutral", "😐"),
    ("confused", "😕"),
    ("stressed", "😫"),
    ("grateful", "🙏"),
    ("hopeful", "🌟"),
    ("tired", "😴"),
    ("worried", "😟"),
    ("content", "😌"),
    ("frustrated", "😤"),
    ("overwhelmed", "😩"),
    ("peaceful", "☮️"),
    ("proud", "🥲"),
    ("disappointed", "😞"),
    ("lonely", "🥺"),
];

/// Emoji badge for a mood label, case-insensitive.
pub fn emoji(mood_label: &str) -> &'static str {
    let label = mood_label.trim().to_lowercase();
    MOOD_EMOJI
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, badge)| *badge)
        .unwrap_or(DEFAULT_EMOJI)
}

/// Semantic groups used for the mood distribution chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MoodGroup {
    Positive,
    Neutral,
    Anxious,
    Sad,
    Angry,
    Other,
}

impl MoodGroup {
    pub const ALL: [MoodGroup; 6] = [
        MoodGroup::Positive,
        MoodGroup::Neutral,
        MoodGroup::Anxious,
        MoodGroup::Sad,
        MoodGroup::Angry,
        MoodGroup::Other,
    ];

    fn members(self) -> &'static [&'static str] {
        match self {
            MoodGroup::Positive => &[
                "happy", "excited", "joyful", "content", "grateful", "peaceful", "proud",
            ],
            MoodGroup::Neutral => &["neutral", "calm", "reflective"],
            MoodGroup::Anxious => &["anxious", "worried", "stressed", "overwhelmed"],
            MoodGroup::Sad => &["sad", "lonely", "disappointed"],
            MoodGroup::Angry => &["angry", "frustrated"],
            MoodGroup::Other => &["confused", "tired"],
        }
    }

    /// Group for a label, or `None` when the label belongs to no group.
    pub fn of(mood_label: &str) -> Option<MoodGroup> {
        let label = mood_label.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|group| group.members().contains(&label.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_case_insensitive() {
        assert_eq!(score("Happy"), score("happy"));
        assert_eq!(score("HAPPY"), score("happy"));
        assert_eq!(score("happy"), 5);
    }

    #[test]
    fn test_unknown_label_is_neutral() {
        assert_eq!(score("zzUnknownLabelzz"), 3);
        assert_eq!(score(""), 3);
    }

    #[test]
    fn test_score_range() {
        for (label, _) in MOOD_SCORES {
            assert!((1..=5).contains(&score(label)), "{} out of range", label);
        }
    }

    #[test]
    fn test_clusters() {
        assert_eq!(score("grateful"), 4);
        assert_eq!(score("reflective"), 3);
        assert_eq!(score("anxious"), 2);
        assert_eq!(score("overwhelmed"), 1);
    }

    #[test]
    fn test_emoji_lookup() {
        assert_eq!(emoji("Happy"), "😊");
        assert_eq!(emoji("hopeful"), "🌟");
        assert_eq!(emoji("zzUnknownLabelzz"), DEFAULT_EMOJI);
    }

    #[test]
    fn test_group_lookup() {
        assert_eq!(MoodGroup::of("Proud"), Some(MoodGroup::Positive));
        assert_eq!(MoodGroup::of("tired"), Some(MoodGroup::Other));
        assert_eq!(MoodGroup::of("unknown_exotic_label"), None);
    }
}
