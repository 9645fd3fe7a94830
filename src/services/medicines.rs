use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::llm::{LlmError, Prompt, TextGenerator};
use crate::analysis::extract_medicines;

/// Characters of document text sent to the model.
pub const LLM_TEXT_LIMIT: usize = 15_000;

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("response is not structured medicine data: {0}")]
    Unparseable(String),
}

/// Finds medicine names in free text.
#[async_trait]
pub trait MedicineFinder: Send + Sync {
    async fn find(&self, text: &str) -> Result<BTreeSet<String>, ExtractionError>;
}

/// Local pattern-based finder. Never fails.
pub struct RegexMedicineFinder;

#[async_trait]
impl MedicineFinder for RegexMedicineFinder {
    async fn find(&self, text: &str) -> Result<BTreeSet<String>, ExtractionError> {
        Ok(extract_medicines(text))
    }
}

/// Asks the model for a JSON list of medicine names.
pub struct LlmMedicineFinder {
    generator: Arc<dyn TextGenerator>,
}

impl LlmMedicineFinder {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl MedicineFinder for LlmMedicineFinder {
    async fn find(&self, text: &str) -> Result<BTreeSet<String>, ExtractionError> {
        let prompt = Prompt::new(
            "You are a medical expert assistant. Your task is to extract medicine names from \
             the provided text. Return only a JSON object of the form {\"medicines\": [..]} \
             without any additional text or explanation.",
            format!(
                "Extract all medicine names from the following text (return JSON only):\n\n{}",
                truncate_chars(text, LLM_TEXT_LIMIT)
            ),
        )
        .json();

        let reply = self.generator.generate(&prompt).await?;
        parse_medicine_list(&reply)
    }
}

/// Accepts a bare JSON array, an object with a `medicines` array, or an
/// object whose first array-valued field holds the names.
pub fn parse_medicine_list(reply: &str) -> Result<BTreeSet<String>, ExtractionError> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| ExtractionError::Unparseable(e.to_string()))?;

    let items = match &value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("medicines") {
            Some(Value::Array(items)) => items,
            _ => map
                .values()
                .find_map(|v| v.as_array())
                .ok_or_else(|| ExtractionError::Unparseable("no array in object".into()))?,
        },
        _ => return Err(ExtractionError::Unparseable("expected array or object".into())),
    };

    Ok(items
        .iter()
        .filter_map(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

/// Model first, patterns when the model fails or answers with something
/// that is not a list of names.
pub struct FallbackMedicineFinder {
    primary: Box<dyn MedicineFinder>,
    fallback: Box<dyn MedicineFinder>,
}

impl FallbackMedicineFinder {
    pub fn new(primary: Box<dyn MedicineFinder>, fallback: Box<dyn MedicineFinder>) -> Self {
        Self { primary, fallback }
    }

    pub fn llm_then_regex(generator: Arc<dyn TextGenerator>) -> Self {
        Self::new(
            Box::new(LlmMedicineFinder::new(generator)),
            Box::new(RegexMedicineFinder),
        )
    }
}

#[async_trait]
impl MedicineFinder for FallbackMedicineFinder {
    async fn find(&self, text: &str) -> Result<BTreeSet<String>, ExtractionError> {
        match self.primary.find(text).await {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::warn!(error = %e, "Structured medicine extraction failed, using pattern fallback");
                self.fallback.find(text).await
            }
        }
    }
}

/// First `limit` characters of `text`, on a char boundary.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm::testing::ScriptedGenerator;

    #[test]
    fn test_parse_shapes() {
        let bare = parse_medicine_list(r#"["Aspirin", "Metformin", "Aspirin"]"#).unwrap();
        assert_eq!(bare.len(), 2);

        let keyed = parse_medicine_list(r#"{"medicines": ["Lisinopril"]}"#).unwrap();
        assert!(keyed.contains("Lisinopril"));

        let other = parse_medicine_list(r#"{"drugs": [" Warfarin ", ""]}"#).unwrap();
        assert_eq!(other.into_iter().collect::<Vec<_>>(), vec!["Warfarin".to_string()]);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_medicine_list("The patient takes aspirin.").is_err());
        assert!(parse_medicine_list(r#"{"note": "none"}"#).is_err());
        assert!(parse_medicine_list("42").is_err());
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[tokio::test]
    async fn test_fallback_uses_llm_when_valid() {
        let generator = Arc::new(ScriptedGenerator::new([Some(r#"{"medicines": ["Insulin"]}"#)]));
        let finder = FallbackMedicineFinder::llm_then_regex(generator.clone());

        let found = finder.find("Take Aspirin daily").await.unwrap();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec!["Insulin".to_string()]);
        assert!(generator.seen()[0].json_output);
    }

    #[tokio::test]
    async fn test_fallback_on_unparseable_reply() {
        let generator = Arc::new(ScriptedGenerator::new([Some("Sure! The medicines are aspirin.")]));
        let finder = FallbackMedicineFinder::llm_then_regex(generator);

        let found = finder.find("Take Aspirin daily").await.unwrap();
        assert!(found.contains("Aspirin"));
    }

    #[tokio::test]
    async fn test_fallback_on_failed_call() {
        let finder = FallbackMedicineFinder::llm_then_regex(Arc::new(ScriptedGenerator::failing()));

        let found = finder.find("Lisinopril 10mg").await.unwrap();
        assert!(found.contains("Lisinopril"));
        assert!(found.contains("Lisinopril 10mg"));
    }
}
