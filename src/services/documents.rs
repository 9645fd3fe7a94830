use std::sync::Arc;

use uuid::Uuid;

use super::llm::{Prompt, TextGenerator};
use super::medicines::{truncate_chars, MedicineFinder, LLM_TEXT_LIMIT};
use super::text_extract::{DocumentKind, TextExtractor};
use crate::analysis::extract_medicines;
use crate::error::{AppError, AppResult};
use crate::models::document::{ExtractedDocument, NewDocument};
use crate::store::DocumentStore;

/// Stored extracted text is capped at this many characters.
pub const STORED_TEXT_LIMIT: usize = 100_000;

pub const SUMMARY_FALLBACK: &str = "Failed to generate summary. Please try again.";

/// Upload pipeline: text extraction, medicine detection, summary, storage.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<dyn DocumentStore>,
    extractor: Arc<dyn TextExtractor>,
    medicines: Arc<dyn MedicineFinder>,
    generator: Arc<dyn TextGenerator>,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        extractor: Arc<dyn TextExtractor>,
        medicines: Arc<dyn MedicineFinder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            store,
            extractor,
            medicines,
            generator,
        }
    }

    pub async fn process(
        &self,
        user_id: Uuid,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<ExtractedDocument> {
        let kind = DocumentKind::from_file_name(file_name)?;
        let extracted_text = self.extractor.extract_text(file_name, kind, bytes).await?;

        let medicines = match self.medicines.find(&extracted_text).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, "Medicine finder failed, using patterns");
                extract_medicines(&extracted_text)
            }
        };

        let summary = self.summarize(&extracted_text).await;

        let document = self
            .store
            .create_document(NewDocument {
                user_id,
                file_name: file_name.to_string(),
                extracted_text: truncate_chars(&extracted_text, STORED_TEXT_LIMIT).to_string(),
                summary,
                medicines: medicines.into_iter().collect(),
            })
            .await?;

        tracing::info!(
            user_id = %user_id,
            document_id = %document.id,
            medicines = document.medicines.len(),
            "Document processed"
        );
        Ok(document)
    }

    async fn summarize(&self, text: &str) -> String {
        let truncated = truncate_chars(text, LLM_TEXT_LIMIT);
        let body = if truncated.len() < text.len() {
            format!("{}...", truncated)
        } else {
            truncated.to_string()
        };

        let prompt = Prompt::new(
            "You are a medical document summarizer. Create a concise but informative summary \
             of the provided medical document.",
            format!(
                "Summarize the following document in a clear and structured way:\n\n{}",
                body
            ),
        );

        match self.generator.generate(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, "Summary generation failed");
                SUMMARY_FALLBACK.to_string()
            }
        }
    }

    pub async fn list(&self, user_id: Uuid) -> AppResult<Vec<ExtractedDocument>> {
        Ok(self.store.list_documents(user_id).await?)
    }

    pub async fn get(&self, user_id: Uuid, id: Uuid) -> AppResult<ExtractedDocument> {
        self.store
            .get_document(user_id, id)
            .await?
            .ok_or(AppError::NotFound("Document not found".into()))
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> AppResult<()> {
        if !self.store.delete_document(user_id, id).await? {
            return Err(AppError::NotFound("Document not found".into()));
        }
        Ok(())
    }
}
