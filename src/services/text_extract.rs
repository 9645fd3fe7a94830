use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TextExtractionError {
    #[error("unsupported file format: {0}")]
    Unsupported(String),

    #[error("no OCR service configured for {0} files")]
    NoOcrService(&'static str),

    #[error("OCR request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OCR service returned {0}")]
    Status(u16),
}

/// Upload formats accepted by the document flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Word,
    Image,
    PlainText,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Result<Self, TextExtractionError> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" | "doc" => Ok(DocumentKind::Word),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "tif" => Ok(DocumentKind::Image),
            "txt" | "md" => Ok(DocumentKind::PlainText),
            _ => Err(TextExtractionError::Unsupported(if extension.is_empty() {
                file_name.to_string()
            } else {
                format!(".{}", extension)
            })),
        }
    }

    fn name(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Word => "word",
            DocumentKind::Image => "image",
            DocumentKind::PlainText => "text",
        }
    }
}

/// Turns an uploaded file into plain text.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(
        &self,
        file_name: &str,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<String, TextExtractionError>;
}

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
}

/// Decodes text files locally and hands everything else to an OCR service
/// that answers `{"text": "..."}`.
pub struct OcrTextExtractor {
    http: reqwest::Client,
    ocr_url: Option<String>,
}

impl OcrTextExtractor {
    pub fn new(ocr_url: Option<String>, timeout_secs: u64) -> Result<Self, TextExtractionError> {
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?,
            ocr_url,
        })
    }
}

#[async_trait]
impl TextExtractor for OcrTextExtractor {
    async fn extract_text(
        &self,
        file_name: &str,
        kind: DocumentKind,
        bytes: &[u8],
    ) -> Result<String, TextExtractionError> {
        if kind == DocumentKind::PlainText {
            return Ok(clean_text(&String::from_utf8_lossy(bytes)));
        }

        let url = self
            .ocr_url
            .as_deref()
            .ok_or(TextExtractionError::NoOcrService(kind.name()))?;

        tracing::info!(file_name = %file_name, kind = kind.name(), size = bytes.len(), "Sending document to OCR service");

        let response = self
            .http
            .post(url)
            .header("content-type", "application/octet-stream")
            .header("x-file-name", file_name)
            .body(bytes.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TextExtractionError::Status(response.status().as_u16()));
        }

        let body: OcrResponse = response.json().await?;
        let text = clean_text(&body.text);
        tracing::info!(file_name = %file_name, chars = text.chars().count(), "Extracted document text");
        Ok(text)
    }
}

static UNWANTED_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[^\w\s.,;:!?'"-]"#).expect("valid regex"));
static HYPHEN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w)-\s+(\w)").expect("valid regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("valid regex"));

fn is_noise_token(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => !matches!(c, 'a' | 'A' | 'I') && !c.is_ascii_digit(),
        _ => false,
    }
}

fn capitalize_first(paragraph: &str) -> String {
    let mut chars = paragraph.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize OCR or file text: strip stray symbols, rejoin words split by
/// a hyphen and line break, drop lone single characters (except "a", "I"
/// and digits), collapse whitespace, and keep blank-line paragraph breaks.
pub fn clean_text(raw: &str) -> String {
    let text = UNWANTED_SYMBOLS.replace_all(raw, " ");
    let text = HYPHEN_BREAK.replace_all(&text, "$1$2");

    PARAGRAPH_BREAK
        .split(&text)
        .map(|paragraph| {
            paragraph
                .split_whitespace()
                .filter(|token| !is_noise_token(token))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|paragraph| !paragraph.is_empty())
        .map(|paragraph| capitalize_first(&paragraph))
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("scan.PDF").unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_file_name("rx.jpeg").unwrap(), DocumentKind::Image);
        assert_eq!(DocumentKind::from_file_name("notes.txt").unwrap(), DocumentKind::PlainText);
        assert_eq!(DocumentKind::from_file_name("report.docx").unwrap(), DocumentKind::Word);
        assert!(matches!(
            DocumentKind::from_file_name("archive.zip"),
            Err(TextExtractionError::Unsupported(ext)) if ext == ".zip"
        ));
        assert!(DocumentKind::from_file_name("README").is_err());
    }

    #[test]
    fn test_clean_text() {
        let raw = "patient  given Amoxi-\n cillin ~ 500 mg * x\n\n\n  take 2 tablets | daily";
        assert_eq!(
            clean_text(raw),
            "Patient given Amoxicillin 500 mg\n\nTake 2 tablets daily"
        );
    }

    #[test]
    fn test_clean_text_keeps_pronoun_and_article() {
        assert_eq!(clean_text("I felt a b c pain"), "I felt a pain");
    }

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(" \n\n ~~ "), "");
    }

    #[tokio::test]
    async fn test_plain_text_decoded_locally() {
        let extractor = OcrTextExtractor::new(None, 5).unwrap();
        let text = extractor
            .extract_text("notes.txt", DocumentKind::PlainText, b"aspirin 81 mg")
            .await
            .unwrap();
        assert_eq!(text, "Aspirin 81 mg");
    }

    #[tokio::test]
    async fn test_scan_without_ocr_service() {
        let extractor = OcrTextExtractor::new(None, 5).unwrap();
        let result = extractor
            .extract_text("scan.png", DocumentKind::Image, &[0x89, 0x50])
            .await;
        assert!(matches!(result, Err(TextExtractionError::NoOcrService("image"))));
    }
}
