pub mod chat;
pub mod diary;
pub mod documents;
pub mod llm;
pub mod medicines;
pub mod text_extract;
