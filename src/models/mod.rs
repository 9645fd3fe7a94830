pub mod chat;
pub mod diary;
pub mod document;
pub mod medical;
pub mod user;
