pub mod auth;
pub mod chat;
pub mod diary;
pub mod documents;
pub mod health;
pub mod mood;
pub mod profile;
