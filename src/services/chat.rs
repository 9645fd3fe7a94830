use std::sync::Arc;

use uuid::Uuid;

use super::llm::{Prompt, TextGenerator};
use crate::error::{AppError, AppResult};
use crate::models::chat::ChatMessage;
use crate::models::medical::describe_conditions;
use crate::store::{ChatStore, ConditionStore};

/// Health Q&A grounded in the user's recorded conditions.
#[derive(Clone)]
pub struct ChatService {
    chats: Arc<dyn ChatStore>,
    conditions: Arc<dyn ConditionStore>,
    generator: Arc<dyn TextGenerator>,
}

impl ChatService {
    pub fn new(
        chats: Arc<dyn ChatStore>,
        conditions: Arc<dyn ConditionStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            chats,
            conditions,
            generator,
        }
    }

    pub async fn ask(&self, user_id: Uuid, question: &str) -> AppResult<ChatMessage> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Question cannot be empty".into()));
        }

        let conditions = self.conditions.conditions(user_id).await?;
        let prompt = Prompt::new(
            "You are a helpful health assistant. Give clear, practical answers, take the \
             user's medical conditions into account, and recommend consulting a doctor for \
             anything that needs a diagnosis.",
            format!(
                "Medical conditions: {}\n\nQuestion: {}",
                describe_conditions(&conditions),
                question
            ),
        );

        let answer = self.generator.generate(&prompt).await?;
        let message = self.chats.save_chat(user_id, question, &answer).await?;

        tracing::info!(user_id = %user_id, chat_id = %message.id, "Chat answered");
        Ok(message)
    }

    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<ChatMessage>> {
        Ok(self.chats.chat_history(user_id).await?)
    }
}
