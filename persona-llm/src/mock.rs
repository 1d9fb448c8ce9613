//! Deterministic generators for tests and offline runs.

use crate::{Generation, TextGenerator, Turn, TurnRole};
use async_trait::async_trait;
use persona_core::{LlmError, PersonaResult, Question};
use std::collections::VecDeque;
use std::sync::Mutex;

fn word_count(text: &str) -> i64 {
    text.split_whitespace().count() as i64
}

/// Echoes the last user turn and answers every questionnaire item with a
/// fixed score.
#[derive(Debug, Clone)]
pub struct EchoGenerator {
    model_id: String,
    score: i64,
}

impl EchoGenerator {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            score: 3,
        }
    }

    /// Score used for every self-assessment item.
    pub fn with_score(mut self, score: i64) -> Self {
        self.score = score;
        self
    }
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, specification: &str, history: &[Turn]) -> PersonaResult<Generation> {
        let last = history
            .iter()
            .rev()
            .find(|t| t.role == TurnRole::User)
            .map(|t| t.content.as_str())
            .unwrap_or("");
        let text = format!("[{}] {}", self.model_id, last);
        Ok(Generation {
            token_count: word_count(specification) + word_count(last) + word_count(&text),
            text,
        })
    }

    async fn self_assess(&self, _specification: &str, questions: &[Question]) -> PersonaResult<String> {
        let answers: serde_json::Map<String, serde_json::Value> = questions
            .iter()
            .map(|q| (q.id.clone(), serde_json::Value::from(self.score)))
            .collect();
        Ok(serde_json::Value::Object(answers).to_string())
    }
}

/// Replays queued replies in order. Generation fails once the queue is
/// drained; the self-assessment reply is returned on every call.
#[derive(Debug)]
pub struct ScriptedGenerator {
    model_id: String,
    replies: Mutex<VecDeque<String>>,
    self_assessment: String,
}

impl ScriptedGenerator {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            replies: Mutex::new(VecDeque::new()),
            self_assessment: String::new(),
        }
    }

    pub fn with_reply(self, reply: impl Into<String>) -> Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply.into());
        }
        self
    }

    pub fn with_self_assessment(mut self, reply: impl Into<String>) -> Self {
        self.self_assessment = reply.into();
        self
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate(&self, _specification: &str, _history: &[Turn]) -> PersonaResult<Generation> {
        let next = self
            .replies
            .lock()
            .map_err(|_| LlmError::InvalidResponse {
                provider: self.model_id.clone(),
                reason: "reply queue poisoned".to_string(),
            })?
            .pop_front();

        let text = next.ok_or_else(|| LlmError::InvalidResponse {
            provider: self.model_id.clone(),
            reason: "script exhausted".to_string(),
        })?;
        Ok(Generation {
            token_count: word_count(&text),
            text,
        })
    }

    async fn self_assess(&self, _specification: &str, _questions: &[Question]) -> PersonaResult<String> {
        Ok(self.self_assessment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use persona_core::{ItemCatalog, PersonaError};

    #[tokio::test]
    async fn test_echo_generate() {
        let generator = EchoGenerator::new("echo");
        let history = vec![Turn::user("first"), Turn::assistant("ok"), Turn::user("second one")];
        let generation = generator.generate("be brief", &history).await.unwrap();
        assert_eq!(generation.text, "[echo] second one");
        assert_eq!(generation.token_count, 2 + 2 + 3);
    }

    #[tokio::test]
    async fn test_echo_self_assess_covers_questions() {
        let questions = ItemCatalog::standard().question_set();
        let reply = EchoGenerator::new("echo")
            .with_score(4)
            .self_assess("spec", &questions)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 28);
        assert_eq!(value["A1"], 4);
    }

    #[tokio::test]
    async fn test_scripted_replays_then_fails() {
        let generator = ScriptedGenerator::new("script").with_reply("one").with_reply("two words");
        assert_eq!(generator.remaining(), 2);
        assert_eq!(generator.generate("", &[]).await.unwrap().text, "one");
        assert_eq!(generator.generate("", &[]).await.unwrap().token_count, 2);
        let err = generator.generate("", &[]).await.unwrap_err();
        assert!(matches!(err, PersonaError::Llm(LlmError::InvalidResponse { .. })));
    }
}
