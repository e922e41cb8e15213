// The chat view's conversation state. It starts from the quiz prompt and grows one turn at a time.

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::constants::GARDEN_ASSISTANT_INSTRUCTIONS;
use crate::prompt::Prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub timestamp: String,
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    // Set while a model request for the latest user turn is outstanding
    reply_in_flight: bool,
}

impl ChatSession {
    /// Seeds the conversation with the assistant instructions and the quiz prompt as the first user turn.
    pub fn new(initial_prompt: &Prompt) -> Self {
        Self {
            messages: vec![
                ChatMessage::new(ChatRole::System, GARDEN_ASSISTANT_INSTRUCTIONS),
                ChatMessage::new(ChatRole::User, initial_prompt.as_str()),
            ],
            reply_in_flight: false,
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.push(ChatRole::User, content)
    }

    /// Records the model's reply and clears the in-flight marker.
    pub fn push_assistant(&mut self, content: impl Into<String>) -> &ChatMessage {
        self.reply_in_flight = false;
        self.push(ChatRole::Assistant, content)
    }

    /// Claims the pending reply: returns the conversation to send to the model, or `None`
    /// when no reply is owed or another request is already fetching it.
    pub fn begin_reply(&mut self) -> Option<Vec<ChatMessage>> {
        if self.reply_in_flight || !self.needs_reply() {
            return None;
        }
        self.reply_in_flight = true;
        Some(self.messages.clone())
    }

    /// Releases a claim from `begin_reply` after the model request failed.
    pub fn abandon_reply(&mut self) {
        self.reply_in_flight = false;
    }

    pub fn reply_in_flight(&self) -> bool {
        self.reply_in_flight
    }

    fn push(&mut self, role: ChatRole, content: impl Into<String>) -> &ChatMessage {
        self.messages.push(ChatMessage::new(role, content));
        // just pushed
        &self.messages[self.messages.len() - 1]
    }

    /// True while the latest turn is the user's.
    pub fn needs_reply(&self) -> bool {
        matches!(self.messages.last(), Some(m) if m.role == ChatRole::User)
    }

    /// Everything sent to the model, system instructions included.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The visible conversation, without the system instructions.
    pub fn transcript(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().filter(|m| m.role != ChatRole::System)
    }

    pub fn initial_prompt(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == ChatRole::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerRecord;

    #[test]
    fn test_session_is_seeded_with_prompt() {
        let prompt = Prompt::from_answers(&AnswerRecord::new());
        let session = ChatSession::new(&prompt);

        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[0].role, ChatRole::System);
        assert_eq!(session.initial_prompt(), Some(prompt.as_str()));
        assert!(session.needs_reply());
        assert_eq!(session.transcript().count(), 1);
    }

    #[test]
    fn test_reply_tracking() {
        let prompt = Prompt::from_answers(&AnswerRecord::new());
        let mut session = ChatSession::new(&prompt);

        session.push_assistant("Try basil on a sunny windowsill.");
        assert!(!session.needs_reply());

        let message = session.push_user("What about mint?");
        assert_eq!(message.role, ChatRole::User);
        assert_eq!(message.content, "What about mint?");
        assert!(session.needs_reply());
        assert_eq!(session.transcript().count(), 3);
    }

    #[test]
    fn test_reply_can_only_be_claimed_once() {
        let prompt = Prompt::from_answers(&AnswerRecord::new());
        let mut session = ChatSession::new(&prompt);

        let claimed = session.begin_reply().expect("the prompt is owed a reply");
        assert_eq!(claimed.len(), 2);
        assert!(session.reply_in_flight());
        assert!(session.begin_reply().is_none());

        session.abandon_reply();
        assert!(session.begin_reply().is_some());

        session.push_assistant("Sunflowers love full sun.");
        assert!(!session.reply_in_flight());
        assert!(session.begin_reply().is_none());
    }
}
