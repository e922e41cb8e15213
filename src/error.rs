use thiserror::Error;
use uuid::Uuid;

use crate::answers::Field;

/// Errors raised at the edges of the quiz: browser input, page sessions and the chat backend.
///
/// Building and formatting answers never fails; these only come from the HTTP and CLI surfaces.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("unknown quiz field `{0}`")]
    UnknownField(String),

    #[error("`{value}` is not an option for {field}")]
    UnknownOption { field: Field, value: String },

    #[error("no garden session with id {0}")]
    SessionNotFound(Uuid),

    #[error("the quiz has already been submitted")]
    AlreadySubmitted,

    #[error("the quiz has not been submitted yet")]
    NotSubmitted,

    #[error("the assistant is still answering the previous message")]
    ReplyPending,

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("chat backend error: {0}")]
    Chat(String),
}

impl From<reqwest::Error> for QuizError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return QuizError::Chat(format!("model request timed out: {err}"));
        }
        QuizError::Chat(err.to_string())
    }
}

pub type Result<T, E = QuizError> = std::result::Result<T, E>;
