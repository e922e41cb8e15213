//! Garden quiz: a seven-question survey whose answers become the opening prompt of a
//! garden-planning chat, served as a web UI or run in the terminal.

pub mod answers;
pub mod chat;
pub mod constants;
pub mod error;
pub mod llm_interaction;
pub mod page;
pub mod prompt;
pub mod questions;
pub mod quiz_form;
pub mod session;
pub mod terminal;
pub mod web_server;

pub use answers::{AnswerRecord, Field, FieldUpdate, Selection};
pub use error::QuizError;
pub use page::{Page, View};
pub use prompt::Prompt;
pub use quiz_form::QuizForm;
