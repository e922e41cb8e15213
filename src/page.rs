use tracing::{info, warn};

use crate::prompt::Prompt;

/// What the page currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View<'a> {
    /// No result yet: show the quiz form.
    Quiz,
    /// Quiz submitted: show the chat view, seeded with the prompt.
    Chat { initial_prompt: &'a Prompt },
}

/// Page-level container switching from the quiz to the chat once a prompt arrives.
#[derive(Debug, Default)]
pub struct Page {
    quiz_results: Option<Prompt>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the quiz result. Only the first result counts; returns whether this one was taken.
    pub fn receive_result(&mut self, prompt: Prompt) -> bool {
        if self.quiz_results.is_some() {
            warn!("Ignoring a second quiz result; the page is already showing the chat");
            return false;
        }
        info!("Quiz results received, switching to chat view");
        self.quiz_results = Some(prompt);
        true
    }

    pub fn view(&self) -> View<'_> {
        match &self.quiz_results {
            None => View::Quiz,
            Some(initial_prompt) => View::Chat { initial_prompt },
        }
    }

    pub fn is_chatting(&self) -> bool {
        self.quiz_results.is_some()
    }

    pub fn quiz_results(&self) -> Option<&Prompt> {
        self.quiz_results.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{AnswerRecord, FieldUpdate};
    use crate::quiz_form::QuizForm;

    #[test]
    fn test_page_starts_on_quiz() {
        let page = Page::new();
        assert_eq!(page.view(), View::Quiz);
        assert!(!page.is_chatting());
    }

    #[test]
    fn test_submission_switches_to_chat_once() {
        let mut page = Page::new();
        let mut answers = AnswerRecord::new();
        answers.apply(FieldUpdate::ZipCode {
            value: "94110".to_string(),
        });
        let expected = Prompt::from_answers(&answers);

        QuizForm::with_answers(answers, |prompt| {
            page.receive_result(prompt);
        })
        .silent()
        .submit();

        assert_eq!(
            page.view(),
            View::Chat {
                initial_prompt: &expected
            }
        );

        let late = Prompt::from_answers(&AnswerRecord::new());
        assert!(!page.receive_result(late));
        assert_eq!(page.quiz_results(), Some(&expected));
    }
}
