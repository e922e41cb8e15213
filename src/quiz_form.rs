use tracing::info;

use crate::answers::{AnswerRecord, FieldUpdate};
use crate::prompt::Prompt;

type PromptObserver = Box<dyn Fn(&Prompt) + Send>;

/// The quiz form: collects answers and, on submit, hands the finished prompt to `on_result`.
///
/// `submit` consumes the form, so the result callback can fire at most once.
pub struct QuizForm<F>
where
    F: FnOnce(Prompt),
{
    answers: AnswerRecord,
    on_result: F,
    observer: Option<PromptObserver>,
}

impl<F> QuizForm<F>
where
    F: FnOnce(Prompt),
{
    pub fn new(on_result: F) -> Self {
        Self::with_answers(AnswerRecord::new(), on_result)
    }

    /// Starts from answers collected elsewhere, e.g. replayed from a submitted browser form.
    pub fn with_answers(answers: AnswerRecord, on_result: F) -> Self {
        Self {
            answers,
            on_result,
            observer: Some(Box::new(log_prompt)),
        }
    }

    /// Replaces the default `tracing` output for the submitted prompt.
    pub fn observe_with(mut self, observer: impl Fn(&Prompt) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Drops the diagnostic output entirely.
    pub fn silent(mut self) -> Self {
        self.observer = None;
        self
    }

    pub fn update(&mut self, update: FieldUpdate) -> &AnswerRecord {
        self.answers.apply(update);
        &self.answers
    }

    pub fn answers(&self) -> &AnswerRecord {
        &self.answers
    }

    /// Formats the answers, reports the prompt to the observer, then passes it to the callback.
    /// Nothing is validated; unanswered questions come through as empty segments.
    pub fn submit(self) {
        let prompt = Prompt::from_answers(&self.answers);
        if let Some(observer) = &self.observer {
            observer(&prompt);
        }
        (self.on_result)(prompt);
    }
}

fn log_prompt(prompt: &Prompt) {
    info!("Prompt text for AI:\n{}", prompt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_submit_passes_prompt_to_callback() {
        let mut received = None;
        let mut form = QuizForm::new(|prompt| received = Some(prompt)).silent();
        form.update(FieldUpdate::ZipCode {
            value: "94110".to_string(),
        });
        form.update(FieldUpdate::Length {
            value: "10".to_string(),
        });
        form.submit();

        let prompt = received.expect("callback should have fired");
        assert!(prompt.as_str().starts_with("Garden Location: Area code 94110\n"));
        assert!(prompt.as_str().contains("Garden Size: 10 ft by  ft"));
    }

    #[test]
    fn test_observer_sees_prompt_before_callback() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let observed = events.clone();
        let on_result = {
            let events = events.clone();
            move |prompt: Prompt| events.lock().unwrap().push(format!("result:{}", prompt.as_str().len()))
        };

        QuizForm::new(on_result)
            .observe_with(move |prompt| {
                observed.lock().unwrap().push(format!("observed:{}", prompt.as_str().len()))
            })
            .submit();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].starts_with("observed:"));
        assert!(events[1].starts_with("result:"));
    }

    #[test]
    fn test_update_returns_current_answers() {
        let mut form = QuizForm::new(|_| {}).silent();
        let answers = form.update(FieldUpdate::Goals {
            value: "I want to have a dazzling variety of plants!".to_string(),
            checked: true,
        });
        assert_eq!(answers.goals.len(), 1);

        form.update(FieldUpdate::Goals {
            value: "I want to have a dazzling variety of plants!".to_string(),
            checked: false,
        });
        assert!(form.answers().goals.is_empty());
    }
}
