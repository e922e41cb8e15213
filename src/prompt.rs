use std::fmt;

use serde::{Deserialize, Serialize};

use crate::answers::AnswerRecord;

/// Separator between values of a checkbox group.
const LIST_SEPARATOR: &str = ", ";

/// The quiz answers rendered as text for the chat model. Built once, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Prompt(String);

impl Prompt {
    /// Formats every answer on its own labelled line. Missing answers leave an empty segment.
    pub fn from_answers(answers: &AnswerRecord) -> Self {
        let text = format!(
            "\nGarden Location: Area code {zip}\n\
             Garden Size: {length} ft by {width} ft\n\
             Growing Containers: {containers}\n\
             Sun Exposure: {sun}\n\
             Time Investment: {time}\n\
             Plant Preference: {preference}\n\
             Garden Goals: {goals}\n",
            zip = answers.zip_code,
            length = answers.length,
            width = answers.width,
            containers = answers.grow_containers.join(LIST_SEPARATOR),
            sun = answers.sun_types.join(LIST_SEPARATOR),
            time = answers.time_investment,
            preference = answers.plant_type_preference,
            goals = answers.goals.join(LIST_SEPARATOR),
        );
        Prompt(text.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Prompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
