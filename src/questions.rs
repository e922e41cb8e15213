// The seven quiz questions, shared by the web template and the terminal quiz.

use serde::Serialize;

use crate::answers::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Number,
    Checkbox,
    Radio,
}

/// One input box of a free-text question.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Entry {
    pub field: Field,
    pub placeholder: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Question {
    pub number: u8,
    pub heading: &'static str,
    pub kind: InputKind,
    /// Text and number questions: one entry per input box.
    pub entries: &'static [Entry],
    /// Checkbox and radio questions: the field the options write to.
    pub field: Option<Field>,
    pub options: &'static [&'static str],
}

pub const GROW_CONTAINERS: &[&str] = &["Pots and planters", "A garden bed", "Directly into soil"];

pub const SUN_TYPES: &[&str] = &["Full sun", "Partial sun", "Partial shade", "Full shade"];

pub const TIME_INVESTMENT: &[&str] = &["Low", "Medium", "High"];

pub const PLANT_TYPE_PREFERENCE: &[&str] = &[
    "I'd like common plants that I can buy at any local store",
    "I want plants that can be easily found in most nurseries",
    "I don't mind visiting a few nurseries until I find my dream cultivars!",
];

pub const GOALS: &[&str] = &[
    "I want to be surrounded by the beauty of nature!",
    "I want to be self-sufficient and grow my own food!",
    "I want to have fresh, delicious herbs for cooking!",
    "I want to create a haven for local pollinators!",
    "I want to plant native species to restore the local ecosystem!",
    "I want to have a dazzling variety of plants!",
];

pub const QUESTIONS: [Question; 7] = [
    Question {
        number: 1,
        heading: "Where is your garden located?",
        kind: InputKind::Text,
        entries: &[Entry {
            field: Field::ZipCode,
            placeholder: "Enter area code",
        }],
        field: None,
        options: &[],
    },
    Question {
        number: 2,
        heading: "About how large is your garden?",
        kind: InputKind::Number,
        entries: &[
            Entry {
                field: Field::Length,
                placeholder: "Length (ft)",
            },
            Entry {
                field: Field::Width,
                placeholder: "Width (ft)",
            },
        ],
        field: None,
        options: &[],
    },
    Question {
        number: 3,
        heading: "What are you planning to grow in?",
        kind: InputKind::Checkbox,
        entries: &[],
        field: Some(Field::GrowContainers),
        options: GROW_CONTAINERS,
    },
    Question {
        number: 4,
        heading: "What types of sun do you have in your garden?",
        kind: InputKind::Checkbox,
        entries: &[],
        field: Some(Field::SunTypes),
        options: SUN_TYPES,
    },
    Question {
        number: 5,
        heading: "How much time do you want to invest in gardening?",
        kind: InputKind::Radio,
        entries: &[],
        field: Some(Field::TimeInvestment),
        options: TIME_INVESTMENT,
    },
    Question {
        number: 6,
        heading: "Do you prefer commonly available plants or rare varieties?",
        kind: InputKind::Radio,
        entries: &[],
        field: Some(Field::PlantTypePreference),
        options: PLANT_TYPE_PREFERENCE,
    },
    Question {
        number: 7,
        heading: "What do you want out of your garden? (Pick up to 3)",
        kind: InputKind::Checkbox,
        entries: &[],
        field: Some(Field::Goals),
        options: GOALS,
    },
];

/// The options a checkbox or radio field offers; `None` for free-text fields.
pub fn options_for(field: Field) -> Option<&'static [&'static str]> {
    match field {
        Field::GrowContainers => Some(GROW_CONTAINERS),
        Field::SunTypes => Some(SUN_TYPES),
        Field::TimeInvestment => Some(TIME_INVESTMENT),
        Field::PlantTypePreference => Some(PLANT_TYPE_PREFERENCE),
        Field::Goals => Some(GOALS),
        Field::ZipCode | Field::Length | Field::Width => None,
    }
}
