use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QuizError, Result};
use crate::questions;

/// The quiz fields, named the way the browser form names its inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    ZipCode,
    Length,
    Width,
    GrowContainers,
    SunTypes,
    TimeInvestment,
    PlantTypePreference,
    Goals,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::ZipCode,
        Field::Length,
        Field::Width,
        Field::GrowContainers,
        Field::SunTypes,
        Field::TimeInvestment,
        Field::PlantTypePreference,
        Field::Goals,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::ZipCode => "zipCode",
            Field::Length => "length",
            Field::Width => "width",
            Field::GrowContainers => "growContainers",
            Field::SunTypes => "sunTypes",
            Field::TimeInvestment => "timeInvestment",
            Field::PlantTypePreference => "plantTypePreference",
            Field::Goals => "goals",
        }
    }

    /// Checkbox groups: any number of options at once.
    pub fn is_multi_select(self) -> bool {
        matches!(self, Field::GrowContainers | Field::SunTypes | Field::Goals)
    }

    /// Radio groups: one option at a time.
    pub fn is_single_choice(self) -> bool {
        matches!(self, Field::TimeInvestment | Field::PlantTypePreference)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| QuizError::UnknownField(s.to_string()))
    }
}

/// A set of checked options that remembers the order they were first checked in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Selection(Vec<String>);

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the value was already selected.
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.contains(&value) {
            return false;
        }
        self.0.push(value);
        true
    }

    /// Returns false if the value was not selected.
    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|v| v != value);
        self.0.len() != before
    }

    /// Applies a checkbox toggle.
    pub fn set(&mut self, value: impl Into<String>, checked: bool) {
        let value = value.into();
        if checked {
            self.insert(value);
        } else {
            self.remove(&value);
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.0.iter().any(|v| v == value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, separator: &str) -> String {
        self.0.join(separator)
    }
}

impl<S: Into<String>> FromIterator<S> for Selection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Selection::new();
        for value in iter {
            selection.insert(value);
        }
        selection
    }
}

impl From<Vec<String>> for Selection {
    fn from(values: Vec<String>) -> Self {
        values.into_iter().collect()
    }
}

impl From<Selection> for Vec<String> {
    fn from(selection: Selection) -> Self {
        selection.0
    }
}

/// Every answer given so far. All fields start empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnswerRecord {
    pub zip_code: String,
    pub length: String,
    pub width: String,
    pub grow_containers: Selection,
    pub sun_types: Selection,
    pub time_investment: String,
    pub plant_type_preference: String,
    pub goals: Selection,
}

impl AnswerRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one field change. Checkbox toggles add or remove a value, everything else replaces.
    pub fn apply(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::ZipCode { value } => self.zip_code = value,
            FieldUpdate::Length { value } => self.length = value,
            FieldUpdate::Width { value } => self.width = value,
            FieldUpdate::GrowContainers { value, checked } => {
                self.grow_containers.set(value, checked)
            }
            FieldUpdate::SunTypes { value, checked } => self.sun_types.set(value, checked),
            FieldUpdate::TimeInvestment { value } => self.time_investment = value,
            FieldUpdate::PlantTypePreference { value } => self.plant_type_preference = value,
            FieldUpdate::Goals { value, checked } => self.goals.set(value, checked),
        }
    }

    /// Rebuilds a record from url-encoded browser form pairs.
    ///
    /// Browsers only send checked boxes and the selected radio, so each pair is replayed as a
    /// "checked" update on an empty record.
    pub fn from_form_pairs<I, K, V>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut record = AnswerRecord::new();
        for (name, value) in pairs {
            record.apply(FieldUpdate::from_input(name.as_ref(), value, true)?);
        }
        Ok(record)
    }

    /// Current value of a single-value field, or `None` for checkbox groups.
    pub fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::ZipCode => Some(&self.zip_code),
            Field::Length => Some(&self.length),
            Field::Width => Some(&self.width),
            Field::TimeInvestment => Some(&self.time_investment),
            Field::PlantTypePreference => Some(&self.plant_type_preference),
            Field::GrowContainers | Field::SunTypes | Field::Goals => None,
        }
    }

    /// Current selection of a checkbox group, or `None` for single-value fields.
    pub fn selection(&self, field: Field) -> Option<&Selection> {
        match field {
            Field::GrowContainers => Some(&self.grow_containers),
            Field::SunTypes => Some(&self.sun_types),
            Field::Goals => Some(&self.goals),
            _ => None,
        }
    }
}

/// A single change to the answer record, one variant per field.
///
/// Serialized with a `field` tag, e.g. `{"field":"sunTypes","value":"Full sun","checked":true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", rename_all = "camelCase")]
pub enum FieldUpdate {
    ZipCode { value: String },
    Length { value: String },
    Width { value: String },
    GrowContainers { value: String, checked: bool },
    SunTypes { value: String, checked: bool },
    TimeInvestment { value: String },
    PlantTypePreference { value: String },
    Goals { value: String, checked: bool },
}

impl FieldUpdate {
    /// Builds an update from a raw input name and value. `checked` is ignored for non-checkbox
    /// fields. The value is checked against the option list for choice fields.
    pub fn from_input(name: &str, value: impl Into<String>, checked: bool) -> Result<Self> {
        let value = value.into();
        let update = match name.parse::<Field>()? {
            Field::ZipCode => FieldUpdate::ZipCode { value },
            Field::Length => FieldUpdate::Length { value },
            Field::Width => FieldUpdate::Width { value },
            Field::GrowContainers => FieldUpdate::GrowContainers { value, checked },
            Field::SunTypes => FieldUpdate::SunTypes { value, checked },
            Field::TimeInvestment => FieldUpdate::TimeInvestment { value },
            Field::PlantTypePreference => FieldUpdate::PlantTypePreference { value },
            Field::Goals => FieldUpdate::Goals { value, checked },
        };
        update.validate()?;
        Ok(update)
    }

    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::ZipCode { .. } => Field::ZipCode,
            FieldUpdate::Length { .. } => Field::Length,
            FieldUpdate::Width { .. } => Field::Width,
            FieldUpdate::GrowContainers { .. } => Field::GrowContainers,
            FieldUpdate::SunTypes { .. } => Field::SunTypes,
            FieldUpdate::TimeInvestment { .. } => Field::TimeInvestment,
            FieldUpdate::PlantTypePreference { .. } => Field::PlantTypePreference,
            FieldUpdate::Goals { .. } => Field::Goals,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldUpdate::ZipCode { value }
            | FieldUpdate::Length { value }
            | FieldUpdate::Width { value }
            | FieldUpdate::TimeInvestment { value }
            | FieldUpdate::PlantTypePreference { value }
            | FieldUpdate::GrowContainers { value, .. }
            | FieldUpdate::SunTypes { value, .. }
            | FieldUpdate::Goals { value, .. } => value,
        }
    }

    /// Rejects values the form never offers for checkbox and radio fields.
    /// Free-text fields, including the numeric ones, accept anything.
    pub fn validate(&self) -> Result<()> {
        let field = self.field();
        match questions::options_for(field) {
            Some(options) if !options.contains(&self.value()) => Err(QuizError::UnknownOption {
                field,
                value: self.value().to_string(),
            }),
            _ => Ok(()),
        }
    }
}
