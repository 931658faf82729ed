use std::collections::BTreeMap;

use serde::Serialize;

use super::catalog::{Country, Ethnicity, Gender, Relation, UnknownOption, YesNo};
use super::questionnaire::{keys, AGE_MAX, AGE_MIN};

/// Normalized record sent to the scoring collaborator.
///
/// Fields are private: the only way to obtain a payload is
/// [`IntakeWizard::submit`](super::IntakeWizard::submit), which validates every
/// section before coercing raw answers here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    #[serde(rename = "A1_Score")]
    a1_score: u8,
    #[serde(rename = "A2_Score")]
    a2_score: u8,
    #[serde(rename = "A3_Score")]
    a3_score: u8,
    #[serde(rename = "A4_Score")]
    a4_score: u8,
    #[serde(rename = "A5_Score")]
    a5_score: u8,
    #[serde(rename = "A6_Score")]
    a6_score: u8,
    #[serde(rename = "A7_Score")]
    a7_score: u8,
    #[serde(rename = "A8_Score")]
    a8_score: u8,
    #[serde(rename = "A9_Score")]
    a9_score: u8,
    #[serde(rename = "A10_Score")]
    a10_score: u8,
    age: u8,
    gender: Gender,
    ethnicity: Ethnicity,
    jaundice: YesNo,
    austim: YesNo,
    contry_of_res: Country,
    used_app_before: YesNo,
    relation: Relation,
}

/// Raised when raw answers cannot be coerced into the payload shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoercionError {
    #[error("field '{0}' has no answer")]
    Missing(&'static str),
    #[error("field '{field}' cannot be coerced from '{value}'")]
    Invalid { field: &'static str, value: String },
    #[error(transparent)]
    UnknownOption(#[from] UnknownOption),
}

impl SubmissionPayload {
    /// Coerce raw wizard values. Scores and age become integers, catalog answers become
    /// their typed enumerations.
    pub(crate) fn from_values(
        values: &BTreeMap<String, Option<String>>,
    ) -> Result<Self, CoercionError> {
        let mut scores = [0u8; 10];
        for (slot, key) in scores.iter_mut().zip(keys::BEHAVIORAL) {
            *slot = binary_score(key, answer(values, key)?)?;
        }
        let [a1_score, a2_score, a3_score, a4_score, a5_score, a6_score, a7_score, a8_score, a9_score, a10_score] =
            scores;

        Ok(Self {
            a1_score,
            a2_score,
            a3_score,
            a4_score,
            a5_score,
            a6_score,
            a7_score,
            a8_score,
            a9_score,
            a10_score,
            age: age(answer(values, keys::AGE)?)?,
            gender: answer(values, keys::GENDER)?.parse()?,
            ethnicity: answer(values, keys::ETHNICITY)?.parse()?,
            jaundice: answer(values, keys::JAUNDICE)?.parse()?,
            austim: answer(values, keys::FAMILY_HISTORY)?.parse()?,
            contry_of_res: answer(values, keys::COUNTRY)?.parse()?,
            used_app_before: answer(values, keys::USED_APP_BEFORE)?.parse()?,
            relation: answer(values, keys::RELATION)?.parse()?,
        })
    }

    /// Behavioural answers in question order (A1 first).
    pub fn scores(&self) -> [u8; 10] {
        [
            self.a1_score,
            self.a2_score,
            self.a3_score,
            self.a4_score,
            self.a5_score,
            self.a6_score,
            self.a7_score,
            self.a8_score,
            self.a9_score,
            self.a10_score,
        ]
    }

    pub fn age(&self) -> u8 {
        self.age
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn ethnicity(&self) -> Ethnicity {
        self.ethnicity
    }

    pub fn country_of_residence(&self) -> Country {
        self.contry_of_res
    }

    pub fn jaundice(&self) -> YesNo {
        self.jaundice
    }

    pub fn family_history(&self) -> YesNo {
        self.austim
    }

    pub fn used_app_before(&self) -> YesNo {
        self.used_app_before
    }

    pub fn relation(&self) -> Relation {
        self.relation
    }
}

fn answer<'a>(
    values: &'a BTreeMap<String, Option<String>>,
    key: &'static str,
) -> Result<&'a str, CoercionError> {
    values
        .get(key)
        .and_then(|value| value.as_deref())
        .ok_or(CoercionError::Missing(key))
}

fn binary_score(key: &'static str, raw: &str) -> Result<u8, CoercionError> {
    match raw {
        "0" => Ok(0),
        "1" => Ok(1),
        other => Err(CoercionError::Invalid {
            field: key,
            value: other.to_string(),
        }),
    }
}

fn age(raw: &str) -> Result<u8, CoercionError> {
    let invalid = || CoercionError::Invalid {
        field: keys::AGE,
        value: raw.to_string(),
    };
    let value: i64 = raw.parse().map_err(|_| invalid())?;
    if !(AGE_MIN..=AGE_MAX).contains(&value) {
        return Err(invalid());
    }
    u8::try_from(value).map_err(|_| invalid())
}
