use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use serde::Serialize;

use super::catalog::{ChoiceOption, Country, Ethnicity, Gender, Relation, YesNo};

/// Wire keys for every field of the standard questionnaire.
pub mod keys {
    pub const BEHAVIORAL: [&str; 10] = [
        "A1_Score", "A2_Score", "A3_Score", "A4_Score", "A5_Score", "A6_Score", "A7_Score",
        "A8_Score", "A9_Score", "A10_Score",
    ];
    pub const AGE: &str = "age";
    pub const GENDER: &str = "gender";
    pub const ETHNICITY: &str = "ethnicity";
    pub const COUNTRY: &str = "contry_of_res";
    pub const JAUNDICE: &str = "jaundice";
    pub const FAMILY_HISTORY: &str = "austim";
    pub const USED_APP_BEFORE: &str = "used_app_before";
    pub const RELATION: &str = "relation";
}

pub const AGE_MIN: i64 = 1;
pub const AGE_MAX: i64 = 120;

const BEHAVIORAL_STATEMENTS: [&str; 10] = [
    "I often notice small sounds when others do not",
    "I usually concentrate more on the whole picture, rather than the small details",
    "I find it easy to do more than one thing at once",
    "If there is an interruption, I can switch back to what I was doing very quickly",
    "I find it easy to 'read between the lines' when someone is talking to me",
    "I know how to tell if someone listening to me is getting bored",
    "When I'm reading a story I find it difficult to work out the characters' intentions",
    "I like to collect information about categories of things",
    "I find it easy to work out what someone is thinking or feeling just by looking at their face",
    "I find it difficult to work out people's intentions",
];

const BEHAVIORAL_OPTIONS: [ChoiceOption; 2] = [
    ChoiceOption {
        value: "1",
        label: "Yes",
    },
    ChoiceOption {
        value: "0",
        label: "No",
    },
];

/// How a field's raw input is interpreted and checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    BinaryChoice { options: Vec<ChoiceOption> },
    Enum { options: Vec<ChoiceOption> },
    IntegerRange { min: i64, max: i64 },
    FreeChoice,
}

/// Declarative rule set for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub required_message: &'static str,
}

impl FieldSpec {
    /// Check a raw value against this field's rules, returning the message to show next to the field.
    ///
    /// `None` means the field has not been answered; blank strings never reach this point
    /// because the wizard stores them as unset.
    pub fn validate(&self, raw: Option<&str>) -> Result<(), String> {
        let Some(raw) = raw else {
            return if self.required {
                Err(self.required_message.to_string())
            } else {
                Ok(())
            };
        };

        match &self.kind {
            FieldKind::BinaryChoice { options } | FieldKind::Enum { options } => {
                if options.iter().any(|option| option.value == raw) {
                    Ok(())
                } else {
                    Err("Please choose one of the listed options".to_string())
                }
            }
            FieldKind::IntegerRange { min, max } => {
                let value: i64 = raw
                    .parse()
                    .map_err(|_| format!("{} must be a whole number", self.label))?;
                if value < *min {
                    Err(format!("{} must be at least {}", self.label, min))
                } else if value > *max {
                    Err(format!("{} must be at most {}", self.label, max))
                } else {
                    Ok(())
                }
            }
            FieldKind::FreeChoice => Ok(()),
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        match &self.kind {
            FieldKind::BinaryChoice { options } | FieldKind::Enum { options } => options,
            FieldKind::IntegerRange { .. } | FieldKind::FreeChoice => &[],
        }
    }
}

/// One page of the wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub title: &'static str,
    pub fields: Vec<FieldSpec>,
}

impl Section {
    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.key == key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum QuestionnaireError {
    #[error("a questionnaire needs at least one section")]
    NoSections,
    #[error("section '{0}' has no fields")]
    EmptySection(&'static str),
    #[error("field key '{0}' is declared more than once")]
    DuplicateKey(&'static str),
}

/// Ordered sections traversed by the intake wizard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Questionnaire {
    sections: Vec<Section>,
}

impl Questionnaire {
    pub fn new(sections: Vec<Section>) -> Result<Self, QuestionnaireError> {
        if sections.is_empty() {
            return Err(QuestionnaireError::NoSections);
        }

        let mut seen = HashSet::new();
        for section in &sections {
            if section.fields.is_empty() {
                return Err(QuestionnaireError::EmptySection(section.title));
            }
            for field in &section.fields {
                if !seen.insert(field.key) {
                    return Err(QuestionnaireError::DuplicateKey(field.key));
                }
            }
        }

        Ok(Self { sections })
    }

    /// The AQ-10 behavioural screen followed by personal and background details.
    pub fn standard() -> Arc<Self> {
        static STANDARD: OnceLock<Arc<Questionnaire>> = OnceLock::new();
        STANDARD
            .get_or_init(|| {
                Arc::new(Self {
                    sections: standard_sections(),
                })
            })
            .clone()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn last_index(&self) -> usize {
        self.sections.len() - 1
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.sections.iter().find_map(|section| section.field(key))
    }

    pub fn section_of(&self, key: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|section| section.field(key).is_some())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.sections.iter().flat_map(|section| section.fields.iter())
    }
}

fn binary_choice(options: Vec<ChoiceOption>) -> FieldKind {
    FieldKind::BinaryChoice { options }
}

fn yes_no() -> FieldKind {
    binary_choice(YesNo::ordered().into_iter().map(YesNo::option).collect())
}

fn standard_sections() -> Vec<Section> {
    let behavioral = keys::BEHAVIORAL
        .into_iter()
        .zip(BEHAVIORAL_STATEMENTS)
        .map(|(key, statement)| FieldSpec {
            key,
            label: statement,
            kind: binary_choice(BEHAVIORAL_OPTIONS.to_vec()),
            required: true,
            required_message: "This field is required",
        })
        .collect();

    vec![
        Section {
            title: "Behavioral Questions",
            fields: behavioral,
        },
        Section {
            title: "Personal Information",
            fields: vec![
                FieldSpec {
                    key: keys::AGE,
                    label: "Age",
                    kind: FieldKind::IntegerRange {
                        min: AGE_MIN,
                        max: AGE_MAX,
                    },
                    required: true,
                    required_message: "Age is required",
                },
                FieldSpec {
                    key: keys::GENDER,
                    label: "Gender",
                    kind: FieldKind::Enum {
                        options: Gender::ordered().into_iter().map(Gender::option).collect(),
                    },
                    required: true,
                    required_message: "Gender is required",
                },
                FieldSpec {
                    key: keys::ETHNICITY,
                    label: "Ethnicity",
                    kind: FieldKind::Enum {
                        options: Ethnicity::ordered()
                            .into_iter()
                            .map(Ethnicity::option)
                            .collect(),
                    },
                    required: true,
                    required_message: "Ethnicity is required",
                },
                FieldSpec {
                    key: keys::COUNTRY,
                    label: "Country of Residence",
                    kind: FieldKind::Enum {
                        options: Country::ordered()
                            .into_iter()
                            .map(Country::option)
                            .collect(),
                    },
                    required: true,
                    required_message: "Country is required",
                },
            ],
        },
        Section {
            title: "Background Information",
            fields: vec![
                FieldSpec {
                    key: keys::JAUNDICE,
                    label: "History of Jaundice",
                    kind: yes_no(),
                    required: true,
                    required_message: "This field is required",
                },
                FieldSpec {
                    key: keys::FAMILY_HISTORY,
                    label: "Family History of Autism",
                    kind: yes_no(),
                    required: true,
                    required_message: "This field is required",
                },
                FieldSpec {
                    key: keys::USED_APP_BEFORE,
                    label: "Used a Screening App Before",
                    kind: yes_no(),
                    required: true,
                    required_message: "This field is required",
                },
                FieldSpec {
                    key: keys::RELATION,
                    label: "Relationship to Person Being Assessed",
                    kind: FieldKind::Enum {
                        options: Relation::ordered()
                            .into_iter()
                            .map(Relation::option)
                            .collect(),
                    },
                    required: true,
                    required_message: "Relationship is required",
                },
            ],
        },
    ]
}
