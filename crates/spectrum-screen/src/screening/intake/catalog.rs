//! Fixed answer catalogs shared by the questionnaire definition and the
//! submission payload. Wire values match the scoring collaborator's encoders.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One selectable answer: the value sent over the wire and the label shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// Raised when a raw answer is not part of a fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a recognised {catalog} value")]
pub struct UnknownOption {
    pub catalog: &'static str,
    pub value: String,
}

fn lookup<T: Copy>(
    catalog: &'static str,
    ordered: &[T],
    wire_value: fn(T) -> &'static str,
    raw: &str,
) -> Result<T, UnknownOption> {
    ordered
        .iter()
        .copied()
        .find(|candidate| wire_value(*candidate) == raw)
        .ok_or_else(|| UnknownOption {
            catalog,
            value: raw.to_string(),
        })
}

/// Yes/no answers used for the background questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    pub const fn ordered() -> [Self; 2] {
        [Self::Yes, Self::No]
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub const fn option(self) -> ChoiceOption {
        ChoiceOption {
            value: self.wire_value(),
            label: self.label(),
        }
    }
}

impl FromStr for YesNo {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        lookup("yes/no", &Self::ordered(), Self::wire_value, raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub const fn ordered() -> [Self; 2] {
        [Self::Male, Self::Female]
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }

    pub const fn option(self) -> ChoiceOption {
        ChoiceOption {
            value: self.wire_value(),
            label: self.label(),
        }
    }
}

impl FromStr for Gender {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        lookup("gender", &Self::ordered(), Self::wire_value, raw)
    }
}

/// Ethnicity categories known to the scoring model. `?` means "prefer not to say".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ethnicity {
    #[serde(rename = "White-European")]
    WhiteEuropean,
    #[serde(rename = "Middle Eastern")]
    MiddleEastern,
    #[serde(rename = "Pasifika")]
    Pasifika,
    #[serde(rename = "Black")]
    Black,
    #[serde(rename = "Others")]
    Others,
    #[serde(rename = "Hispanic")]
    Hispanic,
    #[serde(rename = "Asian")]
    Asian,
    #[serde(rename = "Turkish")]
    Turkish,
    #[serde(rename = "South Asian")]
    SouthAsian,
    #[serde(rename = "Latino")]
    Latino,
    #[serde(rename = "?")]
    Undisclosed,
}

impl Ethnicity {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::WhiteEuropean,
            Self::MiddleEastern,
            Self::Pasifika,
            Self::Black,
            Self::Others,
            Self::Hispanic,
            Self::Asian,
            Self::Turkish,
            Self::SouthAsian,
            Self::Latino,
            Self::Undisclosed,
        ]
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::WhiteEuropean => "White-European",
            Self::MiddleEastern => "Middle Eastern",
            Self::Pasifika => "Pasifika",
            Self::Black => "Black",
            Self::Others => "Others",
            Self::Hispanic => "Hispanic",
            Self::Asian => "Asian",
            Self::Turkish => "Turkish",
            Self::SouthAsian => "South Asian",
            Self::Latino => "Latino",
            Self::Undisclosed => "?",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Undisclosed => "Prefer not to say",
            other => other.wire_value(),
        }
    }

    pub const fn option(self) -> ChoiceOption {
        ChoiceOption {
            value: self.wire_value(),
            label: self.label(),
        }
    }
}

impl FromStr for Ethnicity {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        lookup("ethnicity", &Self::ordered(), Self::wire_value, raw)
    }
}

/// Countries of residence offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "United States")]
    UnitedStates,
    #[serde(rename = "United Kingdom")]
    UnitedKingdom,
    #[serde(rename = "Canada")]
    Canada,
    #[serde(rename = "Australia")]
    Australia,
    #[serde(rename = "India")]
    India,
    #[serde(rename = "Germany")]
    Germany,
    #[serde(rename = "France")]
    France,
    #[serde(rename = "Italy")]
    Italy,
    #[serde(rename = "Spain")]
    Spain,
    #[serde(rename = "Netherlands")]
    Netherlands,
    #[serde(rename = "Sweden")]
    Sweden,
    #[serde(rename = "Brazil")]
    Brazil,
    #[serde(rename = "Argentina")]
    Argentina,
    #[serde(rename = "Mexico")]
    Mexico,
    #[serde(rename = "Japan")]
    Japan,
    #[serde(rename = "China")]
    China,
    #[serde(rename = "South Korea")]
    SouthKorea,
    #[serde(rename = "New Zealand")]
    NewZealand,
    #[serde(rename = "South Africa")]
    SouthAfrica,
    #[serde(rename = "Egypt")]
    Egypt,
    #[serde(rename = "Others")]
    Others,
}

impl Country {
    pub const fn ordered() -> [Self; 21] {
        [
            Self::UnitedStates,
            Self::UnitedKingdom,
            Self::Canada,
            Self::Australia,
            Self::India,
            Self::Germany,
            Self::France,
            Self::Italy,
            Self::Spain,
            Self::Netherlands,
            Self::Sweden,
            Self::Brazil,
            Self::Argentina,
            Self::Mexico,
            Self::Japan,
            Self::China,
            Self::SouthKorea,
            Self::NewZealand,
            Self::SouthAfrica,
            Self::Egypt,
            Self::Others,
        ]
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::UnitedStates => "United States",
            Self::UnitedKingdom => "United Kingdom",
            Self::Canada => "Canada",
            Self::Australia => "Australia",
            Self::India => "India",
            Self::Germany => "Germany",
            Self::France => "France",
            Self::Italy => "Italy",
            Self::Spain => "Spain",
            Self::Netherlands => "Netherlands",
            Self::Sweden => "Sweden",
            Self::Brazil => "Brazil",
            Self::Argentina => "Argentina",
            Self::Mexico => "Mexico",
            Self::Japan => "Japan",
            Self::China => "China",
            Self::SouthKorea => "South Korea",
            Self::NewZealand => "New Zealand",
            Self::SouthAfrica => "South Africa",
            Self::Egypt => "Egypt",
            Self::Others => "Others",
        }
    }

    pub const fn option(self) -> ChoiceOption {
        ChoiceOption {
            value: self.wire_value(),
            label: self.wire_value(),
        }
    }
}

impl FromStr for Country {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        lookup("country", &Self::ordered(), Self::wire_value, raw)
    }
}

/// Who is filling in the questionnaire relative to the person being screened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "Self")]
    SelfReport,
    #[serde(rename = "Parent")]
    Parent,
    #[serde(rename = "Relative")]
    Relative,
    #[serde(rename = "Health care professional")]
    HealthCareProfessional,
    #[serde(rename = "Others")]
    Others,
    #[serde(rename = "?")]
    Undisclosed,
}

impl Relation {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::SelfReport,
            Self::Parent,
            Self::Relative,
            Self::HealthCareProfessional,
            Self::Others,
            Self::Undisclosed,
        ]
    }

    pub const fn wire_value(self) -> &'static str {
        match self {
            Self::SelfReport => "Self",
            Self::Parent => "Parent",
            Self::Relative => "Relative",
            Self::HealthCareProfessional => "Health care professional",
            Self::Others => "Others",
            Self::Undisclosed => "?",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Undisclosed => "Prefer not to say",
            other => other.wire_value(),
        }
    }

    pub const fn option(self) -> ChoiceOption {
        ChoiceOption {
            value: self.wire_value(),
            label: self.label(),
        }
    }
}

impl FromStr for Relation {
    type Err = UnknownOption;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        lookup("relation", &Self::ordered(), Self::wire_value, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogs_have_expected_sizes() {
        assert_eq!(Ethnicity::ordered().len(), 11);
        assert_eq!(Country::ordered().len(), 21);
        assert_eq!(Relation::ordered().len(), 6);
    }

    #[test]
    fn serde_names_match_wire_values() {
        for ethnicity in Ethnicity::ordered() {
            let encoded = serde_json::to_value(ethnicity).expect("serializes");
            assert_eq!(encoded, serde_json::json!(ethnicity.wire_value()));
        }
        for country in Country::ordered() {
            let encoded = serde_json::to_value(country).expect("serializes");
            assert_eq!(encoded, serde_json::json!(country.wire_value()));
        }
        for relation in Relation::ordered() {
            let encoded = serde_json::to_value(relation).expect("serializes");
            assert_eq!(encoded, serde_json::json!(relation.wire_value()));
        }
        assert_eq!(serde_json::to_value(Gender::Female).unwrap(), "f");
        assert_eq!(serde_json::to_value(YesNo::Yes).unwrap(), "yes");
    }

    #[test]
    fn undisclosed_sentinel_parses_and_has_friendly_label() {
        let ethnicity: Ethnicity = "?".parse().expect("sentinel parses");
        assert_eq!(ethnicity, Ethnicity::Undisclosed);
        assert_eq!(ethnicity.label(), "Prefer not to say");
        assert_eq!(Relation::Undisclosed.option().value, "?");
    }

    #[test]
    fn parsing_is_case_sensitive_like_the_model_encoders() {
        let err = "india".parse::<Country>().expect_err("lowercase rejected");
        assert_eq!(err.catalog, "country");
        assert_eq!(err.value, "india");
        assert_eq!("India".parse::<Country>(), Ok(Country::India));
    }
}
