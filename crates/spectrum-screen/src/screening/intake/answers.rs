use serde::Deserialize;
use std::io::Read;
use std::path::Path;

use super::wizard::{IntakeWizard, WizardError};

#[derive(Debug)]
pub enum AnswerSheetError {
    Io(std::io::Error),
    Csv(csv::Error),
    Wizard { row: usize, source: WizardError },
}

impl std::fmt::Display for AnswerSheetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnswerSheetError::Io(err) => write!(f, "failed to read answer sheet: {}", err),
            AnswerSheetError::Csv(err) => write!(f, "invalid answer sheet CSV: {}", err),
            AnswerSheetError::Wizard { row, source } => {
                write!(f, "answer sheet row {} was rejected: {}", row, source)
            }
        }
    }
}

impl std::error::Error for AnswerSheetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AnswerSheetError::Io(err) => Some(err),
            AnswerSheetError::Csv(err) => Some(err),
            AnswerSheetError::Wizard { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for AnswerSheetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AnswerSheetError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct AnswerRow {
    field: String,
    #[serde(default)]
    value: String,
}

/// Pre-filled answers loaded from a `field,value` CSV file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: Vec<(String, String)>,
}

impl AnswerSheet {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnswerSheetError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, AnswerSheetError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut entries = Vec::new();
        for row in csv_reader.deserialize::<AnswerRow>() {
            let row = row?;
            if row.field.is_empty() {
                continue;
            }
            entries.push((row.field, row.value));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Feed every row into the wizard in file order. Later rows overwrite earlier ones.
    pub fn apply_to(&self, wizard: &mut IntakeWizard) -> Result<(), AnswerSheetError> {
        for (index, (field, value)) in self.entries.iter().enumerate() {
            wizard
                .set_field_value(field, value.as_str())
                .map_err(|source| AnswerSheetError::Wizard {
                    row: index + 1,
                    source,
                })?;
        }
        Ok(())
    }
}
