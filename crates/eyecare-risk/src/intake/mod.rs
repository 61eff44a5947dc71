//! Reading assessments from exports: CSV with dataset column headers, or
//! JSON documents holding one assessment or a list of them.

mod parser;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::inference::features::AssessmentInput;

#[derive(Debug)]
pub enum AssessmentImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for AssessmentImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssessmentImportError::Io(err) => write!(f, "failed to read assessments: {}", err),
            AssessmentImportError::Csv(err) => write!(f, "invalid assessment CSV: {}", err),
            AssessmentImportError::Json(err) => write!(f, "invalid assessment JSON: {}", err),
        }
    }
}

impl std::error::Error for AssessmentImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssessmentImportError::Io(err) => Some(err),
            AssessmentImportError::Csv(err) => Some(err),
            AssessmentImportError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for AssessmentImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for AssessmentImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for AssessmentImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub struct AssessmentImporter;

impl AssessmentImporter {
    /// Picks the format from the file extension; anything but `.json` is
    /// read as CSV.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<AssessmentInput>, AssessmentImportError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_reader(file)
        } else {
            Self::from_csv_reader(file)
        }
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Vec<AssessmentInput>, AssessmentImportError> {
        Ok(parser::parse_csv(reader)?)
    }

    pub fn from_json_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<AssessmentInput>, AssessmentImportError> {
        Ok(parser::parse_json(reader)?)
    }
}
