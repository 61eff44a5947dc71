use std::io::Read;

use serde_json::{Number, Value};

use crate::inference::features::AssessmentInput;

/// One assessment per CSV row, keyed by the header. Empty cells are left
/// out and numeric cells become numbers.
pub(crate) fn parse_csv<R: Read>(reader: R) -> Result<Vec<AssessmentInput>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let mut assessments = Vec::new();

    for record in csv_reader.records() {
        let record = record?;
        let assessment: AssessmentInput = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, cell)| !header.is_empty() && !cell.is_empty())
            .map(|(header, cell)| (header.to_string(), cell_value(cell)))
            .collect();
        assessments.push(assessment);
    }

    Ok(assessments)
}

/// A single JSON object or an array of objects.
pub(crate) fn parse_json<R: Read>(reader: R) -> Result<Vec<AssessmentInput>, serde_json::Error> {
    let document: OneOrMany = serde_json::from_reader(reader)?;
    Ok(match document {
        OneOrMany::One(assessment) => vec![assessment],
        OneOrMany::Many(assessments) => assessments,
    })
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<AssessmentInput>),
    One(AssessmentInput),
}

fn cell_value(cell: &str) -> Value {
    if let Ok(integer) = cell.parse::<i64>() {
        return Value::from(integer);
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::from(cell))
}
