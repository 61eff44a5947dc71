use crate::infra::{build_service, with_model_override};
use clap::Args;
use eyecare_risk::config::AppConfig;
use eyecare_risk::error::AppError;
use eyecare_risk::intake::AssessmentImporter;
use eyecare_risk::risk::{recommendations, PredictionResponse, RiskLabel, RiskPrediction};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON file holding one assessment or an array of assessments
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured risk model artifact
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV export with dataset column headers
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Override the configured risk model artifact
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Only print rows labelled HIGH
    #[arg(long)]
    pub(crate) only_high: bool,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let model_config = with_model_override(config.model, args.model);
    let service = build_service(&model_config);

    let assessments = AssessmentImporter::from_json_reader(std::fs::File::open(&args.input)?)?;
    for assessment in &assessments {
        let prediction = service.predict(assessment)?;
        let payload = PredictionResponse {
            recommendations: recommendations(&prediction, assessment),
            prediction,
        };
        match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("prediction payload unavailable: {err}"),
        }
    }

    Ok(())
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let model_config = with_model_override(config.model, args.model);
    let service = build_service(&model_config);

    let assessments = AssessmentImporter::from_path(&args.csv)?;
    println!(
        "Batch risk prediction: {} assessments from {}",
        assessments.len(),
        args.csv.display()
    );

    let mut tally = BatchTally::default();
    for (index, assessment) in assessments.iter().enumerate() {
        let prediction = service.predict(assessment)?;
        tally.record(&prediction);
        if args.only_high && prediction.risk_label != RiskLabel::High {
            continue;
        }
        println!("{}", summary_line(index + 1, &prediction));
    }

    println!("\n{} HIGH / {} LOW", tally.high, tally.low);
    for (condition, count) in &tally.conditions {
        println!("  - {condition}: {count}");
    }

    Ok(())
}

#[derive(Debug, Default)]
struct BatchTally {
    high: usize,
    low: usize,
    conditions: BTreeMap<String, usize>,
}

impl BatchTally {
    fn record(&mut self, prediction: &RiskPrediction) {
        match prediction.risk_label {
            RiskLabel::High => {
                self.high += 1;
                *self
                    .conditions
                    .entry(prediction.probable_condition.label().to_string())
                    .or_default() += 1;
            }
            RiskLabel::Low => self.low += 1,
        }
    }
}

fn summary_line(row: usize, prediction: &RiskPrediction) -> String {
    format!(
        "#{row:<4} p={:.3} {:?} -> {} ({}, {} rules)",
        prediction.risk_probability,
        prediction.risk_label,
        prediction.probable_condition,
        prediction.confidence_level.as_str(),
        prediction.triggered_rules.len()
    )
}
