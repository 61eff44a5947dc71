use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use eyecare_risk::inference::StoredAssessment;
use eyecare_risk::intake::AssessmentImporter;
use eyecare_risk::risk::{RiskError, RiskLabel};
use eyecare_risk::{
    recompute_legacy_probabilities, Condition, ModelHandle, ProbableCondition,
    RiskAssessmentService,
};
use serde_json::json;

fn write_artifact(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("eyecare-risk-it-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(name);
    let artifact = json!({
        "model_version": "it-1",
        "feature_names": ["Age", "Screen_Time_Hours", "Eye_Disease_Risk"],
        "coefficients": [0.0, 1.0, 50.0],
        "intercept": -5.0,
        "imputation": [30.0, 0.0, 0.0],
    });
    fs::write(&path, artifact.to_string()).expect("write artifact");
    path
}

fn service(path: PathBuf) -> RiskAssessmentService {
    RiskAssessmentService::new(Arc::new(ModelHandle::from_path(path)), 0.5)
}

#[test]
fn csv_batch_runs_through_both_stages() {
    let service = service(write_artifact("batch.json"));
    let csv = "Age,Screen_Time_Hours,Sleep_Hours,Outdoor_Exposure_Hours,Glasses_Usage,Eye_Disease_Risk\n\
19,10,4,1,No,1\n\
52,2,8,3,Yes,1\n";

    let assessments =
        AssessmentImporter::from_csv_reader(csv.as_bytes()).expect("import succeeds");
    assert_eq!(assessments.len(), 2);

    let high = service.predict(&assessments[0]).expect("prediction");
    assert_eq!(high.risk_label, RiskLabel::High);
    assert_eq!(
        high.probable_condition,
        ProbableCondition::Condition(Condition::Myopia)
    );
    assert!((high.per_disease_probabilities.total() - 1.0).abs() < 1e-6);
    assert_eq!(high.model_version.as_deref(), Some("it-1"));

    let low = service.predict(&assessments[1]).expect("prediction");
    assert_eq!(low.risk_label, RiskLabel::Low);
    assert_eq!(low.probable_condition, ProbableCondition::NotApplicable);
    assert!(low.per_disease_probabilities.is_empty());

    assert!(service.model().is_loaded());
}

#[test]
fn missing_artifact_is_model_unavailable() {
    let path = std::env::temp_dir().join("eyecare-risk-it-missing/none.json");
    let service = service(path);

    let err = service
        .predict(&eyecare_risk::AssessmentInput::new().with("Age", 40))
        .expect_err("no artifact");
    assert!(matches!(err, RiskError::ModelUnavailable(_)));
    assert!(!service.model().is_loaded());
}

#[test]
fn stored_prediction_replays_through_legacy_path() {
    let service = service(write_artifact("replay.json"));
    let assessment = eyecare_risk::AssessmentInput::new()
        .with("Age", 45)
        .with("Screen_Time_Hours", 9)
        .with("Glasses_Usage", 1)
        .with("Reading_Hours", 3);

    let live = service.predict(&assessment).expect("prediction");
    let predicted = live.probable_condition.label();
    let confidence_score = live.risk_probability * 100.0;

    let legacy = StoredAssessment {
        assessment_id: Some("replay-1".to_string()),
        predicted_disease: Some(predicted.to_string()),
        confidence_score: Some(confidence_score),
        assessment_data: Some(serde_json::to_value(&assessment).expect("serialize input")),
        per_disease_scores: Some(json!({ predicted: 1.0 })),
        ..StoredAssessment::default()
    };

    let replayed = legacy.disease_probabilities();
    assert_eq!(
        replayed,
        recompute_legacy_probabilities(&assessment, predicted, confidence_score)
    );
    for (condition, probability) in live.per_disease_probabilities.iter() {
        let recomputed = replayed.get(condition).unwrap_or_default();
        assert!(
            (recomputed - probability).abs() < 1e-9,
            "{condition}: live {probability}, replayed {recomputed}"
        );
    }
}
