use clap::Args;
use eyecare_risk::error::AppError;
use eyecare_risk::inference::{
    distribute_probabilities, infer_probable_condition, score_conditions, AssessmentInput,
    ConditionProbabilities,
};

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Risk probability handed to the distributor for every profile
    #[arg(long, default_value_t = 0.8)]
    pub(crate) risk: f64,
    /// Print every condition's triggered rules, not only the winner's
    #[arg(long)]
    pub(crate) verbose: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { risk, verbose } = args;

    println!("Eyecare rule engine demo (risk probability {risk:.2}, no classifier)");
    for (name, profile) in sample_profiles() {
        println!("\n{name}");
        let scores = score_conditions(&profile);
        for candidate in scores.iter() {
            if candidate.score == 0 && !verbose {
                continue;
            }
            println!(
                "  - {}: score {}{}",
                candidate.condition,
                candidate.score,
                if verbose && !candidate.triggered_rules.is_empty() {
                    format!(" [{}]", candidate.triggered_rules.join("; "))
                } else {
                    String::new()
                }
            );
        }

        let result = infer_probable_condition(&profile);
        println!(
            "  Probable condition: {} (confidence {}, flag {:?})",
            result.probable_condition,
            result.confidence_level.as_str(),
            result.probable_condition.risk_flag()
        );
        if !result.triggered_rules.is_empty() {
            println!("  Triggered rules: {}", result.triggered_rules.join(", "));
        }

        let distribution =
            distribute_probabilities(risk, &scores, result.probable_condition.condition());
        render_distribution(&distribution);
    }

    Ok(())
}

fn render_distribution(distribution: &ConditionProbabilities) {
    println!("  Distribution:");
    for (label, probability) in distribution.iter().filter(|(_, p)| *p > 0.0) {
        println!("    {label:<20} {:>5.1}%", probability * 100.0);
    }
}

pub(crate) fn sample_profiles() -> Vec<(&'static str, AssessmentInput)> {
    vec![
        (
            "Reader in their forties",
            AssessmentInput::new()
                .with("Age", 45)
                .with("Glasses_Usage", "Yes")
                .with("Reading_Hours", 3)
                .with("Study_Hours", 4),
        ),
        (
            "Student with heavy screen use",
            AssessmentInput::new()
                .with("Age", 19)
                .with("Screen_Time_Hours", 10)
                .with("Sleep_Hours", 4.5)
                .with("Outdoor_Time_Hours", 0.5)
                .with("Water_Intake_Liters", 1.2),
        ),
        (
            "Office worker with dry air",
            AssessmentInput::new()
                .with("Age", 34)
                .with("Screen_Time_Hours", 7)
                .with("Sleep_Hours", 6)
                .with("AC_Exposure", 1)
                .with("Contact_Lens_Use", "Yes")
                .with("Outdoor_Exposure_Hours", 2.5),
        ),
        (
            "Outdoor worker prone to migraines",
            AssessmentInput::new()
                .with("Age", 28)
                .with("Migraine_History", 1)
                .with("UV_Exposure_Hours", 5)
                .with("No_Sunglasses", "Yes")
                .with("Outdoor_Exposure_Hours", 6),
        ),
        (
            "Low-signal profile",
            AssessmentInput::new()
                .with("Age", 27)
                .with("Screen_Time_Hours", 2)
                .with("Sleep_Hours", 9),
        ),
    ]
}
