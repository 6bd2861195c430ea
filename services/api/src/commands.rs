use std::path::PathBuf;

use aura_insight::error::AppError;
use aura_insight::workflows::assessment::{QuestionnaireAnswers, RiskScorer, ScoreProfileKind};
use aura_insight::workflows::partners::{
    normalize_directory, sample_unique, AgencyRecord, DirectoryError, DirectorySource,
    FileDirectorySource, HttpDirectorySource,
};
use clap::Args;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Questionnaire answer as `question_id=label` (repeatable)
    #[arg(long = "answer", value_parser = parse_answer, required = true)]
    pub(crate) answers: Vec<(String, String)>,
    /// Scoring profile (`standard` or `conservative`)
    #[arg(long, default_value = "standard", value_parser = parse_profile)]
    pub(crate) profile: ScoreProfileKind,
    /// Seed for reproducible jitter
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct PartnerSampleArgs {
    /// Directory JSON file on disk
    #[arg(long, required_unless_present = "url", conflicts_with = "url")]
    pub(crate) file: Option<PathBuf>,
    /// Published directory URL
    #[arg(long)]
    pub(crate) url: Option<String>,
    /// Number of agencies to draw
    #[arg(long, default_value_t = 3)]
    pub(crate) count: usize,
    /// Seed for a reproducible draw
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (question, label) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected question_id=label, got '{raw}'"))?;
    let question = question.trim();
    let label = label.trim();
    if question.is_empty() || label.is_empty() {
        return Err(format!("expected question_id=label, got '{raw}'"));
    }
    Ok((question.to_string(), label.to_string()))
}

pub(crate) fn parse_profile(raw: &str) -> Result<ScoreProfileKind, String> {
    ScoreProfileKind::parse(raw)
        .ok_or_else(|| format!("unknown score profile '{raw}' (expected standard or conservative)"))
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        answers,
        profile,
        seed,
    } = args;

    let answers: QuestionnaireAnswers = answers.into_iter().collect();
    let scorer = RiskScorer::new(profile.profile());
    let breakdown = scorer.score(&answers, &mut rng_from(seed));

    println!("Risk assessment ({} profile)", profile.label());
    for component in &breakdown.components {
        println!(
            "  - {}: {} ({} pts)",
            component.question,
            component.answer.as_deref().unwrap_or("unanswered"),
            component.points
        );
    }
    println!(
        "Raw total {}/{} -> base {} | jitter {:+} | score {}%",
        breakdown.raw_total,
        breakdown.max_total,
        breakdown.base,
        breakdown.jitter,
        breakdown.score.value()
    );

    let unknown: Vec<&str> = answers
        .iter()
        .map(|(question, _)| question)
        .filter(|question| !scorer.profile().questions.iter().any(|known| known.id == *question))
        .collect();
    if !unknown.is_empty() {
        println!("Ignored unknown questions: {}", unknown.join(", "));
    }

    Ok(())
}

pub(crate) async fn run_partner_sample(args: PartnerSampleArgs) -> Result<(), AppError> {
    let source: Box<dyn DirectorySource> = match (&args.file, &args.url) {
        (Some(path), _) => Box::new(FileDirectorySource::new(path.clone())),
        (None, Some(url)) => Box::new(HttpDirectorySource::from_current(url.clone())?),
        (None, None) => {
            return Err(DirectoryError::Transport("no directory source given".to_string()).into())
        }
    };

    let entries = tokio::task::spawn_blocking(move || source.fetch())
        .await
        .map_err(|err| DirectoryError::Runtime(err.to_string()))??;
    let agencies = normalize_directory(&entries);

    let picked = sample_unique(agencies.as_slice(), args.count, &mut rng_from(args.seed));
    render_sample(&agencies, &picked);
    Ok(())
}

fn render_sample(agencies: &[AgencyRecord], picked: &[AgencyRecord]) {
    let total_weight: f64 = agencies.iter().map(|agency| agency.weight).sum();
    println!(
        "Partner directory: {} agencies (total weight {:.1})",
        agencies.len(),
        total_weight
    );

    if picked.is_empty() {
        println!("No partner agencies are available right now.");
        return;
    }

    println!("Recommended partners:");
    for (rank, agency) in picked.iter().enumerate() {
        println!(
            "  {}. {} (weight {:.1}) | {} | {}",
            rank + 1,
            agency.name,
            agency.weight,
            agency.phone,
            agency.url
        );
        println!("     {}", agency.description);
    }
}
