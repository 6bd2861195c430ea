use rand::Rng;
use serde::{Deserialize, Serialize};

use super::profile::{ScoreProfile, ScoreProfileKind};
use super::questionnaire::QuestionnaireAnswers;

/// Final risk figure, always inside the active profile's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiskScore(pub u8);

impl RiskScore {
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Points earned by one question, kept for audits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerPoints {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub profile: ScoreProfileKind,
    pub components: Vec<AnswerPoints>,
    pub raw_total: u32,
    pub max_total: u32,
    pub base: u8,
    pub jitter: i32,
    pub score: RiskScore,
}

/// Stateless scorer applying a [`ScoreProfile`] to questionnaire answers.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    profile: ScoreProfile,
}

impl RiskScorer {
    pub fn new(profile: ScoreProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ScoreProfile {
        &self.profile
    }

    pub fn score<R>(&self, answers: &QuestionnaireAnswers, rng: &mut R) -> ScoreBreakdown
    where
        R: Rng + ?Sized,
    {
        let components: Vec<AnswerPoints> = self
            .profile
            .questions
            .iter()
            .map(|question| {
                let answer = answers.get(question.id);
                AnswerPoints {
                    question: question.id.to_string(),
                    answer: answer.map(str::to_string),
                    points: answer.map(|label| self.profile.points_for(label)).unwrap_or(0),
                }
            })
            .collect();

        let raw_total: u32 = components.iter().map(|component| component.points).sum();
        let max_total = self.profile.max_total();
        let base = if max_total == 0 {
            0.0
        } else {
            f64::from(raw_total) / f64::from(max_total) * self.profile.scale
        };
        let base = base.round().clamp(0.0, 100.0) as u8;

        let spread = self.profile.jitter.abs();
        let jitter = if spread == 0 {
            0
        } else {
            rng.gen_range(-spread..=spread)
        };

        ScoreBreakdown {
            profile: self.profile.kind,
            components,
            raw_total,
            max_total,
            base,
            jitter,
            score: self.clamp(i64::from(base) + i64::from(jitter)),
        }
    }

    /// Pins an arbitrary figure into the profile's inclusive bounds.
    pub fn clamp(&self, value: i64) -> RiskScore {
        let floor = i64::from(self.profile.floor);
        let ceiling = i64::from(self.profile.ceiling.max(self.profile.floor));
        RiskScore(value.clamp(floor, ceiling) as u8)
    }
}
