use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::questionnaire::{Question, ResponseLevel, QUESTIONS};

/// Named scoring presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreProfileKind {
    Standard,
    Conservative,
}

impl ScoreProfileKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" | "default" => Some(Self::Standard),
            "conservative" => Some(Self::Conservative),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreProfileKind::Standard => "standard",
            ScoreProfileKind::Conservative => "conservative",
        }
    }

    pub fn profile(&self) -> ScoreProfile {
        match self {
            ScoreProfileKind::Standard => ScoreProfile::standard(),
            ScoreProfileKind::Conservative => ScoreProfile::conservative(),
        }
    }
}

/// Point table, rescale target, jitter, and clamp bounds for the scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreProfile {
    pub kind: ScoreProfileKind,
    pub questions: Vec<Question>,
    pub points: BTreeMap<String, u32>,
    pub scale: f64,
    pub jitter: i32,
    pub floor: u8,
    pub ceiling: u8,
}

impl ScoreProfile {
    /// 0/5/10 points, ±5 jitter, clamped to [5, 98].
    pub fn standard() -> Self {
        Self::with_points(ScoreProfileKind::Standard, [0, 5, 10], 5, 5, 98)
    }

    /// 0/3/7 points, ±3 jitter, clamped to [15, 95].
    pub fn conservative() -> Self {
        Self::with_points(ScoreProfileKind::Conservative, [0, 3, 7], 3, 15, 95)
    }

    fn with_points(kind: ScoreProfileKind, points: [u32; 3], jitter: i32, floor: u8, ceiling: u8) -> Self {
        let points = ResponseLevel::ALL
            .iter()
            .zip(points)
            .map(|(level, value)| (level.label().to_string(), value))
            .collect();

        Self {
            kind,
            questions: QUESTIONS.to_vec(),
            points,
            scale: 95.0,
            jitter,
            floor,
            ceiling,
        }
    }

    /// Points for a label; unknown labels are worth nothing.
    pub fn points_for(&self, label: &str) -> u32 {
        self.points
            .get(label.trim().to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn max_total(&self) -> u32 {
        let top = self.points.values().copied().max().unwrap_or(0);
        top.saturating_mul(self.questions.len() as u32)
    }

    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<(&str, u32)> = self
            .points
            .iter()
            .map(|(label, points)| (label.as_str(), *points))
            .collect();
        labels.sort_by_key(|(_, points)| *points);
        labels.into_iter().map(|(label, _)| label).collect()
    }
}
