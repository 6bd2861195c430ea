use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One entry of the fixed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
}

pub const QUESTIONS: &[Question] = &[
    Question {
        id: "phone_privacy",
        prompt: "Has their phone become noticeably more private?",
    },
    Question {
        id: "schedule_changes",
        prompt: "Have late nights or weekend absences increased without a clear reason?",
    },
    Question {
        id: "spending_patterns",
        prompt: "Have you noticed unexplained charges or cash withdrawals?",
    },
    Question {
        id: "emotional_distance",
        prompt: "Has emotional or physical closeness declined?",
    },
    Question {
        id: "appearance_focus",
        prompt: "Has there been a sudden new focus on appearance?",
    },
    Question {
        id: "defensiveness",
        prompt: "Do ordinary questions about their day trigger defensiveness?",
    },
    Question {
        id: "social_media",
        prompt: "Have their social media habits changed?",
    },
];

/// Three-way response scale shared by every question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseLevel {
    No,
    Somewhat,
    Yes,
}

impl ResponseLevel {
    pub const ALL: [ResponseLevel; 3] = [ResponseLevel::No, ResponseLevel::Somewhat, ResponseLevel::Yes];

    pub fn label(&self) -> &'static str {
        match self {
            ResponseLevel::No => "no",
            ResponseLevel::Somewhat => "somewhat",
            ResponseLevel::Yes => "yes",
        }
    }
}

/// Answers keyed by question id. Keys outside the questionnaire and labels
/// outside the scale are retained; they simply earn no points.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionnaireAnswers(BTreeMap<String, String>);

/// Unanswered questions arrive as `null`; those and any non-string values are
/// treated as not answered.
impl<'de> Deserialize<'de> for QuestionnaireAnswers {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
        Ok(Self(
            raw.into_iter()
                .filter_map(|(question, answer)| match answer {
                    Value::String(label) => Some((question, label)),
                    _ => None,
                })
                .collect(),
        ))
    }
}

impl QuestionnaireAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every known question answered with the same level.
    pub fn uniform(level: ResponseLevel) -> Self {
        QUESTIONS
            .iter()
            .map(|question| (question.id, level.label()))
            .collect()
    }

    pub fn insert(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.0.insert(question.into(), answer.into());
    }

    pub fn get(&self, question: &str) -> Option<&str> {
        self.0.get(question).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for QuestionnaireAnswers
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unanswered_and_non_text_entries_are_dropped() {
        let answers: QuestionnaireAnswers = serde_json::from_str(
            r#"{"phone_privacy": "yes", "schedule_changes": null, "social_media": 2, "defensiveness": false}"#,
        )
        .expect("answers parse");

        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("phone_privacy"), Some("yes"));
        assert_eq!(answers.get("schedule_changes"), None);
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert!(serde_json::from_str::<QuestionnaireAnswers>(r#"["yes"]"#).is_err());
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let answers: QuestionnaireAnswers = [("phone_privacy", "no")].into_iter().collect();
        assert_eq!(
            serde_json::to_value(&answers).expect("serializes"),
            serde_json::json!({"phone_privacy": "no"})
        );
    }
}
