use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Hex SHA-256 digest of a canonical serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// JSON with object keys sorted at every depth.
pub fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(value)?;
    serde_json::to_string(&sort_keys(value))
}

pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash, serde_json::Error> {
    let canonical = canonical_json(value)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(ContentHash(hex::encode(digest)))
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|(left, _), (right, _)| left.cmp(right));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key, sort_keys(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::QuestionnaireAnswers;
    use crate::workflows::intake::SubmittedEvidence;
    use std::collections::HashMap;

    #[test]
    fn hash_is_independent_of_insertion_order() {
        let mut forward = QuestionnaireAnswers::new();
        forward.insert("phone_privacy", "yes");
        forward.insert("schedule_changes", "no");
        forward.insert("social_media", "somewhat");

        let mut backward = QuestionnaireAnswers::new();
        backward.insert("social_media", "somewhat");
        backward.insert("schedule_changes", "no");
        backward.insert("phone_privacy", "yes");

        assert_eq!(
            content_hash(&forward).expect("hash"),
            content_hash(&backward).expect("hash")
        );
    }

    #[test]
    fn hash_changes_when_any_answer_changes() {
        let mut answers = QuestionnaireAnswers::new();
        answers.insert("phone_privacy", "yes");
        answers.insert("schedule_changes", "no");
        let original = content_hash(&answers).expect("hash");

        answers.insert("schedule_changes", "somewhat");
        assert_ne!(original, content_hash(&answers).expect("hash"));
    }

    #[test]
    fn hash_changes_when_free_text_details_change() {
        let mut evidence = SubmittedEvidence {
            details: Some("Receipts from a hotel in Busan dated March 3.".to_string()),
            ..SubmittedEvidence::default()
        };
        let original = content_hash(&evidence).expect("hash");

        evidence.details = Some("Receipts from a hotel in Busan dated March 4.".to_string());
        let edited = content_hash(&evidence).expect("hash");
        assert_ne!(original, edited);

        evidence.details = None;
        assert_ne!(edited, content_hash(&evidence).expect("hash"));
    }

    #[test]
    fn hash_is_sixty_four_hex_characters() {
        let hash = content_hash(&QuestionnaireAnswers::new()).expect("hash");
        assert_eq!(hash.0.len(), 64);
        assert!(hash.0.chars().all(|ch| ch.is_ascii_hexdigit()));
    }

    #[test]
    fn canonical_json_sorts_nested_hash_maps() {
        let mut inner = HashMap::new();
        inner.insert("zeta", 1);
        inner.insert("alpha", 2);
        let mut outer = HashMap::new();
        outer.insert("outer_b", inner.clone());
        outer.insert("outer_a", inner);

        assert_eq!(
            canonical_json(&outer).expect("serializes"),
            r#"{"outer_a":{"alpha":2,"zeta":1},"outer_b":{"alpha":2,"zeta":1}}"#
        );
    }
}
