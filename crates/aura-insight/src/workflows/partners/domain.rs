use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const DESCRIPTION_PLACEHOLDER: &str = "Partner details are shared during consultation.";
pub(crate) const PHONE_PLACEHOLDER: &str = "Contact via website";
pub(crate) const URL_PLACEHOLDER: &str = "#";
pub(crate) const DEFAULT_WEIGHT: f64 = 1.0;

/// Anything the sampler can draw by weight.
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Normalized partner agency. `weight` is always finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyRecord {
    pub name: String,
    pub description: String,
    pub phone: String,
    pub url: String,
    pub weight: f64,
}

impl Weighted for AgencyRecord {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Agency picked for a visitor along with the justification shown to them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub agency: AgencyRecord,
    pub reason: String,
}

/// Directory entry as published upstream. Every field is kept loose so a single
/// malformed value never rejects the whole list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAgency {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub desc: Option<Value>,
    /// Long-form spelling some directories publish; `desc` wins when both are set.
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub url: Option<Value>,
    #[serde(default)]
    pub weight: Option<Value>,
}

impl RawAgency {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(Value::String(name.into())),
            ..Self::default()
        }
    }

    pub fn with_weight(mut self, weight: impl Into<Value>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(Value::String(desc.into()));
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(Value::String(phone.into()));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(Value::String(url.into()));
        self
    }

    /// Returns `None` when the entry has no usable name.
    pub fn normalize(&self) -> Option<AgencyRecord> {
        let name = text_value(self.name.as_ref())?;

        Some(AgencyRecord {
            name,
            description: text_value(self.desc.as_ref())
                .or_else(|| text_value(self.description.as_ref()))
                .unwrap_or_else(|| DESCRIPTION_PLACEHOLDER.to_string()),
            phone: text_value(self.phone.as_ref()).unwrap_or_else(|| PHONE_PLACEHOLDER.to_string()),
            url: text_value(self.url.as_ref()).unwrap_or_else(|| URL_PLACEHOLDER.to_string()),
            weight: weight_value(self.weight.as_ref()),
        })
    }
}

fn text_value(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn weight_value(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(weight) if weight.is_finite() && weight > 0.0 => weight,
        _ => DEFAULT_WEIGHT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_receive_placeholders() {
        let record = RawAgency::named("Seoul Trace").normalize().expect("named");

        assert_eq!(record.description, DESCRIPTION_PLACEHOLDER);
        assert_eq!(record.phone, PHONE_PLACEHOLDER);
        assert_eq!(record.url, URL_PLACEHOLDER);
        assert_eq!(record.weight, DEFAULT_WEIGHT);
    }

    #[test]
    fn non_positive_and_non_numeric_weights_default_to_one() {
        for weight in [json!(0), json!(-4.5), json!("heavy"), json!(null), json!([3])] {
            let record = RawAgency::named("A")
                .with_weight(weight.clone())
                .normalize()
                .expect("named");
            assert_eq!(record.weight, 1.0, "weight {weight} should fall back");
        }
    }

    #[test]
    fn numeric_strings_are_accepted_as_weights() {
        let record = RawAgency::named("A")
            .with_weight("7.5")
            .normalize()
            .expect("named");
        assert_eq!(record.weight, 7.5);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(RawAgency::named("   ").normalize().is_none());
        assert!(RawAgency::default().normalize().is_none());
    }

    #[test]
    fn long_form_description_is_honoured() {
        let raw: RawAgency = serde_json::from_value(json!({
            "name": "Han River Investigations",
            "description": "Licensed since 2009",
            "phone": 1588_0000
        }))
        .expect("raw agency parses");

        let record = raw.normalize().expect("named");
        assert_eq!(record.description, "Licensed since 2009");
        assert_eq!(record.phone, "15880000");
    }
}
