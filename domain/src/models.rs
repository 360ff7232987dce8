use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Raw metadata map attached to a vector in the index.
pub type Metadata = BTreeMap<String, Value>;

/// Metadata keys written by the ingestion job.
pub mod fields {
    pub const GENERIC_NAME: &str = "generic_name";
    pub const FULL_NAME: &str = "full_name";
    pub const DRUG_CLASS: &str = "drug_class";
    pub const BRAND_NAMES: &str = "brand_names";
    pub const RX_OTC: &str = "rx_otc";
    pub const PREGNANCY: &str = "pregnancy";
    pub const CSA: &str = "csa";
    pub const ALCOHOL: &str = "alcohol";
    pub const RATING: &str = "rating";
}

/// One item of an index response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    pub id: String,
    /// Similarity score; absent for filter-only lookups.
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl RawMatch {
    pub fn record(&self) -> MedicationRecord {
        MedicationRecord::from_metadata(&self.metadata)
    }
}

/// Typed view of a medication's index metadata.
///
/// Every field is optional: the index does not enforce a schema, so callers
/// decide whether a missing field is an error (formatter) or gets a default
/// (definition enricher).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    /// Lower-cased single-ingredient name; the exact-match key.
    pub generic_name: Option<String>,
    /// Original (possibly combination) name the record was split from.
    pub full_name: Option<String>,
    pub drug_class: Option<String>,
    pub brand_names: Option<String>,
    pub rx_otc: Option<String>,
    pub pregnancy: Option<String>,
    pub csa: Option<String>,
    pub alcohol: Option<String>,
    pub rating: Option<String>,
}

impl MedicationRecord {
    /// Non-string values are rendered as JSON text, so booleans read `true`/`false`.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let text = |key: &str| metadata.get(key).and_then(metadata_text);
        Self {
            generic_name: text(fields::GENERIC_NAME),
            full_name: text(fields::FULL_NAME),
            drug_class: text(fields::DRUG_CLASS),
            brand_names: text(fields::BRAND_NAMES),
            rx_otc: text(fields::RX_OTC),
            pregnancy: text(fields::PREGNANCY),
            csa: text(fields::CSA),
            alcohol: text(fields::ALCOHOL),
            rating: text(fields::RATING),
        }
    }

    pub fn to_metadata(&self) -> Metadata {
        let pairs = [
            (fields::GENERIC_NAME, &self.generic_name),
            (fields::FULL_NAME, &self.full_name),
            (fields::DRUG_CLASS, &self.drug_class),
            (fields::BRAND_NAMES, &self.brand_names),
            (fields::RX_OTC, &self.rx_otc),
            (fields::PREGNANCY, &self.pregnancy),
            (fields::CSA, &self.csa),
            (fields::ALCOHOL, &self.alcohol),
            (fields::RATING, &self.rating),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| {
                value
                    .as_ref()
                    .map(|v| (key.to_string(), Value::String(v.clone())))
            })
            .collect()
    }
}

fn metadata_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Flat, serializable result row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub generic_name: String,
    pub drug_class: String,
    pub alcohol: String,
    pub pregnancy: String,
    pub csa: String,
}

/// Outcome of a retrieval, tagged by the phase that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "results", rename_all = "lowercase")]
pub enum QueryOutcome {
    /// Metadata filter hit on the generic name; results carry no score.
    Exact(Vec<FormattedResult>),
    /// Nearest-neighbour fallback; results are ranked and scored.
    Semantic(Vec<FormattedResult>),
}

impl QueryOutcome {
    pub fn mode(&self) -> &'static str {
        match self {
            QueryOutcome::Exact(_) => "exact",
            QueryOutcome::Semantic(_) => "semantic",
        }
    }

    pub fn results(&self) -> &[FormattedResult] {
        match self {
            QueryOutcome::Exact(results) | QueryOutcome::Semantic(results) => results,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub definition: String,
}
