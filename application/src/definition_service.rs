use crate::resources::Resources;
use domain::codes::{csa_description, pregnancy_risk};
use domain::models::{Definition, MedicationRecord};
use domain::ports::IndexQuery;
use futures::stream::{self, StreamExt, TryStreamExt};
use shared::types::{MedMateError, Result};
use shared::utils::normalize_name;
use std::sync::Arc;

pub const DEFAULT_TOP_K: usize = 1;
pub const NO_DEFINITION: &str = "No definition available.";

/// Names looked up at once; results still come back in input order.
const CONCURRENCY: usize = 8;

/// Renders a readable definition for each medication name from its best
/// semantic match.
#[derive(Clone)]
pub struct DefinitionService {
    resources: Arc<Resources>,
}

impl DefinitionService {
    pub fn new(resources: Arc<Resources>) -> Self {
        Self { resources }
    }

    /// One entry per input name, in input order, duplicates included.
    pub async fn get_definitions(&self, names: &[String], top_k: usize) -> Result<Vec<Definition>> {
        if top_k == 0 {
            return Err(MedMateError::InvalidQuery("top_k must be at least 1".into()));
        }
        stream::iter(names.iter().map(|name| self.define(name, top_k)))
            .buffered(CONCURRENCY)
            .try_collect()
            .await
    }

    async fn define(&self, name: &str, top_k: usize) -> Result<Definition> {
        let embedding = self.resources.embedder().embed(&normalize_name(name)).await?;
        let matches = self
            .resources
            .index()
            .query(&IndexQuery::by_vector(
                embedding,
                top_k,
                self.resources.namespace(),
            ))
            .await?;

        let definition = match matches.first() {
            Some(best) => describe_record(name, &best.record()),
            None => {
                tracing::debug!(name, "no definition match");
                NO_DEFINITION.to_string()
            }
        };
        Ok(Definition {
            name: name.to_string(),
            definition,
        })
    }
}

/// Multi-line description of `record`, with missing fields defaulted.
pub fn describe_record(name: &str, record: &MedicationRecord) -> String {
    let generic_name = record.generic_name.as_deref().unwrap_or(name);
    let drug_class = record.drug_class.as_deref().unwrap_or("Unknown class");
    let brand_names = record.brand_names.as_deref().unwrap_or("");
    let rx_otc = record.rx_otc.as_deref().unwrap_or("Unknown");
    let rating = record.rating.as_deref().unwrap_or("Not rated");
    let pregnancy = record.pregnancy.as_deref().unwrap_or("N");
    let csa = record.csa.as_deref().unwrap_or("U");
    let alcohol = record.alcohol.as_deref().unwrap_or("");

    format!(
        "{generic_name} belongs to the drug class {drug_class}.\n\
         It is available under the following brand names: {brand_names}.\n\
         This medication is classified as {rx_otc}, with a user-reported effectiveness rating of {rating}/10.\n\
         Pregnancy category: {pregnancy} — {}\n\
         CSA Schedule: {csa} — {}\n\
         Alcohol Interaction Warning: {alcohol}",
        pregnancy_risk(pregnancy),
        csa_description(csa),
    )
    .trim()
    .to_string()
}
