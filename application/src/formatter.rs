use domain::models::{fields, FormattedResult, RawMatch};
use shared::types::{MedMateError, Result};
use shared::utils::round_score;

/// Whether result rows carry a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    /// Nearest-neighbour results: every match must have a score.
    Ranked,
    /// Filter hits: scores are dropped.
    Unranked,
}

/// Flatten raw index matches into result rows.
///
/// A match missing any required metadata field fails the whole call; no
/// defaults are substituted here.
pub fn format_results(matches: &[RawMatch], scoring: Scoring) -> Result<Vec<FormattedResult>> {
    matches.iter().map(|m| format_match(m, scoring)).collect()
}

fn format_match(raw: &RawMatch, scoring: Scoring) -> Result<FormattedResult> {
    let malformed = |field: &'static str| MedMateError::MalformedMatch {
        id: raw.id.clone(),
        field,
    };

    let score = match scoring {
        Scoring::Ranked => Some(round_score(raw.score.ok_or_else(|| malformed("score"))?)),
        Scoring::Unranked => None,
    };

    let record = raw.record();
    Ok(FormattedResult {
        score,
        generic_name: record
            .generic_name
            .ok_or_else(|| malformed(fields::GENERIC_NAME))?,
        drug_class: record
            .drug_class
            .ok_or_else(|| malformed(fields::DRUG_CLASS))?,
        alcohol: record.alcohol.ok_or_else(|| malformed(fields::ALCOHOL))?,
        pregnancy: record.pregnancy.ok_or_else(|| malformed(fields::PREGNANCY))?,
        csa: record.csa.ok_or_else(|| malformed(fields::CSA))?,
    })
}
