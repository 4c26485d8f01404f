use crate::error::{LoctrendError, Result};
use crate::model::{LanguageMetric, Snapshot};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct TokeiLanguage {
    #[serde(default)]
    code: u64,
    #[serde(default)]
    comments: u64,
}

/// Parses `tokei --output json` output. The `Total` entry is dropped and
/// languages come out in name order.
pub fn parse(output: &[u8]) -> Result<Snapshot> {
    let languages: BTreeMap<String, TokeiLanguage> = serde_json::from_slice(output)
        .map_err(|e| LoctrendError::Tool(format!("unreadable tokei output: {e}")))?;

    Ok(languages
        .into_iter()
        .filter(|(name, _)| name != "Total")
        .map(|(name, l)| (name, LanguageMetric::new(l.code, l.comments)))
        .collect())
}
