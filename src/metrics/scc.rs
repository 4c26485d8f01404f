use crate::error::{LoctrendError, Result};
use crate::model::{LanguageMetric, Snapshot};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SccLanguage {
    name: String,
    #[serde(default)]
    code: u64,
    #[serde(default)]
    comment: u64,
}

/// Parses `scc --format json` output. Languages keep the array order.
pub fn parse(output: &[u8]) -> Result<Snapshot> {
    let languages: Option<Vec<SccLanguage>> = serde_json::from_slice(output)
        .map_err(|e| LoctrendError::Tool(format!("unreadable scc output: {e}")))?;

    Ok(languages
        .unwrap_or_default()
        .into_iter()
        .map(|l| (l.name, LanguageMetric::new(l.code, l.comment)))
        .collect())
}
