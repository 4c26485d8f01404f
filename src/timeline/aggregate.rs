use super::merge::{CurrentStateVector, MergedTimeline};
use crate::model::SeriesRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    Total,
    ByLanguage,
}

/// Turns per-repository state into output rows.
///
/// In [`AggregationMode::Total`] with comments included, the second column is
/// `code + comments`, not the comment count alone: the columns are meant to
/// be drawn as stacked areas, largest first.
#[derive(Debug, Clone)]
pub struct Aggregator {
    mode: AggregationMode,
    include_comments: bool,
    languages: Vec<String>,
}

impl Aggregator {
    pub fn new(mode: AggregationMode, include_comments: bool, languages: Vec<String>) -> Self {
        Self {
            mode,
            include_comments,
            languages,
        }
    }

    pub fn columns(&self) -> Vec<String> {
        match self.mode {
            AggregationMode::Total if self.include_comments => {
                vec!["Code".to_string(), "Comments".to_string()]
            }
            AggregationMode::Total => vec!["Code".to_string()],
            AggregationMode::ByLanguage => self.languages.clone(),
        }
    }

    pub fn aggregate(&self, state: &CurrentStateVector<'_>) -> Vec<u64> {
        match self.mode {
            AggregationMode::Total => self.totals(state),
            AggregationMode::ByLanguage => self.per_language(state),
        }
    }

    pub fn rows(&self, timeline: &MergedTimeline<'_>) -> Vec<SeriesRow> {
        timeline
            .states()
            .map(|(timestamp, state)| SeriesRow {
                timestamp,
                values: self.aggregate(&state),
            })
            .collect()
    }

    fn totals(&self, state: &CurrentStateVector<'_>) -> Vec<u64> {
        let (code, comment) = state
            .present()
            .flat_map(|snapshot| snapshot.iter())
            .fold((0u64, 0u64), |(code, comment), (_, metric)| {
                (code + metric.code_lines, comment + metric.comment_lines)
            });

        if self.include_comments {
            vec![code, code + comment]
        } else {
            vec![code]
        }
    }

    fn per_language(&self, state: &CurrentStateVector<'_>) -> Vec<u64> {
        self.languages
            .iter()
            .map(|language| {
                state
                    .present()
                    .filter_map(|snapshot| snapshot.get(language))
                    .map(|metric| {
                        if self.include_comments {
                            metric.code_lines + metric.comment_lines
                        } else {
                            metric.code_lines
                        }
                    })
                    .sum::<u64>()
            })
            .collect()
    }
}
