use crate::model::Timestamp;

pub const SECONDS_PER_DAY: i64 = 86_400;

/// Calendar day (UTC) a timestamp falls on, counted from the unix epoch.
pub fn day_index(timestamp: Timestamp) -> i64 {
    timestamp.div_euclid(SECONDS_PER_DAY)
}

/// Keeps the first item of every calendar day in a chronological stream.
#[derive(Debug, Clone, Default)]
pub struct Sparsifier {
    last_day: Option<i64>,
}

impl Sparsifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether an item at `timestamp` starts a new day and should be kept.
    pub fn keep(&mut self, timestamp: Timestamp) -> bool {
        let day = day_index(timestamp);
        match self.last_day {
            Some(last) if day - last < 1 => false,
            _ => {
                self.last_day = Some(day);
                true
            }
        }
    }
}

/// Reduces `items` to at most one per calendar day, keeping the first of each day.
pub fn sparsify<T, F>(items: impl IntoIterator<Item = T>, timestamp_of: F) -> Vec<T>
where
    F: Fn(&T) -> Timestamp,
{
    let mut sparsifier = Sparsifier::new();
    items
        .into_iter()
        .filter(|item| sparsifier.keep(timestamp_of(item)))
        .collect()
}
