//! Case-insensitive label counting and relative-frequency tables.
//!
//! Both tables remember the order in which keys were first seen. That order
//! is observable: [`crate::contrast::rank_difference`] breaks ties by it.

use crate::error::AnalysisError;
use rustc_hash::FxHashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Insertion-ordered string-keyed table.
#[derive(Clone, Debug, Default)]
struct OrderedTable<V> {
    index: FxHashMap<String, usize>,
    keys: Vec<String>,
    values: Vec<V>,
}

impl<V: Copy> OrderedTable<V> {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            keys: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn slot(&mut self, key: String, init: V) -> &mut V {
        let idx = match self.index.get(&key) {
            Some(&idx) => idx,
            None => {
                let idx = self.keys.len();
                self.index.insert(key.clone(), idx);
                self.keys.push(key);
                self.values.push(init);
                idx
            }
        };
        &mut self.values[idx]
    }

    fn get(&self, key: &str) -> Option<V> {
        self.index.get(key).map(|&idx| self.values[idx])
    }

    fn iter(&self) -> impl Iterator<Item = (&str, V)> + '_ {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    fn len(&self) -> usize {
        self.keys.len()
    }
}

impl<V: Copy + PartialEq> PartialEq for OrderedTable<V> {
    fn eq(&self, other: &Self) -> bool {
        self.keys == other.keys && self.values == other.values
    }
}

impl<V: Copy + Serialize> OrderedTable<V> {
    fn serialize_ordered<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, &v)?;
        }
        map.end()
    }
}

/// Occurrence counts keyed by lowercased label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrequencyTable {
    table: OrderedTable<u64>,
    total: u64,
}

impl FrequencyTable {
    /// Count `labels` case-insensitively. Never fails; the result may be empty.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let iter = labels.into_iter();
        let mut table = OrderedTable::with_capacity(iter.size_hint().0);
        let mut total = 0u64;
        for label in iter {
            *table.slot(label.as_ref().to_lowercase(), 0) += 1;
            total += 1;
        }
        Self { table, total }
    }

    /// Count for `key`. Lookups are case-insensitive like the counting.
    pub fn get(&self, key: &str) -> Option<u64> {
        self.table.get(&key.to_lowercase())
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.table.iter()
    }

    /// The `n` most frequent keys, count descending, ties in first-seen order.
    pub fn most_common(&self, n: usize) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(n);
        entries
    }

    /// Normalise counts into relative frequencies.
    ///
    /// Fails with [`AnalysisError::EmptyInput`] when nothing was counted.
    pub fn probabilities(&self) -> Result<ProbabilityTable, AnalysisError> {
        if self.total == 0 {
            return Err(AnalysisError::empty("frequency table"));
        }
        let total = self.total as f64;
        let mut table = OrderedTable::with_capacity(self.len());
        for (k, count) in self.iter() {
            *table.slot(k.to_string(), 0.0) = count as f64 / total;
        }
        Ok(ProbabilityTable { table })
    }
}

impl Serialize for FrequencyTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.table.serialize_ordered(serializer)
    }
}

/// Relative frequency of each key within one bucket.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbabilityTable {
    table: OrderedTable<f64>,
}

impl ProbabilityTable {
    /// Probability for `key`. Lookups are case-insensitive, the same as
    /// [`FrequencyTable::get`].
    pub fn get(&self, key: &str) -> Option<f64> {
        self.table.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.table.iter()
    }

    /// Sum of all probabilities (≈ 1.0 for tables built from counts).
    pub fn mass(&self) -> f64 {
        self.table.values.iter().sum()
    }
}

/// Build a table from explicit pairs. Keys are lowercased; a repeated key
/// keeps its first position and takes the last value.
impl<S: AsRef<str>> FromIterator<(S, f64)> for ProbabilityTable {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut table = OrderedTable::default();
        for (k, p) in iter {
            *table.slot(k.as_ref().to_lowercase(), 0.0) = p;
        }
        Self { table }
    }
}

impl Serialize for ProbabilityTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.table.serialize_ordered(serializer)
    }
}

/// Count `labels` and normalise them in one step.
pub fn build_tables<I, S>(labels: I) -> Result<(FrequencyTable, ProbabilityTable), AnalysisError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let freq = FrequencyTable::from_labels(labels);
    let prob = freq.probabilities()?;
    Ok((freq, prob))
}
