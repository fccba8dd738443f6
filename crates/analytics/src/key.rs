use serde::{Deserialize, Serialize};

/// An ordered tuple of dimension values addressing one aggregation bucket.
///
/// The value order follows the dimension order of the aggregation call, so a
/// `(broker, sub-elevation, grade)` aggregation yields keys whose `BTreeMap`
/// ordering groups every bucket of a broker contiguously — which is exactly
/// the nesting order reports walk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AggregationKey(Vec<String>);

impl AggregationKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// The dimension value at position `index` of the key tuple.
    pub fn value(&self, index: usize) -> &str {
        &self.0[index]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AggregationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" / "))
    }
}

impl<const N: usize> From<[&str; N]> for AggregationKey {
    fn from(values: [&str; N]) -> Self {
        Self(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_groups_shared_prefixes_together() {
        let mut keys = vec![
            AggregationKey::from(["FW", "HIGH GROWN", "BOPF"]),
            AggregationKey::from(["MPB", "LOW GROWN", "BP1"]),
            AggregationKey::from(["FW", "HIGH GROWN", "BOP"]),
            AggregationKey::from(["MPB", "HIGH GROWN", "BP1"]),
        ];
        keys.sort();
        let brokers: Vec<&str> = keys.iter().map(|k| k.value(0)).collect();
        assert_eq!(brokers, ["FW", "FW", "MPB", "MPB"]);
    }

    #[test]
    fn display_joins_values() {
        let key = AggregationKey::from(["MPB", "LOW GROWN"]);
        assert_eq!(key.to_string(), "MPB / LOW GROWN");
    }
}
