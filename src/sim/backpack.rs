/// Backpack: picked-up item names and how many of each.
/// Counts only grow; the whole backpack is dropped on restart.

use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct Backpack {
    counts: BTreeMap<String, u32>,
}

impl Backpack {
    pub fn new() -> Self {
        Backpack::default()
    }

    /// Count one more `name`, starting at 1.
    pub fn add(&mut self, name: &str) {
        *self.counts.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, name: &str) -> u32 {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// (name, count) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accumulate_per_name() {
        let mut bp = Backpack::new();
        assert!(bp.is_empty());
        bp.add("Peach");
        bp.add("Mace");
        bp.add("Peach");
        assert_eq!(bp.count("Peach"), 2);
        assert_eq!(bp.count("Mace"), 1);
        assert_eq!(bp.count("Chainmail"), 0);
        assert_eq!(bp.iter().collect::<Vec<_>>(), vec![("Mace", 1), ("Peach", 2)]);
    }
}
