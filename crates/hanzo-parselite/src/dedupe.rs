//! Batch deduplication keyed on normalized URLs

use crate::outcome::ClassifiedUrl;
use std::collections::HashMap;

/// Distinct entries in first-seen order, plus where each one came from
#[derive(Debug, Clone, Default)]
pub struct Deduplicated {
    /// One entry per distinct normalized URL
    pub entries: Vec<ClassifiedUrl>,

    /// Normalized URL -> every input index that referenced it, ascending
    pub index_map: HashMap<String, Vec<usize>>,
}

impl Deduplicated {
    /// Number of input positions covered
    pub fn input_len(&self) -> usize {
        self.index_map.values().map(Vec::len).sum()
    }

    /// Normalized URL for each input position
    pub fn normalized_by_index(&self) -> Vec<Option<&str>> {
        let mut slots = vec![None; self.input_len()];
        for (url, indices) in &self.index_map {
            for &index in indices {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(url.as_str());
                }
            }
        }
        slots
    }
}

/// Drop repeated normalized URLs without reordering distinct ones
pub fn dedupe(classified: Vec<ClassifiedUrl>) -> Deduplicated {
    let mut deduped = Deduplicated::default();

    for entry in classified {
        match deduped.index_map.get_mut(&entry.normalized_url) {
            Some(indices) => indices.push(entry.original_index),
            None => {
                deduped
                    .index_map
                    .insert(entry.normalized_url.clone(), vec![entry.original_index]);
                deduped.entries.push(entry);
            }
        }
    }

    deduped
}
