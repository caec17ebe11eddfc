use std::{cmp::Ordering, collections::HashMap};

use sba_search::Candidate;

/// Union candidate batches from multiple indexes into one ranked pool.
///
/// Duplicates share an `(index, doc_id)` key; the record with the strictly
/// higher vector score wins, and exact ties keep the first-seen record. The
/// final stable sort preserves first-seen order among equal scores.
pub fn merge(batches: Vec<Vec<Candidate>>) -> Vec<Candidate> {
	let mut pool: Vec<Candidate> = Vec::new();
	let mut slots: HashMap<(String, String), usize> = HashMap::new();

	for candidate in batches.into_iter().flatten() {
		let key = (candidate.index.clone(), candidate.doc_id.clone());
		match slots.get(&key) {
			Some(&slot) => {
				if candidate.vector_score > pool[slot].vector_score {
					pool[slot] = candidate;
				}
			},
			None => {
				slots.insert(key, pool.len());
				pool.push(candidate);
			},
		}
	}

	pool.sort_by(|a, b| {
		b.vector_score.partial_cmp(&a.vector_score).unwrap_or(Ordering::Equal)
	});

	pool
}
