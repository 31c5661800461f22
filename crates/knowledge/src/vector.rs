//! Vector similarity utilities.
//!
//! Pure-Rust cosine similarity and top-k ranking over embedded documents.

use dualchat_core::knowledge::Document;

use crate::IndexedDocument;

/// Compute cosine similarity between two vectors.
///
/// Returns a value in [-1, 1] where 1 = identical, 0 = orthogonal, -1 = opposite.
/// Returns 0.0 if either vector is zero-length or empty, or if the result
/// is not finite.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = *x as f64;
        let y = *y as f64;
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 {
        return 0.0;
    }

    let sim = dot / denom;
    if sim.is_finite() { sim as f32 } else { 0.0 }
}

/// Rank entries by cosine similarity to a query embedding.
///
/// Returns at most `k` documents sorted by descending similarity, with
/// `score` set to the cosine value. Ties keep index order.
pub fn top_k(entries: &[IndexedDocument], query: &[f32], k: usize) -> Vec<Document> {
    let mut scored: Vec<(f32, &IndexedDocument)> = entries
        .iter()
        .map(|entry| (cosine_similarity(&entry.embedding, query), entry))
        .collect();

    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.truncate(k);
    scored
        .into_iter()
        .map(|(score, entry)| {
            let mut doc = entry.document.clone();
            doc.score = score;
            doc
        })
        .collect()
}
