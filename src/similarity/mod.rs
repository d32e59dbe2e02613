//! Cosine similarity and best-match selection over cached embeddings.

use tracing::{trace, warn};

/// A candidate that met the similarity threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestMatch {
    /// Position of the candidate in scan order.
    pub index: usize,
    /// Cosine similarity against the query embedding.
    pub similarity: f32,
}

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Returns `0.0` for empty or mismatched inputs and when either vector has zero norm,
/// so a degenerate embedding can never meet a positive threshold.
#[inline]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    // f64 accumulation keeps 1536-dim sums stable near the threshold.
    let (dot, norm_a_sq, norm_b_sq) =
        a.iter()
            .zip(b.iter())
            .fold((0.0f64, 0.0f64, 0.0f64), |(dot, na, nb), (&av, &bv)| {
                let av = av as f64;
                let bv = bv as f64;
                (dot + av * bv, na + av * av, nb + bv * bv)
            });

    let norm_a = norm_a_sq.sqrt();
    let norm_b = norm_b_sq.sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        (dot / (norm_a * norm_b)) as f32
    }
}

/// Returns `true` when `similarity` is close enough to count as a hit.
#[inline]
pub fn meets_threshold(similarity: f32, threshold: f32) -> bool {
    similarity >= threshold
}

/// Picks the candidate with the highest similarity that is `>= threshold`.
///
/// Candidates are visited in the order given. A later candidate only replaces the
/// current best when strictly more similar, so ties go to the earliest one.
/// Candidates whose length differs from the query are skipped.
pub fn best_match<'a, I>(query: &[f32], candidates: I, threshold: f32) -> Option<BestMatch>
where
    I: IntoIterator<Item = &'a [f32]>,
{
    let mut best: Option<BestMatch> = None;

    for (index, candidate) in candidates.into_iter().enumerate() {
        if candidate.len() != query.len() {
            warn!(
                index,
                expected_dim = query.len(),
                actual_dim = candidate.len(),
                "Skipping cached entry: embedding dimension mismatch"
            );
            continue;
        }

        let similarity = cosine_similarity(query, candidate);
        trace!(index, similarity, "Compared against cached entry");

        if !meets_threshold(similarity, threshold) {
            continue;
        }

        match best {
            Some(current) if similarity <= current.similarity => {}
            _ => best = Some(BestMatch { index, similarity }),
        }
    }

    best
}

#[cfg(test)]
mod tests;
