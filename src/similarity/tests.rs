use super::*;

fn unit_at_angle(cos: f32) -> Vec<f32> {
    vec![cos, (1.0 - cos * cos).sqrt()]
}

#[test]
fn test_identical_vectors() {
    let v = vec![0.3, -1.2, 4.5, 0.0];
    let sim = cosine_similarity(&v, &v);
    assert!((sim - 1.0).abs() < 1e-6, "got {}", sim);
}

#[test]
fn test_orthogonal_vectors() {
    let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
    assert!(sim.abs() < 1e-6);
}

#[test]
fn test_opposite_vectors() {
    let sim = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]);
    assert!((sim + 1.0).abs() < 1e-6);
}

#[test]
fn test_scale_invariance() {
    let a = vec![1.0, 2.0, 3.0];
    let b = vec![10.0, 20.0, 30.0];
    assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-6);
}

#[test]
fn test_zero_vector_is_zero_similarity() {
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 0.0]), 0.0);
    assert_eq!(cosine_similarity(&[0.0, 0.0], &[0.0, 0.0]), 0.0);
}

#[test]
fn test_empty_and_mismatched_inputs() {
    assert_eq!(cosine_similarity(&[], &[]), 0.0);
    assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
}

#[test]
fn test_meets_threshold_is_inclusive() {
    assert!(meets_threshold(0.85, 0.85));
    assert!(meets_threshold(0.90, 0.85));
    assert!(!meets_threshold(0.849_999, 0.85));
}

#[test]
fn test_best_match_empty_candidates() {
    let query = vec![1.0, 0.0];
    let candidates: Vec<&[f32]> = Vec::new();
    assert_eq!(best_match(&query, candidates, 0.85), None);
}

#[test]
fn test_best_match_picks_highest() {
    let query = vec![1.0, 0.0];
    let low = unit_at_angle(0.86);
    let high = unit_at_angle(0.95);
    let mid = unit_at_angle(0.90);

    let found = best_match(
        &query,
        [low.as_slice(), high.as_slice(), mid.as_slice()],
        0.85,
    )
    .expect("should match");

    assert_eq!(found.index, 1);
    assert!((found.similarity - 0.95).abs() < 1e-4);
}

#[test]
fn test_best_match_below_threshold() {
    let query = vec![1.0, 0.0];
    let unrelated = unit_at_angle(0.10);
    assert_eq!(best_match(&query, [unrelated.as_slice()], 0.85), None);
}

#[test]
fn test_best_match_boundary_is_hit() {
    let query = vec![0.3, 0.7, 0.1];
    let candidate = vec![0.5, 0.2, 0.9];
    let exact = cosine_similarity(&query, &candidate);

    let at_boundary = best_match(&query, [candidate.as_slice()], exact);
    assert_eq!(at_boundary.map(|m| m.index), Some(0));

    let above_boundary = best_match(&query, [candidate.as_slice()], exact + 1e-6);
    assert_eq!(above_boundary, None);
}

#[test]
fn test_best_match_tie_goes_to_first() {
    let query = vec![1.0, 0.0];
    let a = unit_at_angle(0.9);
    let b = a.clone();
    let c = a.clone();

    let found = best_match(&query, [a.as_slice(), b.as_slice(), c.as_slice()], 0.85)
        .expect("should match");
    assert_eq!(found.index, 0);
}

#[test]
fn test_best_match_skips_dimension_mismatch() {
    let query = vec![1.0, 0.0];
    let wrong_dim = vec![1.0, 0.0, 0.0];
    let right = unit_at_angle(0.9);

    let found = best_match(&query, [wrong_dim.as_slice(), right.as_slice()], 0.85)
        .expect("should match the valid candidate");
    assert_eq!(found.index, 1);
}

#[test]
fn test_best_match_zero_query_never_hits() {
    let query = vec![0.0, 0.0];
    let candidate = vec![0.0, 0.0];
    assert_eq!(best_match(&query, [candidate.as_slice()], 0.85), None);
}
