use rayon::prelude::*;

pub struct SearchEngine;

impl SearchEngine {
    /// Cosine similarity; zero-norm inputs score 0.0 instead of NaN.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot_product / (norm_a * norm_b)
    }

    /// Score every candidate against `query` and keep the `top_k` best,
    /// highest similarity first.
    pub fn rank<'a, T, F>(
        query: &[f32],
        candidates: &'a [T],
        vector_of: F,
        top_k: usize,
    ) -> Vec<(f32, &'a T)>
    where
        T: Sync,
        F: Fn(&T) -> &[f32] + Sync,
    {
        let mut similarities: Vec<(f32, &T)> = candidates
            .par_iter()
            .map(|candidate| (Self::cosine_similarity(query, vector_of(candidate)), candidate))
            .collect();

        similarities.sort_by(|a, b| b.0.total_cmp(&a.0));
        similarities.truncate(top_k);
        similarities
    }
}
