/// Canonical form of a medication name as used for the exact-match key.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Round a similarity score to 3 decimal places.
pub fn round_score(score: f32) -> f64 {
    (f64::from(score) * 1000.0).round() / 1000.0
}
