pub fn l2_norm(v: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for x in v {
        sum += x * x;
    }
    sum.sqrt()
}

pub fn cosine_similarity(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    let mut dot = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
    }
    dot / (a_norm * b_norm)
}

pub fn cosine_distance(a: &[f32], b: &[f32], a_norm: f32, b_norm: f32) -> f32 {
    1.0 - cosine_similarity(a, b, a_norm, b_norm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_direction_has_zero_distance() {
        let a = [3.0, 4.0];
        let b = [6.0, 8.0];
        let d = cosine_distance(&a, &b, l2_norm(&a), l2_norm(&b));
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let a = [1.0, 0.0];
        let b = [0.0, 2.0];
        let d = cosine_distance(&a, &b, l2_norm(&a), l2_norm(&b));
        assert!((d - 1.0).abs() < 1e-6);
    }
}
