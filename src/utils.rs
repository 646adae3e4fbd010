/// Create a string of all available items.
pub fn items_to_strings(items: &[&str]) -> String {
    items.join(", ")
}

/// Round a value to a fixed number of decimal places.
#[inline]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Percentage of `part` in `whole`, `None` if `whole` is zero.
#[inline]
pub fn percentage(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        None
    } else {
        Some(part as f64 / whole as f64 * 100.0)
    }
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sq_dev = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    (sq_dev / n).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.33333, 2), 33.33);
        assert_eq!(round_to(66.666666, 2), 66.67);
        assert_eq!(round_to(12.34567, 4), 12.3457);
        assert_eq!(round_to(49.99, 1), 50.0);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 4), Some(25.0));
        assert_eq!(percentage(0, 3), Some(0.0));
        assert_eq!(percentage(3, 0), None);
    }

    #[test]
    fn test_population_std_dev() {
        assert_eq!(population_std_dev(&[100.0, 0.0]), 50.0);
        assert_eq!(population_std_dev(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(population_std_dev(&[]), 0.0);
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(population_std_dev(&v), 2.0);
    }

    #[test]
    fn test_items_to_strings() {
        assert_eq!(items_to_strings(&["a", "b"]), "a, b");
    }
}
