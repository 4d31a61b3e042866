//! Small descriptive statistics used by the chart builders.

use std::collections::HashMap;

use crate::data::model::Categories;

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Percentile of an ascending slice with linear interpolation between the
/// closest ranks. `p` is a fraction in `[0, 1]`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = idx - lo as f64;
    Some(sorted[lo] * (1.0 - frac) + sorted[hi] * frac)
}

/// Minimum, first quartile, median, third quartile and maximum.
pub fn five_number_summary(values: &[f64]) -> Option<[f64; 5]> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some([
        *sorted.first()?,
        percentile(&sorted, 0.25)?,
        percentile(&sorted, 0.50)?,
        percentile(&sorted, 0.75)?,
        *sorted.last()?,
    ])
}

/// Pearson product-moment correlation. `None` when either side has zero
/// variance or the lengths differ.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;
    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some((cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0))
}

/// Frequency of each distinct label, descending by count, ties in order of
/// first appearance.
pub fn value_counts<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, u64)> = Vec::new();
    for label in labels {
        let next = counts.len();
        let i = *index.entry(label).or_insert(next);
        if i == next {
            counts.push((label, 0));
        }
        counts[i].1 += 1;
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(label, n)| (label.to_string(), n))
        .collect()
}

/// Mean of `values` per category, in label-domain order.
pub fn grouped_means(categories: &Categories, values: &[i64]) -> Vec<(String, f64)> {
    let mut sums = vec![(0.0_f64, 0_u64); categories.labels.len()];
    for (&code, &v) in categories.codes.iter().zip(values) {
        let slot = &mut sums[code as usize];
        slot.0 += v as f64;
        slot.1 += 1;
    }
    categories
        .labels
        .iter()
        .zip(sums)
        .filter(|(_, (_, n))| *n > 0)
        .map(|(label, (sum, n))| (label.clone(), sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn five_numbers_are_monotonic() {
        let samples: [&[f64]; 4] = [
            &[7.0],
            &[3.0, -1.0],
            &[5.0, 1.0, 9.0, 2.0, 2.0, 8.0],
            &[-4.0, 100.0, 0.5, 0.25, 17.0, 3.0, 3.0],
        ];
        for values in samples {
            let s = five_number_summary(values).unwrap();
            assert!(s.windows(2).all(|w| w[0] <= w[1]), "{s:?}");
        }
        assert!(five_number_summary(&[]).is_none());
    }

    #[test]
    fn pearson_known_values() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let z = [5.0, 4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&x, &x).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&x, &z).unwrap() + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&x, &[2.0; 5]), None);
    }

    #[test]
    fn value_counts_order() {
        let counts = value_counts(["b", "a", "b", "c", "a", "b"].into_iter());
        assert_eq!(
            counts,
            vec![("b".into(), 3), ("a".into(), 2), ("c".into(), 1)]
        );
        let ties = value_counts(["z", "y", "x"].into_iter());
        assert_eq!(ties[0].0, "z");
        assert_eq!(ties[2].0, "x");
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(20.04, 1), 20.0);
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-2.25, 1), -2.3);
    }
}
