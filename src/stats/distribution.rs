use std::collections::BTreeMap;

use crate::data::model::CellValue;

use super::{quantile_sorted, sorted_present};

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` ascending edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [first, second, ..] => second - first,
            _ => 1.0,
        }
    }

    /// Centre of each bin paired with its count.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

/// Equal-width histogram over the present values. The last bin includes the
/// maximum. A column of one repeated value gets a single unit-wide bin.
pub fn histogram(values: &[Option<f64>], bins: usize) -> Option<Histogram> {
    let sorted = sorted_present(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);

    if max == min {
        return Some(Histogram {
            edges: vec![min - 0.5, min + 0.5],
            counts: vec![sorted.len()],
        });
    }

    let bins = bins.max(1);
    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();
    let mut counts = vec![0usize; bins];
    for v in &sorted {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Some(Histogram { edges, counts })
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
    pub count: usize,
}

/// Tukey box: whiskers reach the most extreme values within `whisker * IQR`
/// of the box, everything beyond is an outlier.
pub fn box_stats(values: &[Option<f64>], whisker: f64) -> Option<BoxStats> {
    let sorted = sorted_present(values);
    if sorted.is_empty() {
        return None;
    }
    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - whisker * iqr;
    let hi_fence = q3 + whisker * iqr;

    let inside = sorted.iter().copied().filter(|v| (lo_fence..=hi_fence).contains(v));
    let lower_whisker = inside.clone().next().unwrap_or(q1);
    let upper_whisker = inside.last().unwrap_or(q3);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| !(lo_fence..=hi_fence).contains(v))
        .collect();

    Some(BoxStats {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
        count: sorted.len(),
    })
}

/// One box of `values` per distinct `keys` entry, ordered by key. Rows with a
/// missing key are grouped under `Null`; groups without any value are dropped.
pub fn grouped_box_stats(
    keys: &[CellValue],
    values: &[Option<f64>],
    whisker: f64,
) -> Vec<(CellValue, BoxStats)> {
    let mut groups: BTreeMap<CellValue, Vec<Option<f64>>> = BTreeMap::new();
    for (key, value) in keys.iter().zip(values) {
        groups.entry(key.clone()).or_default().push(*value);
    }
    groups
        .into_iter()
        .filter_map(|(key, vals)| box_stats(&vals, whisker).map(|b| (key, b)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn col(v: &[f64]) -> Vec<Option<f64>> {
        v.iter().copied().map(Some).collect()
    }

    #[test]
    fn histogram_counts_every_present_value() {
        let h = histogram(&[Some(0.0), Some(1.0), None, Some(2.0), Some(10.0)], 5).unwrap();
        assert_eq!(h.edges.len(), 6);
        assert_eq!(h.counts, vec![2, 1, 0, 0, 1]);
        assert!((h.bin_width() - 2.0).abs() < 1e-12);
        assert_eq!(h.bars().next(), Some((1.0, 2)));
    }

    #[test]
    fn histogram_edge_cases() {
        assert!(histogram(&[None], 20).is_none());
        let h = histogram(&col(&[4.0, 4.0]), 20).unwrap();
        assert_eq!(h.counts, vec![2]);
        assert_eq!(h.edges, vec![3.5, 4.5]);
    }

    #[test]
    fn box_flags_outliers() {
        let b = box_stats(&col(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]), 1.5).unwrap();
        assert!((b.q1 - 2.25).abs() < 1e-12);
        assert!((b.median - 3.5).abs() < 1e-12);
        assert!((b.q3 - 4.75).abs() < 1e-12);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.upper_whisker, 5.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert_eq!(b.count, 6);
    }

    #[test]
    fn groups_by_key() {
        let keys = vec![
            CellValue::String("f".into()),
            CellValue::String("m".into()),
            CellValue::String("f".into()),
        ];
        let groups = grouped_box_stats(&keys, &col(&[10.0, 20.0, 30.0]), 1.5);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, CellValue::String("f".into()));
        assert_eq!(groups[0].1.median, 20.0);
        assert_eq!(groups[1].1.count, 1);
    }
}
