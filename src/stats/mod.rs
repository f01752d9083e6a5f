/// Statistics over classified score columns.
///
/// All functions take `&[Option<f64>]` columns straight from a
/// [`ScoreTable`](crate::data::model::ScoreTable) and skip missing values.
pub mod correlation;
pub mod distribution;
pub mod predictor;
pub mod regression;

// ---------------------------------------------------------------------------
// Descriptive summary
// ---------------------------------------------------------------------------

/// Count, moments and quartiles of one column.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub median: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl Summary {
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Rows of the summary table in display order.
    pub fn rows(&self) -> [(&'static str, Option<f64>); 8] {
        let values = [
            Some(self.count as f64),
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.median,
            self.q75,
            self.max,
        ];
        std::array::from_fn(|i| (Self::LABELS[i], values[i]))
    }
}

/// Present values sorted ascending.
pub fn sorted_present(values: &[Option<f64>]) -> Vec<f64> {
    let mut present: Vec<f64> = values.iter().flatten().copied().collect();
    present.sort_by(f64::total_cmp);
    present
}

/// Quantile with linear interpolation between closest ranks.
/// `sorted` must be ascending and non-empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn describe(values: &[Option<f64>]) -> Summary {
    let sorted = sorted_present(values);
    let count = sorted.len();
    if count == 0 {
        return Summary::default();
    }

    let mean = mean(&sorted);
    let std = match (mean, count) {
        (Some(m), n) if n > 1 => {
            let ss: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
            Some((ss / (n - 1) as f64).sqrt())
        }
        _ => None,
    };

    Summary {
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: Some(quantile_sorted(&sorted, 0.25)),
        median: Some(quantile_sorted(&sorted, 0.5)),
        q75: Some(quantile_sorted(&sorted, 0.75)),
        max: sorted.last().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn describe_skips_missing_values() {
        let s = describe(&[Some(1.0), None, Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.std, (5.0f64 / 3.0).sqrt()));
        assert!(close(s.min, 1.0));
        assert!(close(s.q25, 1.75));
        assert!(close(s.median, 2.5));
        assert!(close(s.q75, 3.25));
        assert!(close(s.max, 4.0));
    }

    #[test]
    fn describe_of_nothing_is_empty() {
        let s = describe(&[None, None]);
        assert_eq!(s, Summary::default());
        assert_eq!(s.rows()[0], ("count", Some(0.0)));
    }

    #[test]
    fn single_value_has_no_spread() {
        let s = describe(&[Some(7.0)]);
        assert_eq!(s.count, 1);
        assert_eq!(s.std, None);
        assert!(close(s.median, 7.0));
    }
}
