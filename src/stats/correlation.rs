/// Square matrix of Pearson coefficients between named columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    /// `values[i][j]` is the coefficient of `labels[i]` against `labels[j]`;
    /// NaN where it is undefined.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.labels.iter().position(|l| l == a)?;
        let j = self.labels.iter().position(|l| l == b)?;
        Some(self.values[i][j])
    }
}

/// Pearson correlation over the rows where both sides are present.
/// NaN with fewer than two such rows or when either side is constant.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in &pairs {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

pub fn correlation_matrix(columns: &[(&str, &[Option<f64>])]) -> CorrelationMatrix {
    let labels = columns.iter().map(|(name, _)| name.to_string()).collect();
    let values = columns
        .iter()
        .map(|(_, x)| columns.iter().map(|(_, y)| pearson(x, y)).collect())
        .collect();
    CorrelationMatrix { labels, values }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfectly_linear_columns() {
        let a = [Some(1.0), Some(2.0), Some(3.0)];
        let b = [Some(2.0), Some(4.0), Some(6.0)];
        let c = [Some(3.0), Some(2.0), Some(1.0)];
        let m = correlation_matrix(&[("a", &a), ("b", &b), ("c", &c)]);
        assert!((m.get("a", "b").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("a", "c").unwrap() + 1.0).abs() < 1e-12);
        assert!((m.get("c", "c").unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(m.values.len(), 3);
    }

    #[test]
    fn uses_pairwise_complete_rows() {
        let a = [Some(1.0), None, Some(3.0), Some(5.0)];
        let b = [Some(1.0), Some(100.0), Some(3.0), Some(5.0)];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn undefined_for_constant_or_tiny_inputs() {
        assert!(pearson(&[Some(1.0), Some(1.0)], &[Some(2.0), Some(3.0)]).is_nan());
        assert!(pearson(&[Some(1.0)], &[Some(2.0)]).is_nan());
    }
}
