/// How values sharing a bucket are folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combine {
    Sum,
    Mean,
}

/// Running per-field sums and counts for one bucket. Missing values are skipped;
/// a field that never saw a value finishes as `None`.
#[derive(Debug, Clone)]
pub struct FieldAccumulator {
    sums: Vec<f64>,
    counts: Vec<usize>,
}

impl FieldAccumulator {
    pub fn new(width: usize) -> Self {
        Self {
            sums: vec![0.0; width],
            counts: vec![0; width],
        }
    }

    pub fn push<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        for (i, value) in values.into_iter().enumerate() {
            if let Some(v) = value {
                self.sums[i] += v;
                self.counts[i] += 1;
            }
        }
    }

    pub fn finish(&self, combine: Combine) -> Vec<Option<f64>> {
        self.sums
            .iter()
            .zip(&self.counts)
            .map(|(&sum, &count)| match (count, combine) {
                (0, _) => None,
                (_, Combine::Sum) => Some(sum),
                (n, Combine::Mean) => Some(sum / n as f64),
            })
            .collect()
    }
}

/// Fills interior gaps of `series` by linear interpolation on position.
///
/// Points are treated as evenly spaced, not placed by timestamp. On an hourly
/// series this equals time-based interpolation only while every day in the
/// span has its 24 slots, which holds when `fill_absent_days` is on.
///
/// Edge gaps are left as `None` unless `clamp_edges` is set.
pub fn interpolate_linear(series: &mut [Option<f64>], clamp_edges: bool) {
    let known: Vec<usize> = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();

    let (Some(&first), Some(&last)) = (known.first(), known.last()) else {
        return;
    };

    for pair in known.windows(2) {
        let (lo, hi) = (pair[0], pair[1]);
        if hi - lo < 2 {
            continue;
        }
        let (Some(a), Some(b)) = (series[lo], series[hi]) else {
            continue;
        };
        let span = (hi - lo) as f64;
        for i in lo + 1..hi {
            let t = (i - lo) as f64 / span;
            series[i] = Some(a + (b - a) * t);
        }
    }

    if clamp_edges {
        let head = series[first];
        let tail = series[last];
        series[..first].iter_mut().for_each(|v| *v = head);
        series[last + 1..].iter_mut().for_each(|v| *v = tail);
    }
}
