//! Small numeric routines behind subsampling and alignment.

/// `n_keep` indices evenly spaced over `[0, n_total - 1]`, first and last included.
/// Fractional positions truncate toward zero, so indices may repeat when
/// `n_keep > n_total`.
pub fn evenly_spaced_indices(n_total: usize, n_keep: usize) -> Vec<usize> {
    if n_total == 0 || n_keep == 0 {
        return Vec::new();
    }
    if n_keep == 1 {
        return vec![0];
    }
    let last = n_total - 1;
    let step = last as f64 / (n_keep - 1) as f64;
    (0..n_keep)
        .map(|i| if i == n_keep - 1 { last } else { (i as f64 * step) as usize })
        .collect()
}

/// Sorted union of every value in `seqs` with duplicates collapsed.
pub fn sorted_unique<'a, I>(seqs: I) -> Vec<f64>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut out: Vec<f64> = seqs.into_iter().flatten().copied().collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}

/// Clamped linear interpolation of `(xp, fp)` at `x`.
///
/// Queries before the first sample return the first value, queries after the
/// last return the last value. With repeated timestamps the last sample at or
/// before `x` anchors the segment. An empty trace yields `0.0`.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return 0.0;
    }
    let xp = &xp[..n];
    let j = xp.partition_point(|&t| t <= x);
    if j == 0 {
        return fp[0];
    }
    segment(x, xp, fp, j - 1)
}

/// [`interp`] at every point of an ascending `axis`, in one forward pass.
pub fn interp_onto(axis: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return vec![0.0; axis.len()];
    }
    let xp = &xp[..n];
    let mut out = Vec::with_capacity(axis.len());
    // Number of samples with xp <= x for the current query.
    let mut seen = 0usize;
    for &x in axis {
        while seen < n && xp[seen] <= x {
            seen += 1;
        }
        out.push(if seen == 0 { fp[0] } else { segment(x, xp, fp, seen - 1) });
    }
    out
}

#[inline]
fn segment(x: f64, xp: &[f64], fp: &[f64], j: usize) -> f64 {
    if j + 1 >= xp.len() {
        return fp[xp.len() - 1];
    }
    if x == xp[j] {
        return fp[j];
    }
    let slope = (fp[j + 1] - fp[j]) / (xp[j + 1] - xp[j]);
    fp[j] + slope * (x - xp[j])
}

/// Index of the sample closest to `x`, or `None` when `x` lies outside
/// `[xp[0], xp[last]]`. Ties resolve to the earliest such sample.
pub fn nearest_index(x: f64, xp: &[f64]) -> Option<usize> {
    let (&first, &last) = (xp.first()?, xp.last()?);
    if x < first || x > last {
        return None;
    }
    let hi = xp.partition_point(|&t| t < x);
    if hi == 0 {
        return Some(0);
    }
    if hi == xp.len() {
        return Some(xp.partition_point(|&t| t < xp[hi - 1]));
    }
    let below = xp[hi - 1];
    let lo = xp.partition_point(|&t| t < below);
    if (x - below).abs() <= (xp[hi] - x).abs() {
        Some(lo)
    } else {
        Some(hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evenly_spaced_indices() {
        assert_eq!(evenly_spaced_indices(10, 5), vec![0, 2, 4, 6, 9]);
        assert_eq!(evenly_spaced_indices(10, 10), (0..10).collect::<Vec<_>>());
        assert_eq!(evenly_spaced_indices(10, 1), vec![0]);
        assert_eq!(evenly_spaced_indices(3, 5), vec![0, 0, 1, 1, 2]);
        assert!(evenly_spaced_indices(0, 5).is_empty());
        assert!(evenly_spaced_indices(5, 0).is_empty());
    }

    #[test]
    fn test_sorted_unique() {
        let a = [2.0, 0.0, 1.0];
        let b = [1.0, 3.0, 3.0];
        assert_eq!(sorted_unique([&a[..], &b[..]]), vec![0.0, 1.0, 2.0, 3.0]);
        assert!(sorted_unique(std::iter::empty::<&[f64]>()).is_empty());
    }

    #[test]
    fn test_interp_clamped() {
        let xp = [1.0, 2.0, 4.0];
        let fp = [10.0, 20.0, 0.0];
        assert_eq!(interp(0.0, &xp, &fp), 10.0);
        assert_eq!(interp(1.0, &xp, &fp), 10.0);
        assert_eq!(interp(1.5, &xp, &fp), 15.0);
        assert_eq!(interp(2.0, &xp, &fp), 20.0);
        assert_eq!(interp(3.0, &xp, &fp), 10.0);
        assert_eq!(interp(4.0, &xp, &fp), 0.0);
        assert_eq!(interp(9.0, &xp, &fp), 0.0);
        assert_eq!(interp(5.0, &[3.0], &[7.0]), 7.0);
        assert_eq!(interp(5.0, &[], &[]), 0.0);
    }

    #[test]
    fn test_interp_repeated_timestamps() {
        let xp = [0.0, 1.0, 1.0, 2.0];
        let fp = [0.0, 5.0, 7.0, 9.0];
        assert_eq!(interp(1.0, &xp, &fp), 7.0);
        assert_eq!(interp(1.5, &xp, &fp), 8.0);
        assert_eq!(interp(0.5, &xp, &fp), 2.5);
    }

    #[test]
    fn test_interp_onto_matches_pointwise() {
        let xp = [0.0, 1.0, 1.0, 2.5, 4.0];
        let fp = [3.0, 1.0, 2.0, 6.0, -1.0];
        let axis = [-1.0, 0.0, 0.5, 1.0, 2.0, 2.5, 3.0, 4.0, 5.0];
        let onto = interp_onto(&axis, &xp, &fp);
        for (x, v) in axis.iter().zip(&onto) {
            assert_eq!(*v, interp(*x, &xp, &fp), "mismatch at {}", x);
        }
        assert_eq!(interp_onto(&axis, &[], &[]), vec![0.0; axis.len()]);
    }

    #[test]
    fn test_nearest_index() {
        let xp = [0.0, 1.0, 1.0, 3.0];
        assert_eq!(nearest_index(-0.1, &xp), None);
        assert_eq!(nearest_index(3.1, &xp), None);
        assert_eq!(nearest_index(0.0, &xp), Some(0));
        assert_eq!(nearest_index(0.4, &xp), Some(0));
        assert_eq!(nearest_index(0.5, &xp), Some(0));
        assert_eq!(nearest_index(1.0, &xp), Some(1));
        assert_eq!(nearest_index(1.9, &xp), Some(1));
        assert_eq!(nearest_index(2.5, &xp), Some(3));
        assert_eq!(nearest_index(3.0, &xp), Some(3));
    }
}
