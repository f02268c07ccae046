//! Small utilities: streaming combinations and geometric dedup helpers.

use std::cmp::Ordering;

use nalgebra::DVector;

/// Call `f` with every k-subset of `0..n` (lexicographic, increasing indices).
///
/// Subsets are streamed; nothing is materialized beyond the current index buffer.
pub(crate) fn for_each_combination<F: FnMut(&[usize])>(n: usize, k: usize, mut f: F) {
    if k == 0 || k > n {
        return;
    }
    let mut idxs: Vec<usize> = (0..k).collect();
    loop {
        f(&idxs);
        // advance the rightmost index that still has room
        let mut i = k;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if idxs[i] != i + n - k {
                break;
            }
            if i == 0 {
                return;
            }
        }
        idxs[i] += 1;
        for j in i + 1..k {
            idxs[j] = idxs[j - 1] + 1;
        }
    }
}

/// Lexicographic order on coordinates; NaN compares equal.
pub(crate) fn lex_cmp(a: &DVector<f64>, b: &DVector<f64>) -> Ordering {
    for (x, y) in a.iter().zip(b.iter()) {
        match x.partial_cmp(y).unwrap_or(Ordering::Equal) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

/// Points closer than `tol * max(1, |a|)` are the same point.
#[inline]
pub(crate) fn same_point(a: &DVector<f64>, b: &DVector<f64>, tol: f64) -> bool {
    (a - b).norm() <= tol * a.norm().max(1.0)
}
