//! Generic ordering primitives: a stable merge sort and a sorted-slice search,
//! both parameterized by a key-extraction function.
//!
//! Every ranked view in the aggregation engine (top stations, top users, top
//! routes, the chronological monthly trend) and the station-name lookup go
//! through these two functions, so their contracts are load-bearing:
//!
//! - the sort is stable (equal keys keep their input order), which is what
//!   makes "ties broken by first-encountered order" deterministic downstream;
//! - the search returns the **first** element whose key equals the target,
//!   so duplicate keys resolve deterministically as well.

/// Stable merge sort over a slice, ordered by the extracted key.
///
/// Returns a new vector with the same elements in non-decreasing key order.
/// Elements with equal keys retain their original relative order. Slices of
/// length <= 1 come back unchanged.
pub fn merge_sort_by_key<T, K, F>(items: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    sort_slice(items, &key)
}

fn sort_slice<T, K, F>(items: &[T], key: &F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    if items.len() <= 1 {
        return items.to_vec();
    }

    let mid = items.len() / 2;
    let left = sort_slice(&items[..mid], key);
    let right = sort_slice(&items[mid..], key);
    merge(&left, &right, key)
}

fn merge<T, K, F>(left: &[T], right: &[T], key: &F) -> Vec<T>
where
    T: Clone,
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut li = 0;
    let mut ri = 0;

    while li < left.len() && ri < right.len() {
        // <= takes the left element on ties; this is the stability guarantee
        if key(&left[li]) <= key(&right[ri]) {
            merged.push(left[li].clone());
            li += 1;
        } else {
            merged.push(right[ri].clone());
            ri += 1;
        }
    }

    merged.extend_from_slice(&left[li..]);
    merged.extend_from_slice(&right[ri..]);
    merged
}

/// Binary search over a slice the caller guarantees is already sorted by the
/// same key function (e.g. by [`merge_sort_by_key`]).
///
/// Returns the first element whose extracted key equals `target`, or `None`.
/// If the slice is not actually sorted by `key`, the result is unspecified
/// (any element or `None` may come back) but the call still completes without
/// panicking. The precondition is the caller's contract, not a runtime check.
pub fn binary_search_by_key<'a, T, K, F>(sorted: &'a [T], target: &K, key: F) -> Option<&'a T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    // Lower bound: first index whose key is >= target.
    let mut lo = 0;
    let mut hi = sorted.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if key(&sorted[mid]) < *target {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }

    let candidate = sorted.get(lo)?;
    if key(candidate) == *target {
        Some(candidate)
    } else {
        None
    }
}
