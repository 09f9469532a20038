//! Ascending sort for unsigned 32-bit keys.
//!
//! Three regimes, picked by input length: tiny slices use insertion sort,
//! medium slices an in-place MSD radix sort in base 256, and large slices a
//! split/merge pass that radix-sorts disjoint sub-slices on worker threads
//! and merges the results pairwise. Whatever the regime, the caller gets the
//! sorted result back in the slice it passed in.
//!
//! Equal keys may be reordered; the radix phase is not stable.

/// Largest slice handled purely by insertion sort.
pub const INSERTION_MAX: usize = 64;

/// Largest slice handled by the single-threaded radix path (1 MiB of keys).
pub const RADIX_MAX: usize = 1024 * 1024 / core::mem::size_of::<u32>();

/// Levels of the split phase; `2^MERGE_MAX_DEPTH` leaf tasks at most.
pub const MERGE_MAX_DEPTH: usize = 3;

/// Sort `values` ascending in place.
pub fn sort(values: &mut [u32]) {
    if values.len() <= INSERTION_MAX {
        insertion(values);
    } else if values.len() <= RADIX_MAX {
        radix(values, 24);
    } else {
        sort_large(values);
    }
}

#[cfg(feature = "parallel")]
fn sort_large(values: &mut [u32]) {
    let mut scratch = vec![0u32; values.len()];
    sort_in_place(values, &mut scratch, 0);
}

/// Single-threaded builds take the radix path at every size.
#[cfg(not(feature = "parallel"))]
fn sort_large(values: &mut [u32]) {
    radix(values, 24);
}

fn insertion(values: &mut [u32]) {
    for i in 1..values.len() {
        let mut j = i;
        while j > 0 && values[j - 1] > values[j] {
            values.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// In-place MSD radix sort of one digit, recursing into each bucket.
///
/// `shift` selects the digit: 24 for the most significant byte down to 0 for
/// the least. Buckets small enough to make the counting pass a loss fall
/// back to insertion sort.
fn radix(values: &mut [u32], shift: u32) {
    let digit = |v: u32| ((v >> shift) & 0xFF) as usize;

    let mut counts = [0usize; 256];
    for &v in values.iter() {
        counts[digit(v)] += 1;
    }

    let mut starts = [0usize; 256];
    let mut ends = [0usize; 256];
    let mut total = 0;
    for b in 0..256 {
        starts[b] = total;
        total += counts[b];
        ends[b] = total;
    }

    // Cycle-following permutation: walk each bucket's window and swap every
    // misplaced value directly into its home bucket's next free slot.
    let mut free = starts;
    for b in 0..256 {
        while free[b] != ends[b] {
            let mut value = values[free[b]];
            let mut home = digit(value);
            while home != b {
                let displaced = values[free[home]];
                values[free[home]] = value;
                free[home] += 1;
                value = displaced;
                home = digit(value);
            }
            values[free[b]] = value;
            free[b] += 1;
        }
    }

    if shift > 0 {
        for b in 0..256 {
            let bucket = &mut values[starts[b]..ends[b]];
            if bucket.len() > INSERTION_MAX {
                radix(bucket, shift - 8);
            } else if bucket.len() > 1 {
                insertion(bucket);
            }
        }
    }
}

/// Sort `a`, leaving the result in `a`; `b` is disjoint scratch of equal
/// length. Mutually recursive with [`sort_into`] so that each merge writes
/// into the buffer the parent expects, with no extra copy on the way up.
#[cfg(feature = "parallel")]
fn sort_in_place(a: &mut [u32], b: &mut [u32], depth: usize) {
    if depth == MERGE_MAX_DEPTH || a.len() <= RADIX_MAX {
        radix(a, 24);
        return;
    }
    let mid = a.len() / 2;
    let (a_lo, a_hi) = a.split_at_mut(mid);
    let (b_lo, b_hi) = b.split_at_mut(mid);
    rayon::join(
        || sort_into(&mut *a_lo, &mut *b_lo, depth + 1),
        || sort_into(&mut *a_hi, &mut *b_hi, depth + 1),
    );
    merge(b_lo, b_hi, a);
}

/// Sort `a`, leaving the result in `b`.
#[cfg(feature = "parallel")]
fn sort_into(a: &mut [u32], b: &mut [u32], depth: usize) {
    if depth == MERGE_MAX_DEPTH || a.len() <= RADIX_MAX {
        radix(a, 24);
        b.copy_from_slice(a);
        return;
    }
    let mid = a.len() / 2;
    let (a_lo, a_hi) = a.split_at_mut(mid);
    let (b_lo, b_hi) = b.split_at_mut(mid);
    rayon::join(
        || sort_in_place(&mut *a_lo, &mut *b_lo, depth + 1),
        || sort_in_place(&mut *a_hi, &mut *b_hi, depth + 1),
    );
    merge(a_lo, a_hi, b);
}

/// Stable two-pointer merge of sorted `lo` and `hi` into `out`.
#[cfg(feature = "parallel")]
fn merge(lo: &[u32], hi: &[u32], out: &mut [u32]) {
    debug_assert_eq!(lo.len() + hi.len(), out.len());
    let (mut i, mut j) = (0, 0);
    for slot in out.iter_mut() {
        if j >= hi.len() || (i < lo.len() && lo[i] <= hi[j]) {
            *slot = lo[i];
            i += 1;
        } else {
            *slot = hi[j];
            j += 1;
        }
    }
}
