//! Canonical ordering for keys of unordered collections.
//!
//! Anything that iterates a map and affects output goes through here first, so
//! the same document always produces the same type model.

use std::cmp::Ordering;

const TIMESTAMP_SUFFIX: &str = "_at";

/// `id` first, then plain keys, then `*_at` keys; byte order inside each group.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    let a_id = a.eq_ignore_ascii_case("id");
    let b_id = b.eq_ignore_ascii_case("id");
    let a_at = a.ends_with(TIMESTAMP_SUFFIX);
    let b_at = b.ends_with(TIMESTAMP_SUFFIX);

    b_id.cmp(&a_id)
        .then_with(|| a_at.cmp(&b_at))
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// Stable in-place sort with [`compare_keys`].
pub fn sort_keys<K: AsRef<str>>(keys: &mut [K]) {
    keys.sort_by(|a, b| compare_keys(a.as_ref(), b.as_ref()));
}

/// Collects map keys into canonical order.
pub fn sorted_keys<'a, K, I>(keys: I) -> Vec<&'a K>
where
    K: AsRef<str> + ?Sized + 'a,
    I: IntoIterator<Item = &'a K>,
{
    let mut keys: Vec<&K> = keys.into_iter().collect();
    keys.sort_by(|a, b| compare_keys((*a).as_ref(), (*b).as_ref()));
    keys
}
