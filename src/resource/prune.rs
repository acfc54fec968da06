//! Column pruning for section tables

use super::normalize::NormalizedAttributes;

/// Drop columns that carry no information anywhere in `content`.
///
/// A header survives iff at least one item has a non-sentinel value for it.
/// Surviving items keep only the surviving keys.
pub fn prune(
    headers: &[String],
    content: &[NormalizedAttributes],
) -> (Vec<String>, Vec<NormalizedAttributes>) {
    let kept: Vec<String> = headers
        .iter()
        .filter(|h| content.iter().any(|item| item.has_value(h)))
        .cloned()
        .collect();

    let pruned = content
        .iter()
        .map(|item| item.retain_keys(|k| kept.iter().any(|h| h == k)))
        .collect();

    (kept, pruned)
}
