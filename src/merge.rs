use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, trace};
use rustc_hash::FxHashMap;

use crate::link::{LinkKey, TargetLink};
use crate::sorts;

/// Merge overlapping, orientation-compatible links into non-overlapping
/// representatives.
///
/// Links are processed in canonical sort order. Each one is folded into any
/// already-merged entry it overlaps on both sides with matching strands, and the
/// search is repeated with the narrowed link until nothing else overlaps it.
/// Intervals only shrink; split-read counts add and read-pair counts take the
/// maximum (see [`TargetLink::merge`]).
///
/// The output is ordered by [`TargetLink::sort_key`] and does not depend on the
/// input order.
pub fn deduplicate<I>(links: I) -> Vec<TargetLink>
where
    I: IntoIterator<Item = TargetLink>,
{
    let start = Instant::now();

    let mut pending: Vec<TargetLink> = links.into_iter().collect();
    let input_len = pending.len();
    sorts::sort_links(&mut pending);

    // Only links on the same left contig with the same strands can merge.
    // Invariant: no two entries of a group are mergeable with each other.
    let mut groups: FxHashMap<MergeGroup, BTreeMap<LinkKey, TargetLink>> = FxHashMap::default();
    for link in pending {
        let mut current = link;
        loop {
            let merged = groups.entry(group_of(&current)).or_default();
            let folded = find_overlapping(merged, &current)
                .and_then(|key| Some((key, merged.get(&key)?.merge(&current)?)));
            match folded {
                Some((key, narrowed)) => {
                    merged.remove(&key);
                    trace!("Merged {current} into {narrowed}");
                    current = narrowed;
                }
                None => {
                    merged.insert(current.sort_key(), current);
                    break;
                }
            }
        }
    }

    let mut out: Vec<TargetLink> = groups
        .into_values()
        .flat_map(|merged| merged.into_values())
        .collect();
    sorts::sort_links(&mut out);
    debug!(
        "Deduplicated {} candidate links into {} in {:?}",
        input_len,
        out.len(),
        start.elapsed()
    );
    out
}

type MergeGroup = (i32, bool, bool);

fn group_of(link: &TargetLink) -> MergeGroup {
    (link.left().contig(), link.left_forward(), link.right_forward())
}

/// Deduplicate links produced independently per genome partition.
///
/// A breakpoint link can straddle a partition seam, so the combined output of
/// all partitions goes through [`deduplicate`] once more.
pub fn reconcile_partitions<P>(partitions: P) -> Vec<TargetLink>
where
    P: IntoIterator<Item = Vec<TargetLink>>,
{
    let mut n_partitions = 0;
    let links: Vec<TargetLink> = partitions
        .into_iter()
        .inspect(|_| n_partitions += 1)
        .flatten()
        .collect();
    debug!("Reconciling {} links from {} partitions", links.len(), n_partitions);
    deduplicate(links)
}

/// First entry, in key order, that `link` can merge with.
///
/// Only entries on the same left contig starting no later than `link.left.end`
/// can overlap it on the left side.
fn find_overlapping(
    merged: &BTreeMap<LinkKey, TargetLink>,
    link: &TargetLink,
) -> Option<LinkKey> {
    let left = link.left();
    let (contig, end) = (left.contig(), left.end());
    let lower: LinkKey = (contig, i64::MIN, i64::MIN, i32::MIN, i64::MIN, i64::MIN, false, false);
    let upper: LinkKey = (contig, end, i64::MAX, i32::MAX, i64::MAX, i64::MAX, true, true);
    merged
        .range(lower..=upper)
        .find(|(_, entry)| entry.is_mergeable_with(link))
        .map(|(key, _)| *key)
}
