use radsort::sort_by_key;

use crate::error::{Error, Result};
use crate::evidence::{Evidence, EvidenceClass};
use crate::interval::GenomicInterval;
use crate::link::TargetLink;

/// Parallel columns describing a set of links, one row per link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkColumns {
    pub left_chrs: Vec<i32>,
    pub left_starts: Vec<i64>,
    pub left_ends: Vec<i64>,
    pub left_strands: Vec<bool>,
    pub right_chrs: Vec<i32>,
    pub right_starts: Vec<i64>,
    pub right_ends: Vec<i64>,
    pub right_strands: Vec<bool>,
    pub split_counts: Vec<u32>,
    pub pair_counts: Vec<u32>,
}

/// Sort links into canonical order: left contig, start, end, then right
/// contig, start, end, then strands.
///
/// radsort is stable, so sorting from the least significant key up yields the
/// full lexicographic order.
pub fn sort_links(links: &mut [TargetLink]) {
    sort_by_key(links, |l| l.right_forward());
    sort_by_key(links, |l| l.left_forward());
    sort_by_key(links, |l| l.right().end());
    sort_by_key(links, |l| l.right().start());
    sort_by_key(links, |l| l.right().contig());
    sort_by_key(links, |l| l.left().end());
    sort_by_key(links, |l| l.left().start());
    sort_by_key(links, |l| l.left().contig());
}

fn check_len(column: &'static str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::ColumnLength {
            column,
            expected,
            found,
        });
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn build_evidence(
    left_chrs: &[i32],
    left_starts: &[i64],
    left_ends: &[i64],
    left_strands: &[bool],
    right_chrs: &[i32],
    right_starts: &[i64],
    right_ends: &[i64],
    right_strands: &[bool],
    is_split: &[bool],
) -> Result<Vec<Evidence>> {
    let n = left_chrs.len();
    check_len("left_starts", n, left_starts.len())?;
    check_len("left_ends", n, left_ends.len())?;
    check_len("left_strands", n, left_strands.len())?;
    check_len("right_chrs", n, right_chrs.len())?;
    check_len("right_starts", n, right_starts.len())?;
    check_len("right_ends", n, right_ends.len())?;
    check_len("right_strands", n, right_strands.len())?;
    check_len("is_split", n, is_split.len())?;

    let mut evidence = Vec::with_capacity(n);
    for i in 0..n {
        let class = if is_split[i] {
            EvidenceClass::SplitRead
        } else {
            EvidenceClass::DiscordantPair
        };
        evidence.push(Evidence::new(
            GenomicInterval::try_new(left_chrs[i], left_starts[i], left_ends[i])?,
            left_strands[i],
            GenomicInterval::try_new(right_chrs[i], right_starts[i], right_ends[i])?,
            right_strands[i],
            class,
        ));
    }

    Ok(evidence)
}

#[allow(clippy::too_many_arguments)]
pub fn build_links(
    left_chrs: &[i32],
    left_starts: &[i64],
    left_ends: &[i64],
    left_strands: &[bool],
    right_chrs: &[i32],
    right_starts: &[i64],
    right_ends: &[i64],
    right_strands: &[bool],
    split_counts: &[u32],
    pair_counts: &[u32],
) -> Result<Vec<TargetLink>> {
    let n = left_chrs.len();
    check_len("left_starts", n, left_starts.len())?;
    check_len("left_ends", n, left_ends.len())?;
    check_len("left_strands", n, left_strands.len())?;
    check_len("right_chrs", n, right_chrs.len())?;
    check_len("right_starts", n, right_starts.len())?;
    check_len("right_ends", n, right_ends.len())?;
    check_len("right_strands", n, right_strands.len())?;
    check_len("split_counts", n, split_counts.len())?;
    check_len("pair_counts", n, pair_counts.len())?;

    let mut links = Vec::with_capacity(n);
    for i in 0..n {
        links.push(TargetLink::new(
            GenomicInterval::try_new(left_chrs[i], left_starts[i], left_ends[i])?,
            left_strands[i],
            GenomicInterval::try_new(right_chrs[i], right_starts[i], right_ends[i])?,
            right_strands[i],
            split_counts[i],
            pair_counts[i],
        ));
    }

    Ok(links)
}

pub fn link_columns(links: &[TargetLink]) -> LinkColumns {
    let mut columns = LinkColumns {
        left_chrs: Vec::with_capacity(links.len()),
        left_starts: Vec::with_capacity(links.len()),
        left_ends: Vec::with_capacity(links.len()),
        left_strands: Vec::with_capacity(links.len()),
        right_chrs: Vec::with_capacity(links.len()),
        right_starts: Vec::with_capacity(links.len()),
        right_ends: Vec::with_capacity(links.len()),
        right_strands: Vec::with_capacity(links.len()),
        split_counts: Vec::with_capacity(links.len()),
        pair_counts: Vec::with_capacity(links.len()),
    };

    for link in links {
        columns.left_chrs.push(link.left().contig());
        columns.left_starts.push(link.left().start());
        columns.left_ends.push(link.left().end());
        columns.left_strands.push(link.left_forward());
        columns.right_chrs.push(link.right().contig());
        columns.right_starts.push(link.right().start());
        columns.right_ends.push(link.right().end());
        columns.right_strands.push(link.right_forward());
        columns.split_counts.push(link.split_count());
        columns.pair_counts.push(link.pair_count());
    }

    columns
}
