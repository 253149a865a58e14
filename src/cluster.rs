use std::collections::{BTreeMap, VecDeque};
use std::time::Instant;

use log::{debug, trace};

use crate::error::{Error, Result};
use crate::evidence::Evidence;
use crate::interval::GenomicInterval;
use crate::link::TargetLink;
use crate::settings::ClusterSettings;
use crate::sorts;

/// Open clusters are keyed by their current right interval, with an insertion
/// sequence number to keep keys unique.
type OpenKey = (i32, i64, u64);

#[derive(Debug)]
struct OpenCluster {
    link: TargetLink,
    /// Stream-side interval: the arrival intervals of all members intersected.
    reach: GenomicInterval,
}

impl OpenCluster {
    fn is_unreachable_from(&self, position: &GenomicInterval, slack: i64) -> bool {
        self.reach.contig() != position.contig()
            || self.reach.end().saturating_add(slack.max(0)) < position.start()
    }
}

/// Lazy stream of clustered links, see [`cluster`].
pub struct EvidenceClusters<I> {
    evidence: I,
    settings: ClusterSettings,
    open: BTreeMap<OpenKey, OpenCluster>,
    /// Closed links that an open cluster may still precede in sort order.
    held: Vec<TargetLink>,
    ready: VecDeque<TargetLink>,
    previous: Option<GenomicInterval>,
    next_seq: u64,
    consumed: usize,
    skipped: usize,
    emitted: usize,
    started: Instant,
    finished: bool,
}

/// Group sorted evidence into candidate links using default settings.
///
/// Evidence must arrive in non-decreasing `(contig, start)` order of its left
/// interval. A link comes out once no later evidence can join it and no open
/// cluster sorts before it, so the output is ordered by
/// [`TargetLink::sort_key`] as long as every item arrives on its canonical left.
///
/// # Panics
///
/// The returned iterator panics if the evidence is out of order.
pub fn cluster<I>(evidence: I) -> EvidenceClusters<I::IntoIter>
where
    I: IntoIterator<Item = Evidence>,
{
    cluster_with_settings(evidence, &ClusterSettings::default())
}

pub fn cluster_with_settings<I>(
    evidence: I,
    settings: &ClusterSettings,
) -> EvidenceClusters<I::IntoIter>
where
    I: IntoIterator<Item = Evidence>,
{
    EvidenceClusters {
        evidence: evidence.into_iter(),
        settings: settings.clone(),
        open: BTreeMap::new(),
        held: Vec::new(),
        ready: VecDeque::new(),
        previous: None,
        next_seq: 0,
        consumed: 0,
        skipped: 0,
        emitted: 0,
        started: Instant::now(),
        finished: false,
    }
}

/// Verify the ordering precondition of [`cluster`] without consuming anything.
pub fn check_sorted(evidence: &[Evidence]) -> Result<()> {
    for pair in evidence.windows(2) {
        let (previous, current) = (pair[0].left(), pair[1].left());
        if out_of_order(&previous, &current) {
            return Err(Error::UnsortedEvidence { previous, current });
        }
    }
    Ok(())
}

#[inline]
fn out_of_order(previous: &GenomicInterval, current: &GenomicInterval) -> bool {
    (current.contig(), current.start()) < (previous.contig(), previous.start())
}

impl<I> EvidenceClusters<I>
where
    I: Iterator<Item = Evidence>,
{
    fn add(&mut self, evidence: Evidence) {
        let position = evidence.left();
        if let Some(previous) = self.previous {
            if out_of_order(&previous, &position) {
                panic!("{}", Error::UnsortedEvidence { previous, current: position });
            }
        }
        self.previous = Some(position);
        self.consumed += 1;

        self.close_unreachable(&position);

        if !evidence.passes_mapq(self.settings.min_evidence_mapq) {
            self.skipped += 1;
            trace!("Skipping low-mapq evidence at {position}");
            return;
        }

        let incoming = TargetLink::from_evidence(&evidence);
        let folded = self.find_match(&incoming).and_then(|key| {
            let cluster = self.open.get(&key)?;
            let link = cluster.link.absorb(&incoming)?;
            let reach = cluster.reach.intersect(&position).unwrap_or(cluster.reach);
            Some((key, OpenCluster { link, reach }))
        });

        match folded {
            Some((key, cluster)) => {
                self.open.remove(&key);
                self.insert(cluster);
            }
            None => self.insert(OpenCluster {
                link: incoming,
                reach: position,
            }),
        }
    }

    /// First open cluster, in right-interval order, that the incoming link can join.
    fn find_match(&self, incoming: &TargetLink) -> Option<OpenKey> {
        let right = incoming.right();
        self.open
            .range((right.contig(), i64::MIN, 0)..=(right.contig(), right.end(), u64::MAX))
            .find(|(_, cluster)| cluster.link.is_mergeable_with(incoming))
            .map(|(key, _)| *key)
    }

    fn insert(&mut self, cluster: OpenCluster) {
        let right = cluster.link.right();
        self.open.insert((right.contig(), right.start(), self.next_seq), cluster);
        self.next_seq += 1;
    }

    fn close_unreachable(&mut self, position: &GenomicInterval) {
        let slack = self.settings.closure_slack;
        let keys: Vec<OpenKey> = self
            .open
            .iter()
            .filter(|(_, cluster)| cluster.is_unreachable_from(position, slack))
            .map(|(key, _)| *key)
            .collect();
        if keys.is_empty() {
            return;
        }

        trace!("Closed {} clusters before {position}", keys.len());
        for key in keys {
            if let Some(cluster) = self.open.remove(&key) {
                self.held.push(cluster.link);
            }
        }
    }

    fn close_all(&mut self) {
        let open = std::mem::take(&mut self.open);
        self.held.extend(open.into_values().map(|cluster| cluster.link));
    }

    /// Move held links that start before every open cluster to `ready`.
    ///
    /// Narrowing never moves an open cluster's left start backwards, so a
    /// released link cannot be overtaken.
    fn release(&mut self) {
        if self.held.is_empty() {
            return;
        }
        sorts::sort_links(&mut self.held);
        let bound = self
            .open
            .values()
            .map(|cluster| (cluster.link.left().contig(), cluster.link.left().start()))
            .min();
        let released = match bound {
            Some(bound) => self
                .held
                .partition_point(|link| (link.left().contig(), link.left().start()) < bound),
            None => self.held.len(),
        };
        self.ready.extend(self.held.drain(..released));
    }
}

impl<I> Iterator for EvidenceClusters<I>
where
    I: Iterator<Item = Evidence>,
{
    type Item = TargetLink;

    fn next(&mut self) -> Option<TargetLink> {
        loop {
            if let Some(link) = self.ready.pop_front() {
                self.emitted += 1;
                return Some(link);
            }
            if self.finished {
                return None;
            }
            match self.evidence.next() {
                Some(evidence) => {
                    self.add(evidence);
                    self.release();
                }
                None => {
                    self.close_all();
                    self.release();
                    self.finished = true;
                    debug!(
                        "Clustered {} evidence items ({} skipped) into {} links in {:?}",
                        self.consumed,
                        self.skipped,
                        self.emitted + self.ready.len(),
                        self.started.elapsed()
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn iv(start: i64, end: i64) -> GenomicInterval {
        GenomicInterval::new(0, start, end)
    }

    fn pair(ls: i64, le: i64, rs: i64, re: i64) -> Evidence {
        Evidence::discordant_pair(iv(ls, le), true, iv(rs, re), false)
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert_eq!(cluster(Vec::<Evidence>::new()).count(), 0);
    }

    #[test]
    fn discordant_pairs_group_by_distal_target() {
        // Three forward reads near 1.2kb; two mates land near 500kb, one near 600kb.
        let evidence = vec![
            pair(1401, 1750, 499_651, 500_005),
            pair(1426, 1775, 599_651, 600_005),
            pair(1451, 1800, 499_676, 500_030),
        ];

        let links: Vec<TargetLink> = cluster(evidence).collect();
        assert_eq!(
            links,
            vec![
                TargetLink::new(iv(1426, 1775), true, iv(599_651, 600_005), false, 0, 1),
                TargetLink::new(iv(1451, 1750), true, iv(499_676, 500_005), false, 0, 2),
            ]
        );
    }

    #[test]
    fn split_and_pair_evidence_count_separately() {
        let evidence = vec![
            Evidence::split_read(iv(100, 110), true, iv(5000, 5010), false),
            pair(100, 400, 4800, 5200),
            Evidence::split_read(iv(105, 115), true, iv(5005, 5015), false),
        ];

        let links: Vec<TargetLink> = cluster(evidence).collect();
        assert_eq!(links, vec![TargetLink::new(iv(105, 110), true, iv(5005, 5010), false, 2, 1)]);
    }

    #[test]
    fn orientation_mismatch_opens_new_cluster() {
        let evidence = vec![
            pair(100, 200, 900, 1000),
            Evidence::discordant_pair(iv(150, 250), false, iv(950, 1050), false),
        ];
        let links: Vec<TargetLink> = cluster(evidence).collect();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.pair_count() == 1));
    }

    #[test]
    fn reversed_evidence_is_canonicalized() {
        let evidence = vec![Evidence::split_read(iv(5000, 5100), false, iv(100, 200), true)];
        let links: Vec<TargetLink> = cluster(evidence).collect();
        assert_eq!(links, vec![TargetLink::new(iv(100, 200), true, iv(5000, 5100), false, 1, 0)]);
        assert_eq!(links[0].left(), iv(100, 200));
    }

    #[test]
    fn clusters_are_emitted_once_the_stream_moves_past_them() {
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(100, 200, 90_000, 90_100),
            pair(5000, 5100, 95_000, 95_100),
            pair(9000, 9100, 99_000, 99_100),
        ];
        let mut links = cluster(evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1)));

        let first = links.next().unwrap();
        assert_eq!(first.left(), iv(100, 200));
        assert_eq!(pulled.get(), 2);

        assert_eq!(links.next().unwrap().left(), iv(5000, 5100));
        assert_eq!(pulled.get(), 3);
        assert_eq!(links.next().unwrap().left(), iv(9000, 9100));
        assert!(links.next().is_none());
    }

    #[test]
    fn closure_slack_keeps_clusters_open_longer() {
        let evidence = || {
            vec![
                pair(100, 200, 90_000, 90_100),
                pair(250, 300, 95_000, 95_100),
                pair(1000, 1100, 99_000, 99_100),
            ]
        };

        let pulled = Cell::new(0);
        let settings = ClusterSettings {
            closure_slack: 100,
            ..ClusterSettings::default()
        };
        let counted = evidence().into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let mut links = cluster_with_settings(counted, &settings);
        assert_eq!(links.next().unwrap().left(), iv(100, 200));
        assert_eq!(pulled.get(), 3);
        assert_eq!(links.count(), 2);

        let pulled = Cell::new(0);
        let mut links = cluster(evidence().into_iter().inspect(|_| pulled.set(pulled.get() + 1)));
        assert_eq!(links.next().unwrap().left(), iv(100, 200));
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn contig_change_closes_everything_open() {
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(100, 200, 90_000, 90_100),
            pair(150, 250, 80_000, 80_100),
            Evidence::discordant_pair(
                GenomicInterval::new(1, 10, 20),
                true,
                GenomicInterval::new(1, 500, 600),
                false,
            ),
        ];
        let mut links = cluster(evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1)));
        assert_eq!(links.next().unwrap().right(), iv(90_000, 90_100));
        assert_eq!(pulled.get(), 3);
        assert_eq!(links.next().unwrap().right(), iv(80_000, 80_100));
        assert_eq!(links.next().unwrap().left().contig(), 1);
        assert!(links.next().is_none());
    }

    #[test]
    fn closed_links_wait_for_open_clusters_that_sort_earlier() {
        // 100-150 closes when 200-210 arrives, but 90-1000 is still open and
        // sorts before it.
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(90, 1000, 70_000, 70_100),
            pair(100, 150, 80_000, 80_100),
            pair(200, 210, 60_000, 60_100),
        ];
        let mut links = cluster(evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1)));

        assert_eq!(links.next().unwrap().left(), iv(90, 1000));
        assert_eq!(pulled.get(), 3);
        let rest: Vec<i64> = links.map(|link| link.left().start()).collect();
        assert_eq!(rest, vec![100, 200]);
    }

    #[test]
    fn evidence_starting_at_reach_end_can_still_join() {
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(100, 200, 900, 1000),
            pair(200, 300, 950, 1050),
            pair(500, 600, 5000, 5100),
        ];
        let mut links = cluster(evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1)));

        assert_eq!(
            links.next(),
            Some(TargetLink::new(iv(200, 200), true, iv(950, 1000), false, 0, 2))
        );
        assert_eq!(pulled.get(), 3);
        assert_eq!(links.next().unwrap().left(), iv(500, 600));
        assert!(links.next().is_none());
    }

    #[test]
    fn slack_boundary_is_inclusive() {
        // Different targets, so the second item cannot join; the first stays
        // open while the stream is still within reach.end + slack.
        let settings = ClusterSettings {
            closure_slack: 50,
            ..ClusterSettings::default()
        };
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(100, 200, 90_000, 90_100),
            pair(250, 260, 80_000, 80_100),
            pair(251, 270, 70_000, 70_100),
        ];
        let counted = evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let mut links = cluster_with_settings(counted, &settings);

        assert_eq!(links.next().unwrap().left(), iv(100, 200));
        assert_eq!(pulled.get(), 3);
    }

    #[test]
    fn huge_slack_keeps_everything_open_without_overflow() {
        let settings = ClusterSettings {
            closure_slack: i64::MAX,
            ..ClusterSettings::default()
        };
        let pulled = Cell::new(0);
        let evidence = vec![
            pair(100, 200, 90_000, 90_100),
            pair(i64::MAX - 10, i64::MAX, 95_000, 95_100),
        ];
        let counted = evidence.into_iter().inspect(|_| pulled.set(pulled.get() + 1));
        let mut links = cluster_with_settings(counted, &settings);

        assert_eq!(links.next().unwrap().left(), iv(100, 200));
        assert_eq!(pulled.get(), 2);
        assert_eq!(links.count(), 1);
    }

    #[test]
    fn negative_slack_behaves_like_zero() {
        let settings = ClusterSettings {
            closure_slack: -1_000,
            ..ClusterSettings::default()
        };
        let evidence = vec![pair(100, 200, 900, 1000), pair(200, 300, 950, 1050)];
        let links: Vec<TargetLink> = cluster_with_settings(evidence, &settings).collect();
        assert_eq!(links, vec![TargetLink::new(iv(200, 200), true, iv(950, 1000), false, 0, 2)]);
    }

    #[test]
    fn low_mapq_evidence_is_skipped() {
        let settings = ClusterSettings {
            min_evidence_mapq: 20,
            ..ClusterSettings::default()
        };
        let evidence = vec![
            pair(100, 200, 900, 1000).with_mapping_quality(60),
            pair(120, 220, 920, 1020).with_mapping_quality(5),
            pair(140, 240, 940, 1040),
        ];
        let links: Vec<TargetLink> = cluster_with_settings(evidence, &settings).collect();
        assert_eq!(links, vec![TargetLink::new(iv(140, 200), true, iv(940, 1000), false, 0, 2)]);
    }

    #[test]
    fn check_sorted_reports_first_violation() {
        let evidence = vec![pair(500, 600, 900, 1000), pair(100, 200, 900, 1000)];
        assert_eq!(
            check_sorted(&evidence),
            Err(Error::UnsortedEvidence {
                previous: iv(500, 600),
                current: iv(100, 200),
            })
        );
        assert_eq!(check_sorted(&evidence[..1]), Ok(()));
    }

    #[test]
    #[should_panic(expected = "evidence out of order")]
    fn unsorted_evidence_panics() {
        let evidence = vec![pair(500, 600, 900, 1000), pair(100, 200, 900, 1000)];
        let _ = cluster(evidence).count();
    }
}
