//! Dead distribution artefact classification.
//!
//! Walks an inventory and asks the asset manager, one media package at a
//! time, whether the media package still exists. Only media packages that are
//! confirmed absent end up in the dead inventory.
//!
//! ## Classification Rules
//!
//! 1. **Exists**: the media package is kept
//! 2. **Absent**: all its artefacts are dead
//! 3. **Check failed**: the media package is kept and a notice is reported,
//!    the scan continues with the next media package

use crate::checker::ExistenceChecker;
use crate::inventory::{DeadInventory, Inventory, media_package_count};
use crate::progress::ProgressReporter;

/// Counters of a finished scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Media packages checked
    pub checked: usize,
    /// Media packages that still exist
    pub alive: usize,
    /// Media packages confirmed absent
    pub dead: usize,
    /// Media packages whose check failed
    pub failed: usize,
    /// Artefacts belonging to dead media packages
    pub dead_artefacts: usize,
}

impl ScanSummary {
    /// Log the summary
    pub fn log(&self) {
        tracing::info!(
            checked = self.checked,
            alive = self.alive,
            dead = self.dead,
            failed = self.failed,
            dead_artefacts = self.dead_artefacts,
            "Dead artefact scan summary"
        );
    }
}

/// Result of a scan: the dead subset of the inventory and the counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification<'a, A> {
    pub dead: DeadInventory<'a, A>,
    pub summary: ScanSummary,
}

/// Progress message reporting what can be deleted so far.
pub fn finished_message(dead_artefacts: usize, dead_media_packages: usize) -> String {
    format!(
        "{dead_artefacts} distribution artefact(s) of {dead_media_packages} media package(s) can be deleted."
    )
}

/// Classify the inventory and return only the dead artefacts.
pub fn classify<'a, A, C, P>(
    inventory: &'a Inventory<A>,
    checker: &C,
    progress: P,
) -> DeadInventory<'a, A>
where
    C: ExistenceChecker + ?Sized,
    P: ProgressReporter,
{
    scan(inventory, checker, progress).dead
}

/// Classify the inventory, returning the dead artefacts and scan counters.
///
/// Every (tenant, media package) pair is checked exactly once. Progress is
/// reported once before the first check and once after every check, the last
/// update carries the final counts.
pub fn scan<'a, A, C, P>(
    inventory: &'a Inventory<A>,
    checker: &C,
    mut progress: P,
) -> Classification<'a, A>
where
    C: ExistenceChecker + ?Sized,
    P: ProgressReporter,
{
    let total = media_package_count(inventory);
    let mut summary = ScanSummary::default();
    let mut dead = DeadInventory::new();

    progress.message(&format!("Checking {total} media package(s)..."));
    progress.progress(0, total, None);

    for (tenant, media_packages) in inventory {
        for (media_package, artefacts) in media_packages {
            match checker.exists(tenant, media_package) {
                Ok(true) => {
                    tracing::trace!(tenant = %tenant, media_package = %media_package, "Media package exists");
                    summary.alive += 1;
                }
                Ok(false) => {
                    tracing::debug!(
                        tenant = %tenant,
                        media_package = %media_package,
                        artefacts = artefacts.len(),
                        "Media package no longer exists"
                    );
                    dead.entry(tenant.as_str())
                        .or_default()
                        .insert(media_package.as_str(), artefacts.as_slice());
                    summary.dead += 1;
                    summary.dead_artefacts += artefacts.len();
                }
                Err(e) => {
                    tracing::warn!(
                        tenant = %tenant,
                        media_package = %media_package,
                        error = %e,
                        "Media package could not be checked, keeping its artefacts"
                    );
                    progress.notice(&format!(
                        "Media package {media_package} could not be checked: {e}"
                    ));
                    summary.failed += 1;
                }
            }

            summary.checked += 1;
            let message = finished_message(summary.dead_artefacts, summary.dead);
            progress.progress(summary.checked, total, Some(&message));
        }
    }

    Classification { dead, summary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{CheckFailed, MockExistenceChecker};
    use crate::inventory::{artefact_count, to_owned_inventory};
    use crate::testing::{ProgressEvent, RecordingProgress, StaticChecker};
    use mockall::predicate::eq;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn inventory(entries: &[(&str, &str, &[&str])]) -> Inventory {
        let mut inventory = Inventory::new();
        for (tenant, mp, artefacts) in entries {
            inventory
                .entry(tenant.to_string())
                .or_default()
                .insert(
                    mp.to_string(),
                    artefacts.iter().map(|a| a.to_string()).collect(),
                );
        }
        inventory
    }

    #[test]
    fn test_dead_media_package_is_collected() {
        let inventory = inventory(&[("t1", "mp1", &["a1.mp4"]), ("t1", "mp2", &["a2.mp4"])]);
        let checker = StaticChecker::new().alive("t1", "mp1").dead("t1", "mp2");
        let mut progress = RecordingProgress::default();

        let dead = classify(&inventory, &checker, &mut progress);

        assert_eq!(
            to_owned_inventory(&dead),
            self::inventory(&[("t1", "mp2", &["a2.mp4"])])
        );
        assert!(progress.notices().is_empty());
    }

    #[test]
    fn test_failed_check_is_never_dead() {
        let inventory = inventory(&[("t1", "mp1", &["a1.mp4"])]);
        let checker = StaticChecker::new().failing("t1", "mp1", "401 Unauthorized");
        let mut progress = RecordingProgress::default();

        let result = scan(&inventory, &checker, &mut progress);

        assert!(result.dead.is_empty());
        assert_eq!(result.summary.failed, 1);
        assert_eq!(
            progress.notices(),
            vec!["Media package mp1 could not be checked: 401 Unauthorized".to_string()]
        );
        assert_eq!(
            progress.last_progress(),
            Some((
                1,
                1,
                Some("0 distribution artefact(s) of 0 media package(s) can be deleted.".to_string())
            ))
        );
    }

    #[test]
    fn test_empty_inventory_reports_zero_of_zero() {
        let inventory = Inventory::<String>::new();
        let mut mock = MockExistenceChecker::new();
        mock.expect_exists().never();
        let mut progress = RecordingProgress::default();

        let dead = classify(&inventory, &mock, &mut progress);

        assert!(dead.is_empty());
        assert_eq!(
            progress.events(),
            &[
                ProgressEvent::Message("Checking 0 media package(s)...".to_string()),
                ProgressEvent::Progress {
                    done: 0,
                    total: 0,
                    message: None
                },
            ]
        );
    }

    #[test]
    fn test_two_tenants_with_one_dead_package_each() {
        let inventory = inventory(&[
            ("t1", "live1", &["l1.mp4"]),
            ("t1", "dead1", &["d1.mp4"]),
            ("t2", "live2", &["l2.mp4"]),
            ("t2", "dead2", &["d2.mp4"]),
        ]);
        let checker = StaticChecker::new()
            .alive("t1", "live1")
            .dead("t1", "dead1")
            .alive("t2", "live2")
            .dead("t2", "dead2");
        let mut progress = RecordingProgress::default();

        let result = scan(&inventory, &checker, &mut progress);

        assert_eq!(
            to_owned_inventory(&result.dead),
            self::inventory(&[("t1", "dead1", &["d1.mp4"]), ("t2", "dead2", &["d2.mp4"])])
        );
        assert_eq!(
            progress.last_progress(),
            Some((
                4,
                4,
                Some("2 distribution artefact(s) of 2 media package(s) can be deleted.".to_string())
            ))
        );
        assert_eq!(
            result.summary,
            ScanSummary {
                checked: 4,
                alive: 2,
                dead: 2,
                failed: 0,
                dead_artefacts: 2,
            }
        );
    }

    #[test]
    fn test_each_pair_checked_exactly_once() {
        let inventory = inventory(&[
            ("t1", "mp1", &["a"]),
            ("t1", "mp2", &["b", "c"]),
            ("t2", "mp1", &[]),
        ]);
        let mut mock = MockExistenceChecker::new();
        mock.expect_exists()
            .with(eq("t1"), eq("mp1"))
            .times(1)
            .returning(|_, _| Ok(true));
        mock.expect_exists()
            .with(eq("t1"), eq("mp2"))
            .times(1)
            .returning(|_, _| Ok(false));
        mock.expect_exists()
            .with(eq("t2"), eq("mp1"))
            .times(1)
            .returning(|_, _| Err(CheckFailed::new("connection reset")));

        let result = scan(&inventory, &mock, RecordingProgress::default());

        assert_eq!(result.summary.checked, 3);
        assert_eq!(result.dead.len(), 1);
        assert_eq!(result.dead["t1"]["mp2"], ["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_running_message_counts_artefacts_and_packages() {
        let inventory = inventory(&[
            ("t1", "mp1", &["a", "b", "c"]),
            ("t1", "mp2", &["d"]),
            ("t1", "mp3", &["e", "f"]),
        ]);
        let checker = StaticChecker::new()
            .dead("t1", "mp1")
            .alive("t1", "mp2")
            .dead("t1", "mp3");
        let mut progress = RecordingProgress::default();

        classify(&inventory, &checker, &mut progress);

        let messages: Vec<Option<String>> = progress
            .progress_updates()
            .into_iter()
            .map(|(_, _, message)| message)
            .collect();
        assert_eq!(
            messages,
            vec![
                None,
                Some(finished_message(3, 1)),
                Some(finished_message(3, 1)),
                Some(finished_message(5, 2)),
            ]
        );
    }

    #[test]
    fn test_empty_media_package_can_be_dead() {
        let inventory = inventory(&[("t1", "mp1", &[])]);
        let checker = StaticChecker::new().dead("t1", "mp1");
        let mut progress = RecordingProgress::default();

        let result = scan(&inventory, &checker, &mut progress);

        assert_eq!(result.dead["t1"]["mp1"].len(), 0);
        assert_eq!(
            progress.last_progress().and_then(|(_, _, message)| message),
            Some(finished_message(0, 1))
        );
    }

    #[test]
    fn test_tenant_without_media_packages_contributes_nothing() {
        let mut inventory = inventory(&[("t1", "mp1", &["a"])]);
        inventory.insert("t2".to_string(), BTreeMap::new());
        let checker = StaticChecker::new().dead("t1", "mp1");
        let mut progress = RecordingProgress::default();

        let dead = classify(&inventory, &checker, &mut progress);

        assert_eq!(dead.len(), 1);
        assert!(!dead.contains_key("t2"));
        assert_eq!(progress.last_progress().map(|(done, total, _)| (done, total)), Some((1, 1)));
    }

    #[test]
    fn test_finished_message_format() {
        assert_eq!(
            finished_message(12, 3),
            "12 distribution artefact(s) of 3 media package(s) can be deleted."
        );
    }

    #[derive(Debug, Clone, Copy)]
    enum Answer {
        Alive,
        Dead,
        Failed,
    }

    fn arb_answer() -> impl Strategy<Value = Answer> {
        prop_oneof![Just(Answer::Alive), Just(Answer::Dead), Just(Answer::Failed)]
    }

    /// Inventory plus a stable answer for every (tenant, media package) pair.
    fn arb_scenario() -> impl Strategy<Value = (Inventory, BTreeMap<(String, String), Answer>)> {
        prop::collection::btree_map(
            "t[0-9]",
            prop::collection::btree_map(
                "mp[a-f0-9]{1,3}",
                (prop::collection::vec("[a-z]{1,4}\\.mp4", 0..4), arb_answer()),
                0..5,
            ),
            0..4,
        )
        .prop_map(|tenants| {
            let mut inventory = Inventory::new();
            let mut answers = BTreeMap::new();
            for (tenant, media_packages) in tenants {
                let entry = inventory.entry(tenant.clone()).or_insert_with(BTreeMap::new);
                for (mp, (artefacts, answer)) in media_packages {
                    answers.insert((tenant.clone(), mp.clone()), answer);
                    entry.insert(mp, artefacts);
                }
            }
            (inventory, answers)
        })
    }

    fn checker_for(answers: &BTreeMap<(String, String), Answer>) -> StaticChecker {
        answers
            .iter()
            .fold(StaticChecker::new(), |checker, ((tenant, mp), answer)| match answer {
                Answer::Alive => checker.alive(tenant, mp),
                Answer::Dead => checker.dead(tenant, mp),
                Answer::Failed => checker.failing(tenant, mp, "unavailable"),
            })
    }

    proptest! {
        #[test]
        fn prop_dead_inventory_matches_answers((inventory, answers) in arb_scenario()) {
            let checker = checker_for(&answers);
            let result = scan(&inventory, &checker, RecordingProgress::default());

            // subset with identical artefacts
            for (tenant, media_packages) in &result.dead {
                for (mp, artefacts) in media_packages {
                    prop_assert_eq!(*artefacts, inventory[*tenant][*mp].as_slice());
                }
            }

            // dead exactly when the checker said so
            for ((tenant, mp), answer) in &answers {
                let in_dead = result
                    .dead
                    .get(tenant.as_str())
                    .is_some_and(|mps| mps.contains_key(mp.as_str()));
                prop_assert_eq!(in_dead, matches!(answer, Answer::Dead));
            }

            let owned = to_owned_inventory(&result.dead);
            prop_assert_eq!(result.summary.dead, media_package_count(&owned));
            prop_assert_eq!(result.summary.dead_artefacts, artefact_count(&owned));
            prop_assert_eq!(result.summary.checked, answers.len());
            prop_assert_eq!(checker.calls().len(), answers.len());
        }

        #[test]
        fn prop_progress_is_monotonic_and_complete((inventory, answers) in arb_scenario()) {
            let checker = checker_for(&answers);
            let mut progress = RecordingProgress::default();
            let result = scan(&inventory, &checker, &mut progress);

            let updates = progress.progress_updates();
            let total = media_package_count(&inventory);
            prop_assert_eq!(updates.len(), total + 1);
            prop_assert_eq!(updates.first().map(|(done, _, _)| *done), Some(0));
            prop_assert_eq!(updates.last().map(|(done, _, _)| *done), Some(total));
            prop_assert!(updates.windows(2).all(|w| w[0].0 <= w[1].0));
            prop_assert!(updates.iter().all(|(_, t, _)| *t == total));
            prop_assert_eq!(
                updates.iter().filter(|(done, _, _)| *done == total).count(),
                1
            );
            if total > 0 {
                let expected = finished_message(result.summary.dead_artefacts, result.summary.dead);
                prop_assert_eq!(updates.last().and_then(|(_, _, m)| m.clone()), Some(expected));
            }
            prop_assert_eq!(progress.notices().len(), result.summary.failed);
        }

        #[test]
        fn prop_classification_is_idempotent((inventory, answers) in arb_scenario()) {
            let checker = checker_for(&answers);
            let first = classify(&inventory, &checker, RecordingProgress::default());
            let second = classify(&inventory, &checker, RecordingProgress::default());
            prop_assert_eq!(first, second);
        }
    }
}
