//! Ordered widget store.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use tracing::{debug, trace};

use crate::error::{BoardkitError, Result};
use crate::pagination::Page;
use crate::sync::{AccessLocker, Locker, LockerKind};

use super::model::{Widget, WidgetCreate, WidgetUpdate};

/// The two coupled indexes over the same widgets. Always read and mutated
/// together inside one critical section so no observer can see them
/// disagree.
#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<String, Widget>,
    by_rank: BTreeMap<i32, Widget>,
}

impl Indexes {
    /// Next free foreground z-index: 0 on an empty store, one past the
    /// current top otherwise. Fails when the top widget already sits at
    /// `i32::MAX`.
    fn next_foreground_z(&self) -> Result<i32> {
        match self.by_rank.last_key_value() {
            None => Ok(0),
            Some((_, top)) => {
                ensure_room_above(top)?;
                Ok(top.z + 1)
            }
        }
    }

    /// Shift every widget with z-index >= `from` up by one, lowest first.
    /// Verifies there is room above the current top before touching either
    /// index, so a failure leaves no partial shift visible.
    fn shift_upwards_from(&mut self, from: i32) -> Result<()> {
        self.next_foreground_z()?;

        let tail = self.by_rank.split_off(&from);
        trace!(from, count = tail.len(), "shifting widgets upward");
        for (_, widget) in tail {
            let shifted = widget.shifted_up();
            self.by_id.insert(shifted.id.clone(), shifted.clone());
            self.by_rank.insert(shifted.z, shifted);
        }
        Ok(())
    }

    /// Put a widget into both indexes.
    fn insert(&mut self, widget: Widget) {
        self.by_id.insert(widget.id.clone(), widget.clone());
        self.by_rank.insert(widget.z, widget);
    }
}

fn ensure_room_above(widget: &Widget) -> Result<()> {
    if widget.z == i32::MAX {
        return Err(BoardkitError::RankExhausted(widget.id.clone()));
    }
    Ok(())
}

/// Staged state for a z-index-changing update, computed in the read phase.
struct UpdateState {
    merged: Widget,
    previous_z: i32,
}

/// In-memory store of widgets keyed by identity and ordered by z-index.
///
/// All operations may be invoked concurrently; the locking strategy chosen
/// at construction decides how much of that concurrency is exploited.
pub struct WidgetStore {
    indexes: Locker<Indexes>,
}

impl WidgetStore {
    pub fn new(kind: LockerKind) -> Self {
        Self {
            indexes: Locker::new(kind, Indexes::default()),
        }
    }

    /// Create a new widget.
    ///
    /// Without a requested z-index the widget is placed in the foreground
    /// (one past the current top, 0 on an empty store). A requested z-index
    /// that is already occupied shifts every widget at or above it up by
    /// one first. Fails with [`BoardkitError::RankExhausted`] when either
    /// placement or shifting would pass `i32::MAX`, leaving the store
    /// unchanged.
    pub fn create(&self, request: &WidgetCreate) -> Result<Widget> {
        self.indexes.read_then_write(
            // Foreground assignment reads the current top z-index, so rank
            // resolution belongs to the read phase of the atomic pair.
            |idx| match request.z {
                Some(z) => Ok(request.to_widget(z)),
                None => idx.next_foreground_z().map(|z| request.to_widget(z)),
            },
            |idx, staged: Result<Widget>| {
                let widget = staged?;
                if idx.by_rank.contains_key(&widget.z) {
                    idx.shift_upwards_from(widget.z)?;
                }
                debug!(id = %widget.id, z = widget.z, "widget created");
                idx.insert(widget.clone());
                Ok(widget)
            },
        )
    }

    /// List widgets in ascending z-index order, at most `limit` of them,
    /// resuming strictly after the z-index of the widget identified by
    /// `after_id`. An unknown `after_id` starts from the beginning. The
    /// returned page carries a continuation token when it is exactly
    /// `limit` long.
    pub fn list(&self, limit: usize, after_id: Option<&str>) -> Page<Widget> {
        self.indexes.read(|idx| {
            let after_z = after_id.and_then(|id| idx.by_id.get(id)).map(|w| w.z);
            let items: Vec<Widget> = match after_z {
                Some(z) => idx
                    .by_rank
                    .range((Bound::Excluded(z), Bound::Unbounded))
                    .take(limit)
                    .map(|(_, w)| w.clone())
                    .collect(),
                None => idx.by_rank.values().take(limit).cloned().collect(),
            };
            let next = if items.len() == limit {
                items.last().map(|w| w.id.clone())
            } else {
                None
            };
            Page::new(items, next)
        })
    }

    /// Read a single widget by identity. Absence is `None`, not an error.
    pub fn read(&self, id: &str) -> Option<Widget> {
        self.indexes.read(|idx| idx.by_id.get(id).cloned())
    }

    /// Merge the provided fields into an existing widget.
    ///
    /// Returns `Ok(None)` when the identity is unknown. A z-index change to
    /// an occupied slot shifts the occupants up exactly as `create` does,
    /// with the moved widget's old entry excluded from the shift scan.
    pub fn update(&self, id: &str, update: &WidgetUpdate) -> Result<Option<Widget>> {
        if update.z.is_none() {
            // No z-index change: replace the snapshot at its current slot.
            return self.indexes.read_then_write(
                |idx| idx.by_id.get(id).map(|current| current.merged(update)),
                |idx, merged: Option<Widget>| {
                    if let Some(widget) = &merged {
                        idx.insert(widget.clone());
                    }
                    Ok(merged)
                },
            );
        }

        self.indexes.read_then_write(
            |idx| {
                idx.by_id.get(id).map(|current| UpdateState {
                    merged: current.merged(update),
                    previous_z: current.z,
                })
            },
            |idx, staged: Option<UpdateState>| {
                let Some(state) = staged else {
                    return Ok(None);
                };

                let occupied = idx
                    .by_rank
                    .get(&state.merged.z)
                    .is_some_and(|occupant| occupant.id != state.merged.id);
                if occupied {
                    // Validate room before removing anything so a failed
                    // shift cannot leave a half-applied move behind.
                    idx.next_foreground_z()?;
                }

                idx.by_rank.remove(&state.previous_z);
                if occupied {
                    idx.shift_upwards_from(state.merged.z)?;
                }
                debug!(id = %state.merged.id, z = state.merged.z, "widget moved");
                idx.insert(state.merged.clone());
                Ok(Some(state.merged))
            },
        )
    }

    /// Remove a widget from both indexes. Returns `false` when the identity
    /// is unknown.
    pub fn delete(&self, id: &str) -> bool {
        self.indexes.read_then_write(
            |idx| idx.by_id.get(id).map(|w| w.z),
            |idx, z: Option<i32>| match z {
                Some(z) => {
                    idx.by_id.remove(id);
                    idx.by_rank.remove(&z);
                    debug!(id, z, "widget deleted");
                    true
                }
                None => false,
            },
        )
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.indexes.read(|idx| idx.by_id.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all widgets. For test setups.
    pub fn clear(&self) {
        self.indexes.write(|idx| {
            idx.by_id.clear();
            idx.by_rank.clear();
        });
    }
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new(LockerKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const KINDS: [LockerKind; 3] = [
        LockerKind::Exclusive,
        LockerKind::ReadWrite,
        LockerKind::Stamped,
    ];

    fn create_at(store: &WidgetStore, z: Option<i32>) -> Widget {
        store
            .create(&WidgetCreate {
                x: 0,
                y: 0,
                z,
                width: 10.0,
                height: 10.0,
            })
            .unwrap()
    }

    fn ranks(store: &WidgetStore) -> Vec<i32> {
        store
            .list(usize::MAX, None)
            .items
            .iter()
            .map(|w| w.z)
            .collect()
    }

    fn assert_indexes_agree(store: &WidgetStore) {
        store.indexes.read(|idx| {
            assert_eq!(idx.by_id.len(), idx.by_rank.len());
            for widget in idx.by_rank.values() {
                assert_eq!(idx.by_id.get(&widget.id), Some(widget));
            }
        });
    }

    #[test]
    fn test_foreground_assignment() {
        let store = WidgetStore::default();
        assert_eq!(create_at(&store, None).z, 0);
        assert_eq!(create_at(&store, None).z, 1);
        assert_eq!(create_at(&store, Some(10)).z, 10);
        assert_eq!(create_at(&store, None).z, 11);
    }

    #[test]
    fn test_create_shifts_occupied_ranks() {
        let store = WidgetStore::default();
        let first = create_at(&store, Some(1));
        let second = create_at(&store, Some(2));
        let third = create_at(&store, Some(3));

        let inserted = create_at(&store, Some(1));

        assert_eq!(ranks(&store), vec![1, 2, 3, 4]);
        assert_eq!(store.read(&inserted.id).unwrap().z, 1);
        assert_eq!(store.read(&first.id).unwrap().z, 2);
        assert_eq!(store.read(&second.id).unwrap().z, 3);
        assert_eq!(store.read(&third.id).unwrap().z, 4);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_create_at_free_rank_shifts_nothing() {
        let store = WidgetStore::default();
        create_at(&store, Some(1));
        create_at(&store, Some(5));
        create_at(&store, Some(3));
        assert_eq!(ranks(&store), vec![1, 3, 5]);
    }

    #[test]
    fn test_ranks_stay_unique() {
        let store = WidgetStore::default();
        for z in [5, 5, 5, 2, 2, 7] {
            create_at(&store, Some(z));
        }
        create_at(&store, None);
        let mut seen = ranks(&store);
        seen.dedup();
        assert_eq!(seen.len(), 7);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_rank_exhaustion_on_foreground() {
        let store = WidgetStore::default();
        create_at(&store, Some(i32::MAX));

        let result = store.create(&WidgetCreate {
            x: 0,
            y: 0,
            z: None,
            width: 1.0,
            height: 1.0,
        });
        assert!(matches!(result, Err(BoardkitError::RankExhausted(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_rank_exhaustion_on_shift() {
        let store = WidgetStore::default();
        create_at(&store, Some(i32::MAX - 1));
        create_at(&store, Some(i32::MAX));

        let result = store.create(&WidgetCreate {
            x: 0,
            y: 0,
            z: Some(i32::MAX - 1),
            width: 1.0,
            height: 1.0,
        });
        assert!(matches!(result, Err(BoardkitError::RankExhausted(_))));
        // No partial shift left visible.
        assert_eq!(ranks(&store), vec![i32::MAX - 1, i32::MAX]);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_create_at_free_max_rank_succeeds() {
        let store = WidgetStore::default();
        create_at(&store, Some(0));
        let top = create_at(&store, Some(i32::MAX));
        assert_eq!(top.z, i32::MAX);
    }

    #[test]
    fn test_read_absent_is_none() {
        let store = WidgetStore::default();
        assert_eq!(store.read("missing"), None);
    }

    #[test]
    fn test_pagination_walk() {
        let store = WidgetStore::default();
        for z in 1..=5 {
            create_at(&store, Some(z));
        }

        let first = store.list(2, None);
        assert_eq!(first.items.iter().map(|w| w.z).collect::<Vec<_>>(), [1, 2]);
        let token = first.next.clone().unwrap();

        let second = store.list(2, Some(&token));
        assert_eq!(second.items.iter().map(|w| w.z).collect::<Vec<_>>(), [3, 4]);
        let token = second.next.clone().unwrap();

        let last = store.list(2, Some(&token));
        assert_eq!(last.items.iter().map(|w| w.z).collect::<Vec<_>>(), [5]);
        assert!(last.next.is_none());
    }

    #[test]
    fn test_list_with_unknown_after_id_starts_over() {
        let store = WidgetStore::default();
        create_at(&store, Some(1));
        create_at(&store, Some(2));
        let page = store.list(10, Some("unknown"));
        assert_eq!(page.items.len(), 2);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_update_merges_fields_without_rank_change() {
        let store = WidgetStore::default();
        let widget = create_at(&store, Some(1));

        let updated = store
            .update(
                &widget.id,
                &WidgetUpdate {
                    x: Some(99),
                    ..WidgetUpdate::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.x, 99);
        assert_eq!(updated.z, 1);
        assert_eq!(store.read(&widget.id).unwrap().x, 99);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_update_moves_rank_and_shifts_occupant() {
        let store = WidgetStore::default();
        let a = create_at(&store, Some(1));
        let b = create_at(&store, Some(2));

        let moved = store
            .update(
                &b.id,
                &WidgetUpdate {
                    z: Some(1),
                    ..WidgetUpdate::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(moved.z, 1);
        assert_eq!(store.read(&a.id).unwrap().z, 2);
        assert_eq!(ranks(&store), vec![1, 2]);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_update_to_own_rank_is_a_replace() {
        let store = WidgetStore::default();
        let widget = create_at(&store, Some(4));

        let updated = store
            .update(
                &widget.id,
                &WidgetUpdate {
                    z: Some(4),
                    y: Some(-3),
                    ..WidgetUpdate::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.z, 4);
        assert_eq!(updated.y, -3);
        assert_eq!(store.len(), 1);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_update_to_free_rank_moves_without_shift() {
        let store = WidgetStore::default();
        let a = create_at(&store, Some(1));
        create_at(&store, Some(2));

        store
            .update(
                &a.id,
                &WidgetUpdate {
                    z: Some(10),
                    ..WidgetUpdate::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(ranks(&store), vec![2, 10]);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_update_absent_is_none() {
        let store = WidgetStore::default();
        let result = store.update(
            "missing",
            &WidgetUpdate {
                x: Some(1),
                ..WidgetUpdate::default()
            },
        );
        assert_eq!(result.unwrap(), None);
    }

    #[test]
    fn test_update_rank_exhaustion_leaves_store_unchanged() {
        let store = WidgetStore::default();
        let low = create_at(&store, Some(0));
        create_at(&store, Some(i32::MAX));

        let result = store.update(
            &low.id,
            &WidgetUpdate {
                z: Some(i32::MAX),
                ..WidgetUpdate::default()
            },
        );

        assert!(matches!(result, Err(BoardkitError::RankExhausted(_))));
        assert_eq!(store.read(&low.id).unwrap().z, 0);
        assert_eq!(ranks(&store), vec![0, i32::MAX]);
        assert_indexes_agree(&store);
    }

    #[test]
    fn test_delete_removes_from_both_indexes() {
        let store = WidgetStore::default();
        let widget = create_at(&store, Some(1));
        create_at(&store, Some(2));

        assert!(store.delete(&widget.id));
        assert_eq!(store.read(&widget.id), None);
        assert_eq!(ranks(&store), vec![2]);
        assert_indexes_agree(&store);

        assert!(!store.delete(&widget.id));
    }

    #[test]
    fn test_clear() {
        let store = WidgetStore::default();
        create_at(&store, None);
        create_at(&store, None);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_concurrent_foreground_creates_yield_contiguous_ranks() {
        const THREADS: usize = 8;
        const PER_THREAD: usize = 25;

        for kind in KINDS {
            let store = Arc::new(WidgetStore::new(kind));

            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for _ in 0..PER_THREAD {
                            create_at(&store, None);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let expected: Vec<i32> = (0..(THREADS * PER_THREAD) as i32).collect();
            assert_eq!(ranks(&store), expected, "kind {kind:?}");
            assert_indexes_agree(&store);
        }
    }

    #[test]
    fn test_concurrent_mixed_operations_keep_invariants() {
        const THREADS: usize = 6;
        const PER_THREAD: usize = 30;

        for kind in KINDS {
            let store = Arc::new(WidgetStore::new(kind));
            for z in 0..10 {
                create_at(&store, Some(z));
            }

            let handles: Vec<_> = (0..THREADS)
                .map(|i| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for n in 0..PER_THREAD {
                            match (i + n) % 3 {
                                0 => {
                                    create_at(&store, Some((n % 10) as i32));
                                }
                                1 => {
                                    store.list(5, None);
                                }
                                _ => {
                                    if let Some(widget) = store.list(1, None).items.first() {
                                        store.delete(&widget.id);
                                    }
                                }
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let mut seen = ranks(&store);
            let len = seen.len();
            seen.dedup();
            assert_eq!(seen.len(), len, "duplicate ranks with kind {kind:?}");
            assert_indexes_agree(&store);
        }
    }
}
