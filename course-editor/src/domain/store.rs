//! In-memory course tree.
//!
//! Every operation is synchronous and either applies fully or returns a
//! [`StoreError`] without touching the tree. Given a tree where each section's
//! activities are ordered `1..N` and point back at their section, every
//! operation leaves it that way.

use std::mem;

use super::error::StoreError;
use super::models::{Activity, ActivityId, Section, SectionId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListStore {
    sections: Vec<Section>,
}

impl ListStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sections(sections: Vec<Section>) -> Self {
        let mut store = Self::new();
        store.replace_all(sections);
        store
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    pub fn activity(&self, section_id: &SectionId, activity_id: &ActivityId) -> Option<&Activity> {
        self.section(section_id)?
            .activities
            .iter()
            .find(|a| &a.id == activity_id)
    }

    /// Look an activity up without knowing its section.
    pub fn find_activity(&self, activity_id: &ActivityId) -> Option<&Activity> {
        self.sections
            .iter()
            .flat_map(|s| s.activities.iter())
            .find(|a| &a.id == activity_id)
    }

    fn section_index(&self, id: &SectionId) -> Result<usize, StoreError> {
        self.sections
            .iter()
            .position(|s| &s.id == id)
            .ok_or_else(|| StoreError::SectionNotFound(id.clone()))
    }

    fn section_mut(&mut self, id: &SectionId) -> Result<&mut Section, StoreError> {
        let index = self.section_index(id)?;
        Ok(&mut self.sections[index])
    }

    /// Reset from an authoritative snapshot.
    ///
    /// Server order values are trusted: sections and activities are sorted
    /// (stably) but never renumbered here.
    pub fn replace_all(&mut self, mut sections: Vec<Section>) {
        sections.sort_by_key(|s| s.order);
        for section in &mut sections {
            section.activities.sort_by_key(|a| a.order);
            for activity in &mut section.activities {
                activity.section_id = section.id.clone();
            }
        }
        self.sections = sections;
    }

    /// Move a section within the top-level sequence and renumber section orders to `1..N`.
    pub fn move_section(&mut self, from_index: usize, to_index: usize) -> Result<(), StoreError> {
        let len = self.sections.len();
        check_index(from_index, len)?;
        check_index(to_index, len)?;

        let section = self.sections.remove(from_index);
        self.sections.insert(to_index, section);
        renumber_sections(&mut self.sections);
        Ok(())
    }

    /// Move an activity to `dest_index` of the destination section.
    ///
    /// Both affected sections are renumbered and the moved activity is
    /// re-parented. Returns the moved activity's id.
    pub fn move_activity(
        &mut self,
        source_section_id: &SectionId,
        source_index: usize,
        dest_section_id: &SectionId,
        dest_index: usize,
    ) -> Result<ActivityId, StoreError> {
        let source = self.section_index(source_section_id)?;
        let dest = self.section_index(dest_section_id)?;

        let source_len = self.sections[source].activities.len();
        check_index(source_index, source_len)?;
        if source == dest {
            check_index(dest_index, source_len)?;
        } else {
            // Appending after the last activity is a valid drop target.
            check_index(dest_index, self.sections[dest].activities.len() + 1)?;
        }

        let mut activity = self.sections[source].activities.remove(source_index);
        activity.section_id = self.sections[dest].id.clone();
        let moved_id = activity.id.clone();
        self.sections[dest].activities.insert(dest_index, activity);

        renumber_activities(&mut self.sections[source]);
        if source != dest {
            renumber_activities(&mut self.sections[dest]);
        }
        Ok(moved_id)
    }

    /// Append an activity to a section. Returns the order it was given.
    pub fn add_activity(
        &mut self,
        section_id: &SectionId,
        mut activity: Activity,
    ) -> Result<u32, StoreError> {
        let section = self.section_mut(section_id)?;
        let order = section.activities.len() as u32 + 1;
        activity.order = order;
        activity.section_id = section.id.clone();
        section.activities.push(activity);
        Ok(order)
    }

    /// Remove an activity and close the gap it leaves.
    pub fn remove_activity(
        &mut self,
        section_id: &SectionId,
        activity_id: &ActivityId,
    ) -> Result<Activity, StoreError> {
        let section = self.section_mut(section_id)?;
        let index = section
            .position_of(activity_id)
            .ok_or_else(|| StoreError::ActivityNotFound(activity_id.clone()))?;
        let removed = section.activities.remove(index);
        renumber_activities(section);
        Ok(removed)
    }

    /// Returns the previous title.
    pub fn rename_section(
        &mut self,
        id: &SectionId,
        title: impl Into<String>,
    ) -> Result<String, StoreError> {
        let section = self.section_mut(id)?;
        Ok(mem::replace(&mut section.title, title.into()))
    }

    /// Returns the previous name.
    pub fn rename_activity(
        &mut self,
        section_id: &SectionId,
        activity_id: &ActivityId,
        name: impl Into<String>,
    ) -> Result<String, StoreError> {
        let activity = self.activity_mut(section_id, activity_id)?;
        Ok(mem::replace(&mut activity.name, name.into()))
    }

    /// Append a section after the current last one. Returns the order it was given.
    pub fn insert_section(&mut self, mut section: Section) -> u32 {
        let order = self.sections.last().map_or(1, |s| s.order + 1);
        section.order = order;
        for activity in &mut section.activities {
            activity.section_id = section.id.clone();
        }
        self.sections.push(section);
        order
    }

    /// Remove a section together with its activities.
    ///
    /// Remaining sections keep their orders; the backend owns section order
    /// after a delete and the next snapshot is trusted as-is.
    pub fn remove_section(&mut self, id: &SectionId) -> Result<Section, StoreError> {
        let index = self.section_index(id)?;
        Ok(self.sections.remove(index))
    }

    /// Swap a provisional section id for the durable one the backend assigned.
    pub fn assign_section_id(
        &mut self,
        current: &SectionId,
        durable: SectionId,
    ) -> Result<(), StoreError> {
        let section = self.section_mut(current)?;
        for activity in &mut section.activities {
            activity.section_id = durable.clone();
        }
        section.id = durable;
        Ok(())
    }

    /// Swap a provisional activity id for the durable one the backend assigned.
    pub fn assign_activity_id(
        &mut self,
        section_id: &SectionId,
        current: &ActivityId,
        durable: ActivityId,
    ) -> Result<(), StoreError> {
        let activity = self.activity_mut(section_id, current)?;
        activity.id = durable;
        Ok(())
    }

    fn activity_mut(
        &mut self,
        section_id: &SectionId,
        activity_id: &ActivityId,
    ) -> Result<&mut Activity, StoreError> {
        self.section_mut(section_id)?
            .activities
            .iter_mut()
            .find(|a| &a.id == activity_id)
            .ok_or_else(|| StoreError::ActivityNotFound(activity_id.clone()))
    }
}

fn check_index(index: usize, len: usize) -> Result<(), StoreError> {
    if index < len {
        Ok(())
    } else {
        Err(StoreError::IndexOutOfRange { index, len })
    }
}

fn renumber_activities(section: &mut Section) {
    for (i, activity) in section.activities.iter_mut().enumerate() {
        activity.order = i as u32 + 1;
    }
}

fn renumber_sections(sections: &mut [Section]) {
    for (i, section) in sections.iter_mut().enumerate() {
        section.order = i as u32 + 1;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::models::ActivityKind;

    pub(crate) fn activity(id: &str, section_id: &str, order: u32) -> Activity {
        Activity {
            id: ActivityId::new(id),
            name: format!("Activity {}", id),
            order,
            section_id: SectionId::new(section_id),
            kind: ActivityKind::Page,
            content: None,
            description: None,
        }
    }

    pub(crate) fn section(id: &str, order: u32, activity_ids: &[&str]) -> Section {
        Section {
            id: SectionId::new(id),
            title: format!("Section {}", id),
            description: None,
            order,
            activities: activity_ids
                .iter()
                .enumerate()
                .map(|(i, a)| activity(a, id, i as u32 + 1))
                .collect(),
        }
    }

    /// Course with A = [a1, a2, a3] and B = [b1, b2].
    pub(crate) fn two_sections() -> ListStore {
        ListStore::from_sections(vec![
            section("A", 1, &["a1", "a2", "a3"]),
            section("B", 2, &["b1", "b2"]),
        ])
    }

    pub(crate) fn assert_consistent(store: &ListStore) {
        for section in store.sections() {
            let orders: Vec<u32> = section.activities.iter().map(|a| a.order).collect();
            let expected: Vec<u32> = (1..=section.activities.len() as u32).collect();
            assert_eq!(orders, expected, "orders not dense in {}", section.id);
            for activity in &section.activities {
                assert_eq!(activity.section_id, section.id, "stale parent on {}", activity.id);
            }
        }
    }

    fn layout<'a>(store: &'a ListStore, section_id: &str) -> Vec<(&'a str, u32)> {
        store
            .section(&SectionId::new(section_id))
            .unwrap()
            .activities
            .iter()
            .map(|a| (a.id.as_str(), a.order))
            .collect()
    }

    #[test]
    fn replace_all_sorts_without_renumbering() {
        let mut store = ListStore::new();
        let mut sec = section("A", 4, &[]);
        sec.activities = vec![activity("x", "A", 7), activity("y", "other", 2)];
        store.replace_all(vec![sec, section("B", 1, &[])]);

        assert_eq!(store.sections()[0].id, SectionId::new("B"));
        assert_eq!(store.sections()[1].order, 4);
        assert_eq!(layout(&store, "A"), vec![("y", 2), ("x", 7)]);
        assert_eq!(store.sections()[1].activities[0].section_id, SectionId::new("A"));
    }

    #[test]
    fn cross_section_move_renumbers_both_sides() {
        let mut store = two_sections();

        let moved = store
            .move_activity(&SectionId::new("A"), 1, &SectionId::new("B"), 1)
            .unwrap();

        assert_eq!(moved, ActivityId::new("a2"));
        assert_eq!(layout(&store, "A"), vec![("a1", 1), ("a3", 2)]);
        assert_eq!(
            layout(&store, "B"),
            vec![("b1", 1), ("a2", 2), ("b2", 3)]
        );
        let a2 = store.find_activity(&ActivityId::new("a2")).unwrap();
        assert_eq!(a2.section_id, SectionId::new("B"));
        assert_consistent(&store);
    }

    #[test]
    fn move_to_same_index_is_identity() {
        let mut store = two_sections();
        let before = store.clone();

        store
            .move_activity(&SectionId::new("A"), 2, &SectionId::new("A"), 2)
            .unwrap();

        assert_eq!(store, before);
    }

    #[test]
    fn same_section_move_shifts_neighbours() {
        let mut store = two_sections();
        store
            .move_activity(&SectionId::new("A"), 0, &SectionId::new("A"), 2)
            .unwrap();

        assert_eq!(
            layout(&store, "A"),
            vec![("a2", 1), ("a3", 2), ("a1", 3)]
        );
    }

    #[test]
    fn move_into_empty_section_and_append_at_end() {
        let mut store = ListStore::from_sections(vec![
            section("A", 1, &["a1", "a2"]),
            section("B", 2, &[]),
        ]);

        store
            .move_activity(&SectionId::new("A"), 0, &SectionId::new("B"), 0)
            .unwrap();
        store
            .move_activity(&SectionId::new("A"), 0, &SectionId::new("B"), 1)
            .unwrap();

        assert!(layout(&store, "A").is_empty());
        assert_eq!(layout(&store, "B"), vec![("a1", 1), ("a2", 2)]);
        assert_consistent(&store);
    }

    #[test]
    fn invalid_move_leaves_tree_untouched() {
        let mut store = two_sections();
        let before = store.clone();

        assert_eq!(
            store.move_activity(&SectionId::new("A"), 3, &SectionId::new("B"), 0),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            store.move_activity(&SectionId::new("A"), 0, &SectionId::new("A"), 3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            store.move_activity(&SectionId::new("A"), 0, &SectionId::new("B"), 3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        );
        assert_eq!(
            store.move_activity(&SectionId::new("Z"), 0, &SectionId::new("B"), 0),
            Err(StoreError::SectionNotFound(SectionId::new("Z")))
        );
        assert_eq!(store, before);
    }

    #[test]
    fn removing_middle_activity_closes_gap() {
        let mut store = ListStore::from_sections(vec![section("S", 1, &["x", "y", "z"])]);

        let removed = store
            .remove_activity(&SectionId::new("S"), &ActivityId::new("y"))
            .unwrap();

        assert_eq!(removed.id, ActivityId::new("y"));
        assert_eq!(layout(&store, "S"), vec![("x", 1), ("z", 2)]);
    }

    #[test]
    fn add_activity_appends_with_next_order() {
        let mut store = two_sections();
        let order = store
            .add_activity(&SectionId::new("B"), activity("b3", "somewhere", 99))
            .unwrap();

        assert_eq!(order, 3);
        assert_eq!(layout(&store, "B").last().unwrap(), &("b3", 3));
        assert_consistent(&store);
    }

    #[test]
    fn move_section_renumbers_sections() {
        let mut store = ListStore::from_sections(vec![
            section("A", 1, &[]),
            section("B", 2, &[]),
            section("C", 3, &[]),
        ]);

        store.move_section(2, 0).unwrap();

        let ids: Vec<(&str, u32)> = store
            .sections()
            .iter()
            .map(|s| (s.id.as_str(), s.order))
            .collect();
        assert_eq!(
            ids,
            vec![("C", 1), ("A", 2), ("B", 3)]
        );
        assert!(store.move_section(0, 3).is_err());
    }

    #[test]
    fn renames_return_previous_value() {
        let mut store = two_sections();
        let old = store.rename_section(&SectionId::new("A"), "Intro").unwrap();
        assert_eq!(old, "Section A");
        assert_eq!(store.sections()[0].title, "Intro");

        let old = store
            .rename_activity(&SectionId::new("B"), &ActivityId::new("b2"), "Reading")
            .unwrap();
        assert_eq!(old, "Activity b2");
        assert_eq!(
            store
                .activity(&SectionId::new("B"), &ActivityId::new("b2"))
                .unwrap()
                .name,
            "Reading"
        );
        assert_eq!(
            store.rename_activity(&SectionId::new("A"), &ActivityId::new("b2"), "x"),
            Err(StoreError::ActivityNotFound(ActivityId::new("b2")))
        );
    }

    #[test]
    fn provisional_ids_are_swapped_including_back_references() {
        let mut store = two_sections();
        let provisional = SectionId::provisional();
        let mut sec = Section::new(provisional.clone(), "Draft", 0);
        sec.activities.push(activity("d1", provisional.as_str(), 1));
        let order = store.insert_section(sec);
        assert_eq!(order, 3);

        store
            .assign_section_id(&provisional, SectionId::new("C"))
            .unwrap();
        assert_eq!(layout(&store, "C"), vec![("d1", 1)]);
        assert_consistent(&store);

        let pending = ActivityId::provisional();
        store
            .add_activity(&SectionId::new("C"), activity(pending.as_str(), "C", 0))
            .unwrap();
        store
            .assign_activity_id(&SectionId::new("C"), &pending, ActivityId::new("d2"))
            .unwrap();
        assert!(store.find_activity(&ActivityId::new("d2")).is_some());
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        let mut store = ListStore::from_sections(vec![
            section("A", 1, &["a1", "a2", "a3", "a4"]),
            section("B", 2, &["b1"]),
            section("C", 3, &[]),
        ]);
        let ids = ["A", "B", "C"];

        // Deterministic pseudo-random walk over moves, adds and removes.
        let mut seed: u64 = 0x2545_f491;
        let mut next = |bound: usize| {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) as usize) % bound.max(1)
        };

        for step in 0..300 {
            let from = SectionId::new(ids[next(3)]);
            let to = SectionId::new(ids[next(3)]);
            let from_len = store.section(&from).unwrap().activities.len();
            match next(4) {
                0 | 1 if from_len > 0 => {
                    let to_len = store.section(&to).unwrap().activities.len();
                    let slots = if from == to { to_len } else { to_len + 1 };
                    store
                        .move_activity(&from, next(from_len), &to, next(slots))
                        .unwrap();
                }
                2 => {
                    let id = format!("n{}", step);
                    store.add_activity(&from, activity(&id, "x", 0)).unwrap();
                }
                3 if from_len > 0 => {
                    let victim = store.section(&from).unwrap().activities[next(from_len)]
                        .id
                        .clone();
                    store.remove_activity(&from, &victim).unwrap();
                }
                _ => {}
            }
            assert_consistent(&store);
        }
    }
}
