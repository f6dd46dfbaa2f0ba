//! Persisting local reorders.
//!
//! A reorder is applied to the [`ListStore`] first. The positions captured
//! just before that mutation are diffed against the store afterwards, which
//! yields the smallest set of writes that brings the backend in line. Writes
//! go out concurrently; if any of them fails the whole course is refetched.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{join, join_all};
use tracing::{error, info, warn};

use super::{
    models::{ActivityId, CourseId, SectionId},
    ports::outbound::CourseBackend,
    store::ListStore,
    BackendError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityPatch {
    pub activity_id: ActivityId,
    pub order: u32,
    pub section_id: SectionId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPatch {
    pub section_id: SectionId,
    pub order: u32,
}

/// Writes implied by one local reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorderPlan {
    pub activities: Vec<ActivityPatch>,
    pub sections: Vec<SectionPatch>,
}

impl ReorderPlan {
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.activities.len() + self.sections.len()
    }
}

/// Positions as they were before a local mutation.
#[derive(Debug, Clone, Default)]
pub struct PositionSnapshot {
    activities: HashMap<ActivityId, (u32, SectionId)>,
    sections: HashMap<SectionId, u32>,
}

impl PositionSnapshot {
    /// Record `(order, section)` for every activity in the given sections.
    pub fn of_activities(store: &ListStore, section_ids: &[&SectionId]) -> Self {
        let activities = section_ids
            .iter()
            .filter_map(|id| store.section(id))
            .flat_map(|s| s.activities.iter())
            .map(|a| (a.id.clone(), (a.order, a.section_id.clone())))
            .collect();

        Self {
            activities,
            sections: HashMap::new(),
        }
    }

    /// Record the order of every section.
    pub fn of_sections(store: &ListStore) -> Self {
        Self {
            activities: HashMap::new(),
            sections: store
                .sections()
                .iter()
                .map(|s| (s.id.clone(), s.order))
                .collect(),
        }
    }

    /// Walk the given sections (each at most once, in the given order) and
    /// emit a patch for every activity whose order or section changed.
    pub fn activity_patches(
        &self,
        store: &ListStore,
        section_ids: &[&SectionId],
    ) -> Vec<ActivityPatch> {
        let mut patches = Vec::new();
        for (i, section_id) in section_ids.iter().enumerate() {
            if section_ids[..i].contains(section_id) {
                continue;
            }
            let Some(section) = store.section(section_id) else {
                continue;
            };
            for activity in &section.activities {
                let current = (activity.order, &activity.section_id);
                let changed = match self.activities.get(&activity.id) {
                    Some((order, old_section)) => (*order, old_section) != current,
                    None => true,
                };
                if changed {
                    patches.push(ActivityPatch {
                        activity_id: activity.id.clone(),
                        order: activity.order,
                        section_id: activity.section_id.clone(),
                    });
                }
            }
        }
        patches
    }

    pub fn section_patches(&self, store: &ListStore) -> Vec<SectionPatch> {
        store
            .sections()
            .iter()
            .filter(|s| self.sections.get(&s.id) != Some(&s.order))
            .map(|s| SectionPatch {
                section_id: s.id.clone(),
                order: s.order,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Nothing changed, no request was made.
    Unchanged,
    /// Every write succeeded; the local tree already matches the backend.
    Saved { writes: usize },
    /// At least one write failed and the tree was reloaded from the backend.
    Reverted { failed: usize },
}

pub struct Reconciler<B> {
    backend: Arc<B>,
    course_id: CourseId,
}

impl<B: CourseBackend> Reconciler<B> {
    pub fn new(backend: Arc<B>, course_id: CourseId) -> Self {
        Self { backend, course_id }
    }

    /// Persist `plan`. On any failed write the store is replaced by a fresh
    /// snapshot; an error is only returned when that refetch fails too.
    pub async fn reconcile(
        &self,
        store: &mut ListStore,
        plan: &ReorderPlan,
    ) -> Result<ReconcileOutcome, BackendError> {
        if plan.is_empty() {
            return Ok(ReconcileOutcome::Unchanged);
        }

        let activity_writes = plan.activities.iter().map(|patch| async move {
            self.backend
                .update_activity_position(&patch.activity_id, patch.order, &patch.section_id)
                .await
                .map_err(|e| (patch.activity_id.to_string(), e))
        });
        let section_writes = plan.sections.iter().map(|patch| async move {
            self.backend
                .update_section_order(&patch.section_id, patch.order)
                .await
                .map_err(|e| (patch.section_id.to_string(), e))
        });

        let (activity_results, section_results) =
            join(join_all(activity_writes), join_all(section_writes)).await;

        let mut failed = 0;
        for (id, e) in activity_results
            .into_iter()
            .chain(section_results)
            .filter_map(Result::err)
        {
            warn!(course_id = %self.course_id, id = %id, error = %e, "Failed to save position");
            failed += 1;
        }

        if failed == 0 {
            info!(course_id = %self.course_id, writes = plan.len(), "Saved new order");
            return Ok(ReconcileOutcome::Saved { writes: plan.len() });
        }

        error!(
            course_id = %self.course_id,
            failed,
            "Order could not be saved, reloading course"
        );
        let sections = self.backend.fetch_sections(&self.course_id).await?;
        store.replace_all(sections);
        Ok(ReconcileOutcome::Reverted { failed })
    }
}
