use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    drag::DragEvent,
    models::{
        Activity, ActivityId, CourseId, NewActivity, NewSection, Section, SectionId,
    },
    ports::outbound::CourseBackend,
    reconcile::{PositionSnapshot, ReconcileOutcome, Reconciler, ReorderPlan},
    store::ListStore,
    EditorError, StoreError,
};

/// Editing session for one course.
///
/// Owns the course tree and the backend handle. Every mutation happens on
/// the local tree first (synchronously), and only then is the backend
/// called. Failures are reported through [`CourseEditor::status`] and undone
/// by reverting the one field, dropping the provisional entity, or reloading
/// the whole course.
pub struct CourseEditor<B> {
    backend: Arc<B>,
    course_id: CourseId,
    store: ListStore,
    reconciler: Reconciler<B>,
    is_ordering: bool,
    status: Option<String>,
}

impl<B: CourseBackend> CourseEditor<B> {
    pub fn new(backend: Arc<B>, course_id: CourseId) -> Self {
        Self {
            reconciler: Reconciler::new(backend.clone(), course_id.clone()),
            backend,
            course_id,
            store: ListStore::new(),
            is_ordering: false,
            status: None,
        }
    }

    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    /// True between a reorder being applied locally and its writes resolving.
    pub fn is_ordering(&self) -> bool {
        self.is_ordering
    }

    /// Last user-facing notice, set whenever a backend call fails.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    /// Replace the tree with the backend's current state.
    #[instrument(name = "CourseEditor::load", skip(self), fields(course_id = %self.course_id))]
    pub async fn load(&mut self) -> Result<(), EditorError> {
        let sections = self.backend.fetch_sections(&self.course_id).await?;
        info!(sections = sections.len(), "Loaded course");
        self.store.replace_all(sections);
        Ok(())
    }

    /// Reload on user request. Clears any pending notice first.
    pub async fn refresh(&mut self) -> Result<(), EditorError> {
        self.clear_status();
        self.load().await
    }

    async fn reload_after_failure(&mut self) {
        if let Err(e) = self.load().await {
            error!(course_id = %self.course_id, error = %e, "Failed to reload course");
        }
    }

    /// Apply a drag locally and return the writes needed to persist it.
    ///
    /// `None` means there is nothing to save. While a previous plan is still
    /// being reconciled, moves are refused with [`EditorError::Busy`].
    pub fn apply_drag(&mut self, event: DragEvent) -> Result<Option<ReorderPlan>, EditorError> {
        match event {
            DragEvent::Cancelled => Ok(None),
            _ if self.is_ordering => Err(EditorError::Busy),
            DragEvent::SectionMove {
                from_index,
                to_index,
            } => {
                if from_index == to_index {
                    return Ok(None);
                }
                let snapshot = PositionSnapshot::of_sections(&self.store);
                self.store.move_section(from_index, to_index)?;
                debug!(from_index, to_index, "Moved section");

                self.begin_ordering(ReorderPlan {
                    activities: Vec::new(),
                    sections: snapshot.section_patches(&self.store),
                })
            }
            DragEvent::ActivityMove {
                source_section_id,
                source_index,
                dest_section_id,
                dest_index,
            } => {
                let touched = [&source_section_id, &dest_section_id];
                let snapshot = PositionSnapshot::of_activities(&self.store, &touched);
                let moved = self.store.move_activity(
                    &source_section_id,
                    source_index,
                    &dest_section_id,
                    dest_index,
                )?;
                debug!(
                    activity_id = %moved,
                    from = %source_section_id,
                    to = %dest_section_id,
                    dest_index,
                    "Moved activity"
                );

                self.begin_ordering(ReorderPlan {
                    activities: snapshot.activity_patches(&self.store, &touched),
                    sections: Vec::new(),
                })
            }
        }
    }

    fn begin_ordering(&mut self, plan: ReorderPlan) -> Result<Option<ReorderPlan>, EditorError> {
        if plan.is_empty() {
            return Ok(None);
        }
        self.is_ordering = true;
        Ok(Some(plan))
    }

    /// Persist a plan produced by [`CourseEditor::apply_drag`].
    pub async fn reconcile(&mut self, plan: ReorderPlan) -> Result<ReconcileOutcome, EditorError> {
        let result = self.reconciler.reconcile(&mut self.store, &plan).await;
        self.is_ordering = false;

        match &result {
            Ok(ReconcileOutcome::Reverted { .. }) => {
                self.set_status("The new order could not be saved. The course was reloaded.");
            }
            Err(e) => {
                self.set_status(format!(
                    "The new order could not be saved and the course could not be reloaded: {}",
                    e
                ));
            }
            Ok(_) => {}
        }
        Ok(result?)
    }

    /// Apply a drag and persist it.
    pub async fn handle_drag(&mut self, event: DragEvent) -> Result<ReconcileOutcome, EditorError> {
        match self.apply_drag(event)? {
            Some(plan) => self.reconcile(plan).await,
            None => Ok(ReconcileOutcome::Unchanged),
        }
    }

    #[instrument(name = "CourseEditor::create_section", skip(self, draft), fields(course_id = %self.course_id))]
    pub async fn create_section(&mut self, draft: NewSection) -> Result<SectionId, EditorError> {
        let draft = NewSection {
            title: required_text(&draft.title, "Section title")?,
            description: optional_text(draft.description),
        };

        let provisional = SectionId::provisional();
        let mut section = Section::new(provisional.clone(), draft.title.clone(), 0);
        section.description = draft.description.clone();
        let order = self.store.insert_section(section);

        match self
            .backend
            .create_section(&self.course_id, &draft, order)
            .await
        {
            Ok(created) => {
                self.store.assign_section_id(&provisional, created.id.clone())?;
                info!(section_id = %created.id, order, "Created section");
                Ok(created.id)
            }
            Err(e) => {
                self.store.remove_section(&provisional)?;
                warn!(error = %e, "Failed to create section");
                self.set_status(format!("Could not create section: {}", e));
                Err(e.into())
            }
        }
    }

    #[instrument(name = "CourseEditor::rename_section", skip(self, title))]
    pub async fn rename_section(
        &mut self,
        section_id: &SectionId,
        title: &str,
    ) -> Result<(), EditorError> {
        let title = required_text(title, "Section title")?;
        ensure_saved(section_id.is_provisional(), section_id)?;

        let previous = self.store.rename_section(section_id, title.clone())?;
        if let Err(e) = self.backend.rename_section(section_id, &title).await {
            self.store.rename_section(section_id, previous)?;
            warn!(error = %e, "Failed to rename section, reverted");
            self.set_status(format!("Could not rename section: {}", e));
            return Err(e.into());
        }
        Ok(())
    }

    /// Delete a section. The local tree only changes once the backend confirms.
    #[instrument(name = "CourseEditor::delete_section", skip(self))]
    pub async fn delete_section(&mut self, section_id: &SectionId) -> Result<(), EditorError> {
        if self.store.section(section_id).is_none() {
            return Err(StoreError::SectionNotFound(section_id.clone()).into());
        }
        ensure_saved(section_id.is_provisional(), section_id)?;

        if let Err(e) = self.backend.delete_section(section_id).await {
            warn!(error = %e, "Failed to delete section");
            self.set_status(format!("Could not delete section: {}", e));
            return Err(e.into());
        }
        self.store.remove_section(section_id)?;
        info!("Deleted section");
        Ok(())
    }

    #[instrument(name = "CourseEditor::add_activity", skip(self, draft))]
    pub async fn add_activity(
        &mut self,
        section_id: &SectionId,
        draft: NewActivity,
    ) -> Result<ActivityId, EditorError> {
        let draft = NewActivity {
            name: required_text(&draft.name, "Activity title")?,
            kind: draft.kind,
            content: optional_text(draft.content),
            description: optional_text(draft.description),
        };
        ensure_saved(section_id.is_provisional(), section_id)?;

        let provisional = ActivityId::provisional();
        let order = self.store.add_activity(
            section_id,
            Activity {
                id: provisional.clone(),
                name: draft.name.clone(),
                order: 0,
                section_id: section_id.clone(),
                kind: draft.kind,
                content: draft.content.clone(),
                description: draft.description.clone(),
            },
        )?;

        match self
            .backend
            .create_activity(section_id, &draft, order)
            .await
        {
            Ok(created) => {
                self.store
                    .assign_activity_id(section_id, &provisional, created.id.clone())?;
                info!(activity_id = %created.id, order, "Created activity");
                Ok(created.id)
            }
            Err(e) => {
                self.store.remove_activity(section_id, &provisional)?;
                warn!(error = %e, "Failed to create activity");
                self.set_status(format!("Could not create activity: {}", e));
                Err(e.into())
            }
        }
    }

    #[instrument(name = "CourseEditor::rename_activity", skip(self, name))]
    pub async fn rename_activity(
        &mut self,
        section_id: &SectionId,
        activity_id: &ActivityId,
        name: &str,
    ) -> Result<(), EditorError> {
        let name = required_text(name, "Activity title")?;
        ensure_saved(activity_id.is_provisional(), activity_id)?;

        let previous = self
            .store
            .rename_activity(section_id, activity_id, name.clone())?;
        if let Err(e) = self.backend.rename_activity(activity_id, &name).await {
            self.store
                .rename_activity(section_id, activity_id, previous)?;
            warn!(error = %e, "Failed to rename activity, reverted");
            self.set_status(format!("Could not rename activity: {}", e));
            return Err(e.into());
        }
        Ok(())
    }

    /// Delete an activity and persist the renumbering of the siblings after it.
    ///
    /// The activity disappears locally right away. If the backend refuses the
    /// delete, the course is reloaded.
    #[instrument(name = "CourseEditor::delete_activity", skip(self))]
    pub async fn delete_activity(
        &mut self,
        section_id: &SectionId,
        activity_id: &ActivityId,
    ) -> Result<ReconcileOutcome, EditorError> {
        if self.is_ordering {
            return Err(EditorError::Busy);
        }
        ensure_saved(activity_id.is_provisional(), activity_id)?;

        let snapshot = PositionSnapshot::of_activities(&self.store, &[section_id]);
        self.store.remove_activity(section_id, activity_id)?;

        if let Err(e) = self.backend.delete_activity(activity_id).await {
            warn!(error = %e, "Failed to delete activity, reloading course");
            self.set_status(format!("Could not delete activity: {}", e));
            self.reload_after_failure().await;
            return Err(e.into());
        }
        info!("Deleted activity");

        let plan = ReorderPlan {
            activities: snapshot.activity_patches(&self.store, &[section_id]),
            sections: Vec::new(),
        };
        match self.begin_ordering(plan)? {
            Some(plan) => self.reconcile(plan).await,
            None => Ok(ReconcileOutcome::Unchanged),
        }
    }
}

fn required_text(value: &str, field: &str) -> Result<String, EditorError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(EditorError::invalid_input(format!("{} must not be empty", field)));
    }
    Ok(value.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn ensure_saved(provisional: bool, id: &impl std::fmt::Display) -> Result<(), EditorError> {
    if provisional {
        return Err(EditorError::Provisional(id.to_string()));
    }
    Ok(())
}
