use tracing::{debug, info};

use crate::domain::{
    ports::outbound::CourseBackend, reconcile::ReconcileOutcome, services::CourseEditor,
    EditorError,
};

use super::action_queue::Action;

pub(super) async fn run_action<B: CourseBackend>(
    action: Action,
    editor: &mut CourseEditor<B>,
) -> Result<(), EditorError> {
    match action {
        Action::Drag(event) if event.is_cancelled() => {
            debug!("Drag cancelled, nothing to apply");
        }
        Action::Drag(event) => {
            let outcome = editor.handle_drag(event).await?;
            log_outcome(outcome);
        }
        Action::CreateSection(section) => {
            let id = editor.create_section(section).await?;
            info!(section_id = %id, "Section added");
        }
        Action::RenameSection { section_id, title } => {
            editor.rename_section(&section_id, &title).await?;
        }
        Action::DeleteSection(section_id) => {
            editor.delete_section(&section_id).await?;
        }
        Action::AddActivity {
            section_id,
            activity,
        } => {
            let id = editor.add_activity(&section_id, activity).await?;
            info!(activity_id = %id, section_id = %section_id, "Activity added");
        }
        Action::RenameActivity {
            section_id,
            activity_id,
            name,
        } => {
            editor
                .rename_activity(&section_id, &activity_id, &name)
                .await?;
        }
        Action::DeleteActivity {
            section_id,
            activity_id,
        } => {
            let outcome = editor.delete_activity(&section_id, &activity_id).await?;
            log_outcome(outcome);
        }
        Action::Refresh => {
            editor.refresh().await?;
        }
    }
    Ok(())
}

fn log_outcome(outcome: ReconcileOutcome) {
    match outcome {
        ReconcileOutcome::Unchanged => info!("Nothing to save"),
        ReconcileOutcome::Saved { writes } => info!(writes, "Order saved"),
        ReconcileOutcome::Reverted { failed } => info!(failed, "Order reverted to server state"),
    }
}
