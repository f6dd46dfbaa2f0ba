use tracing::{debug, warn};

use crate::domain::{ports::outbound::CourseBackend, services::CourseEditor};

use super::{action_queue::ActionRx, actions::run_action};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Drain the action queue into the editor until every sender is dropped.
///
/// A failing action is logged and counted; it never stops the loop.
pub async fn run_actions<B: CourseBackend>(
    mut action_rx: ActionRx,
    editor: &mut CourseEditor<B>,
) -> RunSummary {
    let mut summary = RunSummary::default();

    while let Some(action) = action_rx.recv().await {
        debug!(?action, "Running action");
        match run_action(action, editor).await {
            Ok(()) => summary.succeeded += 1,
            Err(e) => {
                warn!(error = %e, "Action failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::adapters::outbound::memory::{InMemoryCourseBackend, DEMO_COURSE_ID};
    use crate::domain::{
        drag::DragEvent,
        models::{ActivityId, CourseId, NewSection, SectionId},
    };
    use crate::runtime::{channel, Action};

    #[tokio::test]
    async fn queued_actions_run_in_order_and_survive_failures() {
        let course_id = CourseId::new(DEMO_COURSE_ID);
        let backend = Arc::new(InMemoryCourseBackend::seeded());
        backend.fail_writes_for("sec-week-2");
        let mut editor = CourseEditor::new(backend.clone(), course_id.clone());
        editor.load().await.unwrap();

        let (tx, rx) = channel();
        tx.send(Action::Drag(DragEvent::ActivityMove {
            source_section_id: SectionId::new("sec-intro"),
            source_index: 0,
            dest_section_id: SectionId::new("sec-week-1"),
            dest_index: 2,
        }))
        .unwrap();
        tx.send(Action::Drag(DragEvent::ActivityMove {
            source_section_id: SectionId::new("sec-week-1"),
            source_index: 2,
            dest_section_id: SectionId::new("sec-intro"),
            dest_index: 0,
        }))
        .unwrap();
        tx.send(Action::RenameSection {
            section_id: SectionId::new("sec-week-2"),
            title: "Week 2".to_string(),
        })
        .unwrap();
        tx.send(Action::CreateSection(NewSection {
            title: "Wrap-up".to_string(),
            description: None,
        }))
        .unwrap();
        tx.send(Action::Drag(DragEvent::Cancelled)).unwrap();
        drop(tx);

        let summary = run_actions(rx, &mut editor).await;

        assert_eq!(
            summary,
            RunSummary {
                succeeded: 4,
                failed: 1
            }
        );
        let intro = editor.store().section(&SectionId::new("sec-intro")).unwrap();
        assert_eq!(intro.activities[0].id, ActivityId::new("act-welcome"));
        assert_eq!(editor.store().sections().len(), 4);
        assert_eq!(backend.snapshot(&course_id), editor.store().sections().to_vec());
        assert!(!editor.is_ordering());
    }
}
