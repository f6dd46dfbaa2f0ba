use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::{
    drag::DragEvent,
    models::{ActivityId, NewActivity, NewSection, SectionId},
};

/// One user intent, queued for the editor.
///
/// Actions are handled strictly in the order they were sent. A drag is only
/// taken off the queue once the previous one has been saved or reverted.
#[derive(Debug, Clone)]
pub enum Action {
    Drag(DragEvent),
    CreateSection(NewSection),
    RenameSection {
        section_id: SectionId,
        title: String,
    },
    DeleteSection(SectionId),
    AddActivity {
        section_id: SectionId,
        activity: NewActivity,
    },
    RenameActivity {
        section_id: SectionId,
        activity_id: ActivityId,
        name: String,
    },
    DeleteActivity {
        section_id: SectionId,
        activity_id: ActivityId,
    },
    Refresh,
}

pub type ActionTx = UnboundedSender<Action>;
pub type ActionRx = UnboundedReceiver<Action>;

pub fn channel() -> (ActionTx, ActionRx) {
    mpsc::unbounded_channel()
}
