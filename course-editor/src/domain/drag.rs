//! Boundary with the drag-and-drop controller.
//!
//! The controller reports one [`DragGesture`] per completed drag. The editor
//! only ever sees the closed [`DragEvent`] it converts into.

use serde::Deserialize;

use super::models::SectionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DragKind {
    Section,
    Activity,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragLocation {
    pub container_id: String,
    pub index: usize,
}

/// Raw payload of a completed gesture, as the controller reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragGesture {
    pub kind: DragKind,
    pub source: DragLocation,
    /// `None` when the item was dropped outside any container.
    #[serde(default)]
    pub destination: Option<DragLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    SectionMove {
        from_index: usize,
        to_index: usize,
    },
    ActivityMove {
        source_section_id: SectionId,
        source_index: usize,
        dest_section_id: SectionId,
        dest_index: usize,
    },
    Cancelled,
}

impl DragEvent {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DragEvent::Cancelled)
    }
}

impl From<DragGesture> for DragEvent {
    fn from(gesture: DragGesture) -> Self {
        let Some(destination) = gesture.destination else {
            return DragEvent::Cancelled;
        };

        match gesture.kind {
            DragKind::Section => DragEvent::SectionMove {
                from_index: gesture.source.index,
                to_index: destination.index,
            },
            DragKind::Activity => DragEvent::ActivityMove {
                source_section_id: SectionId::new(gesture.source.container_id),
                source_index: gesture.source.index,
                dest_section_id: SectionId::new(destination.container_id),
                dest_index: destination.index,
            },
        }
    }
}
