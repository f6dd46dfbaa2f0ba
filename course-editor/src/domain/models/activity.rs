use strum::{Display, EnumString};

use super::{ActivityId, SectionId};

/// A single content unit positioned inside exactly one section.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub id: ActivityId,
    pub name: String,
    /// 1-based position inside the owning section.
    pub order: u32,
    pub section_id: SectionId,
    pub kind: ActivityKind,
    pub content: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ActivityKind {
    #[default]
    Page,
    File,
    Url,
    Video,
    Quiz,
    Assignment,
    Forum,
    Other,
}

/// User input for a new activity, before it has an id or a position.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub name: String,
    pub kind: ActivityKind,
    pub content: Option<String>,
    pub description: Option<String>,
}

impl NewActivity {
    pub fn new(name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            name: name.into(),
            kind,
            content: None,
            description: None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}
