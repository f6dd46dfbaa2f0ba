use super::{Activity, SectionId};

/// A named, ordered group of activities within a course.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    pub description: Option<String>,
    /// 1-based position among the course's sections.
    pub order: u32,
    /// Always sorted by ascending `order`.
    pub activities: Vec<Activity>,
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            order,
            activities: Vec::new(),
        }
    }

    pub fn position_of(&self, activity_id: &super::ActivityId) -> Option<usize> {
        self.activities.iter().position(|a| &a.id == activity_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSection {
    pub title: String,
    pub description: Option<String>,
}
