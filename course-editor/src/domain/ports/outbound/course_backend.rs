use async_trait::async_trait;

use crate::domain::{
    models::{Activity, ActivityId, CourseId, NewActivity, NewSection, Section, SectionId},
    BackendError,
};

/// Outbound port for the system that owns course structure.
///
/// The editor never talks HTTP directly; it goes through this trait so the
/// LMS adapter and the in-memory backend are interchangeable.
#[async_trait]
pub trait CourseBackend: Send + Sync + 'static {
    /// Fetch every section of a course with its activities nested.
    async fn fetch_sections(&self, course_id: &CourseId) -> Result<Vec<Section>, BackendError>;

    /// Create a section at `order`. Returns the section with its durable id.
    async fn create_section(
        &self,
        course_id: &CourseId,
        section: &NewSection,
        order: u32,
    ) -> Result<Section, BackendError>;

    async fn rename_section(&self, section_id: &SectionId, title: &str)
        -> Result<(), BackendError>;

    async fn update_section_order(
        &self,
        section_id: &SectionId,
        order: u32,
    ) -> Result<(), BackendError>;

    /// Delete a section. The backend drops its activities with it.
    async fn delete_section(&self, section_id: &SectionId) -> Result<(), BackendError>;

    /// Create an activity at `order` inside `section_id`. Returns it with its durable id.
    async fn create_activity(
        &self,
        section_id: &SectionId,
        activity: &NewActivity,
        order: u32,
    ) -> Result<Activity, BackendError>;

    async fn rename_activity(
        &self,
        activity_id: &ActivityId,
        name: &str,
    ) -> Result<(), BackendError>;

    /// Persist an activity's position. This is the only write reconciliation issues per activity.
    async fn update_activity_position(
        &self,
        activity_id: &ActivityId,
        order: u32,
        section_id: &SectionId,
    ) -> Result<(), BackendError>;

    async fn delete_activity(&self, activity_id: &ActivityId) -> Result<(), BackendError>;
}
