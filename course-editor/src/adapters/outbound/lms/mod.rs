mod conversions;

use async_trait::async_trait;
use lms_client::{
    domain::{
        CreateActivityRequest, CreateSectionRequest, UpdateActivityRequest, UpdateSectionRequest,
    },
    LmsClient,
};

use crate::domain::{
    models::{Activity, ActivityId, CourseId, NewActivity, NewSection, Section, SectionId},
    ports::outbound::CourseBackend,
    BackendError,
};

use self::conversions::{map_lms_error, to_domain_activity, to_domain_section, to_wire_type};

/// Adapter that wraps the LMS client to implement the CourseBackend port.
pub struct LmsCourseBackend {
    client: LmsClient,
}

impl LmsCourseBackend {
    pub fn new(client: LmsClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CourseBackend for LmsCourseBackend {
    async fn fetch_sections(&self, course_id: &CourseId) -> Result<Vec<Section>, BackendError> {
        let course = self
            .client
            .get_course(course_id.as_str())
            .await
            .map_err(map_lms_error)?;
        Ok(course.sections.into_iter().map(to_domain_section).collect())
    }

    async fn create_section(
        &self,
        course_id: &CourseId,
        section: &NewSection,
        order: u32,
    ) -> Result<Section, BackendError> {
        let request = CreateSectionRequest {
            course_id: course_id.as_str(),
            title: &section.title,
            description: section.description.as_deref(),
            order,
        };
        let created = self
            .client
            .create_section(&request)
            .await
            .map_err(map_lms_error)?;
        Ok(to_domain_section(created))
    }

    async fn rename_section(
        &self,
        section_id: &SectionId,
        title: &str,
    ) -> Result<(), BackendError> {
        let request = UpdateSectionRequest {
            title: Some(title),
            ..Default::default()
        };
        self.client
            .update_section(section_id.as_str(), &request)
            .await
            .map_err(map_lms_error)
    }

    async fn update_section_order(
        &self,
        section_id: &SectionId,
        order: u32,
    ) -> Result<(), BackendError> {
        let request = UpdateSectionRequest {
            order: Some(order),
            ..Default::default()
        };
        self.client
            .update_section(section_id.as_str(), &request)
            .await
            .map_err(map_lms_error)
    }

    async fn delete_section(&self, section_id: &SectionId) -> Result<(), BackendError> {
        self.client
            .delete_section(section_id.as_str())
            .await
            .map_err(map_lms_error)
    }

    async fn create_activity(
        &self,
        section_id: &SectionId,
        activity: &NewActivity,
        order: u32,
    ) -> Result<Activity, BackendError> {
        let request = CreateActivityRequest {
            title: &activity.name,
            activity_type: to_wire_type(activity.kind),
            content: activity.content.as_deref(),
            order,
            section_id: section_id.as_str(),
            description: activity.description.as_deref(),
        };
        let created = self
            .client
            .create_activity(&request)
            .await
            .map_err(map_lms_error)?;
        Ok(to_domain_activity(created, section_id))
    }

    async fn rename_activity(
        &self,
        activity_id: &ActivityId,
        name: &str,
    ) -> Result<(), BackendError> {
        let request = UpdateActivityRequest {
            title: Some(name),
            ..Default::default()
        };
        self.client
            .update_activity(activity_id.as_str(), &request)
            .await
            .map_err(map_lms_error)
    }

    async fn update_activity_position(
        &self,
        activity_id: &ActivityId,
        order: u32,
        section_id: &SectionId,
    ) -> Result<(), BackendError> {
        let request = UpdateActivityRequest::position(order, section_id.as_str());
        self.client
            .update_activity(activity_id.as_str(), &request)
            .await
            .map_err(map_lms_error)
    }

    async fn delete_activity(&self, activity_id: &ActivityId) -> Result<(), BackendError> {
        self.client
            .delete_activity(activity_id.as_str())
            .await
            .map_err(map_lms_error)
    }
}
