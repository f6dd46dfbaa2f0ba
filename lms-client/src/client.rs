use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{
    Activity, Course, CourseSection, CreateActivityRequest, CreateSectionRequest,
    UpdateActivityRequest, UpdateSectionRequest,
};

/// HTTP client for the LMS backend that owns courses, sections and activities.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct LmsClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl LmsClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, LmsError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| LmsError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(LmsError::InvalidUrl(base_url.to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| LmsError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Attach a bearer token that is sent with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL below the base URL. Segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder, call_name: &str) -> Result<Response, LmsError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| LmsError::Request(format!("Failed to call {}: {}", call_name, e)))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(LmsError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(LmsError::NotFound(call_name.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LmsError::Status {
                call: call_name.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        debug!(call = call_name, status = status.as_u16(), "LMS call succeeded");
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T, LmsError> {
        let response = self.send(request, call_name).await?;
        let body = response
            .text()
            .await
            .map_err(|e| LmsError::Request(format!("Failed to read {} body: {}", call_name, e)))?;

        serde_json::from_str(&body).map_err(|e| {
            LmsError::Parsing(format!("Failed to parse {} response as JSON: {}", call_name, e))
        })
    }

    async fn send_without_body(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<(), LmsError> {
        let response = self.send(request, call_name).await?;
        response
            .bytes()
            .await
            .map_err(|e| LmsError::Request(format!("Failed to read {} body: {}", call_name, e)))?;
        Ok(())
    }

    #[instrument(name = "LmsClient::get_course", skip(self))]
    pub async fn get_course(&self, course_id: &str) -> Result<Course, LmsError> {
        self.get_json(
            self.client.get(self.endpoint(&["courses", course_id])),
            "GET /courses/:id",
        )
        .await
    }

    #[instrument(name = "LmsClient::create_section", skip(self, request), fields(course_id = request.course_id))]
    pub async fn create_section(
        &self,
        request: &CreateSectionRequest<'_>,
    ) -> Result<CourseSection, LmsError> {
        self.get_json(
            self.client
                .post(self.endpoint(&["course-sections"]))
                .json(request),
            "POST /course-sections",
        )
        .await
    }

    #[instrument(name = "LmsClient::update_section", skip(self, request))]
    pub async fn update_section(
        &self,
        section_id: &str,
        request: &UpdateSectionRequest<'_>,
    ) -> Result<(), LmsError> {
        self.send_without_body(
            self.client
                .patch(self.endpoint(&["course-sections", section_id]))
                .json(request),
            "PATCH /course-sections/:id",
        )
        .await
    }

    #[instrument(name = "LmsClient::delete_section", skip(self))]
    pub async fn delete_section(&self, section_id: &str) -> Result<(), LmsError> {
        self.send_without_body(
            self.client
                .delete(self.endpoint(&["courses", "sections", section_id])),
            "DELETE /courses/sections/:id",
        )
        .await
    }

    #[instrument(name = "LmsClient::create_activity", skip(self, request), fields(section_id = request.section_id))]
    pub async fn create_activity(
        &self,
        request: &CreateActivityRequest<'_>,
    ) -> Result<Activity, LmsError> {
        self.get_json(
            self.client.post(self.endpoint(&["activities"])).json(request),
            "POST /activities",
        )
        .await
    }

    #[instrument(name = "LmsClient::update_activity", skip(self, request))]
    pub async fn update_activity(
        &self,
        activity_id: &str,
        request: &UpdateActivityRequest<'_>,
    ) -> Result<(), LmsError> {
        self.send_without_body(
            self.client
                .patch(self.endpoint(&["activities", activity_id]))
                .json(request),
            "PATCH /activities/:id",
        )
        .await
    }

    #[instrument(name = "LmsClient::delete_activity", skip(self))]
    pub async fn delete_activity(&self, activity_id: &str) -> Result<(), LmsError> {
        self.send_without_body(
            self.client.delete(self.endpoint(&["activities", activity_id])),
            "DELETE /activities/:id",
        )
        .await
    }
}

#[derive(Error, Debug)]
pub enum LmsError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("{call} returned {status}: {body}")]
    Status {
        call: String,
        status: u16,
        body: String,
    },
    #[error("RequestError: {0}")]
    Request(String),
    #[error("ParsingError: {0}")]
    Parsing(String),
}
