use lms_client::domain as wire;

use crate::domain::{
    models::{Activity, ActivityId, ActivityKind, Section, SectionId},
    BackendError,
};

/// Convert an LMS course section, including its activities, to a domain Section.
pub fn to_domain_section(section: wire::CourseSection) -> Section {
    let id = SectionId::new(section.id);
    let activities = section
        .activities
        .into_iter()
        .map(|a| to_domain_activity(a, &id))
        .collect();

    Section {
        id,
        title: section.title,
        description: section.description,
        order: section.order,
        activities,
    }
}

/// Convert an LMS activity to a domain Activity.
///
/// The parent is taken from the section the activity was nested in, not from
/// the activity's own `sectionId` field.
pub fn to_domain_activity(activity: wire::Activity, section_id: &SectionId) -> Activity {
    Activity {
        id: ActivityId::new(activity.id),
        name: activity.title,
        order: activity.order,
        section_id: section_id.clone(),
        kind: to_domain_kind(activity.activity_type),
        content: activity.content,
        description: activity.description,
    }
}

pub fn to_domain_kind(activity_type: wire::ActivityType) -> ActivityKind {
    match activity_type {
        wire::ActivityType::Page => ActivityKind::Page,
        wire::ActivityType::File => ActivityKind::File,
        wire::ActivityType::Url => ActivityKind::Url,
        wire::ActivityType::Video => ActivityKind::Video,
        wire::ActivityType::Quiz => ActivityKind::Quiz,
        wire::ActivityType::Assignment => ActivityKind::Assignment,
        wire::ActivityType::Forum => ActivityKind::Forum,
        wire::ActivityType::Other => ActivityKind::Other,
    }
}

pub fn to_wire_type(kind: ActivityKind) -> wire::ActivityType {
    match kind {
        ActivityKind::Page => wire::ActivityType::Page,
        ActivityKind::File => wire::ActivityType::File,
        ActivityKind::Url => wire::ActivityType::Url,
        ActivityKind::Video => wire::ActivityType::Video,
        ActivityKind::Quiz => wire::ActivityType::Quiz,
        ActivityKind::Assignment => wire::ActivityType::Assignment,
        ActivityKind::Forum => wire::ActivityType::Forum,
        ActivityKind::Other => wire::ActivityType::Other,
    }
}

pub fn map_lms_error(e: lms_client::LmsError) -> BackendError {
    match e {
        lms_client::LmsError::Unauthorized => BackendError::Unauthorized,
        lms_client::LmsError::NotFound(call) => BackendError::NotFound(call),
        lms_client::LmsError::Status { status, body, .. } => BackendError::Rejected {
            status,
            message: body,
        },
        lms_client::LmsError::Request(msg) => BackendError::Network(msg),
        lms_client::LmsError::Parsing(msg) => BackendError::InvalidResponse(msg),
        lms_client::LmsError::InvalidUrl(msg) => BackendError::unknown(msg),
    }
}
