//! In-memory course backend.
//!
//! Backs `--dev` mode and the test suite. Every call is recorded, and writes
//! touching selected ids can be made to fail.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::{
    models::{
        Activity, ActivityId, ActivityKind, CourseId, NewActivity, NewSection, Section, SectionId,
    },
    ports::outbound::CourseBackend,
    BackendError,
};

pub const DEMO_COURSE_ID: &str = "demo-course";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    FetchSections(CourseId),
    CreateSection {
        course_id: CourseId,
        title: String,
        order: u32,
    },
    RenameSection {
        section_id: SectionId,
        title: String,
    },
    UpdateSectionOrder {
        section_id: SectionId,
        order: u32,
    },
    DeleteSection(SectionId),
    CreateActivity {
        section_id: SectionId,
        name: String,
        order: u32,
    },
    RenameActivity {
        activity_id: ActivityId,
        name: String,
    },
    UpdateActivityPosition {
        activity_id: ActivityId,
        order: u32,
        section_id: SectionId,
    },
    DeleteActivity(ActivityId),
}

impl BackendCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, BackendCall::FetchSections(_))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    courses: HashMap<CourseId, Vec<Section>>,
    next_id: u64,
    calls: Vec<BackendCall>,
    failing_ids: HashSet<String>,
    fail_fetch: bool,
}

impl MemoryState {
    fn mint_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check_write(&self, ids: &[&str]) -> Result<(), BackendError> {
        match ids.iter().find(|id| self.failing_ids.contains(**id)) {
            Some(id) => Err(BackendError::Rejected {
                status: 500,
                message: format!("write to {} failed", id),
            }),
            None => Ok(()),
        }
    }

    fn section_mut(&mut self, section_id: &SectionId) -> Result<&mut Section, BackendError> {
        self.courses
            .values_mut()
            .flat_map(|sections| sections.iter_mut())
            .find(|s| &s.id == section_id)
            .ok_or_else(|| BackendError::NotFound(format!("section {}", section_id)))
    }

    fn take_activity(&mut self, activity_id: &ActivityId) -> Result<Activity, BackendError> {
        for section in self.courses.values_mut().flat_map(|s| s.iter_mut()) {
            if let Some(index) = section.position_of(activity_id) {
                return Ok(section.activities.remove(index));
            }
        }
        Err(BackendError::NotFound(format!("activity {}", activity_id)))
    }

    fn activity_mut(&mut self, activity_id: &ActivityId) -> Result<&mut Activity, BackendError> {
        self.courses
            .values_mut()
            .flat_map(|sections| sections.iter_mut())
            .flat_map(|s| s.activities.iter_mut())
            .find(|a| &a.id == activity_id)
            .ok_or_else(|| BackendError::NotFound(format!("activity {}", activity_id)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCourseBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend holding the demo course used by `--dev`.
    pub fn seeded() -> Self {
        Self::new().with_course(CourseId::new(DEMO_COURSE_ID), seed_demo_course())
    }

    pub fn with_course(self, course_id: CourseId, sections: Vec<Section>) -> Self {
        self.lock().courses.insert(course_id, sections);
        self
    }

    /// Make every write that targets `id` (activity or section) fail.
    pub fn fail_writes_for(&self, id: impl Into<String>) {
        self.lock().failing_ids.insert(id.into());
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.lock().fail_fetch = fail;
    }

    pub fn recover(&self) {
        let mut state = self.lock();
        state.failing_ids.clear();
        state.fail_fetch = false;
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<BackendCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_write())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Current server-side state of a course, ordered the way a fetch returns it.
    pub fn snapshot(&self, course_id: &CourseId) -> Vec<Section> {
        let state = self.lock();
        let mut sections = state.courses.get(course_id).cloned().unwrap_or_default();
        sections.sort_by_key(|s| s.order);
        for section in &mut sections {
            section.activities.sort_by_key(|a| a.order);
        }
        sections
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("memory backend lock poisoned")
    }
}

#[async_trait]
impl CourseBackend for InMemoryCourseBackend {
    async fn fetch_sections(&self, course_id: &CourseId) -> Result<Vec<Section>, BackendError> {
        {
            let mut state = self.lock();
            state.calls.push(BackendCall::FetchSections(course_id.clone()));
            if state.fail_fetch {
                return Err(BackendError::Network("connection reset".to_string()));
            }
            if !state.courses.contains_key(course_id) {
                return Err(BackendError::NotFound(format!("course {}", course_id)));
            }
        }
        Ok(self.snapshot(course_id))
    }

    async fn create_section(
        &self,
        course_id: &CourseId,
        section: &NewSection,
        order: u32,
    ) -> Result<Section, BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::CreateSection {
            course_id: course_id.clone(),
            title: section.title.clone(),
            order,
        });
        state.check_write(&[course_id.as_str()])?;

        let id = SectionId::new(state.mint_id("sec"));
        let created = Section {
            id,
            title: section.title.clone(),
            description: section.description.clone(),
            order,
            activities: Vec::new(),
        };
        state
            .courses
            .get_mut(course_id)
            .ok_or_else(|| BackendError::NotFound(format!("course {}", course_id)))?
            .push(created.clone());
        Ok(created)
    }

    async fn rename_section(
        &self,
        section_id: &SectionId,
        title: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::RenameSection {
            section_id: section_id.clone(),
            title: title.to_string(),
        });
        state.check_write(&[section_id.as_str()])?;
        state.section_mut(section_id)?.title = title.to_string();
        Ok(())
    }

    async fn update_section_order(
        &self,
        section_id: &SectionId,
        order: u32,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::UpdateSectionOrder {
            section_id: section_id.clone(),
            order,
        });
        state.check_write(&[section_id.as_str()])?;
        state.section_mut(section_id)?.order = order;
        Ok(())
    }

    async fn delete_section(&self, section_id: &SectionId) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::DeleteSection(section_id.clone()));
        state.check_write(&[section_id.as_str()])?;
        for sections in state.courses.values_mut() {
            if let Some(index) = sections.iter().position(|s| &s.id == section_id) {
                sections.remove(index);
                return Ok(());
            }
        }
        Err(BackendError::NotFound(format!("section {}", section_id)))
    }

    async fn create_activity(
        &self,
        section_id: &SectionId,
        activity: &NewActivity,
        order: u32,
    ) -> Result<Activity, BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::CreateActivity {
            section_id: section_id.clone(),
            name: activity.name.clone(),
            order,
        });
        state.check_write(&[section_id.as_str()])?;

        let id = ActivityId::new(state.mint_id("act"));
        let created = Activity {
            id,
            name: activity.name.clone(),
            order,
            section_id: section_id.clone(),
            kind: activity.kind,
            content: activity.content.clone(),
            description: activity.description.clone(),
        };
        state
            .section_mut(section_id)?
            .activities
            .push(created.clone());
        Ok(created)
    }

    async fn rename_activity(
        &self,
        activity_id: &ActivityId,
        name: &str,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::RenameActivity {
            activity_id: activity_id.clone(),
            name: name.to_string(),
        });
        state.check_write(&[activity_id.as_str()])?;
        state.activity_mut(activity_id)?.name = name.to_string();
        Ok(())
    }

    async fn update_activity_position(
        &self,
        activity_id: &ActivityId,
        order: u32,
        section_id: &SectionId,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        state.calls.push(BackendCall::UpdateActivityPosition {
            activity_id: activity_id.clone(),
            order,
            section_id: section_id.clone(),
        });
        state.check_write(&[activity_id.as_str(), section_id.as_str()])?;

        // Resolve the target first so a bad section id leaves the activity in place.
        state.section_mut(section_id)?;
        let mut activity = state.take_activity(activity_id)?;
        activity.order = order;
        activity.section_id = section_id.clone();
        state.section_mut(section_id)?.activities.push(activity);
        Ok(())
    }

    async fn delete_activity(&self, activity_id: &ActivityId) -> Result<(), BackendError> {
        let mut state = self.lock();
        state
            .calls
            .push(BackendCall::DeleteActivity(activity_id.clone()));
        state.check_write(&[activity_id.as_str()])?;
        state.take_activity(activity_id).map(|_| ())
    }
}

fn seed_demo_course() -> Vec<Section> {
    let section = |id: &str, title: &str, order: u32, activities: &[(&str, &str, ActivityKind)]| {
        Section {
            id: SectionId::new(id),
            title: title.to_string(),
            description: None,
            order,
            activities: activities
                .iter()
                .enumerate()
                .map(|(i, (activity_id, name, kind))| Activity {
                    id: ActivityId::new(*activity_id),
                    name: name.to_string(),
                    order: i as u32 + 1,
                    section_id: SectionId::new(id),
                    kind: *kind,
                    content: None,
                    description: None,
                })
                .collect(),
        }
    };

    vec![
        section(
            "sec-intro",
            "Getting started",
            1,
            &[
                ("act-welcome", "Welcome", ActivityKind::Page),
                ("act-syllabus", "Syllabus", ActivityKind::File),
                ("act-intro-video", "Course overview", ActivityKind::Video),
            ],
        ),
        section(
            "sec-week-1",
            "Week 1: Foundations",
            2,
            &[
                ("act-reading-1", "Required reading", ActivityKind::Url),
                ("act-quiz-1", "Quiz 1", ActivityKind::Quiz),
            ],
        ),
        section(
            "sec-week-2",
            "Week 2: Practice",
            3,
            &[
                ("act-assignment-1", "Assignment 1", ActivityKind::Assignment),
                ("act-discussion", "Discussion board", ActivityKind::Forum),
            ],
        ),
    ]
}
