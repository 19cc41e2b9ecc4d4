//! In-memory project / application store behind the mock service.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use telemetry_models::{
    AppId, ApplicationLogs, ApplicationSummary, AssistantState, ChatItem, Project, ProjectId,
    Step,
};
use uuid::Uuid;

use crate::error::MockError;

/// Everything recorded for one application.
#[derive(Debug, Clone)]
pub struct AppRecord {
    pub created: DateTime<Utc>,
    pub last_written: DateTime<Utc>,
    pub steps: Vec<Step>,
    pub chat: Vec<ChatItem>,
    pub assistant: AssistantState,
}

impl AppRecord {
    fn new(app_id: AppId, at: DateTime<Utc>) -> Self {
        Self {
            created: at,
            last_written: at,
            steps: Vec::new(),
            chat: Vec::new(),
            assistant: AssistantState::new(app_id),
        }
    }

    /// Append a finished step and bump the write time.
    pub fn record_step(&mut self, action: &str, result: Option<serde_json::Value>) {
        let now = Utc::now();
        self.steps.push(Step {
            sequence_id: self.steps.len() as u64,
            action: action.to_string(),
            start_time: now,
            end_time: Some(now),
            result,
            exception: None,
        });
        self.last_written = now;
    }

    fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            num_steps: self.steps.len() as u64,
            first_written: self.created,
            last_written: self.last_written,
            ..ApplicationSummary::empty(self.assistant.app_id.clone(), self.created)
        }
    }
}

#[derive(Debug, Clone)]
struct ProjectRecord {
    created: DateTime<Utc>,
    apps: BTreeMap<AppId, AppRecord>,
}

/// An application to pre-load into the store.
#[derive(Debug, Clone)]
pub struct SeedApp {
    app_id: AppId,
    num_steps: u64,
    minutes_ago: i64,
}

impl SeedApp {
    /// An application with `num_steps` steps, last written `minutes_ago`.
    pub fn new(app_id: &str, num_steps: u64, minutes_ago: i64) -> Self {
        Self {
            app_id: AppId::new(app_id),
            num_steps,
            minutes_ago,
        }
    }
}

/// All projects known to the mock service.
#[derive(Debug, Default)]
pub struct Store {
    projects: BTreeMap<ProjectId, ProjectRecord>,
}

impl Store {
    /// Ensure a project exists.
    pub fn ensure_project(&mut self, project: &ProjectId) {
        self.projects
            .entry(project.clone())
            .or_insert_with(|| ProjectRecord {
                created: Utc::now(),
                apps: BTreeMap::new(),
            });
    }

    /// Insert a pre-built application.
    pub fn seed(&mut self, project: &ProjectId, seed: SeedApp) {
        self.ensure_project(project);
        let last_written = Utc::now() - Duration::minutes(seed.minutes_ago);
        let created = last_written - Duration::minutes(seed.num_steps as i64);
        let mut record = AppRecord::new(seed.app_id.clone(), created);
        for i in 0..seed.num_steps {
            let at = created + Duration::minutes(i as i64);
            record.steps.push(Step {
                sequence_id: i,
                action: "seeded".into(),
                start_time: at,
                end_time: Some(at),
                result: None,
                exception: None,
            });
        }
        record.last_written = last_written;
        if let Some(p) = self.projects.get_mut(project) {
            p.apps.insert(seed.app_id, record);
        }
    }

    /// Every project, newest activity first.
    pub fn projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .map(|(id, record)| Project {
                name: id.to_string(),
                id: id.clone(),
                uri: format!("memory://{id}"),
                created: record.created,
                last_written: record
                    .apps
                    .values()
                    .map(|a| a.last_written)
                    .max()
                    .unwrap_or(record.created),
                num_apps: record.apps.len() as u64,
            })
            .collect();
        projects.sort_by(|a, b| b.last_written.cmp(&a.last_written));
        projects
    }

    /// Summaries of a project's applications; empty for unknown projects.
    pub fn apps(&self, project: &ProjectId) -> Vec<ApplicationSummary> {
        self.projects
            .get(project)
            .map(|p| p.apps.values().map(AppRecord::summary).collect())
            .unwrap_or_default()
    }

    /// The id an application will be stored under: a fresh UUID for the
    /// `create_new` sentinel, `app` itself otherwise. Nothing is inserted.
    pub fn allocate(app: &AppId) -> AppId {
        if app.is_create_new() {
            AppId::new(&Uuid::new_v4().to_string())
        } else {
            app.clone()
        }
    }

    /// Create an application, allocating an id for the `create_new`
    /// sentinel. Creating an existing id is a no-op.
    pub fn create(&mut self, project: &ProjectId, app: &AppId) -> AppId {
        self.ensure_project(project);
        let app_id = Self::allocate(app);
        if let Some(p) = self.projects.get_mut(project) {
            p.apps
                .entry(app_id.clone())
                .or_insert_with(|| AppRecord::new(app_id.clone(), Utc::now()));
        }
        app_id
    }

    /// Look up an application.
    pub fn app(&self, project: &ProjectId, app: &AppId) -> Result<&AppRecord, MockError> {
        self.projects
            .get(project)
            .and_then(|p| p.apps.get(app))
            .ok_or_else(|| MockError::UnknownApplication {
                project: project.clone(),
                app: app.clone(),
            })
    }

    /// Look up an application for modification.
    pub fn app_mut(
        &mut self,
        project: &ProjectId,
        app: &AppId,
    ) -> Result<&mut AppRecord, MockError> {
        self.projects
            .get_mut(project)
            .and_then(|p| p.apps.get_mut(app))
            .ok_or_else(|| MockError::UnknownApplication {
                project: project.clone(),
                app: app.clone(),
            })
    }

    /// Step logs of an application.
    pub fn logs(&self, project: &ProjectId, app: &AppId) -> Result<ApplicationLogs, MockError> {
        let record = self.app(project, app)?;
        Ok(ApplicationLogs {
            app_id: app.clone(),
            steps: record.steps.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo() -> ProjectId {
        ProjectId::new("demo")
    }

    #[test]
    fn create_new_allocates_fresh_ids() {
        let mut store = Store::default();
        let a = store.create(&demo(), &AppId::create_new());
        let b = store.create(&demo(), &AppId::create_new());
        assert_ne!(a, b);
        assert!(!a.is_create_new());
        assert_eq!(store.apps(&demo()).len(), 2);
    }

    #[test]
    fn allocating_does_not_insert() {
        let store = Store::default();
        let id = Store::allocate(&AppId::create_new());
        assert!(!id.is_create_new());
        assert_eq!(Store::allocate(&AppId::new("demo1")), AppId::new("demo1"));
        assert!(store.apps(&demo()).is_empty());
        assert!(store.app(&demo(), &id).is_err());
    }

    #[test]
    fn create_is_idempotent_for_named_apps() {
        let mut store = Store::default();
        store.create(&demo(), &AppId::new("demo1"));
        store
            .app_mut(&demo(), &AppId::new("demo1"))
            .unwrap()
            .record_step("x", None);
        store.create(&demo(), &AppId::new("demo1"));
        let apps = store.apps(&demo());
        assert_eq!(apps.len(), 1);
        assert_eq!(apps[0].num_steps, 1);
    }

    #[test]
    fn seeded_apps_carry_step_counts_and_times() {
        let mut store = Store::default();
        store.seed(&demo(), SeedApp::new("old", 3, 120));
        store.seed(&demo(), SeedApp::new("new", 1, 5));
        let apps = store.apps(&demo());
        let old = apps.iter().find(|a| a.app_id.as_str() == "old").unwrap();
        let new = apps.iter().find(|a| a.app_id.as_str() == "new").unwrap();
        assert_eq!(old.num_steps, 3);
        assert!(new.last_written > old.last_written);
        assert!(old.first_written < old.last_written);
    }

    #[test]
    fn unknown_app_lookup_fails() {
        let store = Store::default();
        assert!(matches!(
            store.logs(&demo(), &AppId::new("nope")),
            Err(MockError::UnknownApplication { .. })
        ));
        assert!(store.apps(&demo()).is_empty());
    }

    #[test]
    fn projects_report_app_counts() {
        let mut store = Store::default();
        store.ensure_project(&ProjectId::new("empty"));
        store.seed(&demo(), SeedApp::new("a", 1, 1));
        let projects = store.projects();
        assert_eq!(projects.len(), 2);
        let demo_project = projects.iter().find(|p| p.id == demo()).unwrap();
        assert_eq!(demo_project.num_apps, 1);
    }
}
