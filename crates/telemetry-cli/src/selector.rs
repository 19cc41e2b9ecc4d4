//! Searchable, creatable list of a project's applications.

use telemetry_models::{AppId, ApplicationSummary, ProjectId};
use telemetry_sdk::{SdkError, TelemetryClient};
use tracing::{debug, info};

/// One line of the selector.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorEntry<'a> {
    /// An application that already exists.
    Existing(&'a ApplicationSummary),
    /// Create an application with the typed name.
    Create(String),
}

/// Application list sorted newest first, with a search query and a
/// highlighted line.
#[derive(Debug, Clone, Default)]
pub struct AppSelector {
    apps: Vec<ApplicationSummary>,
    current: Option<AppId>,
    query: String,
    highlighted: usize,
}

impl AppSelector {
    /// Replace the list. Entries are kept sorted by `last_written`,
    /// newest first.
    pub fn set_apps(&mut self, mut apps: Vec<ApplicationSummary>) {
        apps.sort_by(|a, b| b.last_written.cmp(&a.last_written));
        self.apps = apps;
        self.clamp_highlight();
    }

    pub fn apps(&self) -> &[ApplicationSummary] {
        &self.apps
    }

    pub fn current_id(&self) -> Option<&AppId> {
        self.current.as_ref()
    }

    /// Make `app_id` current if it is listed; otherwise do nothing.
    pub fn select(&mut self, app_id: &AppId) -> bool {
        if self.apps.iter().any(|a| &a.app_id == app_id) {
            self.current = Some(app_id.clone());
            true
        } else {
            debug!(app = %app_id, "selection ignored: not in list");
            false
        }
    }

    pub fn deselect(&mut self) {
        self.current = None;
    }

    /// Install the list fetched after a create and select the created id.
    pub fn apply_created(&mut self, created: &AppId, apps: Vec<ApplicationSummary>) -> bool {
        self.set_apps(apps);
        let selected = self.select(created);
        if selected {
            self.query.clear();
            self.highlighted = 0;
        }
        selected
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn push_char(&mut self, c: char) {
        self.query.push(c);
        self.highlighted = 0;
    }

    pub fn pop_char(&mut self) {
        self.query.pop();
        self.highlighted = 0;
    }

    /// Labels of every application, in display order.
    pub fn options(&self) -> Vec<String> {
        self.apps.iter().map(label).collect()
    }

    /// Applications whose id contains `query`, ignoring case.
    pub fn filtered(&self, query: &str) -> Vec<&ApplicationSummary> {
        let needle = query.trim().to_lowercase();
        self.apps
            .iter()
            .filter(|a| needle.is_empty() || a.app_id.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Applications matching the query, then a "create" line when the
    /// query names an application that does not exist yet.
    pub fn entries(&self) -> Vec<SelectorEntry<'_>> {
        let mut entries: Vec<SelectorEntry<'_>> = self
            .filtered(&self.query)
            .into_iter()
            .map(SelectorEntry::Existing)
            .collect();
        let name = self.query.trim();
        if !name.is_empty() && !self.apps.iter().any(|a| a.app_id.as_str() == name) {
            entries.push(SelectorEntry::Create(name.to_string()));
        }
        entries
    }

    // ------------------------------------------------------------------
    // Highlight
    // ------------------------------------------------------------------

    pub fn highlighted(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted_entry(&self) -> Option<SelectorEntry<'_>> {
        self.entries().into_iter().nth(self.highlighted)
    }

    pub fn highlight_next(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.highlighted = (self.highlighted + 1) % len;
        }
    }

    pub fn highlight_prev(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.highlighted = (self.highlighted + len - 1) % len;
        }
    }

    fn clamp_highlight(&mut self) {
        let len = self.entries().len();
        if self.highlighted >= len {
            self.highlighted = len.saturating_sub(1);
        }
    }
}

/// Display label: step count, id and creation time.
pub fn label(app: &ApplicationSummary) -> String {
    format!(
        "{:>4}  {}  {}",
        app.num_steps,
        app.app_id,
        app.first_written.format("%Y-%m-%d %H:%M")
    )
}

/// Create `name` in `project`, then refetch the project's applications.
///
/// Returns the id the service assigned together with the refreshed list.
pub async fn create_application(
    client: &TelemetryClient,
    project: &ProjectId,
    name: &str,
) -> Result<(AppId, Vec<ApplicationSummary>), SdkError> {
    let created = client
        .create_assistant_application(project, &AppId::new(name))
        .await?;
    info!(project = %project, app = %created, "application created");
    let apps = client.apps(project).await?;
    Ok((created, apps))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use mock_telemetry::{MockService, SeedApp};

    fn summary(id: &str, minute: i64) -> ApplicationSummary {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + Duration::minutes(minute);
        ApplicationSummary::empty(AppId::new(id), at)
    }

    fn ids(selector: &AppSelector) -> Vec<&str> {
        selector.apps().iter().map(|a| a.app_id.as_str()).collect()
    }

    #[test]
    fn list_is_newest_first() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("b", 5), summary("a", 30), summary("c", 1)]);
        assert_eq!(ids(&selector), vec!["a", "b", "c"]);
        assert!(selector
            .apps()
            .windows(2)
            .all(|w| w[0].last_written >= w[1].last_written));
    }

    #[test]
    fn select_ignores_unknown_ids() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("a", 0)]);
        assert!(selector.select(&AppId::new("a")));
        assert!(!selector.select(&AppId::new("zzz")));
        assert_eq!(selector.current_id(), Some(&AppId::new("a")));
    }

    #[test]
    fn created_id_missing_from_refresh_keeps_selection() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("a", 0)]);
        selector.select(&AppId::new("a"));
        let selected = selector.apply_created(&AppId::new("ghost"), vec![summary("a", 0)]);
        assert!(!selected);
        assert_eq!(selector.current_id(), Some(&AppId::new("a")));
    }

    #[test]
    fn empty_project_offers_only_creation() {
        let mut selector = AppSelector::default();
        assert!(selector.entries().is_empty());
        for c in "demo1".chars() {
            selector.push_char(c);
        }
        assert_eq!(
            selector.entries(),
            vec![SelectorEntry::Create("demo1".into())]
        );
    }

    #[test]
    fn query_filters_and_exact_match_hides_create() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("alpha", 0), summary("beta", 1)]);
        selector.push_char('A');
        let entries = selector.entries();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[2], SelectorEntry::Create(ref n) if n == "A"));

        selector.pop_char();
        for c in "beta".chars() {
            selector.push_char(c);
        }
        assert_eq!(selector.entries().len(), 1);
        assert!(matches!(selector.entries()[0], SelectorEntry::Existing(_)));
    }

    #[test]
    fn options_follow_display_order() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("Old", 0), summary("new", 9)]);
        let options = selector.options();
        assert!(options[0].contains("new"));
        assert!(options[1].contains("Old"));
        let hits: Vec<&str> = selector
            .filtered("OL")
            .iter()
            .map(|a| a.app_id.as_str())
            .collect();
        assert_eq!(hits, vec!["Old"]);
    }

    #[test]
    fn highlight_wraps() {
        let mut selector = AppSelector::default();
        selector.set_apps(vec![summary("a", 0), summary("b", 1)]);
        selector.highlight_prev();
        assert_eq!(selector.highlighted(), 1);
        selector.highlight_next();
        assert_eq!(selector.highlighted(), 0);
    }

    #[test]
    fn label_shows_steps_id_and_date() {
        let mut app = summary("demo1", 0);
        app.num_steps = 7;
        assert_eq!(label(&app), "   7  demo1  2024-05-01 12:00");
    }

    #[tokio::test]
    async fn creating_in_an_empty_project_selects_the_new_app() {
        let project = ProjectId::new("P");
        let addr = MockService::new()
            .with_project(&project)
            .spawn_local()
            .await
            .unwrap();
        let client = TelemetryClient::new(&format!("http://{addr}")).unwrap();

        let mut selector = AppSelector::default();
        selector.set_apps(client.apps(&project).await.unwrap());
        assert!(selector.apps().is_empty());

        let (created, apps) = create_application(&client, &project, "demo1")
            .await
            .unwrap();
        assert_eq!(created, AppId::new("demo1"));
        assert!(selector.apply_created(&created, apps));
        assert_eq!(selector.current_id(), Some(&AppId::new("demo1")));
    }

    #[tokio::test]
    async fn refreshed_list_is_sorted_after_creation() {
        let project = ProjectId::new("P");
        let addr = MockService::new()
            .with_app(&project, SeedApp::new("old", 2, 600))
            .spawn_local()
            .await
            .unwrap();
        let client = TelemetryClient::new(&format!("http://{addr}")).unwrap();

        let (created, apps) = create_application(&client, &project, "fresh")
            .await
            .unwrap();
        let mut selector = AppSelector::default();
        selector.apply_created(&created, apps);
        assert_eq!(ids(&selector), vec!["fresh", "old"]);
    }
}
