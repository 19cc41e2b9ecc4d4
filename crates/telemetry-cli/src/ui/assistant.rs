use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use telemetry_models::{AppId, ApplicationSummary, AssistantState, ProjectId};
use telemetry_sdk::{SdkError, TelemetryClient};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

use crate::app_state::{AppController, Focus};
use crate::forms::ActiveForm;
use crate::selector::{self, AppSelector, SelectorEntry};
use crate::session::{AssistantSession, Mutation};
use crate::tui::Action;
use crate::view::AssistantView;

const NOTIFICATION_SECS: u64 = 4;

pub struct AssistantApp {
    client: TelemetryClient,
    tx: UnboundedSender<Action>,
    should_quit: bool,

    session: AssistantSession,
    selector: AppSelector,
    form: ActiveForm,
    focus: Focus,
    list_state: ListState,

    in_flight: usize,
    notification: Option<(String, Instant)>,
}

impl AssistantApp {
    pub fn new(client: TelemetryClient, project: ProjectId, tx: UnboundedSender<Action>) -> Self {
        Self {
            client,
            tx,
            should_quit: false,
            session: AssistantSession::new(project),
            selector: AppSelector::default(),
            form: ActiveForm::None,
            focus: Focus::Selector,
            list_state: ListState::default(),
            in_flight: 0,
            notification: None,
        }
    }

    /// Kick off the first application list load.
    pub fn start(&mut self) {
        self.spawn_load_apps(None);
    }

    // ------------------------------------------------------------------
    // Background requests
    // ------------------------------------------------------------------

    fn spawn_load_apps(&mut self, select: Option<AppId>) {
        self.in_flight += 1;
        let client = self.client.clone();
        let project = self.session.project().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.apps(&project).await;
            let _ = tx.send(Action::AppsLoaded { select, result });
        });
    }

    fn spawn_request(&mut self, mutation: Mutation) {
        let request = self.session.request(mutation);
        info!(app = %request.app, mutation = request.mutation.name(), "assistant request");
        self.in_flight += 1;
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = request.execute(&client).await;
            let _ = tx.send(Action::StateLoaded(result));
        });
    }

    fn spawn_create(&mut self, name: String) {
        self.in_flight += 1;
        let client = self.client.clone();
        let project = self.session.project().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = selector::create_application(&client, &project, &name).await;
            let _ = tx.send(Action::AppCreated(result));
        });
    }

    // ------------------------------------------------------------------
    // Results
    // ------------------------------------------------------------------

    fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn show_notification(&mut self, msg: String) {
        self.notification = Some((msg, Instant::now()));
    }

    fn show_error(&mut self, what: &str, e: &SdkError) {
        warn!(error = %e, "{what} failed");
        let msg = match e.validation() {
            Some(detail) => format!("{what} rejected:\n{detail}"),
            None => format!("{what} failed:\n{e}"),
        };
        self.show_notification(msg);
    }

    /// Make `app` current and load its state.
    fn open_app(&mut self, app: AppId) {
        if self.session.select_app(app) {
            self.form = ActiveForm::None;
            self.spawn_request(Mutation::Refresh);
        }
        self.focus = Focus::Form;
    }

    fn start_new(&mut self) {
        self.session.start_new();
        self.selector.deselect();
        self.form = ActiveForm::new_draft();
        self.focus = Focus::Form;
    }

    fn on_apps_loaded(
        &mut self,
        select: Option<AppId>,
        result: Result<Vec<ApplicationSummary>, SdkError>,
    ) {
        self.finish_request();
        match result {
            Ok(apps) => {
                self.selector.set_apps(apps);
                if let Some(app) = select {
                    self.selector.select(&app);
                }
            }
            Err(e) => self.show_error("Loading applications", &e),
        }
    }

    fn on_app_created(&mut self, result: Result<(AppId, Vec<ApplicationSummary>), SdkError>) {
        self.finish_request();
        match result {
            Ok((created, apps)) => {
                if self.selector.apply_created(&created, apps) {
                    self.open_app(created);
                } else {
                    debug!(app = %created, "created application not in refreshed list");
                }
            }
            Err(e) => self.show_error("Creating the application", &e),
        }
    }

    fn on_state_loaded(&mut self, result: Result<AssistantState, SdkError>) {
        self.finish_request();
        let had_app = self.session.app().is_some();
        match self.session.apply(result) {
            Ok(()) => {
                self.form = ActiveForm::for_state(self.session.state());
                if self.session.view() == AssistantView::Completed {
                    self.show_notification("Workflow finished.".to_string());
                }
                // The service allocated an application for us: list it.
                if !had_app {
                    let adopted = self.session.app().cloned();
                    self.spawn_load_apps(adopted);
                }
            }
            Err(e) => self.show_error("Assistant request", &e),
        }
    }

    // ------------------------------------------------------------------
    // Keys
    // ------------------------------------------------------------------

    fn on_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => self.should_quit = true,
                KeyCode::Char('n') => self.start_new(),
                KeyCode::Char('r') => {
                    if self.session.app().is_some() {
                        self.spawn_request(Mutation::Refresh);
                    }
                    let current = self.selector.current_id().cloned();
                    self.spawn_load_apps(current);
                }
                _ => {}
            }
            return;
        }
        match self.focus {
            Focus::Selector => self.on_selector_key(key),
            Focus::Form => self.on_form_key(key),
        }
    }

    fn on_selector_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Up => self.selector.highlight_prev(),
            KeyCode::Down => self.selector.highlight_next(),
            KeyCode::Char(c) => self.selector.push_char(c),
            KeyCode::Backspace => self.selector.pop_char(),
            KeyCode::Tab => {
                if self.form.form().is_some() {
                    self.focus = Focus::Form;
                }
            }
            KeyCode::Enter => {
                let (open, create) = match self.selector.highlighted_entry() {
                    Some(SelectorEntry::Existing(app)) => (Some(app.app_id.clone()), None),
                    Some(SelectorEntry::Create(name)) => (None, Some(name)),
                    None => (None, None),
                };
                if let Some(app) = open {
                    self.selector.select(&app);
                    self.open_app(app);
                }
                if let Some(name) = create {
                    self.spawn_create(name);
                }
            }
            _ => {}
        }
    }

    fn on_form_key(&mut self, key: KeyEvent) {
        let newline = key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);
        match key.code {
            KeyCode::Esc | KeyCode::Tab => self.focus = Focus::Selector,
            KeyCode::Enter if newline => {
                if let Some(form) = self.form.form_mut() {
                    form.push_char('\n');
                }
            }
            KeyCode::Enter => self.submit_or_advance(),
            KeyCode::Up | KeyCode::BackTab => {
                if let Some(form) = self.form.form_mut() {
                    form.focus_prev();
                }
            }
            KeyCode::Down => {
                if let Some(form) = self.form.form_mut() {
                    form.focus_next();
                }
            }
            KeyCode::Char(c) => {
                if let Some(form) = self.form.form_mut() {
                    form.push_char(c);
                }
            }
            KeyCode::Backspace => {
                if let Some(form) = self.form.form_mut() {
                    form.pop_char();
                }
            }
            _ => {}
        }
    }

    fn submit_or_advance(&mut self) {
        let Some(form) = self.form.form_mut() else {
            return;
        };
        if !form.on_last_field() {
            form.focus_next();
            return;
        }
        if let Some(mutation) = self.form.submission() {
            self.spawn_request(mutation);
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn state_lines(state: &AssistantState) -> Vec<Line<'static>> {
        let heading = |s: &str| {
            Line::from(Span::styled(
                s.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ))
        };
        let mut lines = Vec::new();
        if let Some(email) = &state.email_to_respond {
            lines.push(heading("Email"));
            lines.extend(email.lines().map(|l| Line::from(l.to_string())));
        }
        if let Some(instructions) = &state.response_instructions {
            lines.push(heading("Instructions"));
            lines.extend(instructions.lines().map(|l| Line::from(l.to_string())));
        }
        if let (Some(questions), Some(answers)) = (&state.questions, &state.answers) {
            lines.push(heading("Clarifications"));
            for (q, a) in questions.iter().zip(answers) {
                lines.push(Line::from(format!("Q: {q}")));
                lines.push(Line::from(Span::styled(
                    format!("A: {a}"),
                    Style::default().fg(Color::Cyan),
                )));
            }
        }
        if !state.feedbacks.is_empty() {
            lines.push(heading("Feedback given"));
            lines.extend(state.feedbacks.iter().map(|f| Line::from(format!("- {f}"))));
        }
        let draft = state.final_draft.as_deref().or_else(|| state.latest_draft());
        if let Some(draft) = draft {
            let title = if state.final_draft.is_some() {
                "Final draft"
            } else {
                "Latest draft"
            };
            lines.push(heading(title));
            lines.extend(draft.lines().map(|l| {
                Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Green)))
            }));
        }
        lines.push(Line::from(""));
        lines
    }

    fn form_lines(&self) -> Vec<Line<'static>> {
        let Some(form) = self.form.form() else {
            return Vec::new();
        };
        let editing = self.focus == Focus::Form;
        let mut lines = Vec::new();
        for (i, field) in form.fields().iter().enumerate() {
            let focused = editing && i == form.focused();
            let label_style = if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            lines.push(Line::from(Span::styled(field.label.clone(), label_style)));
            let mut value: Vec<Line<'static>> = field
                .value
                .split('\n')
                .map(|l| Line::from(format!("> {l}")))
                .collect();
            if focused {
                if let Some(last) = value.last_mut() {
                    last.push_span(Span::styled("_", Style::default().fg(Color::Yellow)));
                }
            }
            lines.extend(value);
        }
        if matches!(self.form, ActiveForm::Answers(_)) && form.fields().is_empty() {
            lines.push(Line::from("No questions. Press Enter to continue."));
        }
        lines
    }

    fn render_assistant(&self, f: &mut Frame, area: Rect) {
        let view = self.session.view();
        let mut lines = Vec::new();
        if let (true, Some(state)) = (view.shows_current_state(), self.session.state()) {
            lines.extend(Self::state_lines(state));
        }
        lines.extend(self.form_lines());
        if lines.is_empty() {
            let hint = if self.session.app().is_some() {
                "Loading..."
            } else {
                "Pick an application on the right, type a name to create one,\nor press Ctrl+N to start a new email."
            };
            lines.extend(hint.lines().map(|l| Line::from(l.to_string())));
        }

        let title = if matches!(view, AssistantView::Empty) && self.form.form().is_some() {
            AssistantView::SubmitInitial.title()
        } else {
            view.title()
        };
        let border = if self.focus == Focus::Form {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let pane = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL).border_style(border).title(title));
        f.render_widget(pane, area);
    }

    fn render_selector(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let border = if self.focus == Focus::Selector {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        let search = Paragraph::new(self.selector.query().to_string()).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title("Search / new"),
        );
        f.render_widget(search, chunks[0]);

        let current = self.selector.current_id().cloned();
        let entries = self.selector.entries();
        let items: Vec<ListItem> = if entries.is_empty() {
            vec![ListItem::new("No applications. Type a name to create one.")
                .style(Style::default().fg(Color::DarkGray))]
        } else {
            entries
                .iter()
                .map(|entry| match entry {
                    SelectorEntry::Existing(app) => {
                        let marker = if current.as_ref() == Some(&app.app_id) {
                            "* "
                        } else {
                            "  "
                        };
                        ListItem::new(format!("{marker}{}", selector::label(app)))
                    }
                    SelectorEntry::Create(name) => ListItem::new(format!("+ create \"{name}\""))
                        .style(Style::default().fg(Color::Green)),
                })
                .collect()
        };
        let selected = (!entries.is_empty()).then(|| self.selector.highlighted());
        self.list_state.select(selected);

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border)
                    .title(format!("Applications ({})", self.selector.apps().len())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Yellow))
            .highlight_symbol(">> ");
        f.render_stateful_widget(list, chunks[1], &mut self.list_state);
    }
}

impl AppController for AssistantApp {
    fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.on_key(key),
            Action::AppsLoaded { select, result } => self.on_apps_loaded(select, result),
            Action::AppCreated(result) => self.on_app_created(result),
            Action::StateLoaded(result) => self.on_state_loaded(result),
            Action::Quit => self.should_quit = true,
            Action::Tick | Action::Resize => {}
        }

        if let Some((_, time)) = &self.notification {
            if time.elapsed().as_secs() >= NOTIFICATION_SECS {
                self.notification = None;
            }
        }
    }

    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(f.area());

        let app = self
            .session
            .app()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let mut status = vec![
            Span::raw("Project: "),
            Span::styled(
                self.session.project().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  App: "),
            Span::styled(app, Style::default().fg(Color::Cyan)),
        ];
        if self.in_flight > 0 {
            status.push(Span::styled("  loading...", Style::default().fg(Color::Yellow)));
        }
        let header = Paragraph::new(Line::from(status))
            .block(Block::default().borders(Borders::ALL).title("Email Assistant"));
        f.render_widget(header, chunks[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(chunks[1]);
        self.render_assistant(f, body[0]);
        self.render_selector(f, body[1]);

        let hints = match self.focus {
            Focus::Selector => {
                "Up/Down move  Enter open/create  Tab form  Ctrl+N new  Ctrl+R reload  Esc quit"
            }
            Focus::Form => {
                "Enter next/submit  Shift+Enter newline  Up/Down field  Esc/Tab list  Ctrl+C quit"
            }
        };
        f.render_widget(
            Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
            chunks[2],
        );

        if let Some((msg, _)) = &self.notification {
            let area = centered_rect(60, 25, f.area());
            let block = Paragraph::new(msg.as_str()).wrap(Wrap { trim: false }).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Notification")
                    .style(Style::default().bg(Color::Blue).fg(Color::White)),
            );
            f.render_widget(Clear, area);
            f.render_widget(block, area);
        }
    }

    fn should_quit(&self) -> bool {
        self.should_quit
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use mock_telemetry::{MockService, SeedApp};
    use ratatui::{backend::TestBackend, Terminal};
    use telemetry_models::NextStep;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    async fn app_with(service: MockService) -> (AssistantApp, UnboundedReceiver<Action>) {
        let addr = service.spawn_local().await.unwrap();
        let client = TelemetryClient::new(&format!("http://{addr}")).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let app = AssistantApp::new(client, ProjectId::new("P"), tx);
        (app, rx)
    }

    /// Feed the next background result into the app.
    async fn pump(app: &mut AssistantApp, rx: &mut UnboundedReceiver<Action>) {
        let action = rx.recv().await.unwrap();
        app.update(action);
    }

    fn press(app: &mut AssistantApp, code: KeyCode) {
        app.update(Action::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut AssistantApp, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn screen(app: &mut AssistantApp) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[tokio::test]
    async fn empty_project_create_then_full_workflow() {
        let (mut app, mut rx) =
            app_with(MockService::new().with_project(&ProjectId::new("P"))).await;
        app.start();
        pump(&mut app, &mut rx).await;
        assert!(screen(&mut app).contains("No applications"));

        type_text(&mut app, "demo1");
        assert!(screen(&mut app).contains("+ create \"demo1\""));
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await; // AppCreated
        assert_eq!(app.selector.current_id(), Some(&AppId::new("demo1")));
        assert_eq!(app.focus, Focus::Form);

        pump(&mut app, &mut rx).await; // state refresh
        assert_eq!(app.session.view(), AssistantView::SubmitInitial);
        assert!(screen(&mut app).contains("Email to respond to"));

        type_text(&mut app, "Can we meet?");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Say yes");
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await;

        let state = app.session.state().unwrap();
        assert_eq!(state.next_step, Some(NextStep::ClarifyInstructions));
        let questions = state.pending_questions().to_vec();
        let ActiveForm::Answers(form) = &app.form else {
            panic!("expected answer form");
        };
        assert_eq!(form.fields().len(), questions.len());
        assert!(screen(&mut app).contains(questions[0].as_str()));

        for _ in &questions {
            type_text(&mut app, "ok");
            press(&mut app, KeyCode::Enter);
        }
        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.view(), AssistantView::SubmitFeedback);
        assert!(screen(&mut app).contains("Latest draft"));

        // Empty feedback accepts the draft.
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.view(), AssistantView::Completed);
        assert!(screen(&mut app).contains("Final draft"));
    }

    #[tokio::test]
    async fn rejected_submission_keeps_the_view_and_notifies() {
        let project = ProjectId::new("P");
        let (mut app, mut rx) =
            app_with(MockService::new().with_app(&project, SeedApp::new("a", 0, 5))).await;
        app.start();
        pump(&mut app, &mut rx).await;
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.session.view(), AssistantView::SubmitInitial);
        let before = app.session.state().cloned();

        // Submitting an empty email is rejected by the service.
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await;

        assert_eq!(app.session.state().cloned(), before);
        assert_eq!(app.session.view(), AssistantView::SubmitInitial);
        let (msg, _) = app.notification.as_ref().unwrap();
        assert!(msg.contains("rejected"));
        assert!(screen(&mut app).contains("Notification"));
    }

    #[tokio::test]
    async fn new_email_without_an_app_adopts_the_allocated_one() {
        let (mut app, mut rx) =
            app_with(MockService::new().with_project(&ProjectId::new("P"))).await;
        app.start();
        pump(&mut app, &mut rx).await;

        app.update(Action::Key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)));
        assert!(matches!(app.form, ActiveForm::Draft(_)));
        type_text(&mut app, "Hello?");
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "Be brief");
        press(&mut app, KeyCode::Enter);
        pump(&mut app, &mut rx).await; // StateLoaded
        let adopted = app.session.app().cloned().unwrap();
        assert!(!adopted.is_create_new());

        pump(&mut app, &mut rx).await; // AppsLoaded
        assert_eq!(app.selector.current_id(), Some(&adopted));
        assert_eq!(app.selector.apps().len(), 1);
    }

    #[tokio::test]
    async fn selector_lists_newest_first_and_esc_quits() {
        let project = ProjectId::new("P");
        let service = MockService::new()
            .with_app(&project, SeedApp::new("older", 3, 120))
            .with_app(&project, SeedApp::new("newer", 1, 5));
        let (mut app, mut rx) = app_with(service).await;
        app.start();
        pump(&mut app, &mut rx).await;

        let text = screen(&mut app);
        let newer = text.find("newer").unwrap();
        let older = text.find("older").unwrap();
        assert!(newer < older);

        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn tick_and_resize_leave_the_screen_alone() {
        let project = ProjectId::new("P");
        let service = MockService::new().with_app(&project, SeedApp::new("only", 2, 5));
        let (mut app, mut rx) = app_with(service).await;
        app.start();
        pump(&mut app, &mut rx).await;
        let before = screen(&mut app);

        app.update(Action::Resize);
        app.update(Action::Tick);

        assert_eq!(screen(&mut app), before);
        assert_eq!(app.focus, Focus::Selector);
        assert!(!app.should_quit());
    }
}
