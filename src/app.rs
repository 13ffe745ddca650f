use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actions::ActionRegistry;
use crate::config::Config;
use crate::editor::{AuthoringMode, AutomationEditor, EditorError};
use crate::locale::Catalog;
use crate::submit::Submitter;
use crate::ui::{install_panic_hook, ComposerView, Focus, StatusKind, TerminalGuard};

struct StatusMessage {
    text: String,
    kind: StatusKind,
    shown_at: Instant,
}

pub struct App {
    config: Config,
    /// Where the language choice is persisted
    config_file: PathBuf,
    editor: AutomationEditor,
    view: ComposerView,
    catalog: Catalog,
    submitter: Arc<dyn Submitter>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config, registry: Arc<ActionRegistry>, submitter: Arc<dyn Submitter>) -> Self {
        let catalog = Catalog::new(config.locale.language);
        let editor = AutomationEditor::new(registry);
        let mut view = ComposerView::new(&catalog);
        view.sync(&editor);

        Self {
            config,
            config_file: Config::local_config_path(),
            editor,
            view,
            catalog,
            submitter,
            status: None,
            should_quit: false,
        }
    }

    /// Persist language changes somewhere other than `.composer/config.toml`
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = path.into();
        self
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::new()?;
        let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

        let tick_rate = Duration::from_millis(self.config.ui.tick_rate_ms);

        while !self.should_quit {
            self.expire_status();
            terminal.draw(|f| self.draw(f))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && self.handle_key(key) {
                        self.set_status(self.catalog.text("submitting").to_string(), StatusKind::Info);
                        terminal.draw(|f| self.draw(f))?;
                        self.submit().await;
                    }
                }
            }
        }

        guard.release();
        terminal.show_cursor()?;
        Ok(())
    }

    fn draw(&mut self, frame: &mut Frame) {
        let status = self.status.as_ref().map(|s| (s.text.as_str(), s.kind));
        self.view.render(frame, &self.editor, &self.catalog, status);
    }

    /// Apply a key press. Returns true when the user asked to submit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('s') if ctrl => return true,
            KeyCode::Char('t') if ctrl => self.toggle_mode(),
            KeyCode::Char('n') if ctrl => self.add_step(),
            KeyCode::Char('d') if ctrl => self.remove_focused_step(),
            KeyCode::Char('l') if ctrl => self.next_language(),
            KeyCode::Tab => self.view.focus_next(&self.editor),
            KeyCode::BackTab => self.view.focus_prev(&self.editor),
            _ => self.edit_focused(key),
        }

        self.view.sync(&self.editor);
        false
    }

    fn edit_focused(&mut self, key: KeyEvent) {
        match self.view.focus() {
            Focus::Mode => {
                if matches!(
                    key.code,
                    KeyCode::Left | KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ')
                ) {
                    self.toggle_mode();
                }
            }
            Focus::StepType(step) => match key.code {
                KeyCode::Left => self.cycle_step_type(step, false),
                KeyCode::Right | KeyCode::Enter | KeyCode::Char(' ') => {
                    self.cycle_step_type(step, true)
                }
                _ => {}
            },
            _ => {
                if self.view.handle_focused_key(key) {
                    if let Err(e) = self.view.commit(&mut self.editor) {
                        self.report_error(&e);
                    }
                }
            }
        }
    }

    fn toggle_mode(&mut self) {
        let mode = self.editor.mode().toggled();
        self.editor.switch_mode(mode);
    }

    fn add_step(&mut self) {
        if self.editor.mode() != AuthoringMode::Builder {
            return;
        }
        self.editor.steps_mut().add_step();
        self.view.sync(&self.editor);
        self.view
            .set_focus(Focus::StepType(self.editor.steps().len() - 1));
    }

    fn remove_focused_step(&mut self) {
        let Some(step) = self.view.focus().step() else {
            return;
        };
        if let Err(e) = self.editor.steps_mut().remove_step(step) {
            self.report_error(&e);
        }
    }

    /// Move a step to the next or previous registered action type
    fn cycle_step_type(&mut self, step: usize, forward: bool) {
        let types = self.editor.registry().action_types();
        if types.is_empty() {
            return;
        }
        let len = types.len();
        let current = self
            .editor
            .steps()
            .get(step)
            .and_then(|entry| entry.action_type())
            .and_then(|t| types.iter().position(|candidate| candidate == t));
        let next = match (current, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(idx), true) => (idx + 1) % len,
            (Some(idx), false) => (idx + len - 1) % len,
        };
        let action_type = types[next].clone();

        if let Err(e) = self.editor.steps_mut().set_step_type(step, &action_type) {
            self.report_error(&e);
        }
    }

    fn next_language(&mut self) {
        let language = self.catalog.language().next();
        self.catalog.set_language(language);
        self.view.relabel(&self.catalog);
        self.config.locale.language = language;

        if let Err(e) = self.config.save_to(&self.config_file) {
            tracing::warn!(error = %e, "Failed to persist language choice");
        }
        self.set_status(
            self.catalog.text("language_changed").to_string(),
            StatusKind::Info,
        );
    }

    /// Validate the session and hand it to the backend
    pub async fn submit(&mut self) {
        let submission = match self.editor.submit() {
            Ok(submission) => submission,
            Err(e) => {
                self.report_error(&e);
                return;
            }
        };

        match self.submitter.create_agent(&submission).await {
            Ok(response) => {
                tracing::info!(agent_id = response.agent_id, "Agent creation accepted");
                self.editor.reset();
                self.view.set_focus(Focus::Name);
                self.view.sync(&self.editor);
                self.set_status(
                    self.catalog.text("agent_creation_success").to_string(),
                    StatusKind::Success,
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "Agent creation failed");
                let mut text = self.catalog.text("agent_creation_error").to_string();
                if let Some(message) = e.backend_message() {
                    text = format!("{} {}", text, message);
                }
                self.set_status(text, StatusKind::Error);
            }
        }
    }

    fn report_error(&mut self, error: &EditorError) {
        if error.is_internal() {
            tracing::error!(error = %error, "Editor rejected an operation");
        } else {
            tracing::debug!(error = %error, "Editor validation failed");
        }

        if let (Some(position), AuthoringMode::Builder) = (error.position(), self.editor.mode()) {
            self.view.set_focus(Focus::StepType(position));
            self.view.sync(&self.editor);
        }
        self.set_status(self.catalog.error_message(error), StatusKind::Error);
    }

    fn set_status(&mut self, text: String, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text,
            kind,
            shown_at: Instant::now(),
        });
    }

    fn expire_status(&mut self) {
        let timeout = Duration::from_secs(self.config.ui.status_timeout_secs);
        if self
            .status
            .as_ref()
            .is_some_and(|s| s.shown_at.elapsed() >= timeout)
        {
            self.status = None;
        }
    }

    pub fn editor(&self) -> &AutomationEditor {
        &self.editor
    }

    pub fn focus(&self) -> Focus {
        self.view.focus()
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }
}
