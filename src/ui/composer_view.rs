//! Main composer screen: agent details, mode selector and the active editor

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::form_field::FormField;
use crate::actions::ActionRegistry;
use crate::editor::{AuthoringMode, AutomationEditor, EditorError};
use crate::locale::{Catalog, Direction};

/// Which input currently receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Purpose,
    Mode,
    RawText,
    StepType(usize),
    StepField { step: usize, field: usize },
}

impl Focus {
    /// Step the focus belongs to, if any
    pub fn step(self) -> Option<usize> {
        match self {
            Focus::StepType(step) | Focus::StepField { step, .. } => Some(step),
            _ => None,
        }
    }
}

/// Severity of a status line message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

impl StatusKind {
    fn color(self) -> Color {
        match self {
            StatusKind::Info => Color::Yellow,
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
        }
    }
}

/// Input widgets for one builder step
struct StepWidgets {
    action_type: Option<String>,
    /// (field name, label key, widget) in declaration order
    fields: Vec<(String, String, FormField)>,
}

impl StepWidgets {
    fn build(action_type: Option<&str>, registry: &ActionRegistry) -> Self {
        let fields = action_type
            .and_then(|t| registry.lookup(t))
            .map(|definition| {
                definition
                    .fields
                    .iter()
                    .map(|spec| {
                        (
                            spec.name.clone(),
                            spec.label_key.clone(),
                            FormField::for_field(spec),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            action_type: action_type.map(str::to_string),
            fields,
        }
    }

    /// Borders, type selector and every field
    fn height(&self) -> u16 {
        3 + self
            .fields
            .iter()
            .map(|(_, _, field)| field.render_height())
            .sum::<u16>()
    }
}

/// Widget state mirroring an [`AutomationEditor`].
///
/// The editor is the source of truth: every edit is committed to it and
/// [`ComposerView::sync`] realigns the widgets afterwards.
pub struct ComposerView {
    name: FormField,
    purpose: FormField,
    raw_text: FormField,
    steps: Vec<StepWidgets>,
    focus: Focus,
}

impl ComposerView {
    pub fn new(catalog: &Catalog) -> Self {
        let mut view = Self {
            name: FormField::single_line(""),
            purpose: FormField::multi_line(""),
            raw_text: FormField::multi_line(""),
            steps: Vec::new(),
            focus: Focus::Name,
        };
        view.relabel(catalog);
        view
    }

    /// Refresh placeholders after a language change
    pub fn relabel(&mut self, catalog: &Catalog) {
        self.raw_text
            .set_placeholder(catalog.text("automation_steps_placeholder"));
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Focusable inputs in Tab order
    pub fn focus_order(&self, editor: &AutomationEditor) -> Vec<Focus> {
        let mut order = vec![Focus::Name, Focus::Purpose, Focus::Mode];
        match editor.mode() {
            AuthoringMode::Text => order.push(Focus::RawText),
            AuthoringMode::Builder => {
                for (step, widgets) in self.steps.iter().enumerate() {
                    order.push(Focus::StepType(step));
                    order.extend((0..widgets.fields.len()).map(|field| Focus::StepField { step, field }));
                }
            }
        }
        order
    }

    pub fn focus_next(&mut self, editor: &AutomationEditor) {
        let order = self.focus_order(editor);
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + 1) % order.len()];
    }

    pub fn focus_prev(&mut self, editor: &AutomationEditor) {
        let order = self.focus_order(editor);
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = order[(idx + order.len() - 1) % order.len()];
    }

    /// Realign widgets and focus with the editor's current state
    pub fn sync(&mut self, editor: &AutomationEditor) {
        sync_field(&mut self.name, &editor.name);
        sync_field(&mut self.purpose, &editor.purpose);
        sync_field(&mut self.raw_text, editor.raw_text());

        let entries = editor.steps().entries();
        self.steps.truncate(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            let stale = self
                .steps
                .get(idx)
                .map(|w| w.action_type.as_deref() != entry.action_type())
                .unwrap_or(true);
            if stale {
                let widgets = StepWidgets::build(entry.action_type(), editor.registry());
                if idx < self.steps.len() {
                    self.steps[idx] = widgets;
                } else {
                    self.steps.push(widgets);
                }
            }

            for (name, _, field) in &mut self.steps[idx].fields {
                sync_field(field, entry.field_value(name).unwrap_or_default());
            }
        }

        if !self.focus_order(editor).contains(&self.focus) {
            self.focus = self.fallback_focus(editor);
        }
    }

    fn fallback_focus(&self, editor: &AutomationEditor) -> Focus {
        match (editor.mode(), self.focus.step()) {
            (AuthoringMode::Text, _) => Focus::RawText,
            (AuthoringMode::Builder, _) if self.steps.is_empty() => Focus::Mode,
            (AuthoringMode::Builder, Some(step)) => {
                Focus::StepType(step.min(self.steps.len() - 1))
            }
            (AuthoringMode::Builder, None) => Focus::StepType(0),
        }
    }

    /// Forward a key to the focused text input; true if its value changed
    pub fn handle_focused_key(&mut self, key: crossterm::event::KeyEvent) -> bool {
        match self.focused_field_mut() {
            Some(field) => field.handle_key(key),
            None => false,
        }
    }

    fn focused_field_mut(&mut self) -> Option<&mut FormField> {
        match self.focus {
            Focus::Name => Some(&mut self.name),
            Focus::Purpose => Some(&mut self.purpose),
            Focus::RawText => Some(&mut self.raw_text),
            Focus::StepField { step, field } => self
                .steps
                .get_mut(step)
                .and_then(|w| w.fields.get_mut(field))
                .map(|(_, _, f)| f),
            Focus::Mode | Focus::StepType(_) => None,
        }
    }

    /// Write the focused input's value into the editor
    pub fn commit(&self, editor: &mut AutomationEditor) -> Result<(), EditorError> {
        match self.focus {
            Focus::Name => editor.name = self.name.value(),
            Focus::Purpose => editor.purpose = self.purpose.value(),
            Focus::RawText => editor.set_raw_text(self.raw_text.value()),
            Focus::StepField { step, field } => {
                if let Some((name, _, input)) =
                    self.steps.get(step).and_then(|w| w.fields.get(field))
                {
                    editor
                        .steps_mut()
                        .set_field_value(step, name, input.value())?;
                }
            }
            Focus::Mode | Focus::StepType(_) => {}
        }
        Ok(())
    }

    pub fn render(
        &mut self,
        frame: &mut Frame,
        editor: &AutomationEditor,
        catalog: &Catalog,
        status: Option<(&str, StatusKind)>,
    ) {
        let direction = catalog.direction();
        let alignment = alignment_for(direction);
        let purpose_height = self.purpose.render_height();

        let chunks = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(purpose_height),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

        let header = Paragraph::new(vec![
            Line::from(Span::styled(
                catalog.text("app_name"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                catalog.text("welcome_message"),
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .alignment(alignment);
        frame.render_widget(header, chunks[0]);

        let focus = self.focus;
        self.name.render(
            frame,
            chunks[1],
            catalog.text("agent_name_label"),
            focus == Focus::Name,
            direction,
        );
        self.purpose.render(
            frame,
            chunks[2],
            catalog.text("agent_purpose_label"),
            focus == Focus::Purpose,
            direction,
        );
        render_mode_selector(frame, chunks[3], editor.mode(), catalog, focus == Focus::Mode);

        match editor.mode() {
            AuthoringMode::Text => self.raw_text.render(
                frame,
                chunks[4],
                catalog.text("automation_steps_label"),
                focus == Focus::RawText,
                direction,
            ),
            AuthoringMode::Builder => {
                self.render_steps(frame, chunks[4], editor.registry(), catalog)
            }
        }

        if let Some((text, kind)) = status {
            let line = Paragraph::new(Span::styled(text, Style::default().fg(kind.color())))
                .alignment(alignment);
            frame.render_widget(line, chunks[5]);
        }

        let help = Paragraph::new(Span::styled(
            catalog.text("help_keys"),
            Style::default().fg(Color::DarkGray),
        ))
        .alignment(alignment);
        frame.render_widget(help, chunks[6]);
    }

    /// Render as many steps as fit, keeping the focused one visible
    fn render_steps(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        registry: &ActionRegistry,
        catalog: &Catalog,
    ) {
        let heights: Vec<u16> = self.steps.iter().map(StepWidgets::height).collect();
        if heights.is_empty() {
            let hint = Paragraph::new(Span::styled(
                catalog.text("no_code_steps_empty_error"),
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(alignment_for(catalog.direction()))
            .block(Block::default().borders(Borders::ALL));
            frame.render_widget(hint, area);
            return;
        }

        let mut first = self.focus.step().unwrap_or(0).min(heights.len() - 1);
        let mut used = heights[first];
        while first > 0 && used + heights[first - 1] <= area.height {
            first -= 1;
            used += heights[first];
        }

        let bottom = area.y + area.height;
        let mut y = area.y;
        for (idx, height) in heights.iter().enumerate().skip(first) {
            let height = (*height).min(bottom.saturating_sub(y));
            if height < 3 {
                break;
            }
            let step_area = Rect {
                x: area.x,
                y,
                width: area.width,
                height,
            };
            self.render_step(frame, step_area, idx, registry, catalog);
            y += height;
        }
    }

    fn render_step(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        idx: usize,
        registry: &ActionRegistry,
        catalog: &Catalog,
    ) {
        let focus = self.focus;
        let direction = catalog.direction();
        let alignment = alignment_for(direction);
        let Some(widgets) = self.steps.get_mut(idx) else {
            return;
        };

        let border_color = if focus.step() == Some(idx) {
            Color::Cyan
        } else {
            Color::Gray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Line::from(catalog.step_heading(idx)).alignment(alignment))
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(
            widgets
                .fields
                .iter()
                .map(|(_, _, field)| Constraint::Length(field.render_height())),
        );
        let rows = Layout::vertical(constraints).split(inner);

        let type_label = widgets
            .action_type
            .as_deref()
            .and_then(|t| registry.lookup(t))
            .map(|definition| catalog.text(&definition.label_key))
            .unwrap_or_else(|| catalog.text("select_step_type"));
        let selector_style = if focus == Focus::StepType(idx) {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::REVERSED)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let selector = Paragraph::new(Span::styled(format!("< {} >", type_label), selector_style))
            .alignment(alignment);
        frame.render_widget(selector, rows[0]);

        for (field_idx, (_, label_key, field)) in widgets.fields.iter_mut().enumerate() {
            let focused = focus
                == Focus::StepField {
                    step: idx,
                    field: field_idx,
                };
            field.render(
                frame,
                rows[field_idx + 1],
                catalog.text(label_key),
                focused,
                direction,
            );
        }
    }
}

fn render_mode_selector(
    frame: &mut Frame,
    area: Rect,
    mode: AuthoringMode,
    catalog: &Catalog,
    focused: bool,
) {
    let option = |candidate: AuthoringMode| {
        let style = if candidate == mode {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!("[{}]", catalog.text(candidate.label_key())), style)
    };

    let alignment = alignment_for(catalog.direction());
    let line = Line::from(vec![
        option(AuthoringMode::Text),
        Span::raw(" / "),
        option(AuthoringMode::Builder),
    ]);
    let border_color = if focused { Color::Cyan } else { Color::Gray };
    let para = Paragraph::new(line).alignment(alignment).block(
        Block::default()
            .borders(Borders::ALL)
            .title(Line::from(catalog.text("build_method_label")).alignment(alignment))
            .border_style(Style::default().fg(border_color)),
    );
    frame.render_widget(para, area);
}

fn alignment_for(direction: Direction) -> Alignment {
    match direction {
        Direction::Ltr => Alignment::Left,
        Direction::Rtl => Alignment::Right,
    }
}

/// Overwrite a widget only when it disagrees, so cursors survive
fn sync_field(field: &mut FormField, expected: &str) {
    if field.value() != expected {
        field.set_value(expected);
    }
}
