use std::collections::HashMap;
use std::io::stdout;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use profdiff_core::GroupRegistry;
use profdiff_core::compare::{DurationMetric, Trend, compare_groups, rank_components};
use profdiff_core::model::{Group, GroupId};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::report::{ReportOptions, describe_diff, format_ms};

/// Interactive state of the comparison screen.
struct ViewState {
    selected: usize,
    metric: DurationMetric,
    baseline: Option<GroupId>,
    show_all: bool,
    top: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Quit,
}

impl ViewState {
    fn toggle_metric(&mut self) {
        self.metric = match self.metric {
            DurationMetric::Actual => DurationMetric::SelfTime,
            DurationMetric::SelfTime => DurationMetric::Actual,
        };
    }

    fn handle_key(&mut self, code: KeyCode, registry: &GroupRegistry) -> KeyOutcome {
        let last = registry.groups().len().saturating_sub(1);
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyOutcome::Quit,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(last),
            KeyCode::Char('m') => self.toggle_metric(),
            KeyCode::Char('a') => self.show_all = !self.show_all,
            KeyCode::Char('b') => {
                if let Some(group) = registry.groups().get(self.selected) {
                    self.baseline = if self.baseline == Some(group.id) {
                        None
                    } else {
                        Some(group.id)
                    };
                }
            }
            _ => {}
        }
        KeyOutcome::Continue
    }
}

fn trend_color(trend: Trend) -> Color {
    match trend {
        Trend::Faster => Color::Green,
        Trend::Slower => Color::Red,
        Trend::Unchanged => Color::Gray,
    }
}

/// Restores the terminal when dropped, including on early error returns.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(err) = execute!(stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), LeaveAlternateScreen, Show);
    }
}

pub fn render_tui(registry: &GroupRegistry, options: &ReportOptions) -> Result<()> {
    let _guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut state = ViewState {
        selected: 0,
        metric: options.metric,
        baseline: options.baseline,
        show_all: false,
        top: options.top,
    };

    loop {
        terminal.draw(|frame| draw(frame, registry, &state))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && state.handle_key(key.code, registry) == KeyOutcome::Quit
            {
                break;
            }
        }
    }

    Ok(())
}

fn draw(frame: &mut Frame, registry: &GroupRegistry, state: &ViewState) {
    let area = frame.area();
    let table_height = u16::try_from(registry.groups().len())
        .unwrap_or(u16::MAX)
        .saturating_add(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(table_height),
            Constraint::Min(5),
        ])
        .split(area);

    let header = Paragraph::new(format!(
        " profdiff: {} duration | ↑↓ select | b baseline | m metric | a all | q quit ",
        state.metric.label()
    ))
    .style(Style::default().fg(Color::White).bg(Color::DarkGray));
    frame.render_widget(header, chunks[0]);

    draw_comparison(frame, chunks[1], registry, state);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[2]);
    if let Some(group) = registry.groups().get(state.selected) {
        draw_files(frame, body[0], group);
        draw_ranking(frame, body[1], group, state);
    }
}

fn draw_comparison(frame: &mut Frame, area: Rect, registry: &GroupRegistry, state: &ViewState) {
    let compared: HashMap<GroupId, (String, Option<Trend>)> =
        compare_groups(registry.groups(), state.baseline)
            .iter()
            .map(|row| {
                let trend = row.diff.map(|diff| diff.trend);
                (row.group_id, (describe_diff(row), trend))
            })
            .collect();

    let rows = registry.groups().iter().enumerate().map(|(i, group)| {
        let value = match (&group.loading_error, group.average_summary) {
            (Some(_), _) => "error".to_string(),
            (None, Some(summary)) => format_ms(summary.total_duration),
            (None, None) => "-".to_string(),
        };
        let (diff, trend) = compared
            .get(&group.id)
            .cloned()
            .unwrap_or_else(|| ("-".into(), None));
        let diff_style = trend.map_or(Style::default(), |trend| {
            Style::default().fg(trend_color(trend))
        });

        let mut style = Style::default();
        if i == state.selected {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        Row::new(vec![
            Cell::from(group.group_name.clone()),
            Cell::from(group.file_count().to_string()),
            Cell::from(value),
            Cell::from(diff).style(diff_style),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(30),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Min(20),
        ],
    )
    .header(
        Row::new(vec!["Group", "Files", "Avg commit", "vs baseline"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(" Groups "));
    frame.render_widget(table, area);
}

fn draw_files(frame: &mut Frame, area: Rect, group: &Group) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {}: files ", group.group_name));

    if let Some(error) = &group.loading_error {
        let text = Paragraph::new(error.as_str())
            .style(Style::default().fg(Color::Red))
            .block(block);
        frame.render_widget(text, area);
        return;
    }

    let rows = group.file_stats.iter().map(|stats| {
        Row::new(vec![
            Cell::from(stats.file_name.clone()),
            Cell::from(format_ms(stats.total_duration)),
            Cell::from(stats.commit_count.to_string()),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(8),
        ],
    )
    .header(
        Row::new(vec!["File", "Total", "Commits"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block);
    frame.render_widget(table, area);
}

fn draw_ranking(frame: &mut Frame, area: Rect, group: &Group, state: &ViewState) {
    let mut ranked = rank_components(group, state.metric);
    let total = ranked.len();
    if !state.show_all {
        ranked.truncate(state.top);
    }

    let title = if state.show_all {
        format!(" Ranking ({total}): {} duration ", state.metric.label())
    } else {
        format!(" Top {}: {} duration ", state.top, state.metric.label())
    };

    let rows = ranked.iter().enumerate().map(|(i, entry)| {
        Row::new(vec![
            Cell::from(format!("#{}", i + 1)),
            Cell::from(entry.name.clone()),
            Cell::from(format_ms(entry.duration)),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(5),
            Constraint::Min(16),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["", "Component", "Time"]).style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}
