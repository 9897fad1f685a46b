use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use data_map::{
    category::unique_data_categories, group_systems, ordered_group_keys, CategoryIndex,
    Connection, Dataset, FilterSelection, LayoutMode, System, ViewConfig,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::collections::BTreeSet;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Map,
    Filters,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Map => Page::Filters,
            Page::Filters => Page::Map,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Map => "Data Map",
            Page::Filters => "Filters",
        }
    }
}

/// One line of the map table: a group header or a system inside a group
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapRow {
    Group { key: String, count: usize },
    System { fides_key: String },
}

/// One entry of the filters page: uses first, then categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOption {
    DataUse(String),
    Category(String),
}

pub struct App {
    pub systems: Vec<System>,
    pub filtered_systems: Vec<System>,
    pub config: ViewConfig,
    pub layout_mode: LayoutMode,
    pub selection: FilterSelection,
    pub rows: Vec<MapRow>,
    pub state: TableState,
    pub filter_options: Vec<FilterOption>,
    pub filter_cursor: usize,
    pub current_page: Page,
    pub show_detail: bool,
    pub dropped_count: usize,
    index: CategoryIndex,
}

impl App {
    pub fn new(dataset: Dataset, config: ViewConfig) -> Self {
        let mut filter_options: Vec<FilterOption> = dataset
            .data_uses()
            .into_iter()
            .map(FilterOption::DataUse)
            .collect();
        filter_options.extend(dataset.data_categories().into_iter().map(FilterOption::Category));

        let mut app = Self {
            systems: dataset.systems,
            filtered_systems: Vec::new(),
            layout_mode: config.layout_mode,
            config,
            selection: FilterSelection::default(),
            rows: Vec::new(),
            state: TableState::default(),
            filter_options,
            filter_cursor: 0,
            current_page: Page::Map,
            show_detail: false,
            dropped_count: dataset.dropped_keys.len(),
            index: CategoryIndex::default(),
        };
        app.refresh();
        app
    }

    /// Recompute filtered set, index and rows after any selection/layout change
    pub fn refresh(&mut self) {
        let previous_focus = self.focused_key().map(str::to_string);

        self.filtered_systems = self.selection.apply(&self.systems);
        self.index = CategoryIndex::build(&self.filtered_systems);

        let groups = group_systems(&self.filtered_systems, self.layout_mode);
        let order = ordered_group_keys(&groups, self.layout_mode, &self.config.system_type_order);

        self.rows.clear();
        for key in order {
            let members = groups.get(&key).unwrap_or(&[]);
            self.rows.push(MapRow::Group {
                key: key.clone(),
                count: members.len(),
            });
            for system in members {
                self.rows.push(MapRow::System {
                    fides_key: system.fides_key.clone(),
                });
            }
        }

        // Keep focus on the same system when it survived the filter
        let restored = previous_focus.and_then(|key| {
            self.rows
                .iter()
                .position(|row| matches!(row, MapRow::System { fides_key } if *fides_key == key))
        });
        let first = self.rows.iter().position(|row| matches!(row, MapRow::System { .. }));
        self.state.select(restored.or(first));
    }

    pub fn focused_key(&self) -> Option<&str> {
        match self.state.selected().and_then(|i| self.rows.get(i)) {
            Some(MapRow::System { fides_key }) => Some(fides_key.as_str()),
            _ => None,
        }
    }

    pub fn focused_system(&self) -> Option<&System> {
        let key = self.focused_key()?;
        self.filtered_systems.iter().find(|s| s.fides_key == key)
    }

    /// Highlighting only applies while each system sits in a single bucket
    pub fn highlights_related(&self) -> bool {
        self.layout_mode == LayoutMode::SystemType
    }

    /// Keys to highlight; empty when nothing is focused or highlighting is off
    pub fn related(&self) -> BTreeSet<String> {
        match self.focused_key() {
            Some(key) if self.highlights_related() => self.index.related_keys(key),
            _ => BTreeSet::new(),
        }
    }

    pub fn connections(&self) -> Vec<Connection> {
        match self.focused_key() {
            Some(key) if self.highlights_related() => self.index.connections_for(key),
            _ => Vec::new(),
        }
    }

    /// A system row drawn faded because it shares nothing with the focus
    pub fn is_dimmed(&self, fides_key: &str, related: &BTreeSet<String>) -> bool {
        self.highlights_related() && self.focused_key().is_some() && !related.contains(fides_key)
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn toggle_layout(&mut self) {
        self.layout_mode = self.layout_mode.toggled();
        self.refresh();
    }

    pub fn toggle_filter_at_cursor(&mut self) {
        match self.filter_options.get(self.filter_cursor) {
            Some(FilterOption::DataUse(data_use)) => {
                let data_use = data_use.clone();
                self.selection.toggle_use(&data_use);
            }
            Some(FilterOption::Category(category)) => {
                let category = category.clone();
                self.selection.toggle_category(&category);
            }
            None => return,
        }
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.selection.clear();
        self.refresh();
    }

    pub fn is_option_selected(&self, option: &FilterOption) -> bool {
        match option {
            FilterOption::DataUse(data_use) => self.selection.is_use_selected(data_use),
            FilterOption::Category(category) => self.selection.is_category_selected(category),
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    /// Move focus to the next system row (group headers are skipped)
    pub fn next(&mut self) {
        match self.current_page {
            Page::Map => self.step_focus(true),
            Page::Filters => {
                if !self.filter_options.is_empty() {
                    self.filter_cursor = (self.filter_cursor + 1) % self.filter_options.len();
                }
            }
        }
    }

    pub fn previous(&mut self) {
        match self.current_page {
            Page::Map => self.step_focus(false),
            Page::Filters => {
                let len = self.filter_options.len();
                if len > 0 {
                    self.filter_cursor = (self.filter_cursor + len - 1) % len;
                }
            }
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let len = self.rows.len();
        if len == 0 {
            return;
        }
        let start = self.state.selected().unwrap_or(0);
        for step in 1..=len {
            let i = if forward {
                (start + step) % len
            } else {
                (start + len - step % len) % len
            };
            if matches!(self.rows[i], MapRow::System { .. }) {
                self.state.select(Some(i));
                return;
            }
        }
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app, event::read);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Viewer event loop failed")
}

fn run_app<B, F>(terminal: &mut Terminal<B>, app: &mut App, mut next_event: F) -> io::Result<()>
where
    B: ratatui::backend::Backend,
    F: FnMut() -> io::Result<Event>,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = next_event()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Tab => app.next_page(),
                KeyCode::Enter => app.toggle_detail(),
                KeyCode::Char('g') => app.toggle_layout(),
                KeyCode::Char('c') => app.clear_filters(),
                KeyCode::Char(' ') if app.current_page == Page::Filters => {
                    app.toggle_filter_at_cursor()
                }
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Map if app.show_detail => {
            let content_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);
            render_map(f, content_chunks[0], app);
            render_detail_panel(f, content_chunks[1], app);
        }
        Page::Map => render_map(f, chunks[1], app),
        Page::Filters => render_filters(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::Map, Page::Filters].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Systems: {}/{}", app.filtered_systems.len(), app.systems.len()),
        Style::default().fg(Color::White),
    ));
    if app.dropped_count > 0 {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("({} duplicates dropped)", app.dropped_count),
            Style::default().fg(Color::DarkGray),
        ));
    }
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Group by: {}", app.layout_mode.title()),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(header, area);
}

pub const EMPTY_MAP_MESSAGE: &str =
    "No systems match the current filters. Try adjusting your selection.";

fn render_map(f: &mut Frame, area: Rect, app: &mut App) {
    if app.rows.is_empty() {
        let placeholder = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(EMPTY_MAP_MESSAGE, Style::default().fg(Color::DarkGray))),
        ])
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Systems "),
        );
        f.render_widget(placeholder, area);
        return;
    }

    let related = app.related();
    let focused = app.focused_key().map(str::to_string);

    let header = Row::new(["System", "Type", "Categories"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    }))
    .style(Style::default().bg(Color::DarkGray))
    .height(1);

    let rows: Vec<Row> = app
        .rows
        .iter()
        .map(|row| match row {
            MapRow::Group { key, count } => {
                let label = if key.is_empty() { "(untyped)" } else { key.as_str() };
                Row::new(vec![Cell::from(format!("▸ {} ({})", label, count))]).style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                )
            }
            MapRow::System { fides_key } => {
                let system = app.filtered_systems.iter().find(|s| &s.fides_key == fides_key);
                let (name, system_type, categories) = match system {
                    Some(s) => (
                        s.name.clone(),
                        s.system_type.clone(),
                        unique_data_categories(s).join(", "),
                    ),
                    None => (fides_key.clone(), String::new(), String::new()),
                };

                let color = if focused.as_deref() == Some(fides_key.as_str()) {
                    Color::White
                } else if related.contains(fides_key) {
                    Color::Cyan
                } else if app.is_dimmed(fides_key, &related) {
                    Color::DarkGray
                } else {
                    Color::White
                };

                Row::new(vec![
                    Cell::from(format!("  {}", truncate(&name, 30))),
                    Cell::from(system_type),
                    Cell::from(truncate(&categories, 60)),
                ])
                .style(Style::default().fg(color))
            }
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(34),
            Constraint::Length(14),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Systems "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![];

    match app.focused_system() {
        Some(system) => {
            lines.push(Line::from(Span::styled(
                system.name.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("{} · {}", system.fides_key, system.system_type),
                Style::default().fg(Color::DarkGray),
            )));
            if !system.description.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(system.description.clone()));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Declarations", Style::default().fg(Color::Cyan))));
            if system.privacy_declarations.is_empty() {
                lines.push(Line::from("  (none)"));
            }
            for decl in &system.privacy_declarations {
                lines.push(Line::from(format!("  {} · {}", decl.data_use, decl.name)));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Categories", Style::default().fg(Color::Cyan))));
            lines.push(Line::from(format!("  {}", unique_data_categories(system).join(", "))));

            if app.highlights_related() {
                let connections = app.connections();
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("Shares categories with ({})", connections.len()),
                    Style::default().fg(Color::Cyan),
                )));
                for connection in connections {
                    lines.push(Line::from(format!("  ⇢ {}", connection.to)));
                }
            }
        }
        None => lines.push(Line::from("No system selected")),
    }

    let panel = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Details "),
    );
    f.render_widget(panel, area);
}

fn render_filters(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![];
    let mut last_kind = None;

    for (i, option) in app.filter_options.iter().enumerate() {
        let (kind, label) = match option {
            FilterOption::DataUse(v) => ("Filter by Data Use", v),
            FilterOption::Category(v) => ("Filter by Data Categories", v),
        };
        if last_kind != Some(kind) {
            if last_kind.is_some() {
                lines.push(Line::from(""));
            }
            lines.push(Line::from(Span::styled(
                kind,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            last_kind = Some(kind);
        }

        let mark = if app.is_option_selected(option) { "[x]" } else { "[ ]" };
        let style = if i == app.filter_cursor {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(format!("  {} {}", mark, label), style)));
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filters "),
    );
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];

    if app.selection.has_active_filters() {
        spans.push(Span::styled(
            format!(
                " Filters: {} uses, {} categories ",
                app.selection.selected_uses.len(),
                app.selection.selected_categories.len()
            ),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw("("));
        spans.push(Span::styled("c", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" clear) | "));
    }

    for (key, label) in [
        ("Tab", " Page | "),
        ("↑/↓", " Nav | "),
        ("Enter", " Details | "),
        ("Space", " Toggle | "),
        ("g", " Group by | "),
    ] {
        spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(label));
    }
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;

    fn sample_app() -> App {
        App::new(Dataset::sample().unwrap(), ViewConfig::default())
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_starts_focused_on_first_system() {
        let app = sample_app();

        assert_eq!(app.current_page, Page::Map);
        assert!(matches!(app.rows[0], MapRow::Group { .. }));
        assert_eq!(app.state.selected(), Some(1));
        assert_eq!(app.focused_key(), Some("web_app"));
    }

    #[test]
    fn test_groups_follow_configured_order() {
        let app = sample_app();
        let groups: Vec<&str> = app
            .rows
            .iter()
            .filter_map(|row| match row {
                MapRow::Group { key, .. } => Some(key.as_str()),
                _ => None,
            })
            .collect();

        assert_eq!(groups, vec!["Application", "Service", "Database", "Integration"]);
    }

    #[test]
    fn test_navigation_skips_group_headers() {
        let mut app = sample_app();

        app.next(); // mobile_app
        app.next(); // header skipped → ad_service
        assert_eq!(app.focused_key(), Some("ad_service"));

        app.previous();
        assert_eq!(app.focused_key(), Some("mobile_app"));
    }

    #[test]
    fn test_related_highlight_for_focus() {
        let app = sample_app();
        let related = app.related();

        assert!(related.contains("web_app"));
        assert!(related.contains("mobile_app"));
        assert!(!related.contains("payments"));
        assert_eq!(app.connections().len(), related.len() - 1);
    }

    #[test]
    fn test_toggle_filter_and_clear() {
        let mut app = sample_app();
        app.current_page = Page::Filters;
        let total = app.filtered_systems.len();

        // first option is the first data use alphabetically
        app.toggle_filter_at_cursor();
        assert!(app.selection.has_active_filters());
        assert!(app.filtered_systems.len() < total);

        app.clear_filters();
        assert_eq!(app.filtered_systems.len(), total);
    }

    #[test]
    fn test_focus_survives_filter_when_possible() {
        let mut app = sample_app();
        app.next();
        assert_eq!(app.focused_key(), Some("mobile_app"));

        app.selection.toggle_category("location");
        app.refresh();
        assert_eq!(app.focused_key(), Some("mobile_app"));
    }

    #[test]
    fn test_layout_toggle_regroups() {
        let mut app = sample_app();
        app.toggle_layout();

        assert_eq!(app.layout_mode, LayoutMode::DataUse);
        assert!(app
            .rows
            .iter()
            .any(|row| matches!(row, MapRow::Group { key, .. } if key == "(no data use)")));
    }

    #[test]
    fn test_data_use_layout_turns_highlighting_off() {
        let mut app = sample_app();
        assert!(app.is_dimmed("payments", &app.related()));

        app.toggle_layout();
        assert_eq!(app.focused_key(), Some("web_app"));
        assert!(app.related().is_empty());
        assert!(app.connections().is_empty());

        let related = app.related();
        for row in &app.rows {
            if let MapRow::System { fides_key } = row {
                assert!(!app.is_dimmed(fides_key, &related));
            }
        }

        app.toggle_layout();
        assert!(app.related().contains("mobile_app"));
    }

    #[test]
    fn test_empty_filter_result_shows_message() {
        let mut app = sample_app();
        app.selection.toggle_category("no_such_category");
        app.refresh();
        assert!(app.rows.is_empty());
        assert_eq!(app.focused_key(), None);

        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        terminal.draw(|f| ui(f, &mut app)).unwrap();
        assert!(screen_text(&terminal).contains(EMPTY_MAP_MESSAGE));
    }

    #[test]
    fn test_event_errors_reach_the_caller() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();

        let res = run_app(&mut terminal, &mut app, || {
            Err(io::Error::new(io::ErrorKind::Other, "input closed"))
        });
        assert_eq!(res.unwrap_err().to_string(), "input closed");
    }

    #[test]
    fn test_event_loop_handles_keys_until_quit() {
        let mut app = sample_app();
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let mut keys = vec![KeyCode::Char('q'), KeyCode::Char('g'), KeyCode::Down];

        run_app(&mut terminal, &mut app, || {
            let code = keys.pop().unwrap();
            Ok(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        })
        .unwrap();

        assert_eq!(app.layout_mode, LayoutMode::DataUse);
        assert!(screen_text(&terminal).contains("Group by: Data Use"));
    }

    #[test]
    fn test_filter_cursor_wraps() {
        let mut app = sample_app();
        app.next_page();
        app.previous();
        assert_eq!(app.filter_cursor, app.filter_options.len() - 1);
        app.next();
        assert_eq!(app.filter_cursor, 0);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer name", 10), "a much ...");
    }
}
