use crate::editor::RowEditor;
use crate::purchase::{Field, PurchaseId};
use crate::store::PurchaseStore;
use crate::summary::{format_money, format_price, format_units, Summary};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::debug;
use tui_big_text::{BigText, PixelSize};

const ABOUT_TEXT: &str = "Dollar cost averaging means buying an asset in several smaller \
purchases over time instead of all at once. Enter each purchase as the number of units \
bought and the price paid per unit. The calculator adds up the units and the money \
invested, and shows the average price you paid per unit, weighted by how much each \
purchase cost. It does not model time, fees or current market prices.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tab {
    Home,
    Calculator,
    About,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppMode {
    Normal,
    Edit(Field),
}

impl Tab {
    fn title(self) -> &'static str {
        match self {
            Tab::Home => "Home",
            Tab::Calculator => "DCA Calculator",
            Tab::About => "About",
        }
    }

    fn all() -> &'static [Tab] {
        &[Tab::Home, Tab::Calculator, Tab::About]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Some(Tab::Home),
            "calculator" | "calc" | "dca" => Some(Tab::Calculator),
            "about" => Some(Tab::About),
            _ => None,
        }
    }
}

pub struct App {
    pub current_tab: Tab,
    pub store: PurchaseStore,
    pub editor: RowEditor,
    pub should_quit: bool,
    pub mode: AppMode,
    pub selected: usize,
    /// What the user typed into the field being edited, before sanitizing.
    edit_buffer: String,
    summary: Summary,
    summary_revision: u64,
}

impl App {
    pub fn new(store: PurchaseStore, editor: RowEditor) -> App {
        let summary = store.summary();
        let summary_revision = store.revision();
        App {
            current_tab: Tab::Calculator,
            store,
            editor,
            should_quit: false,
            mode: AppMode::Normal,
            selected: 0,
            edit_buffer: String::new(),
            summary,
            summary_revision,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    // Recompute totals only when the purchase list changed
    fn refresh_summary(&mut self) {
        if self.store.revision() != self.summary_revision {
            self.summary = self.store.summary();
            self.summary_revision = self.store.revision();
        }
    }

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(current_index + 1) % tabs.len()];
    }

    pub fn previous_tab(&mut self) {
        let tabs = Tab::all();
        let current_index = tabs
            .iter()
            .position(|&t| t == self.current_tab)
            .unwrap_or(0);
        self.current_tab = tabs[(current_index + tabs.len() - 1) % tabs.len()];
    }

    fn selected_id(&self) -> Option<PurchaseId> {
        self.store.entries().get(self.selected).map(|e| e.id())
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
    }

    pub fn select_next(&mut self) {
        if self.selected < self.store.len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn add_purchase(&mut self) {
        self.store.add();
        self.selected = self.store.len() - 1;
    }

    pub fn remove_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.store.remove(id);
            self.editor.forget(id);
            self.clamp_selection();
        }
    }

    pub fn reset(&mut self) {
        self.store.reset();
        self.editor.clear();
        self.selected = 0;
        self.mode = AppMode::Normal;
    }

    pub fn enter_edit_mode(&mut self, field: Field) {
        if let Some(id) = self.selected_id() {
            self.mode = AppMode::Edit(field);
            self.edit_buffer = self
                .store
                .get(id)
                .map(|e| e.get(field).text().into_owned())
                .unwrap_or_default();
        }
    }

    pub fn exit_edit_mode(&mut self) {
        self.mode = AppMode::Normal;
        self.edit_buffer.clear();
    }

    /// Append `c` to the typed text, or drop its last character, and run the
    /// result through the editor.
    fn type_into(&mut self, field: Field, c: Option<char>) {
        let Some(id) = self.selected_id() else {
            self.exit_edit_mode();
            return;
        };
        match c {
            Some(c) => self.edit_buffer.push(c),
            None => {
                self.edit_buffer.pop();
            }
        }
        let cleaned = self.editor.edit(&mut self.store, id, field, &self.edit_buffer);
        // keep a typed leading dot so one Backspace undoes it; otherwise
        // follow the cleaned text so rejected characters are not kept
        let only_zero_added = self.edit_buffer.starts_with('.')
            && cleaned.strip_prefix('0') == Some(self.edit_buffer.as_str());
        if !only_zero_added {
            self.edit_buffer = cleaned;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.mode {
            AppMode::Normal => self.handle_normal_key(key),
            AppMode::Edit(field) => self.handle_edit_key(field, key),
        }
        self.refresh_summary();
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            // Vim navigation - hjkl
            KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => {
                self.previous_tab();
            }
            KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => {
                self.next_tab();
            }
            KeyCode::Char('1') => self.current_tab = Tab::Home,
            KeyCode::Char('2') => self.current_tab = Tab::Calculator,
            KeyCode::Char('3') => self.current_tab = Tab::About,
            _ if self.current_tab != Tab::Calculator => {}
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('a') => self.add_purchase(),
            KeyCode::Char('d') | KeyCode::Delete => self.remove_selected(),
            KeyCode::Char('R') => self.reset(),
            KeyCode::Char('e') | KeyCode::Char('u') | KeyCode::Enter => {
                self.enter_edit_mode(Field::Units)
            }
            KeyCode::Char('p') => self.enter_edit_mode(Field::Price),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, field: Field, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.exit_edit_mode(),
            KeyCode::Tab | KeyCode::BackTab => self.enter_edit_mode(field.other()),
            KeyCode::Backspace => self.type_into(field, None),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.type_into(field, Some(c))
            }
            _ => {}
        }
    }
}

pub fn run_tui(store: PurchaseStore, editor: RowEditor, tab: Tab) -> eyre::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, editor);
    app.current_tab = tab;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
                debug!(code = ?key.code, mode = ?app.mode, rows = app.store.len(), "key handled");
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(f.area());

    let tab_titles: Vec<Line> = Tab::all()
        .iter()
        .map(|t| {
            let style = if *t == app.current_tab {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            Line::from(Span::styled(t.title(), style))
        })
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(Block::default().borders(Borders::ALL).title("DCA TUI"))
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow))
        .select(
            Tab::all()
                .iter()
                .position(|&t| t == app.current_tab)
                .unwrap_or(0),
        );
    f.render_widget(tabs, chunks[0]);

    match app.current_tab {
        Tab::Home => render_home(f, chunks[1]),
        Tab::Calculator => render_calculator(f, chunks[1], app),
        Tab::About => render_about(f, chunks[1]),
    }
}

fn render_home(f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let big_text = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .lines(vec!["DCA".into()])
        .build();
    f.render_widget(big_text, chunks[0]);

    let help = vec![
        Line::from("Work out the average price of a series of purchases."),
        Line::from(""),
        Line::from("Navigation: h/l (tabs) | 1-3 (direct) | q (quit)"),
        Line::from("Calculator: j/k (select) | a (add) | d (remove) | R (reset)"),
        Line::from("            e (edit units) | p (edit price) | Tab (switch field)"),
    ];
    let paragraph = Paragraph::new(help)
        .block(Block::default().borders(Borders::ALL).title("Welcome"))
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, chunks[1]);
}

fn render_about(f: &mut Frame, area: Rect) {
    let paragraph = Paragraph::new(ABOUT_TEXT)
        .block(Block::default().borders(Borders::ALL).title("About"))
        .style(Style::default().fg(Color::White))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_calculator(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Purchases
            Constraint::Length(4), // Field errors
            Constraint::Length(5), // Summary
        ])
        .split(area);

    render_purchases(f, chunks[0], app);
    render_field_errors(f, chunks[1], app);
    render_summary(f, chunks[2], app.summary());
}

fn render_purchases(f: &mut Frame, area: Rect, app: &App) {
    let help_text = match app.mode {
        AppMode::Normal => "j/k (select) | a (add) | d (remove) | R (reset) | e/p (edit)",
        AppMode::Edit(_) => "Editing: type digits | Tab (switch field) | Enter/Esc (done)",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Purchases - {help_text}"));

    if app.store.is_empty() {
        let placeholder = Paragraph::new("No purchases. Press 'a' to add one.")
            .block(block)
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center);
        f.render_widget(placeholder, area);
        return;
    }

    let header_cells = ["#", "Units", "Price / unit", "Invested"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows = app.store.entries().iter().enumerate().map(|(i, entry)| {
        let is_selected = i == app.selected;
        let row_style = if is_selected {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };

        let field_cell = |field: Field| {
            let value = entry.get(field);
            let text = value.text();
            let editing = is_selected && app.mode == AppMode::Edit(field);
            let has_error = app.editor.error(entry.id(), field).is_some();
            let style = if has_error {
                Style::default().fg(Color::Red)
            } else if editing {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let shown = if editing {
                format!("{text}\u{2588}")
            } else if value.is_empty() {
                "-".to_string()
            } else {
                text.into_owned()
            };
            Cell::from(shown).style(style)
        };

        Row::new(vec![
            Cell::from(format!("{}", i + 1)),
            field_cell(Field::Units),
            field_cell(Field::Price),
            Cell::from(format_money(entry.amount())).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
        .style(row_style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ],
    )
    .header(header)
    .block(block)
    .style(Style::default().fg(Color::White));

    f.render_widget(table, area);
}

fn render_field_errors(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = match app.selected_id() {
        Some(id) => [Field::Units, Field::Price]
            .iter()
            .filter_map(|&field| app.editor.error(id, field))
            .map(|msg| Line::from(Span::styled(msg.to_string(), Style::default().fg(Color::Red))))
            .collect(),
        None => Vec::new(),
    };

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Input"))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_summary(f: &mut Frame, area: Rect, summary: &Summary) {
    let label = Style::default().fg(Color::Gray);
    let value = Style::default()
        .fg(Color::Green)
        .add_modifier(Modifier::BOLD);

    let lines = vec![
        Line::from(vec![
            Span::styled("Total units:    ", label),
            Span::styled(format_units(summary.total_units), value),
        ]),
        Line::from(vec![
            Span::styled("Average price:  ", label),
            Span::styled(format_price(summary.avg_price), value),
        ]),
        Line::from(vec![
            Span::styled("Total invested: ", label),
            Span::styled(format_money(summary.total_amount), value),
        ]),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Summary"));
    f.render_widget(paragraph, area);
}
