use std::{
    collections::HashSet,
    io, thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

use realtyxr_core::{
    config::AppConfig,
    invest::{FlowPhase, InvestFlow, InvestOutcome},
    ledger::{LedgerService, MonitorEvent},
    models::{NetworkStatus, Property, WorldPosition},
    scene::{InputEvent, InputKind, NodeId, SceneGraph},
    selection::{Highlighter, PanelMode, PanelSink, SelectionCoordinator},
};

const TICK_RATE: Duration = Duration::from_millis(250);
const BOUNCE_DURATION: Duration = Duration::from_millis(400);
const CELEBRATION_DURATION: Duration = Duration::from_secs(3);
const MAX_TOKEN_DIGITS: usize = 6;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    accent_alt: Color,
    muted: Color,
    success: Color,
    warning: Color,
    danger: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            accent_alt: Color::Blue,
            muted: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
            danger: Color::Red,
        }
    }
}

/// One property card in the scene strip. `area` is refreshed on every
/// draw and backs mouse hit testing.
struct Card {
    property_id: String,
    node: NodeId,
    area: Option<Rect>,
}

/// Render surface fed by the selection coordinator. Holds the highlight
/// set and whichever panel variant is currently requested.
#[derive(Default)]
struct Surface {
    highlights: HashSet<String>,
    bounce: Option<(String, Instant)>,
    panel: Option<PanelView>,
}

struct PanelView {
    property: Property,
    anchor: Option<WorldPosition>,
}

impl Surface {
    fn is_highlighted(&self, property_id: &str) -> bool {
        self.highlights.contains(property_id)
    }

    fn is_bouncing(&self, property_id: &str) -> bool {
        self.bounce
            .as_ref()
            .map(|(id, at)| id == property_id && at.elapsed() < BOUNCE_DURATION)
            .unwrap_or(false)
    }
}

impl Highlighter for Surface {
    fn set_highlight(&mut self, property_id: &str, on: bool) {
        if on {
            self.highlights.insert(property_id.to_string());
        } else {
            // Clearing an unhighlighted entity is a no-op.
            self.highlights.remove(property_id);
        }
    }

    fn bounce(&mut self, property_id: &str) {
        self.bounce = Some((property_id.to_string(), Instant::now()));
    }
}

impl PanelSink for Surface {
    fn render_panel(&mut self, property: &Property) {
        self.panel = Some(PanelView {
            property: property.clone(),
            anchor: None,
        });
    }

    fn render_world_panel(&mut self, property: &Property, anchor: WorldPosition) {
        self.panel = Some(PanelView {
            property: property.clone(),
            anchor: Some(anchor),
        });
    }

    fn clear_panel(&mut self) {
        self.panel = None;
    }
}

/// Token-count entry modal shown before a purchase is submitted.
struct InvestModal {
    property_id: String,
    property_name: String,
    price_per_token: u64,
    currency: String,
    min_investment: u64,
    max_investment: u64,
    available: u64,
    input: String,
}

impl InvestModal {
    fn new(property: &Property) -> Self {
        Self {
            property_id: property.id.clone(),
            property_name: property.name.clone(),
            price_per_token: property.valuation.price_per_token,
            currency: property.valuation.currency.clone(),
            min_investment: property.token.min_investment,
            max_investment: property.token.max_investment,
            available: property.token.available_tokens,
            input: "1".to_string(),
        }
    }

    fn insert(&mut self, ch: char) {
        if ch.is_ascii_digit() && self.input.len() < MAX_TOKEN_DIGITS {
            self.input.push(ch);
        }
    }

    fn backspace(&mut self) {
        self.input.pop();
    }

    fn tokens(&self) -> u64 {
        self.input.parse().unwrap_or(0)
    }

    fn total_cost(&self) -> u64 {
        self.tokens() * self.price_per_token
    }

    /// Validation message for the current entry, if it cannot be
    /// submitted as-is.
    fn validation_error(&self) -> Option<String> {
        let tokens = self.tokens();
        if tokens < self.min_investment {
            return Some(format!(
                "Enter at least {} token(s)",
                self.min_investment
            ));
        }
        if tokens > self.max_investment {
            return Some(format!(
                "At most {} tokens per investor",
                self.max_investment
            ));
        }
        None
    }
}

/// Gaze reticle dwell state. When the reticle rests on the same card
/// long enough, the fuse fires a gaze selection.
struct GazeState {
    focus: usize,
    since: Instant,
    fused: bool,
}

impl GazeState {
    fn new() -> Self {
        Self {
            focus: 0,
            since: Instant::now(),
            fused: false,
        }
    }

    fn retarget(&mut self, focus: usize) {
        if focus != self.focus {
            self.focus = focus;
            self.since = Instant::now();
            self.fused = false;
        }
    }
}

enum AppEvent {
    Input(Event),
    Tick,
    InvestResolved {
        property_id: String,
        outcome: InvestOutcome,
    },
}

/// High-level application state for the showcase TUI.
pub struct RealtyApp {
    ledger: LedgerService,
    config: AppConfig,
    flow: InvestFlow,
    coordinator: SelectionCoordinator<LedgerService>,
    surface: Surface,
    cards: Vec<Card>,
    gaze: GazeState,
    hovered_card: Option<usize>,
    panel_mode: PanelMode,
    invest_modal: Option<InvestModal>,
    network: Option<NetworkStatus>,
    status: String,
    celebrate_until: Option<Instant>,
    event_tx: Option<mpsc::Sender<AppEvent>>,
    monitor_rx: Option<mpsc::Receiver<MonitorEvent>>,
    should_quit: bool,
    theme: Theme,
}

impl RealtyApp {
    pub fn new(ledger: LedgerService, config: AppConfig) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, WorldPosition::default());
        let mut cards = Vec::new();
        for property in ledger.snapshot_all() {
            let group = scene.add_selectable(Some(root), property.model.position, &property.id);
            // Hit tests report the mesh child; ancestry resolution walks
            // up to the tagged group, mirroring the raycast contract.
            let mesh = scene.add_node(Some(group), property.model.position);
            cards.push(Card {
                property_id: property.id,
                node: mesh,
                area: None,
            });
        }

        let flow = InvestFlow::new(
            ledger.clone(),
            Duration::from_secs(config.purchase_timeout_secs),
        );
        let coordinator = SelectionCoordinator::new(scene, ledger.clone());

        Self {
            ledger,
            config,
            flow,
            coordinator,
            surface: Surface::default(),
            cards,
            gaze: GazeState::new(),
            hovered_card: None,
            panel_mode: PanelMode::Flat,
            invest_modal: None,
            network: None,
            status: "Select a property: click, dwell the reticle, or press Enter".to_string(),
            celebrate_until: None,
            event_tx: None,
            monitor_rx: None,
            should_quit: false,
            theme: Theme::default(),
        }
    }

    pub fn attach_monitor(&mut self, receiver: mpsc::Receiver<MonitorEvent>) {
        self.monitor_rx = Some(receiver);
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(properties = self.cards.len(), "showcase starting");

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx.clone());
        self.event_tx = Some(event_tx);

        let mut monitor_rx = self.monitor_rx.take();

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.should_quit {
                break;
            }

            if let Some(rx) = monitor_rx.as_mut() {
                let mut monitor_closed = false;
                tokio::select! {
                    maybe_event = event_rx.recv() => {
                        if !self.process_app_event(maybe_event) {
                            break;
                        }
                    }
                    maybe_status = rx.recv() => {
                        match maybe_status {
                            Some(event) => self.handle_monitor_event(event),
                            None => monitor_closed = true,
                        }
                    }
                }
                if monitor_closed {
                    monitor_rx = None;
                }
            } else {
                let maybe_event = event_rx.recv().await;
                if !self.process_app_event(maybe_event) {
                    break;
                }
            }

            if self.should_quit {
                break;
            }
        }

        restore_terminal(&mut terminal)?;
        self.event_tx = None;
        Ok(())
    }

    fn process_app_event(&mut self, maybe_event: Option<AppEvent>) -> bool {
        match maybe_event {
            Some(AppEvent::Input(event)) => {
                self.handle_input(event);
                true
            }
            Some(AppEvent::Tick) => {
                self.handle_tick();
                true
            }
            Some(AppEvent::InvestResolved {
                property_id,
                outcome,
            }) => {
                self.handle_invest_resolved(&property_id, outcome);
                true
            }
            None => false,
        }
    }

    fn handle_monitor_event(&mut self, event: MonitorEvent) {
        match event {
            MonitorEvent::Status(status) => {
                debug!(block_height = status.block_height, "status update");
                self.network = Some(status);
            }
        }
    }

    fn handle_tick(&mut self) {
        // Gaze fuse: dwelling on the focused card selects it once.
        let fuse = Duration::from_millis(self.config.gaze_fuse_ms);
        if !self.gaze.fused && self.gaze.since.elapsed() >= fuse && self.invest_modal.is_none() {
            self.gaze.fused = true;
            if let Some(card) = self.cards.get(self.gaze.focus) {
                let event = InputEvent {
                    kind: InputKind::Gaze,
                    target: card.node,
                };
                self.coordinator.dispatch(event, &mut self.surface);
            }
        }

        if let Some(until) = self.celebrate_until {
            if Instant::now() >= until {
                self.celebrate_until = None;
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.invest_modal.is_some() {
            self.handle_modal_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_focus(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_focus(1),
            KeyCode::Enter => {
                if let Some(card) = self.cards.get(self.gaze.focus) {
                    let event = InputEvent {
                        kind: InputKind::Trigger,
                        target: card.node,
                    };
                    self.coordinator.dispatch(event, &mut self.surface);
                }
            }
            KeyCode::Char('i') => self.open_invest_modal(),
            KeyCode::Char('v') => self.toggle_panel_mode(),
            KeyCode::Esc => {
                self.coordinator.deselect(&mut self.surface);
                self.status.clear();
            }
            _ => {}
        }
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.invest_modal = None;
            }
            KeyCode::Backspace => {
                if let Some(modal) = self.invest_modal.as_mut() {
                    modal.backspace();
                }
            }
            KeyCode::Char(ch) => {
                if let Some(modal) = self.invest_modal.as_mut() {
                    modal.insert(ch);
                }
            }
            KeyCode::Enter => self.confirm_investment(),
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.invest_modal.is_some() {
            return;
        }
        match mouse.kind {
            MouseEventKind::Moved => {
                let hit = hit_card(&self.cards, mouse.column, mouse.row);
                if hit != self.hovered_card {
                    if let Some(index) = self.hovered_card {
                        if let Some(card) = self.cards.get(index) {
                            self.coordinator.hover_leave(card.node, &mut self.surface);
                        }
                    }
                    if let Some(index) = hit {
                        if let Some(card) = self.cards.get(index) {
                            self.coordinator.hover_enter(card.node, &mut self.surface);
                        }
                    }
                    self.hovered_card = hit;
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                match hit_card(&self.cards, mouse.column, mouse.row) {
                    Some(index) => {
                        self.gaze.retarget(index);
                        if let Some(card) = self.cards.get(index) {
                            let event = InputEvent {
                                kind: InputKind::Pointer,
                                target: card.node,
                            };
                            self.coordinator.dispatch(event, &mut self.surface);
                        }
                    }
                    None => {
                        // Clicking empty space deselects, as in the
                        // desktop showcase.
                        self.coordinator.deselect(&mut self.surface);
                    }
                }
            }
            _ => {}
        }
    }

    fn move_focus(&mut self, delta: isize) {
        if self.cards.is_empty() {
            return;
        }
        let len = self.cards.len() as isize;
        let next = (self.gaze.focus as isize + delta).rem_euclid(len) as usize;
        if next != self.gaze.focus {
            if let Some(card) = self.cards.get(self.gaze.focus) {
                self.coordinator.hover_leave(card.node, &mut self.surface);
            }
            self.gaze.retarget(next);
            if let Some(card) = self.cards.get(next) {
                self.coordinator.hover_enter(card.node, &mut self.surface);
            }
        }
    }

    fn toggle_panel_mode(&mut self) {
        self.panel_mode = match self.panel_mode {
            PanelMode::Flat => PanelMode::WorldAnchored,
            PanelMode::WorldAnchored => PanelMode::Flat,
        };
        self.coordinator.set_panel_mode(self.panel_mode);
        self.coordinator.refresh(&mut self.surface);
        self.status = match self.panel_mode {
            PanelMode::Flat => "Desktop panel".to_string(),
            PanelMode::WorldAnchored => "World-anchored panel".to_string(),
        };
    }

    fn open_invest_modal(&mut self) {
        let Some(selected) = self.coordinator.selected().map(str::to_string) else {
            self.status = "Select a property first".to_string();
            return;
        };
        let Some(property) = self.ledger.snapshot(&selected) else {
            return;
        };
        if property.sold_out() {
            self.status = format!("{} is sold out", property.name);
            return;
        }
        if self.flow.phase() != FlowPhase::Idle {
            self.status = "A transaction is already in progress".to_string();
            return;
        }
        self.invest_modal = Some(InvestModal::new(&property));
    }

    fn confirm_investment(&mut self) {
        let Some(modal) = self.invest_modal.as_ref() else {
            return;
        };
        if let Some(error) = modal.validation_error() {
            self.status = error;
            return;
        }
        let property_id = modal.property_id.clone();
        let tokens = modal.tokens();
        self.invest_modal = None;

        let Some(tx) = self.event_tx.clone() else {
            return;
        };
        let flow = self.flow.clone();
        self.status = "Processing investment…".to_string();
        tokio::spawn(async move {
            let outcome = flow.invest(&property_id, tokens).await;
            let _ = tx
                .send(AppEvent::InvestResolved {
                    property_id,
                    outcome,
                })
                .await;
        });
    }

    fn handle_invest_resolved(&mut self, property_id: &str, outcome: InvestOutcome) {
        match outcome {
            InvestOutcome::Settled(transaction) => {
                self.status = format!(
                    "Purchased {} token(s) · {}",
                    transaction.tokens, transaction.transaction_id
                );
                self.celebrate_until = Some(Instant::now() + CELEBRATION_DURATION);
                // Refresh the panel with the post-purchase counts.
                self.coordinator.refresh(&mut self.surface);
            }
            InvestOutcome::Rejected(reason) => {
                self.status = format!("Cannot invest: {reason}");
            }
            InvestOutcome::Failed(err) => {
                self.status = format!("Transaction failed: {err}");
            }
            InvestOutcome::TimedOut => {
                self.status = "Transaction timed out; the control has been unlocked".to_string();
            }
            InvestOutcome::Busy => {
                self.status = "A transaction is already in progress".to_string();
            }
        }
        debug!(property_id, status = %self.status, "invest resolved");
    }

    // ---------------- Rendering ----------------

    fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(9),
                Constraint::Length(4),
            ])
            .split(frame.size());

        self.render_banner(frame, chunks[0]);
        self.render_scene(frame, chunks[1]);
        self.render_flat_panel(frame, chunks[2]);
        self.render_status(frame, chunks[3]);

        if let Some(panel) = self.surface.panel.as_ref() {
            if panel.anchor.is_some() {
                self.render_world_panel(frame, chunks[1]);
            }
        }
        if self.invest_modal.is_some() {
            self.render_invest_modal(frame);
        }
    }

    fn render_banner(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(vec![
            Span::styled(
                "REALTY XR ",
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "· tokenized property showcase",
                Style::default().fg(self.theme.muted),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, area);
    }

    fn render_scene(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Scene");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.cards.is_empty() {
            return;
        }
        let constraints: Vec<Constraint> = self
            .cards
            .iter()
            .map(|_| Constraint::Ratio(1, self.cards.len() as u32))
            .collect();
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(inner);

        let selected = self.coordinator.selected().map(str::to_string);
        let fuse = Duration::from_millis(self.config.gaze_fuse_ms);
        for (index, card) in self.cards.iter_mut().enumerate() {
            let column = columns[index];
            card.area = Some(column);
            let Some(property) = self.ledger.snapshot(&card.property_id) else {
                continue;
            };

            let is_selected = selected.as_deref() == Some(card.property_id.as_str());
            let is_highlighted = self.surface.is_highlighted(&card.property_id);
            let is_focused = index == self.gaze.focus;

            let border_style = if is_selected {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else if is_highlighted {
                Style::default().fg(self.theme.accent_alt)
            } else {
                Style::default().fg(self.theme.muted)
            };

            let mut title = property.token.symbol.clone();
            if is_focused {
                title = format!("◎ {title}");
            }
            if self.surface.is_bouncing(&card.property_id) {
                title = format!("{title} ▲");
            }

            let mut lines = vec![
                Line::from(Span::styled(
                    property.name.clone(),
                    Style::default()
                        .fg(self.theme.primary_fg)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    property.kind.clone(),
                    Style::default().fg(self.theme.muted),
                )),
                Line::from(property.location.short_label()),
                Line::from(format!(
                    "{} / token",
                    format_currency(property.valuation.price_per_token, &property.valuation.currency)
                )),
                Line::from(format!("{} yield", format_percent(property.yields.annual_yield))),
                Line::from(format!(
                    "{} of {} available",
                    format_number(property.token.available_tokens),
                    format_number(property.token.total_supply)
                )),
            ];
            if property.sold_out() {
                lines.push(Line::from(Span::styled(
                    "SOLD OUT",
                    Style::default().fg(self.theme.danger),
                )));
            } else if is_focused && !self.gaze.fused {
                let progress = (self.gaze.since.elapsed().as_millis() as f64
                    / fuse.as_millis().max(1) as f64)
                    .min(1.0);
                let filled = (progress * 8.0) as usize;
                lines.push(Line::from(Span::styled(
                    format!("gaze {}{}", "▰".repeat(filled), "▱".repeat(8 - filled)),
                    Style::default().fg(self.theme.warning),
                )));
            }

            let paragraph = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true })
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border_style)
                        .title(title),
                );
            frame.render_widget(paragraph, column);
        }
    }

    fn render_flat_panel(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Property");
        let panel = self
            .surface
            .panel
            .as_ref()
            .filter(|panel| panel.anchor.is_none());
        let Some(panel) = panel else {
            let hint = Paragraph::new("No property selected.")
                .style(Style::default().fg(self.theme.muted))
                .block(block);
            frame.render_widget(hint, area);
            return;
        };

        let property = &panel.property;
        let currency = &property.valuation.currency;
        let lines = vec![
            Line::from(Span::styled(
                property.display_name(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} · {}",
                property.location.short_label(),
                property.location.country
            )),
            Line::from(format!(
                "Valuation {}   ·   {} per token",
                format_currency(property.valuation.total_value, currency),
                format_currency(property.valuation.price_per_token, currency)
            )),
            Line::from(format!(
                "Annual yield {}   ·   occupancy {}",
                format_percent(property.yields.annual_yield),
                format_percent(property.yields.occupancy_rate)
            )),
            Line::from(format!(
                "Tokens available {}   ·   sold {}   ·   supply {}",
                format_number(property.token.available_tokens),
                format_number(property.token.sold_tokens),
                format_number(property.token.total_supply)
            )),
            Line::from(Span::styled(
                if property.sold_out() {
                    "Sold out".to_string()
                } else {
                    format!(
                        "Press i to invest ({}-{} tokens)",
                        property.token.min_investment, property.token.max_investment
                    )
                },
                Style::default().fg(self.theme.warning),
            )),
        ];
        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
        frame.render_widget(paragraph, area);
    }

    fn render_world_panel(&self, frame: &mut Frame, scene_area: Rect) {
        let Some(panel) = self.surface.panel.as_ref() else {
            return;
        };
        let property = &panel.property;
        // Anchor above the selected card, like the in-world panel
        // floating above the building.
        let card_area = self
            .cards
            .iter()
            .find(|card| card.property_id == property.id)
            .and_then(|card| card.area)
            .unwrap_or(scene_area);

        let width = card_area.width.clamp(24, 40);
        let x = card_area
            .x
            .saturating_add(card_area.width / 2)
            .saturating_sub(width / 2)
            .max(scene_area.x);
        let height = 6.min(scene_area.height.saturating_sub(1));
        let popup = Rect::new(x, scene_area.y + 1, width, height);

        let lines = vec![
            Line::from(Span::styled(
                property.name.clone(),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(format!(
                "{} | {} yield",
                format_currency(property.valuation.price_per_token, &property.valuation.currency),
                format_percent(property.yields.annual_yield)
            )),
            Line::from(format!(
                "Available: {}",
                format_number(property.token.available_tokens)
            )),
            Line::from(Span::styled(
                "i invest · Esc close",
                Style::default().fg(self.theme.muted),
            )),
        ];
        frame.render_widget(Clear, popup);
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent)),
            );
        frame.render_widget(paragraph, popup);
    }

    fn render_invest_modal(&self, frame: &mut Frame) {
        let Some(modal) = self.invest_modal.as_ref() else {
            return;
        };
        let area = centered_rect(46, 11, frame.size());
        frame.render_widget(Clear, area);

        let entry_style = if modal.validation_error().is_some() {
            Style::default().fg(self.theme.danger)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let lines = vec![
            Line::from(Span::styled(
                format!("Invest in {}", modal.property_name),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!(
                "Price per token: {}",
                format_currency(modal.price_per_token, &modal.currency)
            )),
            Line::from(format!("Available: {}", format_number(modal.available))),
            Line::from(format!(
                "Allowed: {} to {} tokens",
                modal.min_investment, modal.max_investment
            )),
            Line::from(""),
            Line::from(vec![
                Span::raw("Tokens: "),
                Span::styled(format!("{}▏", modal.input), entry_style),
                Span::raw("  Total: "),
                Span::styled(
                    format_currency(modal.total_cost(), &modal.currency),
                    Style::default().fg(self.theme.warning),
                ),
            ]),
            Line::from(Span::styled(
                "Enter confirm · Esc cancel",
                Style::default().fg(self.theme.muted),
            )),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.accent))
                .title("Confirm Investment"),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let network = match self.network.as_ref() {
            Some(status) => format!(
                "{} · block {} · synced {}",
                status.name,
                format_number(status.block_height),
                status.last_sync.format("%H:%M:%S")
            ),
            None => "Connecting to network…".to_string(),
        };
        let mut lines = vec![Line::from(Span::styled(
            network,
            Style::default().fg(self.theme.muted),
        ))];
        if self.celebrate_until.is_some() {
            lines.push(Line::from(Span::styled(
                "✦ ✦ ✦  Investment settled — welcome aboard  ✦ ✦ ✦",
                Style::default()
                    .fg(self.theme.success)
                    .add_modifier(Modifier::BOLD),
            )));
        } else if !self.status.is_empty() {
            lines.push(Line::from(self.status.clone()));
        }
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

fn hit_card(cards: &[Card], column: u16, row: u16) -> Option<usize> {
    cards.iter().position(|card| {
        card.area
            .map(|area| {
                column >= area.x
                    && column < area.x + area.width
                    && row >= area.y
                    && row < area.y + area.height
            })
            .unwrap_or(false)
    })
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn format_currency(amount: u64, currency: &str) -> String {
    let symbol = match currency {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        _ => "",
    };
    if symbol.is_empty() {
        format!("{} {}", format_number(amount), currency)
    } else {
        format!("{symbol}{}", format_number(amount))
    }
}

fn format_number(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_percent(value: f64) -> String {
    format!("{value:.1}%")
}
