use anyhow::{Result, bail};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use media_browser_config::Config;
use media_browser_engine::gallery::plural_noun;
use media_browser_engine::permissions::NoPermissionModel;
use media_browser_engine::router::share;
use media_browser_engine::{
    CapabilityTier, Category, Galleries, GalleryCache, GalleryItem, GalleryMount, ListingStatus,
    LoadOutcome, NavOutcome, Navigator, PermissionGateway, Route, Selection, StdFileSystem,
    TapAction, route, scan_with_report,
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{env, io::stdout, path::PathBuf, process, sync::Arc};

/// A gallery screen while it is on display
struct GalleryView {
    mount: GalleryMount,
    items: Arc<[GalleryItem]>,
    selection: Selection,
    message: Option<String>,
}

enum Screen {
    Browser,
    Gallery(GalleryView),
}

struct App {
    navigator: Navigator<StdFileSystem>,
    galleries: Galleries<StdFileSystem>,
    gateway: PermissionGateway<NoPermissionModel>,
    screen: Screen,
    list_state: ListState,
    /// Last route the app would have pushed, shown in the side panel
    last_route: Vec<String>,
}

impl App {
    fn new(config: &Config) -> Self {
        let mut app = Self {
            navigator: Navigator::new(StdFileSystem, config.storage_root.clone()),
            galleries: Galleries::new(
                StdFileSystem,
                Arc::new(GalleryCache::new()),
                config.resolved_sources(),
                config.limits,
            ),
            gateway: PermissionGateway::new(NoPermissionModel, CapabilityTier::Unrestricted),
            screen: Screen::Browser,
            list_state: ListState::default(),
            last_route: Vec::new(),
        };
        app.reset_selection();
        app
    }

    fn len(&self) -> usize {
        match &self.screen {
            Screen::Browser => self.navigator.entries().len(),
            Screen::Gallery(view) => view.items.len(),
        }
    }

    fn reset_selection(&mut self) {
        let first = if self.len() == 0 { None } else { Some(0) };
        self.list_state.select(first);
    }

    fn next(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    fn selected_item(&self) -> Option<GalleryItem> {
        let Screen::Gallery(view) = &self.screen else {
            return None;
        };
        let index = self.list_state.selected()?;
        view.items.get(index).cloned()
    }

    fn show_route(&mut self, route: &Route) {
        let mut lines = vec![format!("→ {}", route.screen_name())];
        match route {
            Route::Viewer(target) => lines.push(target.start_at.clone()),
            Route::Share { images } => {
                lines.extend(images.iter().map(|item| item.display_name.clone()));
            }
        }
        self.last_route = lines;
    }

    /// Enter/open on the highlighted row
    fn activate(&mut self) {
        match &self.screen {
            Screen::Browser => {
                let Some(index) = self.list_state.selected() else {
                    return;
                };
                match self.navigator.enter_index(index) {
                    NavOutcome::Listed => self.reset_selection(),
                    NavOutcome::Open(route) => self.show_route(&route),
                    NavOutcome::Ignored | NavOutcome::Exit => {}
                }
            }
            Screen::Gallery(_) => {
                let Some(item) = self.selected_item() else {
                    return;
                };
                let Screen::Gallery(view) = &mut self.screen else {
                    return;
                };
                if let TapAction::Open(path) = view.selection.tap(&item) {
                    let target = route(&path, view.mount.category());
                    self.show_route(&Route::Viewer(target));
                }
            }
        }
    }

    /// Long-press equivalent in a gallery
    fn select(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        if let Screen::Gallery(view) = &mut self.screen {
            if view.selection.is_active() {
                view.selection.tap(&item);
            } else {
                view.selection.long_press(&item);
            }
        }
    }

    fn toggle_all(&mut self) {
        if let Screen::Gallery(view) = &mut self.screen {
            view.selection.toggle_all(&view.items);
        }
    }

    fn share(&mut self) {
        let Screen::Gallery(view) = &self.screen else {
            return;
        };
        if let Some(route) = share(view.selection.set().selected_items(&view.items)) {
            self.show_route(&route);
        }
    }

    /// Returns `false` when back should quit the app
    fn back(&mut self) -> bool {
        match &mut self.screen {
            Screen::Browser => match self.navigator.back() {
                NavOutcome::Exit => false,
                _ => {
                    self.reset_selection();
                    true
                }
            },
            Screen::Gallery(view) => {
                if !view.selection.cancel() {
                    view.mount.unmount();
                    self.screen = Screen::Browser;
                    self.reset_selection();
                }
                true
            }
        }
    }

    fn open_gallery(&mut self, category: Category) {
        if let Screen::Gallery(view) = &self.screen {
            view.mount.unmount();
        }

        let mount = self.galleries.mount(category);
        let outcome = self.galleries.load(&mount, &self.gateway);
        let message = outcome.message(category);
        let items = match outcome {
            LoadOutcome::Loaded(items) => items,
            LoadOutcome::Empty => Arc::from(Vec::<GalleryItem>::new()),
            LoadOutcome::PermissionDenied | LoadOutcome::Discarded => mount.cached_items(),
        };

        self.screen = Screen::Gallery(GalleryView {
            mount,
            items,
            selection: Selection::new(),
            message,
        });
        self.reset_selection();
    }

    fn title(&self) -> String {
        match &self.screen {
            Screen::Browser => self.navigator.current_directory_name(),
            Screen::Gallery(view) => {
                let noun = plural_noun(view.mount.category());
                if view.selection.is_active() {
                    format!("{} selected", view.selection.count())
                } else {
                    format!("{} ({})", noun, view.items.len())
                }
            }
        }
    }

    fn rows(&self) -> Vec<ListItem<'static>> {
        match &self.screen {
            Screen::Browser => self
                .navigator
                .entries()
                .iter()
                .map(|entry| {
                    let text = match entry.child_count_label() {
                        Some(label) => {
                            format!("📁 {}  ({label}, {})", entry.name, entry.modified_label())
                        }
                        None => format!("📄 {}  ({})", entry.name, entry.modified_label()),
                    };
                    ListItem::new(Line::from(vec![Span::raw(text)]))
                })
                .collect(),
            Screen::Gallery(view) => view
                .items
                .iter()
                .map(|item| {
                    let mark = if !view.selection.is_active() {
                        ""
                    } else if view.selection.set().is_selected(&item.path) {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    ListItem::new(Line::from(vec![Span::raw(format!(
                        "{mark}{}",
                        item.display_name
                    ))]))
                })
                .collect(),
        }
    }

    fn side_panel(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.screen {
            Screen::Browser => {
                let state = self.navigator.state();
                lines.push(state.current_path.display().to_string());
                match &state.status {
                    ListingStatus::Loaded => {}
                    ListingStatus::Empty => lines.push("This folder is empty".to_string()),
                    ListingStatus::Failed(message) => lines.push(message.clone()),
                }
            }
            Screen::Gallery(view) => {
                if let Some(message) = &view.message {
                    lines.push(message.clone());
                }
            }
        }
        if !self.last_route.is_empty() {
            lines.push(String::new());
            lines.extend(self.last_route.iter().cloned());
        }
        lines
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.get(1).map(String::as_str) == Some("scan") {
        return run_scan(&args[2..]);
    }

    let config_path = Config::config_path();
    let config = if args.len() == 2 {
        // CLI argument provided - browse and scan beneath it
        Config::for_root(PathBuf::from(&args[1]))
    } else if args.len() == 1 {
        match Config::load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                eprintln!("Error: No storage root provided and no config file found");
                eprintln!("Usage: {} <storage-root>", args[0]);
                eprintln!("       {} scan <category> [root...]", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <storage-root>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [storage-root]", args[0]);
        eprintln!("       {} scan <category> [root...]", args[0]);
        process::exit(1);
    };

    if !config.storage_root.is_dir() {
        eprintln!(
            "Error: Storage root '{}' is not a directory",
            config.storage_root.display()
        );
        process::exit(1);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

/// `scan <category> [root...]`: print matching paths, one per line
fn run_scan(args: &[String]) -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let Some(name) = args.first() else {
        bail!("Usage: scan <image|video|audio|document> [root...]");
    };
    let Some(category) = Category::parse(name) else {
        bail!("Unknown category '{name}', expected image, video, audio or document");
    };

    let config = Config::load()?.unwrap_or_default();
    let roots: Vec<PathBuf> = if args.len() > 1 {
        args[1..].iter().map(PathBuf::from).collect()
    } else {
        config.resolved_sources().roots(category).to_vec()
    };

    let report = scan_with_report(&StdFileSystem, &roots, category, config.limits);
    for issue in &report.issues {
        log::warn!("{issue}");
    }
    for item in &report.items {
        println!("{}", item.path.display());
    }
    if report.truncated {
        eprintln!(
            "Stopped at {} {}; raise limits.max_results to see more",
            report.items.len(),
            plural_noun(category)
        );
    }
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::Enter | KeyCode::Right => app.activate(),
                KeyCode::Backspace | KeyCode::Left | KeyCode::Esc => {
                    if !app.back() {
                        return Ok(());
                    }
                }
                KeyCode::Char(' ') => app.select(),
                KeyCode::Char('a') => app.toggle_all(),
                KeyCode::Char('s') => app.share(),
                KeyCode::Char('1') => app.open_gallery(Category::Image),
                KeyCode::Char('2') => app.open_gallery(Category::Video),
                KeyCode::Char('3') => app.open_gallery(Category::Audio),
                KeyCode::Char('4') => app.open_gallery(Category::Document),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .margin(1)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)].as_ref())
        .split(f.area());

    let list = List::new(app.rows())
        .block(Block::default().borders(Borders::ALL).title(app.title()))
        .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));

    f.render_stateful_widget(list, chunks[0], &mut app.list_state);

    let details: Vec<Line> = app
        .side_panel()
        .into_iter()
        .map(|line| Line::from(vec![Span::raw(line)]))
        .collect();
    let details = Paragraph::new(details)
        .block(Block::default().borders(Borders::ALL).title("Details"))
        .wrap(ratatui::widgets::Wrap { trim: true });

    f.render_widget(details, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("q: Quit | ↑↓/jk: Move | Enter: Open | ←/Esc: Back | "),
        Span::raw("1-4: Images/Videos/Audio/Docs | Space: Select | a: All | s: Share"),
    ]);

    let help = Paragraph::new(vec![help_text]).block(Block::default());

    // Place help at bottom
    let bottom_chunk = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(f.area());

    f.render_widget(help, bottom_chunk[1]);
}
