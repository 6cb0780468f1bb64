use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use kana_markers_config::Config;
use kana_markers_engine::{Cmd, Decoration, Document, LivePreview, TagSet, Widget, render};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::{
    env,
    io::{Stdout, stdout},
    path::{Path, PathBuf},
    process,
};
use unicode_width::UnicodeWidthStr;

#[derive(Debug, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    render: bool,
    init_config: bool,
    file: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut parsed = Args {
        config: None,
        render: false,
        init_config: false,
        file: None,
    };
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--render" => parsed.render = true,
            "--init-config" => parsed.init_config = true,
            "--config" => {
                let path = rest.next().ok_or("--config needs a path")?;
                let path = PathBuf::from(path);
                parsed.config = Some(Config::expand_path(&path).unwrap_or(path));
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {flag}")),
            file if parsed.file.is_none() => parsed.file = Some(PathBuf::from(file)),
            extra => return Err(format!("unexpected argument {extra}")),
        }
    }
    if parsed.render && parsed.file.is_none() {
        return Err("--render needs a file".to_string());
    }
    Ok(parsed)
}

/// Tag vocabulary from the config file, or the built-in one when absent.
fn load_tags(config_path: Option<&PathBuf>) -> Result<TagSet> {
    let loaded = match config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    match loaded {
        Some(config) => Ok(config.tag_set()?),
        None => {
            log::info!("no config file found, using built-in tags");
            Ok(TagSet::default())
        }
    }
}

/// Writes the built-in tag vocabulary to `config_path`, or to the default
/// location. An existing file is left alone.
fn init_config(config_path: Option<&Path>) -> Result<PathBuf> {
    let path = config_path.map_or_else(Config::config_path, Path::to_path_buf);
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }
    Config::with_default_tags().save_to_path(&path)?;
    log::info!("wrote default config to {}", path.display());
    Ok(path)
}

/// What a key press asks the editor to do.
#[derive(Debug, PartialEq)]
enum Action {
    Quit,
    Save,
    InsertMarkerNamed(&'static str),
    InsertMarkerAt(usize),
    Insert(char),
    Newline,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Ignore,
}

fn action_for(key: &KeyEvent) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('q') if ctrl => Action::Quit,
        KeyCode::Char('s') if ctrl => Action::Save,
        // Without keyboard enhancement, Ctrl+Shift+<letter> arrives as Ctrl+<letter>.
        KeyCode::Char('h' | 'H') if ctrl && !alt => Action::InsertMarkerNamed("hg"),
        KeyCode::Char('k' | 'K') if ctrl && alt => Action::InsertMarkerNamed("hk"),
        KeyCode::Char('k' | 'K') if ctrl => Action::InsertMarkerNamed("kk"),
        KeyCode::F(n @ 2..=9) => Action::InsertMarkerAt(usize::from(n - 2)),
        KeyCode::Char(c) if !ctrl && !alt => Action::Insert(c),
        KeyCode::Enter => Action::Newline,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        _ => Action::Ignore,
    }
}

struct App {
    file: Option<PathBuf>,
    document: Document,
    preview: LivePreview,
    status: String,
    dirty: bool,
}

impl App {
    fn new(file: Option<PathBuf>, tags: TagSet) -> Result<Self> {
        let document = match &file {
            Some(path) if path.exists() => Document::from_bytes(&std::fs::read(path)?)?,
            _ => Document::new(""),
        };

        let mut app = Self {
            file,
            document,
            preview: LivePreview::new(tags),
            status: String::new(),
            dirty: false,
        };
        app.refresh();
        Ok(app)
    }

    /// Recomputes decorations after any text or caret change.
    fn refresh(&mut self) {
        self.preview.sync(&self.document);
    }

    fn apply(&mut self, cmd: Cmd) {
        match self.document.apply(cmd) {
            Ok(patch) => {
                if !patch.changed.is_empty() {
                    self.dirty = true;
                }
                self.refresh();
            }
            Err(e) => self.status = format!("Edit rejected: {e}"),
        }
    }

    fn insert_text(&mut self, text: &str) {
        self.apply(Cmd::InsertText {
            at: self.document.caret(),
            text: text.to_string(),
        });
    }

    fn insert_marker_named(&mut self, name: &str) {
        match self.preview.tags().get(name) {
            Some(tag) => {
                let cmd = Cmd::insert_marker(tag, self.document.caret());
                self.apply(cmd);
            }
            None => self.status = format!("No tag named {name} is configured"),
        }
    }

    fn insert_marker_at(&mut self, index: usize) {
        let tag = self.preview.tags().iter().nth(index);
        match tag {
            Some(tag) => {
                let cmd = Cmd::insert_marker(tag, self.document.caret());
                self.apply(cmd);
            }
            None => self.status = format!("No tag in slot {}", index + 1),
        }
    }

    fn backspace(&mut self) {
        let caret = self.document.caret();
        if caret > 0 {
            let start = self.document.prev_char_boundary(caret);
            self.apply(Cmd::DeleteRange {
                range: start..caret,
            });
        }
    }

    fn delete(&mut self) {
        let caret = self.document.caret();
        if caret < self.document.len() {
            let end = self.document.next_char_boundary(caret);
            self.apply(Cmd::DeleteRange { range: caret..end });
        }
    }

    fn move_caret(&mut self, to: usize) {
        self.apply(Cmd::MoveCaret { to });
    }

    /// Moves to the previous (`up`) or next line, keeping the column where
    /// the line is long enough.
    fn move_vertically(&mut self, up: bool) {
        let caret = self.document.caret();
        let (_, col) = self.document.line_col(caret);
        let line_start = self.document.line_start(caret);
        let line_end = self.document.line_end(caret);

        let target_start = if up {
            if line_start == 0 {
                return;
            }
            self.document.line_start(line_start - 1)
        } else {
            if line_end >= self.document.len() {
                return;
            }
            line_end + 1
        };

        let target_end = self.document.line_end(target_start);
        let mut to = target_start;
        for _ in 0..col {
            if to >= target_end {
                break;
            }
            to = self.document.next_char_boundary(to);
        }
        self.move_caret(to);
    }

    /// Failures only reach the status line; the buffer stays dirty.
    fn save(&mut self) {
        let Some(path) = &self.file else {
            self.status = "No file to save to; pass a path on the command line".to_string();
            return;
        };
        match std::fs::write(path, self.document.to_bytes()) {
            Ok(()) => {
                self.status = format!("Saved {}", path.display());
                self.dirty = false;
            }
            Err(e) => {
                log::warn!("saving {} failed: {e}", path.display());
                self.status = format!("Save failed: {e}");
            }
        }
    }

    /// Returns `false` when the editor should exit.
    fn handle(&mut self, action: Action) -> Result<bool> {
        self.status.clear();
        match action {
            Action::Quit => return Ok(false),
            Action::Save => self.save(),
            Action::InsertMarkerNamed(name) => self.insert_marker_named(name),
            Action::InsertMarkerAt(index) => self.insert_marker_at(index),
            Action::Insert(c) => self.insert_text(c.encode_utf8(&mut [0; 4])),
            Action::Newline => self.insert_text("\n"),
            Action::Backspace => self.backspace(),
            Action::Delete => self.delete(),
            Action::Left => {
                let to = self.document.prev_char_boundary(self.document.caret());
                self.move_caret(to);
            }
            Action::Right => {
                let to = self.document.next_char_boundary(self.document.caret());
                self.move_caret(to);
            }
            Action::Up => self.move_vertically(true),
            Action::Down => self.move_vertically(false),
            Action::Home => {
                let to = self.document.line_start(self.document.caret());
                self.move_caret(to);
            }
            Action::End => {
                let to = self.document.line_end(self.document.caret());
                self.move_caret(to);
            }
            Action::Ignore => {}
        }
        Ok(true)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let parsed = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Usage: {} [--config PATH] [FILE]", args[0]);
            eprintln!("       {} [--config PATH] --render FILE", args[0]);
            eprintln!("       {} [--config PATH] --init-config", args[0]);
            process::exit(1);
        }
    };

    if parsed.init_config {
        let path = init_config(parsed.config.as_deref())?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    let tags = match load_tags(parsed.config.as_ref()) {
        Ok(tags) => tags,
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Config file location: {}", Config::config_path().display());
            process::exit(1);
        }
    };

    if parsed.render {
        // parse_args guarantees a file for --render
        if let Some(file) = &parsed.file {
            let text = std::fs::read_to_string(file)?;
            print!("{}", render(&text, &tags));
        }
        return Ok(());
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let enhanced_keys = supports_keyboard_enhancement().unwrap_or(false);
    if enhanced_keys {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = App::new(parsed.file, tags).and_then(|mut app| run_app(&mut terminal, &mut app));

    // Restore terminal
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle(action_for(&key))?
        {
            return Ok(());
        }
    }
}

/// Preview text: source with every decorated span swapped for its widget.
fn preview_lines(text: &str, decorations: &[Decoration]) -> Vec<Line<'static>> {
    let kana = Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![Line::default()];
    let mut copied_to = 0;
    for d in decorations {
        push_segment(&mut lines, &text[copied_to..d.span.start], Style::default());
        push_segment(&mut lines, d.widget.text(), kana);
        copied_to = d.span.end;
    }
    push_segment(&mut lines, &text[copied_to..], Style::default());
    lines
}

fn push_segment(lines: &mut Vec<Line<'static>>, segment: &str, style: Style) {
    for (i, part) in segment.split('\n').enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        if !part.is_empty()
            && let Some(line) = lines.last_mut()
        {
            line.push_span(Span::styled(part.to_string(), style));
        }
    }
}

/// Terminal cells between the start of the caret's line and the caret.
fn caret_column(text: &str, caret: usize) -> usize {
    let before = &text[..caret];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    before[line_start..].width()
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Percentage(50),
                Constraint::Min(3),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    // Source panel
    let text = app.document.text();
    let caret = app.document.caret();
    let (line, _) = app.document.line_col(caret);
    let col = caret_column(&text, caret);
    let inner_height = rows[0].height.saturating_sub(2) as usize;
    let scroll = line.saturating_sub(inner_height.saturating_sub(1));

    let title = match &app.file {
        Some(path) if app.dirty => format!("Source - {} *", path.display()),
        Some(path) => format!("Source - {}", path.display()),
        None => "Source".to_string(),
    };
    let source_lines: Vec<Line> = text.split('\n').map(Line::raw).collect();
    let source = Paragraph::new(source_lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll as u16, 0));
    f.render_widget(source, rows[0]);

    let max_x = rows[0].x + rows[0].width.saturating_sub(2);
    let cursor_x = (rows[0].x + 1 + col as u16).min(max_x);
    let cursor_y = rows[0].y + 1 + (line - scroll) as u16;
    f.set_cursor_position((cursor_x, cursor_y));

    // Live preview panel
    let preview = Paragraph::new(preview_lines(&text, app.preview.decorations()))
        .block(Block::default().borders(Borders::ALL).title("Live preview"))
        .wrap(Wrap { trim: false });
    f.render_widget(preview, rows[1]);

    // Status / help line
    let help = if app.status.is_empty() {
        Line::from(vec![
            Span::raw("Esc: Quit | "),
            Span::raw("Ctrl+S: Save | "),
            Span::raw("Ctrl+H/F2: {hg} | "),
            Span::raw("Ctrl+K/F3: {kk} | "),
            Span::raw("Ctrl+Alt+K/F4: {hk}"),
        ])
    } else {
        Line::from(Span::styled(
            app.status.clone(),
            Style::default().fg(Color::Yellow),
        ))
    };
    f.render_widget(Paragraph::new(help), rows[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use kana_markers_engine::{Conversion, ConvertError, reconcile_with};
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("kana-markers-cli")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    fn upper(_: Conversion, s: &str) -> Result<String, ConvertError> {
        Ok(s.to_uppercase())
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn parses_file_and_render_flag() {
        assert_eq!(
            parse_args(&args(&["--render", "notes.md"])).unwrap(),
            Args {
                config: None,
                render: true,
                init_config: false,
                file: Some(PathBuf::from("notes.md")),
            }
        );
    }

    #[test]
    fn render_without_file_is_an_error() {
        assert!(parse_args(&args(&["--render"])).is_err());
    }

    #[test]
    fn rejects_unknown_flags_and_extra_files() {
        assert!(parse_args(&args(&["--verbose"])).is_err());
        assert!(parse_args(&args(&["a.md", "b.md"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
    }

    #[test]
    fn init_config_writes_builtin_tags() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kana").join("config.toml");

        assert_eq!(init_config(Some(path.as_path())).unwrap(), path);
        let tags = load_tags(Some(&path)).unwrap();
        assert_eq!(tags, TagSet::default());
    }

    #[test]
    fn init_config_keeps_existing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(init_config(Some(path.as_path())).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn parses_init_config_flag() {
        let parsed = parse_args(&args(&["--init-config"])).unwrap();
        assert!(parsed.init_config);
        assert_eq!(parsed.file, None);
    }

    #[test]
    fn marker_hotkeys() {
        let key = |code, modifiers| KeyEvent::new(code, modifiers);
        let ctrl_shift = KeyModifiers::CONTROL | KeyModifiers::SHIFT;
        let ctrl_alt = KeyModifiers::CONTROL | KeyModifiers::ALT;

        assert_eq!(
            action_for(&key(KeyCode::Char('H'), ctrl_shift)),
            Action::InsertMarkerNamed("hg")
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('K'), ctrl_shift)),
            Action::InsertMarkerNamed("kk")
        );
        assert_eq!(
            action_for(&key(KeyCode::Char('k'), ctrl_alt)),
            Action::InsertMarkerNamed("hk")
        );
        assert_eq!(
            action_for(&key(KeyCode::F(3), KeyModifiers::NONE)),
            Action::InsertMarkerAt(1)
        );
    }

    // Legacy terminals report Ctrl+Shift+<letter> with only CONTROL set.
    #[test]
    fn marker_hotkeys_without_shift() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        assert_eq!(action_for(&key('h')), Action::InsertMarkerNamed("hg"));
        assert_eq!(action_for(&key('k')), Action::InsertMarkerNamed("kk"));
        assert_eq!(
            action_for(&KeyEvent::new(
                KeyCode::Char('k'),
                KeyModifiers::CONTROL | KeyModifiers::ALT
            )),
            Action::InsertMarkerNamed("hk")
        );
    }

    #[test]
    fn plain_keys_still_insert() {
        let key = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        assert_eq!(action_for(&key('k')), Action::Insert('k'));
        assert_eq!(
            action_for(&KeyEvent::new(KeyCode::Char('K'), KeyModifiers::SHIFT)),
            Action::Insert('K')
        );
    }

    #[test]
    fn failed_save_keeps_editing() {
        let mut app = App::new(
            Some(PathBuf::from("/nonexistent/dir/x.md")),
            TagSet::default(),
        )
        .unwrap();
        app.handle(Action::Insert('a')).unwrap();

        assert!(app.handle(Action::Save).unwrap());
        assert!(app.status.starts_with("Save failed"));
        assert!(app.dirty);
        assert_eq!(app.document.text(), "a");
    }

    #[test]
    fn save_clears_dirty_flag() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        let mut app = App::new(Some(path.clone()), TagSet::default()).unwrap();
        app.handle(Action::Insert('a')).unwrap();

        assert!(app.handle(Action::Save).unwrap());
        assert!(!app.dirty);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a");
    }

    #[test]
    fn caret_column_counts_wide_kana_as_two_cells() {
        let text = "ab\nかなx";
        assert_eq!(caret_column(text, 0), 0);
        assert_eq!(caret_column(text, 2), 2);
        assert_eq!(caret_column(text, 3), 0);
        assert_eq!(caret_column(text, 9), 4);
        assert_eq!(caret_column(text, 10), 5);
    }

    #[test]
    fn preview_swaps_decorated_spans() {
        let text = "a {hg}ka{/hg}\nb {kk}ki{/kk}";
        let decorations = reconcile_with(text, 0, &TagSet::default(), &upper);
        let lines = preview_lines(text, &decorations);
        let rendered: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(rendered, ["a KA", "b KI"]);
    }

    #[test]
    fn preview_keeps_raw_marker_under_caret() {
        let text = "a {hg}ka{/hg}";
        let decorations = reconcile_with(text, 7, &TagSet::default(), &upper);
        let lines = preview_lines(text, &decorations);
        assert_eq!(line_text(&lines[0]), text);
    }

    #[test]
    fn typing_inside_new_marker_keeps_it_raw() {
        let mut app = App::new(None, TagSet::default()).unwrap();
        app.handle(Action::InsertMarkerNamed("kk")).unwrap();
        for c in "tesuto".chars() {
            app.handle(Action::Insert(c)).unwrap();
        }
        assert_eq!(app.document.text(), "{kk}tesuto{/kk}");
        assert!(app.preview.decorations().is_empty());

        app.handle(Action::End).unwrap();
        app.handle(Action::Insert(' ')).unwrap();
        assert_eq!(app.preview.decorations().len(), 1);
        assert_eq!(app.preview.decorations()[0].widget.content(), "テスト");
    }

    #[test]
    fn unknown_marker_name_sets_status() {
        let tags = TagSet::new(vec![]).unwrap();
        let mut app = App::new(None, tags).unwrap();
        app.handle(Action::InsertMarkerNamed("hg")).unwrap();
        assert_eq!(app.document.text(), "");
        assert!(app.status.contains("hg"));
    }

    #[test]
    fn vertical_moves_keep_column() {
        let mut app = App::new(None, TagSet::default()).unwrap();
        for c in "abcd\nxy\nlonger".chars() {
            let action = if c == '\n' {
                Action::Newline
            } else {
                Action::Insert(c)
            };
            app.handle(action).unwrap();
        }
        // caret at end of "longer" (col 6); up clamps to end of "xy"
        app.handle(Action::Up).unwrap();
        assert_eq!(app.document.caret(), 7);
        app.handle(Action::Up).unwrap();
        assert_eq!(app.document.caret(), 2);
        app.handle(Action::Down).unwrap();
        assert_eq!(app.document.caret(), 7);
    }

    #[test]
    fn backspace_removes_whole_character() {
        let mut app = App::new(None, TagSet::default()).unwrap();
        app.handle(Action::Insert('か')).unwrap();
        app.handle(Action::Backspace).unwrap();
        assert_eq!(app.document.text(), "");
        assert_eq!(app.document.caret(), 0);
    }
}
