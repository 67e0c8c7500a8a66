use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};
use std::io;

use crate::models::{formatted_date, PhotoItem};

/// What the user chose when leaving the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerAction {
    Back,
    OpenBrowser,
}

/// Builds the text of the detail screen, wrapped to `width` columns.
pub fn detail_lines(item: &PhotoItem, width: usize) -> Vec<String> {
    let width = width.max(20);
    let mut lines = Vec::new();

    let fields = [
        ("Author", item.author_name().to_string()),
        ("Published", formatted_date(&item.published)),
        ("Taken", formatted_date(&item.taken)),
        ("Tags", item.tag_list().join(", ")),
        ("Image", item.image_url().to_string()),
        ("Link", item.link.clone()),
    ];
    for (label, value) in fields {
        if value.is_empty() {
            continue;
        }
        let text = format!("{}: {}", label, value);
        lines.extend(textwrap::wrap(&text, width).into_iter().map(|l| l.into_owned()));
    }

    lines.push(String::new());
    lines.push("─".repeat(width.min(40)));
    lines.push(String::new());

    let description = html2text::from_read(item.description.as_bytes(), width);
    let description = description.trim();
    if description.is_empty() {
        lines.push("No description available".to_string());
    } else {
        lines.extend(description.lines().map(String::from));
    }

    lines
}

/// Shows the detail screen for `item` until the user leaves it.
pub fn run_viewer(item: &PhotoItem) -> Result<ViewerAction> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let _restore = RestoreOnDrop::new(restore_terminal);

    execute!(io::stdout(), EnterAlternateScreen, Hide)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let width = terminal.size()?.width.saturating_sub(2) as usize;
    let mut app = ViewerApp {
        item,
        scroll: 0,
        content_lines: detail_lines(item, width),
    };

    let action = run_app(&mut terminal, &mut app).context("Detail viewer failed")?;

    if action == ViewerAction::OpenBrowser {
        open_in_browser(&item.link);
    }

    Ok(action)
}

/// Runs `restore` when dropped, including on early `?` returns.
struct RestoreOnDrop<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> RestoreOnDrop<F> {
    fn new(restore: F) -> Self {
        Self { restore }
    }
}

impl<F: FnMut()> Drop for RestoreOnDrop<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn restore_terminal() {
    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "failed to leave raw mode");
    }
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
        tracing::warn!(error = %e, "failed to leave alternate screen");
    }
}

struct ViewerApp<'a> {
    item: &'a PhotoItem,
    scroll: u16,
    content_lines: Vec<String>,
}

/// Header and footer rows plus the content block's bottom border.
const CHROME_HEIGHT: u16 = 4 + 3 + 1;

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut ViewerApp,
) -> io::Result<ViewerAction> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(ViewerAction::Back),
            KeyCode::Char('o') => return Ok(ViewerAction::OpenBrowser),
            code => {
                let page = terminal.size()?.height.saturating_sub(CHROME_HEIGHT);
                let last = (app.content_lines.len() as u16).saturating_sub(page);
                app.scroll = scrolled(code, app.scroll, page, last);
            }
        }
    }
}

/// New top line after `code`, clamped to `0..=last`.
fn scrolled(code: KeyCode, scroll: u16, page: u16, last: u16) -> u16 {
    let next = match code {
        KeyCode::Char('j') | KeyCode::Down => scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => scroll.saturating_sub(1),
        KeyCode::PageDown | KeyCode::Char(' ') => scroll.saturating_add(page),
        KeyCode::PageUp => scroll.saturating_sub(page),
        KeyCode::Char('g') | KeyCode::Home => 0,
        KeyCode::Char('G') | KeyCode::End => last,
        _ => scroll,
    };
    next.min(last)
}

fn panel(borders: Borders, color: Color) -> Block<'static> {
    Block::default()
        .borders(borders)
        .border_style(Style::default().fg(color))
}

fn key_hint(key: &str, label: &str) -> [Span<'static>; 2] {
    [
        Span::styled(
            format!(" {} ", key),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        Span::raw(format!(" {}  ", label)),
    ]
}

fn draw(f: &mut Frame, app: &ViewerApp) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(10), Constraint::Length(3)])
        .split(f.size());
    let (header_area, body_area, footer_area) = (areas[0], areas[1], areas[2]);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            app.item.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw("By "),
            Span::styled(app.item.author_name().to_string(), Style::default().fg(Color::Yellow)),
        ]),
    ])
    .block(
        panel(Borders::ALL, Color::Blue)
            .title(" Image Detail ")
            .title_alignment(Alignment::Center),
    );
    f.render_widget(header, header_area);

    let total = app.content_lines.len();
    let position = if total > body_area.height.saturating_sub(1) as usize {
        format!(" [{}/{}] ", app.scroll as usize + 1, total)
    } else {
        String::new()
    };
    // lines are pre-wrapped by detail_lines
    let body = Paragraph::new(app.content_lines.join("\n"))
        .scroll((app.scroll, 0))
        .block(
            panel(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM, Color::Gray)
                .title(position)
                .title_alignment(Alignment::Right),
        );
    f.render_widget(body, body_area);

    let hints: Vec<Span> = [("q", "Back"), ("o", "Open in Browser"), ("j/k", "Scroll")]
        .into_iter()
        .flat_map(|(key, label)| key_hint(key, label))
        .collect();
    let footer = Paragraph::new(Line::from(hints))
        .block(panel(Borders::ALL, Color::Blue))
        .alignment(Alignment::Center);
    f.render_widget(footer, footer_area);
}

fn open_in_browser(url: &str) {
    let open_cmd = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "linux") {
        "xdg-open"
    } else {
        tracing::warn!(url, "no browser launcher for this platform");
        return;
    };

    if let Err(e) = std::process::Command::new(open_cmd).arg(url).spawn() {
        tracing::warn!(url, error = %e, "failed to open browser");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Media;
    use std::cell::Cell;
    use uuid::Uuid;

    fn hellcat() -> PhotoItem {
        PhotoItem {
            id: Uuid::new_v4(),
            title: "Grumman Hellcat II KE209".to_string(),
            link: "https://www.flickr.com/photos/100201028@N08/53845575152/".to_string(),
            media: Media {
                m: "https://live.staticflickr.com/65535/53845575152_b6f8b79aec_m.jpg".to_string(),
            },
            taken: "2023-08-10T12:21:28-08:00".to_string(),
            description: "<p><b>gbadger1</b> posted a photo</p>".to_string(),
            published: "2024-07-09T21:44:08Z".to_string(),
            author: "nobody@flickr.com (\"gbadger1\")".to_string(),
            author_id: "100201028@N08".to_string(),
            tags: "grumman hellcat".to_string(),
        }
    }

    #[test]
    fn test_detail_lines_fields() {
        let lines = detail_lines(&hellcat(), 100);

        assert_eq!(lines[0], "Author: gbadger1");
        assert_eq!(lines[1], "Published: 9 Jul 2024");
        assert_eq!(lines[2], "Taken: 10 Aug 2023");
        assert_eq!(lines[3], "Tags: grumman, hellcat");
        assert!(lines.iter().any(|l| l.starts_with("Link: https://www.flickr.com/photos/")));
        assert!(lines.iter().any(|l| l.contains("posted a photo")));
        assert!(!lines.iter().any(|l| l.contains("<p>")));
    }

    #[test]
    fn test_scrolling_stays_in_range() {
        assert_eq!(scrolled(KeyCode::Char('j'), 0, 10, 25), 1);
        assert_eq!(scrolled(KeyCode::Down, 25, 10, 25), 25);
        assert_eq!(scrolled(KeyCode::Char('k'), 0, 10, 25), 0);
        assert_eq!(scrolled(KeyCode::PageDown, 20, 10, 25), 25);
        assert_eq!(scrolled(KeyCode::PageUp, 4, 10, 25), 0);
        assert_eq!(scrolled(KeyCode::Char('G'), 3, 10, 25), 25);
        assert_eq!(scrolled(KeyCode::Home, 17, 10, 25), 0);
        assert_eq!(scrolled(KeyCode::Char('x'), 7, 10, 25), 7);
        // content shorter than the screen never scrolls
        assert_eq!(scrolled(KeyCode::Char('G'), 0, 10, 0), 0);
    }

    fn setup(restored: &Cell<u32>, fail: bool) -> io::Result<()> {
        let _restore = RestoreOnDrop::new(|| restored.set(restored.get() + 1));
        if fail {
            return Err(io::Error::new(io::ErrorKind::Other, "no terminal"));
        }
        Ok(())
    }

    #[test]
    fn test_restore_runs_on_every_exit() {
        let restored = Cell::new(0);
        assert!(setup(&restored, true).is_err());
        assert_eq!(restored.get(), 1);

        assert!(setup(&restored, false).is_ok());
        assert_eq!(restored.get(), 2);
    }

    #[test]
    fn test_detail_lines_wrap_and_skip_empty() {
        let mut item = hellcat();
        item.tags = String::new();
        item.description = String::new();
        item.link = format!("https://example.com/{}", "a".repeat(60));

        let lines = detail_lines(&item, 30);

        assert!(!lines.iter().any(|l| l.starts_with("Tags:")));
        assert!(lines.iter().all(|l| l.chars().count() <= 30));
        assert_eq!(lines.last().map(String::as_str), Some("No description available"));
    }
}
