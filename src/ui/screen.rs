//! Full-screen view of the status and results regions.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};

use crate::render::{Display, IN_PROGRESS_TEXT};

const FOREGROUND: Color = Color::Rgb(206, 224, 220);
const BACKGROUND: Color = Color::Rgb(0, 0, 0);
const ACCENT: Color = Color::Rgb(185, 207, 212);

/// Terminal screen showing the current [`Display`].
pub struct TriggerScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    server: String,
}

impl TriggerScreen {
    /// Creates the screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    /// - If alternate screen cannot be entered
    pub fn new(server: &str) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(TriggerScreen {
            terminal,
            server: server.to_string(),
        })
    }

    /// Draws one frame.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn draw(&mut self, display: &Display) -> anyhow::Result<()> {
        let server = self.server.as_str();
        self.terminal.draw(|frame| draw_display(frame, display, server))?;
        Ok(())
    }

    /// Shows an error on a full red screen until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering or input polling fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();
                let style = Style::default().fg(Color::Rgb(255, 255, 255)).bg(Color::Rgb(255, 0, 0));
                frame.render_widget(Block::default().style(style), area);

                let padding_x = area.width / 10;
                let centered_area = Rect {
                    x: area.x + padding_x,
                    y: area.y + area.height / 2,
                    width: (area.width * 80) / 100,
                    height: area.height / 2,
                };
                let paragraph = Paragraph::new(error_message)
                    .style(style)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, centered_area);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    /// - If cursor cannot be shown
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TriggerScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Lays out status, results, matches and the key help footer.
pub fn draw_display(frame: &mut Frame, display: &Display, server: &str) {
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(BACKGROUND)), area);

    let [status_area, results_area, matches_area, footer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let status_style = if display.status.starts_with("Error: ") {
        Style::default().fg(Color::Red)
    } else if display.status == IN_PROGRESS_TEXT {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(FOREGROUND)
    };

    let status = Paragraph::new(display.status.as_str())
        .style(status_style)
        .block(Block::default().borders(Borders::ALL).title(" status "));
    frame.render_widget(status, status_area);

    let results = Paragraph::new(display.results.as_str())
        .style(Style::default().fg(FOREGROUND))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" intervals "));
    frame.render_widget(results, results_area);

    if !display.matches.is_empty() {
        let lines: Vec<Line> = display.matches.iter().map(|m| Line::raw(m.as_str())).collect();
        let matches = Paragraph::new(lines)
            .style(Style::default().fg(FOREGROUND))
            .block(Block::default().borders(Borders::ALL).title(" matching songs "));
        frame.render_widget(matches, matches_area);
    }

    let footer = Paragraph::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Red)),
        Span::raw("Enter record / q quit / "),
        Span::raw(server),
    ]))
    .style(Style::default().fg(ACCENT).bg(BACKGROUND));
    frame.render_widget(footer, footer_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn rendered(display: &Display) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 14)).unwrap();
        terminal
            .draw(|frame| draw_display(frame, display, "http://127.0.0.1:5000/process-audio"))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_draws_status_and_results() {
        let text = rendered(&Display {
            status: "Processing completed!".to_string(),
            results: "Tone intervals: 1, 2, 3".to_string(),
            matches: vec!["Ode to Joy".to_string()],
        });
        assert!(text.contains("Processing completed!"));
        assert!(text.contains("Tone intervals: 1, 2, 3"));
        assert!(text.contains("Ode to Joy"));
        assert!(text.contains("Enter record"));
    }

    #[test]
    fn test_empty_matches_leave_no_panel() {
        let text = rendered(&Display {
            status: "No valid notes found.".to_string(),
            ..Display::default()
        });
        assert!(text.contains("No valid notes found."));
        assert!(!text.contains("matching songs"));
    }
}
