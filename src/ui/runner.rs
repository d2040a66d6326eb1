//! The draw / read-key loop every screen runs in.

use crate::ui::keys::is_interrupt;
use crate::ui::terminal::EventReader;
use crate::ui::theme::Theme;
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEvent};
use ratatui::{backend::Backend, style::Style, widgets::Block, Frame, Terminal};
use std::time::Duration;

const POLL_TIMEOUT: Duration = Duration::from_millis(250);

/// Result of one key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow<T> {
    Continue,
    Exit(T),
}

/// A full-screen view. Screens never touch the terminal themselves; they
/// draw into a frame and return an outcome when the loop should stop, e.g.
/// to let the caller run a side effect and then resume the same screen.
pub trait Screen {
    type Outcome;

    /// Draw the screen. Takes `&mut self` so the screen can adapt its
    /// viewport to the frame size.
    fn render(&mut self, frame: &mut Frame, theme: &Theme);

    fn handle_key(&mut self, key: KeyEvent) -> Flow<Self::Outcome>;
}

/// How a [`run_screen`] loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ended<T> {
    Outcome(T),
    /// Ctrl-C.
    Interrupted,
}

/// Draw `screen` and feed it keys until it returns an outcome.
pub fn run_screen<B, S>(
    terminal: &mut Terminal<B>,
    screen: &mut S,
    events: &mut dyn EventReader,
    theme: &Theme,
) -> Result<Ended<S::Outcome>>
where
    B: Backend,
    S: Screen,
{
    loop {
        terminal
            .draw(|frame| {
                frame.render_widget(
                    Block::default().style(Style::default().bg(theme.bg)),
                    frame.area(),
                );
                screen.render(frame, theme);
            })
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("Failed to draw terminal UI")?;

        let Some(event) = events.read_event(POLL_TIMEOUT)? else {
            continue;
        };

        match event {
            Event::Key(key) if is_interrupt(&key) => return Ok(Ended::Interrupted),
            Event::Key(key) => {
                if let Flow::Exit(outcome) = screen.handle_key(key) {
                    return Ok(Ended::Outcome(outcome));
                }
            }
            // Resize needs nothing here: the next draw picks up the new size.
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use ratatui::text::Line;

    struct Keys(Vec<KeyCode>);

    impl EventReader for Keys {
        fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
            if self.0.is_empty() {
                anyhow::bail!("no more keys");
            }
            let code = self.0.remove(0);
            Ok(Some(Event::Key(KeyEvent::new(code, KeyModifiers::NONE))))
        }
    }

    /// One line of text in the top-left corner; exits on Enter.
    struct Label;

    impl Screen for Label {
        type Outcome = &'static str;

        fn render(&mut self, frame: &mut Frame, _theme: &Theme) {
            frame.render_widget(Line::raw("hi"), frame.area());
        }

        fn handle_key(&mut self, key: KeyEvent) -> Flow<&'static str> {
            match key.code {
                KeyCode::Enter => Flow::Exit("done"),
                _ => Flow::Continue,
            }
        }
    }

    #[test]
    fn test_frame_background_uses_theme() {
        let theme = Theme::by_name("Nord").expect("nord theme");
        let mut terminal = Terminal::new(TestBackend::new(10, 3)).expect("terminal");
        let mut keys = Keys(vec![KeyCode::Char('x'), KeyCode::Enter]);

        let ended = run_screen(&mut terminal, &mut Label, &mut keys, theme).expect("run");
        assert_eq!(ended, Ended::Outcome("done"));

        let buffer = terminal.backend().buffer();
        // Cells the screen drew and cells it left alone both carry the theme bg.
        assert_eq!(buffer[(0, 0)].symbol(), "h");
        assert_eq!(buffer[(0, 0)].bg, theme.bg);
        assert_eq!(buffer[(9, 2)].bg, theme.bg);
    }

    #[test]
    fn test_ctrl_c_interrupts() {
        struct CtrlC;
        impl EventReader for CtrlC {
            fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
                Ok(Some(Event::Key(KeyEvent::new(
                    KeyCode::Char('c'),
                    KeyModifiers::CONTROL,
                ))))
            }
        }

        let mut terminal = Terminal::new(TestBackend::new(10, 3)).expect("terminal");
        let ended = run_screen(&mut terminal, &mut Label, &mut CtrlC, Theme::default_theme())
            .expect("run");
        assert_eq!(ended, Ended::Interrupted);
    }
}
