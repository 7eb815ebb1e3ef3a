//! Component trait implemented by every screen.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

/// Lifecycle: `init` once, then `mount` each time the guard lets the screen
/// through, interleaved with `handle_key_event` / `update` / `render`.
pub trait Component: Send {
    /// Receives the sender used to report background results.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// The screen became visible. List screens refetch here.
    fn mount(&mut self) -> Result<()> {
        Ok(())
    }

    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Process a dispatched action. May return a follow-up action.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// `true` while the screen is collecting text, so single-letter global
    /// keys go to the screen instead.
    fn captures_input(&self) -> bool {
        false
    }

    /// Key hints for the status bar.
    fn key_hints(&self) -> &'static str {
        ""
    }
}
