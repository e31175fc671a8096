//! Component trait for the dashboard panes.
//!
//! Components own only local UI state (cursors, edit buffers, cached
//! geometry); shared session state lives on [`App`]. Event handlers report
//! side effects back as [`Effect`]s instead of performing them, and
//! rendering is side-effect free apart from drawing.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::app::{App, Effect};

pub(crate) trait Component {
    /// Handle a key event while this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle a mouse event that landed inside this component's last
    /// rendered area.
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Draw the component into `rect`.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);
}
