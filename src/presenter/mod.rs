//! Window side of the overlay.
//!
//! The window pulls one composited frame per tick and feeds pointer and
//! keyboard state to the [`Overlay`](crate::overlay::Overlay). Everything
//! else talks to it through [`PresenterLink`], a queue of window commands
//! drained at the start of each frame.

pub mod window;

pub use window::{run, OverlayApp};

use std::sync::mpsc::{self, Receiver, Sender};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCommand {
    SetTitle(String),
    SetPosition { x: i32, y: i32 },
    SetMousePassthrough(bool),
}

/// Cloneable sending half handed to scripts and other threads.
#[derive(Debug, Clone)]
pub struct PresenterLink {
    tx: Sender<WindowCommand>,
}

impl PresenterLink {
    pub fn channel() -> (Self, Receiver<WindowCommand>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Queue `command` for the next frame. Dropped silently once the window
    /// has gone away.
    pub fn send(&self, command: WindowCommand) {
        if let Err(err) = self.tx.send(command) {
            tracing::debug!("window command dropped: {:?}", err.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_arrive_in_order() {
        let (link, rx) = PresenterLink::channel();
        link.send(WindowCommand::SetTitle("hi".into()));
        link.clone().send(WindowCommand::SetPosition { x: 3, y: 4 });
        assert_eq!(rx.try_recv(), Ok(WindowCommand::SetTitle("hi".into())));
        assert_eq!(rx.try_recv(), Ok(WindowCommand::SetPosition { x: 3, y: 4 }));
    }

    #[test]
    fn send_after_window_closed_is_harmless() {
        let (link, rx) = PresenterLink::channel();
        drop(rx);
        link.send(WindowCommand::SetMousePassthrough(true));
    }
}
