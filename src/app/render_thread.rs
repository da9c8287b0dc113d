//! Background render thread.
//!
//! The thread owns the terminal and draws `AppState` snapshots sent from the
//! event loop, so a slow draw never delays pipeline events or key input.

use std::io;
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};

use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::state::AppState;

pub enum RenderCommand {
    Draw(Box<AppState>),
    Shutdown,
}

pub struct RenderThread {
    cmd_tx: SyncSender<RenderCommand>,
    handle: Option<JoinHandle<()>>,
}

impl RenderThread {
    /// Spawn the render thread. Raw mode and the alternate screen are entered
    /// on that thread and restored when it exits.
    pub fn spawn() -> io::Result<Self> {
        // Capacity 1: only the newest snapshot matters
        let (cmd_tx, cmd_rx) = mpsc::sync_channel::<RenderCommand>(1);

        let handle = thread::Builder::new()
            .name("redraft-render".to_string())
            .spawn(move || {
                if let Err(e) = enable_raw_mode() {
                    tracing::error!("Failed to enable raw mode: {}", e);
                    return;
                }

                let mut stdout = io::stdout();
                if let Err(e) = execute!(stdout, EnterAlternateScreen, cursor::Hide) {
                    tracing::error!("Failed to enter alternate screen: {}", e);
                    disable_raw_mode().ok();
                    return;
                }

                let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
                    Ok(t) => t,
                    Err(e) => {
                        tracing::error!("Failed to create terminal: {}", e);
                        disable_raw_mode().ok();
                        return;
                    }
                };

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        RenderCommand::Draw(state) => {
                            if let Err(e) = terminal.draw(|f| crate::ui::render(f, &state)) {
                                tracing::error!("Render error: {}", e);
                            }
                        }
                        RenderCommand::Shutdown => break,
                    }
                }

                disable_raw_mode().ok();
                execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show).ok();
            })?;

        Ok(Self {
            cmd_tx,
            handle: Some(handle),
        })
    }

    /// Queue a snapshot without blocking. Dropped when a draw is pending.
    pub fn render(&self, state: AppState) {
        match self.cmd_tx.try_send(RenderCommand::Draw(Box::new(state))) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::trace!("Render thread busy, skipping frame");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::error!("Render thread disconnected");
            }
        }
    }

    /// Stop drawing, restore the terminal, and join the thread
    pub fn shutdown(mut self) {
        let _ = self.cmd_tx.send(RenderCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            handle.join().ok();
        }
    }
}
