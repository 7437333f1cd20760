//! Non-blocking terminal input for the frame loop.
//!
//! Crossterm's `event::read` blocks, so [`InputPump`] runs it on a blocking
//! thread and forwards events over a bounded channel. The UI loop drains the
//! channel once per frame via [`handle_events`], which translates keys into
//! [`App`] actions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use tasklab_engine::App;
use tasklab_types::ui::Button;

const INPUT_CHANNEL_CAPACITY: usize = 256;
const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(50);
const MAX_EVENTS_PER_FRAME: usize = 64;

#[derive(Debug)]
enum InputMsg {
    Event(Event),
    Error(String),
}

pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(&stop2, &tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Close the receiver first so the input thread unblocks if it is
        // currently backpressured on a send.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Best-effort stop if the caller exits early; do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: &Arc<AtomicBool>, tx: &mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending input and apply it to the app. Returns `true` when the user
/// asked to quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };
        processed += 1;

        if let Event::Key(key) = ev
            && apply_key(app, key)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Translate one key event into an app action. Returns `true` on quit.
fn apply_key(app: &mut App, key: KeyEvent) -> bool {
    if matches!(key.kind, KeyEventKind::Release) {
        return false;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return true;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            app.quit();
            true
        }
        KeyCode::Left | KeyCode::BackTab => {
            app.focus_prev();
            false
        }
        KeyCode::Right | KeyCode::Tab => {
            app.focus_next();
            false
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.press_focused();
            false
        }
        KeyCode::Char(c) => {
            if let Some(button) = Button::from_shortcut(c.to_ascii_lowercase()) {
                app.press(button);
            }
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklab_engine::TasklabConfig;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        App::with_seed(&TasklabConfig::default(), 7)
    }

    #[tokio::test(start_paused = true)]
    async fn quit_keys_request_quit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = test_app();
            assert!(apply_key(&mut app, key(code)));
            assert!(app.should_quit());
        }

        let mut app = test_app();
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(apply_key(&mut app, ctrl_c));
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn arrows_move_focus() {
        let mut app = test_app();
        assert_eq!(app.focused_button(), Button::StartEmitter);

        apply_key(&mut app, key(KeyCode::Right));
        assert_eq!(app.focused_button(), Button::CancelEmitter);

        apply_key(&mut app, key(KeyCode::Left));
        apply_key(&mut app, key(KeyCode::Left));
        assert_eq!(app.focused_button(), Button::Alternate);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_presses_the_focused_button() {
        let mut app = test_app();
        apply_key(&mut app, key(KeyCode::Enter));
        assert!(app.emitter_active());
    }

    #[tokio::test(start_paused = true)]
    async fn shortcuts_press_without_moving_focus() {
        let mut app = test_app();
        apply_key(&mut app, key(KeyCode::Char('s')));
        assert!(app.emitter_active());
        assert_eq!(app.focused_button(), Button::StartEmitter);

        apply_key(&mut app, key(KeyCode::Char('c')));
        assert!(!app.emitter_active());
    }

    #[tokio::test(start_paused = true)]
    async fn release_events_are_ignored() {
        let mut app = test_app();
        let mut release = key(KeyCode::Char('s'));
        release.kind = KeyEventKind::Release;
        assert!(!apply_key(&mut app, release));
        assert!(!app.emitter_active());
    }
}
