use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Physical keys the arcade maps. Every game must also accept pointer
/// input for the same logical actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCode {
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    KeyA,
    KeyD,
    KeyW,
    KeyS,
}

/// A multiplexed page input event. Pointer coordinates are normalized to
/// the surface (0..1 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    Key { code: KeyCode, pressed: bool },
    PointerMove { x: f32, y: f32 },
    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },
}

/// Host-side fan-out point for page input. The orchestrator keeps one hub
/// for the page life and hands each mounted module a fresh subscription.
#[derive(Debug, Clone)]
pub struct InputHub {
    tx: broadcast::Sender<InputEvent>,
}

impl InputHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Feed a page event to whichever module is currently subscribed.
    /// Lost events (no active module) are fine.
    pub fn dispatch(&self, event: InputEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> InputStream {
        InputStream {
            rx: self.tx.subscribe(),
        }
    }
}

/// A module's view of the input feed.
pub struct InputStream {
    rx: broadcast::Receiver<InputEvent>,
}

impl InputStream {
    /// Next input event. Skips over lag gaps (a stalled module prefers
    /// fresh input over a replay of stale events); returns `None` once the
    /// hub is gone.
    pub async fn next(&mut self) -> Option<InputEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "input stream lagged, dropping stale events");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking drain used inside tick loops.
    pub fn try_next(&mut self) -> Option<InputEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
