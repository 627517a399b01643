use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use arcade_engine::scene::SceneFrame;

/// Logical pixel size of the mounting surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }
}

/// A single 2D draw command. The page-side renderer replays these onto a
/// canvas in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DrawOp {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [f32; 4],
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: [f32; 4],
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        color: [f32; 4],
        content: String,
    },
}

/// One canvas redraw: background fill plus an ordered draw list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasFrame {
    pub width: f32,
    pub height: f32,
    pub background: [f32; 4],
    pub ops: Vec<DrawOp>,
}

impl CanvasFrame {
    pub fn new(width: f32, height: f32, background: [f32; 4]) -> Self {
        Self {
            width,
            height,
            background,
            ops: Vec::new(),
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }
}

/// What a game presents to its surface each frame, plus the host's clear
/// signal emitted after a module's cleanup has run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FramePacket {
    /// Remove every node the previous module left behind.
    Clear,
    Canvas(CanvasFrame),
    Scene(SceneFrame),
}

impl FramePacket {
    /// Compact encoding for the host/page bridge.
    pub fn encode(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec(self)
    }

    pub fn decode(data: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(data)
    }
}

/// The exclusive mounting region handed to the active module: a frame sink
/// plus a size watch. The module owns everything it presents here until its
/// cleanup handle runs.
#[derive(Debug, Clone)]
pub struct Surface {
    frames: mpsc::UnboundedSender<FramePacket>,
    size: watch::Receiver<SurfaceSize>,
}

impl Surface {
    pub fn new(
        frames: mpsc::UnboundedSender<FramePacket>,
        size: watch::Receiver<SurfaceSize>,
    ) -> Self {
        Self { frames, size }
    }

    /// Present a frame. Send failures mean the host page went away; the
    /// module keeps running until its cleanup handle fires, so this is not
    /// an error path.
    pub fn present(&self, packet: FramePacket) {
        let _ = self.frames.send(packet);
    }

    /// Current surface size.
    pub fn size(&self) -> SurfaceSize {
        *self.size.borrow()
    }

    /// Wait for the next resize. Returns the new size, or `None` when the
    /// host dropped its side.
    pub async fn resized(&mut self) -> Option<SurfaceSize> {
        self.size.changed().await.ok()?;
        Some(*self.size.borrow())
    }
}
