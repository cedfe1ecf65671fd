/// Pointer and keyboard state sampled once per frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputFrame {
    /// Cursor position in canvas coordinates, when the presenter knows it.
    pub pointer: Option<(i32, i32)>,
    pub primary_down: bool,
    pub primary_pressed: bool,
    pub primary_released: bool,
    pub escape: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub from: (i32, i32),
    pub to: (i32, i32),
}

/// Remembers where the pointer was on the previous tick so drags become
/// connected segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerTracker {
    last: Option<(i32, i32)>,
}

impl PointerTracker {
    /// Record `point` and return the segment travelled since the previous
    /// sample. The first sample yields a zero-length segment.
    pub fn advance(&mut self, point: (i32, i32)) -> Segment {
        let from = self.last.replace(point).unwrap_or(point);
        Segment { from, to: point }
    }

    pub fn last(&self) -> Option<(i32, i32)> {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}
