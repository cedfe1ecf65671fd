#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerMode {
    #[default]
    Idle,
    Paint,
    Erase,
}

impl PointerMode {
    pub fn is_drawing(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Pressing a tool button flips between that tool and Idle.
    pub fn toggled(self, tool: PointerMode) -> PointerMode {
        if self == tool {
            PointerMode::Idle
        } else {
            tool
        }
    }

    /// Mouse passthrough stays on unless a drawing tool needs the pointer.
    pub fn wants_passthrough(self) -> bool {
        !self.is_drawing()
    }
}
