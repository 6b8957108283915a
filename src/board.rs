use crate::entity::Position;

/// Columns taken by the board's left and right border.
pub const SIDE_CHROME: i32 = 2;
/// Rows taken by the title, borders, spacing and stats around the board.
pub const VERTICAL_CHROME: i32 = 10;

/// Raw terminal size as reported by the display layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Playable grid, derived from the viewport and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    pub width: i32,
    pub height: i32,
}

/// Subtracts the fixed chrome from the viewport. Never negative, but may be
/// zero before the first resize or on a tiny terminal.
pub fn field_size(viewport: Viewport) -> (i32, i32) {
    let width = (viewport.width as i32 - SIDE_CHROME).max(0);
    let height = (viewport.height as i32 - VERTICAL_CHROME).max(0);
    (width, height)
}

impl Board {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn from_viewport(viewport: Viewport) -> Self {
        let (width, height) = field_size(viewport);
        Self { width, height }
    }

    pub fn contains(&self, p: Position) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }

    /// No cell can be played on.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn diagonal(&self) -> f64 {
        (self.width.max(0) as f64).hypot(self.height.max(0) as f64)
    }

    pub fn cell_count(&self) -> usize {
        if self.is_degenerate() {
            return 0;
        }
        self.width as usize * self.height as usize
    }
}
