//! Input plumbing: normalized events, click targets, and pixel-to-cell mapping.

use ratzilla::ratatui::layout::Rect;

/// Keyboard and pointer input after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(char),
    /// Tap on a registered target, carrying its action ID.
    Click(u16),
}

#[derive(Debug, Clone)]
pub struct ClickTarget {
    /// Hit region in terminal cells.
    pub rect: Rect,
    pub action_id: u16,
}

/// Click targets registered during the last draw, shared with the mouse handler.
pub struct ClickState {
    pub targets: Vec<ClickTarget>,
    pub terminal_cols: u16,
    pub terminal_rows: u16,
}

impl ClickState {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            terminal_cols: 0,
            terminal_rows: 0,
        }
    }

    /// Record the frame size and drop last frame's targets.
    pub fn begin_frame(&mut self, area: Rect) {
        self.terminal_cols = area.width;
        self.terminal_rows = area.height;
        self.targets.clear();
    }

    pub fn add_click_target(&mut self, rect: Rect, action_id: u16) {
        self.targets.push(ClickTarget { rect, action_id });
    }

    /// Full-width target on `row` of `area`. Rows outside the area are ignored.
    pub fn add_row_target(&mut self, area: Rect, row: u16, action_id: u16) {
        if row >= area.y && row < area.y + area.height {
            self.add_click_target(Rect::new(area.x, row, area.width, 1), action_id);
        }
    }

    /// Action ID under a cell. Later targets sit on top of earlier ones.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<u16> {
        self.targets.iter().rev().find_map(|t| {
            let r = &t.rect;
            if col >= r.x && col < r.x + r.width && row >= r.y && row < r.y + r.height {
                Some(t.action_id)
            } else {
                None
            }
        })
    }
}

impl Default for ClickState {
    fn default() -> Self {
        Self::new()
    }
}

/// Phones get the stacked layout.
pub fn is_narrow_layout(width: u16) -> bool {
    width < 60
}

/// Map a pixel offset inside the grid container to a cell index along one axis.
///
/// Returns `None` when the offset is outside the grid or the grid is empty.
fn pixel_to_cell(offset: f64, extent: f64, cells: u16) -> Option<u16> {
    if extent <= 0.0 || cells == 0 || offset < 0.0 {
        return None;
    }
    let cell = (offset / (extent / cells as f64)) as u16;
    if cell >= cells {
        None
    } else {
        Some(cell)
    }
}

pub fn pixel_y_to_row(click_y: f64, grid_height: f64, terminal_rows: u16) -> Option<u16> {
    pixel_to_cell(click_y, grid_height, terminal_rows)
}

pub fn pixel_x_to_col(click_x: f64, grid_width: f64, terminal_cols: u16) -> Option<u16> {
    pixel_to_cell(click_x, grid_width, terminal_cols)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── hit_test ───────────────────────────────────────────────────

    #[test]
    fn hit_test_rows() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 4, 60, 1), 100);
        cs.add_click_target(Rect::new(0, 5, 60, 1), 200);

        assert_eq!(cs.hit_test(3, 4), Some(100));
        assert_eq!(cs.hit_test(59, 5), Some(200));
        assert_eq!(cs.hit_test(60, 5), None);
        assert_eq!(cs.hit_test(3, 6), None);
    }

    #[test]
    fn hit_test_overlap_last_wins() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 80, 20), 1);
        cs.add_click_target(Rect::new(10, 5, 10, 2), 2);

        assert_eq!(cs.hit_test(12, 6), Some(2));
        assert_eq!(cs.hit_test(2, 6), Some(1));
    }

    #[test]
    fn hit_test_empty() {
        assert_eq!(ClickState::new().hit_test(0, 0), None);
    }

    #[test]
    fn row_target_spans_area_width() {
        let area = Rect::new(4, 10, 30, 5);
        let mut cs = ClickState::new();
        cs.add_row_target(area, 12, 7);

        assert_eq!(cs.hit_test(4, 12), Some(7));
        assert_eq!(cs.hit_test(33, 12), Some(7));
        assert_eq!(cs.hit_test(3, 12), None);
        assert_eq!(cs.hit_test(34, 12), None);
    }

    #[test]
    fn row_target_outside_area_ignored() {
        let area = Rect::new(0, 10, 30, 5);
        let mut cs = ClickState::new();
        cs.add_row_target(area, 9, 1);
        cs.add_row_target(area, 15, 2);
        assert!(cs.targets.is_empty());
    }

    #[test]
    fn begin_frame_resets_targets_and_size() {
        let mut cs = ClickState::new();
        cs.add_click_target(Rect::new(0, 0, 10, 1), 1);
        cs.begin_frame(Rect::new(0, 0, 42, 30));

        assert!(cs.targets.is_empty());
        assert_eq!(cs.terminal_cols, 42);
        assert_eq!(cs.terminal_rows, 30);
    }

    #[test]
    fn narrow_layout_threshold() {
        assert!(is_narrow_layout(40));
        assert!(is_narrow_layout(59));
        assert!(!is_narrow_layout(60));
        assert!(!is_narrow_layout(120));
    }

    // ── pixel conversion ───────────────────────────────────────────

    #[test]
    fn pixel_to_row_cells() {
        assert_eq!(pixel_y_to_row(0.0, 600.0, 40), Some(0));
        assert_eq!(pixel_y_to_row(14.9, 600.0, 40), Some(0));
        assert_eq!(pixel_y_to_row(15.0, 600.0, 40), Some(1));
        assert_eq!(pixel_y_to_row(599.0, 600.0, 40), Some(39));
    }

    #[test]
    fn pixel_to_row_rejects_outside_or_empty() {
        assert_eq!(pixel_y_to_row(600.0, 600.0, 40), None);
        assert_eq!(pixel_y_to_row(-0.5, 600.0, 40), None);
        assert_eq!(pixel_y_to_row(10.0, 0.0, 40), None);
        assert_eq!(pixel_y_to_row(10.0, 600.0, 0), None);
    }

    #[test]
    fn pixel_to_col_cells() {
        assert_eq!(pixel_x_to_col(0.0, 370.0, 37), Some(0));
        assert_eq!(pixel_x_to_col(10.0, 370.0, 37), Some(1));
        assert_eq!(pixel_x_to_col(369.0, 370.0, 37), Some(36));
        assert_eq!(pixel_x_to_col(370.0, 370.0, 37), None);
    }

    #[test]
    fn tap_on_floor_row_reaches_its_target() {
        // Phone-sized grid with one row per floor under a bordered header.
        let mut cs = ClickState::new();
        cs.begin_frame(Rect::new(0, 0, 37, 50));
        let shaft = Rect::new(0, 3, 37, 6);
        for floor in 0..4u16 {
            cs.add_row_target(shaft, 4 + floor, 400 + floor);
        }

        let grid_height = 50.0 * 15.0;
        for floor in 0..4u16 {
            let row = 4 + floor;
            let click_y = row as f64 * 15.0 + 7.5;
            let hit = pixel_y_to_row(click_y, grid_height, cs.terminal_rows)
                .and_then(|r| cs.hit_test(20, r));
            assert_eq!(hit, Some(400 + floor));
        }
    }
}
