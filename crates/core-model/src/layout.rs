//! Screen geometry: text area on top, one status row at the bottom.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub cols: u16,
    pub rows: u16,
}

impl ScreenLayout {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Rows available for text (at least one).
    pub fn text_height(&self) -> usize {
        (self.rows as usize).saturating_sub(1).max(1)
    }

    pub fn text_width(&self) -> usize {
        (self.cols as usize).max(1)
    }

    /// 0-based screen row of the status line.
    pub fn status_row(&self) -> u16 {
        self.text_height() as u16
    }
}
