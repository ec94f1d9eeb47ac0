//! Per-row cache of what the terminal currently shows.
//!
//! One slot per text row holding the `(highlight, text)` pair last painted
//! there. A slot is `None` when the content is unknown (cold start, after
//! invalidation, or a row that just entered through a scroll shift); unknown
//! rows always repaint.

/// Selection highlight of one painted row, in screen columns relative to the
/// horizontal margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    /// The whole row.
    Whole,
    /// From this column to the end of the row (selection starts here).
    From(usize),
    /// From the row start up to this column (selection ends here).
    Until(usize),
    /// Selection starts and ends inside the row.
    Between(usize, usize),
}

impl Highlight {
    /// Map a buffer column range (`to == None` means end of line) into screen
    /// columns for a view scrolled horizontally by `margin`.
    pub fn for_columns(from: usize, to: Option<usize>, margin: usize, width: usize) -> Self {
        let start = from.saturating_sub(margin).min(width);
        match to {
            None if from <= margin => Highlight::Whole,
            None => Highlight::From(start),
            Some(to) => {
                let end = to.saturating_sub(margin).min(width);
                if end <= start {
                    Highlight::None
                } else if from <= margin {
                    Highlight::Until(end)
                } else {
                    Highlight::Between(start, end)
                }
            }
        }
    }

    /// Half-open highlighted char range within a row of `len` chars.
    pub fn range(self, len: usize) -> Option<(usize, usize)> {
        let (a, b) = match self {
            Highlight::None => return None,
            Highlight::Whole => (0, len),
            Highlight::From(a) => (a, len),
            Highlight::Until(b) => (0, b),
            Highlight::Between(a, b) => (a, b),
        };
        Some((a.min(len), b.min(len)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowEntry {
    pub highlight: Highlight,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct RowCache {
    rows: Vec<Option<RowEntry>>,
    /// Buffer line shown on row 0 when the cache was filled.
    pub top: Option<usize>,
    pub width: usize,
}

impl RowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop everything; the next frame repaints every row.
    pub fn invalidate(&mut self) {
        for r in &mut self.rows {
            *r = None;
        }
        self.top = None;
    }

    /// Size the cache for a `width` x `height` text area, invalidating it when
    /// the geometry changed.
    pub fn ensure_geometry(&mut self, width: usize, height: usize) -> bool {
        if self.rows.len() == height && self.width == width {
            return false;
        }
        self.rows = vec![None; height];
        self.width = width;
        self.top = None;
        true
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&RowEntry> {
        self.rows.get(row).and_then(|r| r.as_ref())
    }

    pub fn store(&mut self, row: usize, entry: RowEntry) {
        if let Some(slot) = self.rows.get_mut(row) {
            *slot = Some(entry);
        }
    }

    /// Shift cached rows for a viewport that moved by `delta` lines (positive:
    /// content moved up). Entering rows become unknown. `|delta|` must be
    /// smaller than the row count.
    pub fn shift_for_scroll(&mut self, delta: isize) {
        let abs = delta.unsigned_abs();
        debug_assert!(abs > 0 && abs < self.rows.len(), "shift out of range");
        if delta > 0 {
            self.rows.rotate_left(abs);
            let n = self.rows.len();
            for r in &mut self.rows[n - abs..] {
                *r = None;
            }
        } else {
            self.rows.rotate_right(abs);
            for r in &mut self.rows[..abs] {
                *r = None;
            }
        }
        if let Some(top) = self.top {
            self.top = Some(top.saturating_add_signed(delta));
        }
    }
}
