/// Distance from the bottom edge that still counts as "at the bottom".
const BOTTOM_EPSILON: f64 = 1.0;

/// Scroll state of the transcript viewport, in rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    scroll_top: f64,
    scroll_height: f64,
    client_height: f64,
    /// Whether the view sat at the bottom before the latest append.
    pinned: bool,
}

impl Viewport {
    pub fn new(client_height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            scroll_height: 0.0,
            client_height: client_height.max(0.0),
            pinned: true,
        }
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn scroll_height(&self) -> f64 {
        self.scroll_height
    }

    pub fn client_height(&self) -> f64 {
        self.client_height
    }

    fn max_scroll_top(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_height - self.client_height <= self.scroll_top + BOTTOM_EPSILON
    }

    /// Manual scroll by the user; clamped to the content.
    pub fn scroll_to(&mut self, top: f64) {
        self.scroll_top = top.clamp(0.0, self.max_scroll_top());
        self.pinned = self.is_at_bottom();
    }

    pub fn resize(&mut self, client_height: f64) {
        self.client_height = client_height.max(0.0);
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
        self.pinned = self.is_at_bottom();
    }

    /// Records an append of `rows`, capturing the bottom state beforehand.
    pub fn content_grew(&mut self, rows: f64) {
        self.pinned = self.is_at_bottom();
        self.scroll_height += rows.max(0.0);
    }

    /// Records a removal of `rows`; the scroll position is only clamped.
    pub fn content_shrank(&mut self, rows: f64) {
        self.scroll_height = (self.scroll_height - rows.max(0.0)).max(0.0);
        self.scroll_top = self.scroll_top.min(self.max_scroll_top());
    }

    /// Follows the tail if the view was at the bottom before the last append.
    pub fn auto_scroll(&mut self) {
        if self.pinned {
            self.scroll_top = self.max_scroll_top();
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(24.0)
    }
}
