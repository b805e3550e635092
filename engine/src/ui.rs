//! Minimal UI layout primitives.
//!
//! A `Rect` type plus a few helpers for the layout tasks the game needs: insets, anchored
//! placement, and splitting a strip into equal cells.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_size(w: u32, h: u32) -> Self {
        Self { x: 0, y: 0, w, h }
    }

    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x
            && px < self.x.saturating_add(self.w)
            && py >= self.y
            && py < self.y.saturating_add(self.h)
    }

    pub fn center(&self) -> (u32, u32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Returns the rectangle inset by `insets`. Oversized insets saturate to an empty rect.
    pub fn inset(&self, insets: Insets) -> Self {
        let w = self
            .w
            .saturating_sub(insets.left.saturating_add(insets.right));
        let h = self
            .h
            .saturating_sub(insets.top.saturating_add(insets.bottom));
        Self {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            w,
            h,
        }
    }

    /// Places a child of `size` inside this rect using the requested `anchor`.
    ///
    /// If `size` exceeds this rect, it is clamped to fit.
    pub fn place(&self, size: Size, anchor: Anchor) -> Self {
        let w = size.w.min(self.w);
        let h = size.h.min(self.h);

        let x = match anchor {
            Anchor::TopLeft | Anchor::CenterLeft | Anchor::BottomLeft => self.x,
            Anchor::TopCenter | Anchor::Center | Anchor::BottomCenter => {
                self.x.saturating_add(self.w.saturating_sub(w) / 2)
            }
            Anchor::TopRight | Anchor::CenterRight | Anchor::BottomRight => {
                self.x.saturating_add(self.w.saturating_sub(w))
            }
        };

        let y = match anchor {
            Anchor::TopLeft | Anchor::TopCenter | Anchor::TopRight => self.y,
            Anchor::CenterLeft | Anchor::Center | Anchor::CenterRight => {
                self.y.saturating_add(self.h.saturating_sub(h) / 2)
            }
            Anchor::BottomLeft | Anchor::BottomCenter | Anchor::BottomRight => {
                self.y.saturating_add(self.h.saturating_sub(h))
            }
        };

        Self { x, y, w, h }
    }

    /// Splits off a `w`-wide strip from the right edge, leaving `gap` pixels between the parts.
    ///
    /// Returns `(left, right)`.
    pub fn split_right(&self, w: u32, gap: u32) -> (Self, Self) {
        let w = w.min(self.w);
        let right = Self::new(self.right() - w, self.y, w, self.h);
        let left = Self::new(self.x, self.y, self.w.saturating_sub(w.saturating_add(gap)), self.h);
        (left, right)
    }

    /// The `index`th of `count` equal-width columns separated by `gap`.
    pub fn column(&self, index: u32, count: u32, gap: u32) -> Self {
        let count = count.max(1);
        let gaps = gap.saturating_mul(count - 1);
        let cell_w = self.w.saturating_sub(gaps) / count;
        Self::new(
            self.x + index.min(count - 1) * (cell_w + gap),
            self.y,
            cell_w,
            self.h,
        )
    }

    /// The `index`th of `count` equal-height rows separated by `gap`.
    pub fn row(&self, index: u32, count: u32, gap: u32) -> Self {
        let count = count.max(1);
        let gaps = gap.saturating_mul(count - 1);
        let cell_h = self.h.saturating_sub(gaps) / count;
        Self::new(
            self.x,
            self.y + index.min(count - 1) * (cell_h + gap),
            self.w,
            cell_h,
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Insets {
    pub fn all(v: u32) -> Self {
        Self {
            left: v,
            top: v,
            right: v,
            bottom: v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}
