//! Frames and bounding boxes

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Frame {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Frame {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Smallest frame containing both
    pub fn union(&self, other: &Frame) -> Frame {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Frame {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }

    /// Bounding box of a set of frames, `None` when empty
    pub fn bounding<'a>(frames: impl IntoIterator<Item = &'a Frame>) -> Option<Frame> {
        frames
            .into_iter()
            .fold(None, |acc: Option<Frame>, f| match acc {
                Some(b) => Some(b.union(f)),
                None => Some(*f),
            })
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Frame {
        Frame {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }

    /// Same size, moved so its top-left corner is at `(x, y)`
    pub fn moved_to(&self, x: f64, y: f64) -> Frame {
        Frame { x, y, ..*self }
    }

    /// Top-left y that vertically centers `height` inside this frame
    pub fn centered_y(&self, height: f64) -> f64 {
        self.y + (self.height - height) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union() {
        let a = Frame::new(-16.0, 0.0, 100.0, 56.0);
        let b = Frame::new(0.0, 60.0, 200.0, 40.0);
        assert_eq!(a.union(&b), Frame::new(-16.0, 0.0, 216.0, 100.0));
    }

    #[test]
    fn test_bounding_empty() {
        assert_eq!(Frame::bounding(std::iter::empty()), None);
    }

    #[test]
    fn test_centered_y() {
        let band = Frame::new(0.0, 56.0, 664.0, 56.0);
        assert_eq!(band.centered_y(40.0), 64.0);
    }
}
