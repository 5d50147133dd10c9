//! Fixed slot arrangement for each frame orientation.
//!
//! The frame always exposes four slot rectangles; how many are visible and
//! how tall the frame is depends on the number of captured photos:
//!
//! | photos | layout                                         | min height |
//! |--------|------------------------------------------------|------------|
//! | 0      | no visible slots                               | 200        |
//! | 1      | single-photo compact (slot 0 spans the width), | 300        |
//! |        | except for the square grid                     |            |
//! | 2..=4  | full grid                                      | 600        |

use crate::config::{FrameConfig, Orientation};
use crate::util::{Rect, Size};

/// Number of photo slots in every orientation.
pub const SLOT_COUNT: usize = 4;

const EMPTY_MIN_HEIGHT: f64 = 200.0;
const SINGLE_MIN_HEIGHT: f64 = 300.0;
const FULL_MIN_HEIGHT: f64 = 600.0;

/// Slot height over slot width.
const SLOT_ASPECT: f64 = 3.0 / 4.0;

/// Preview-space dimensions the slot grid is laid out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMetrics {
    pub horizontal_width: f64,
    pub vertical_width: f64,
    pub square_width: f64,
    pub padding: f64,
    pub gap: f64,
    pub footer: f64,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self::from(&FrameConfig::default())
    }
}

impl From<&FrameConfig> for FrameMetrics {
    fn from(config: &FrameConfig) -> Self {
        Self {
            horizontal_width: config.horizontal_width,
            vertical_width: config.vertical_width,
            square_width: config.square_width,
            padding: config.padding,
            gap: config.gap,
            footer: config.footer,
        }
    }
}

impl FrameMetrics {
    pub fn width_for(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Horizontal => self.horizontal_width,
            Orientation::Vertical => self.vertical_width,
            Orientation::Square => self.square_width,
        }
    }
}

/// Columns and rows of the slot grid.
fn grid(orientation: Orientation) -> (usize, usize) {
    match orientation {
        Orientation::Horizontal => (4, 1),
        Orientation::Vertical => (1, 4),
        Orientation::Square => (2, 2),
    }
}

/// Resolved frame size and slot rectangles for one photo count.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameGeometry {
    pub orientation: Orientation,
    pub size: Size,
    pub slots: [Rect; SLOT_COUNT],
    /// Number of visible slots (`min(photo_count, 4)`)
    pub visible: usize,
    /// Whether the single-photo compact layout is active
    pub single_photo: bool,
}

impl FrameGeometry {
    pub fn compute(orientation: Orientation, photo_count: usize, metrics: &FrameMetrics) -> Self {
        let width = metrics.width_for(orientation);
        let (cols, rows) = grid(orientation);
        let pad = metrics.padding;
        let gap = metrics.gap;
        let inner = (width - 2.0 * pad).max(0.0);

        let slot_w = ((inner - (cols - 1) as f64 * gap) / cols as f64).max(0.0);
        let slot_h = slot_w * SLOT_ASPECT;

        let mut slots = [Rect::default(); SLOT_COUNT];
        for (i, slot) in slots.iter_mut().enumerate() {
            let col = (i % cols) as f64;
            let row = (i / cols) as f64;
            *slot = Rect::new(
                pad + col * (slot_w + gap),
                pad + row * (slot_h + gap),
                slot_w,
                slot_h,
            );
        }

        let single_photo = photo_count == 1 && orientation != Orientation::Square;
        let content_height = if single_photo {
            let h = inner * SLOT_ASPECT;
            slots[0] = Rect::new(pad, pad, inner, h);
            2.0 * pad + h + metrics.footer
        } else {
            2.0 * pad + rows as f64 * slot_h + (rows - 1) as f64 * gap + metrics.footer
        };

        let height = match photo_count {
            0 => EMPTY_MIN_HEIGHT,
            1 => SINGLE_MIN_HEIGHT.max(content_height),
            _ => FULL_MIN_HEIGHT.max(content_height),
        };

        Self {
            orientation,
            size: Size::new(width, height),
            slots,
            visible: photo_count.min(SLOT_COUNT),
            single_photo,
        }
    }

    /// Frame bounds in preview space (origin at 0,0).
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.size.width, self.size.height)
    }

    /// Visible slots in index order.
    pub fn visible_slots(&self) -> impl Iterator<Item = (usize, Rect)> + '_ {
        self.slots.iter().copied().enumerate().take(self.visible)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        index < self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> FrameMetrics {
        FrameMetrics::default()
    }

    #[test]
    fn empty_frame_is_minimal_height() {
        for orientation in [
            Orientation::Horizontal,
            Orientation::Vertical,
            Orientation::Square,
        ] {
            let geometry = FrameGeometry::compute(orientation, 0, &metrics());
            assert_eq!(geometry.size.height, EMPTY_MIN_HEIGHT);
            assert_eq!(geometry.visible_slots().count(), 0);
        }
    }

    #[test]
    fn single_photo_spans_inner_width_unless_square() {
        let m = metrics();
        let geometry = FrameGeometry::compute(Orientation::Horizontal, 1, &m);
        assert!(geometry.single_photo);
        assert_eq!(geometry.slots[0].width, m.horizontal_width - 2.0 * m.padding);
        assert!(geometry.size.height >= SINGLE_MIN_HEIGHT);

        let square = FrameGeometry::compute(Orientation::Square, 1, &m);
        assert!(!square.single_photo);
        let full = FrameGeometry::compute(Orientation::Square, 4, &m);
        assert_eq!(square.slots[0], full.slots[0]);
    }

    #[test]
    fn full_layouts_stay_inside_frame() {
        for orientation in [
            Orientation::Horizontal,
            Orientation::Vertical,
            Orientation::Square,
        ] {
            let geometry = FrameGeometry::compute(orientation, 4, &metrics());
            assert!(geometry.size.height >= FULL_MIN_HEIGHT);
            for (_, slot) in geometry.visible_slots() {
                assert!(slot.x >= 0.0 && slot.y >= 0.0);
                assert!(slot.x + slot.width <= geometry.size.width + 1e-9);
                assert!(slot.y + slot.height <= geometry.size.height + 1e-9);
            }
        }
    }

    #[test]
    fn slot_arrangement_follows_orientation() {
        let m = metrics();
        let horizontal = FrameGeometry::compute(Orientation::Horizontal, 4, &m);
        assert!(horizontal.slots.iter().all(|s| s.y == m.padding));

        let vertical = FrameGeometry::compute(Orientation::Vertical, 4, &m);
        assert!(vertical.slots.iter().all(|s| s.x == m.padding));
        assert!(vertical.slots[3].y > vertical.slots[2].y);

        let square = FrameGeometry::compute(Orientation::Square, 4, &m);
        assert_eq!(square.slots[0].y, square.slots[1].y);
        assert_eq!(square.slots[0].x, square.slots[2].x);
    }

    #[test]
    fn visibility_tracks_photo_count() {
        for count in 0..=SLOT_COUNT {
            let geometry = FrameGeometry::compute(Orientation::Vertical, count, &metrics());
            let visible: Vec<usize> = geometry.visible_slots().map(|(i, _)| i).collect();
            assert_eq!(visible, (0..count).collect::<Vec<_>>());
            for index in 0..SLOT_COUNT {
                assert_eq!(geometry.is_visible(index), index < count);
            }
        }
    }
}
