use crate::canvas::{Canvas, CanvasError, PixelBuffer, Rect};
use crate::color::Color;
use std::ops::RangeInclusive;

/// Intersection of `lo..=hi` with `min..=max`.
fn clip(lo: i64, hi: i64, min: i64, max: i64) -> Option<RangeInclusive<i64>> {
    let (lo, hi) = (lo.max(min), hi.min(max));
    (lo <= hi).then_some(lo..=hi)
}

impl Canvas {
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        self.target().set_pixel(x, y, color);
    }

    /// Integer line from `(x1, y1)` to `(x2, y2)`, both ends inclusive.
    ///
    /// Axis-aligned spans are walked directly. Diagonal spans step along the
    /// major axis and derive the minor coordinate with truncating integer
    /// interpolation, so the same inputs always produce the same pixels.
    /// A stroke of thickness `t` covers offsets `-(t-1)/2 ..= t/2` across the
    /// major axis. Only the part inside the canvas is walked.
    pub fn draw_line(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        thickness: i32,
        color: Color,
    ) {
        let (max_x, max_y) = (self.width() as i64 - 1, self.height() as i64 - 1);
        let target = self.target();
        let mut plot = |x: i64, y: i64| target.set_pixel(x as i32, y as i32, color);

        let (x1, y1, x2, y2) = (x1 as i64, y1 as i64, x2 as i64, y2 as i64);
        let t = thickness.max(1) as i64;
        let (off_lo, off_hi) = (-(t - 1) / 2, t / 2);
        let (dx, dy) = (x2 - x1, y2 - y1);

        if dx == 0 {
            let Some(xs) = clip(x1 + off_lo, x1 + off_hi, 0, max_x) else {
                return;
            };
            let Some(ys) = clip(y1.min(y2), y1.max(y2), 0, max_y) else {
                return;
            };
            for y in ys {
                for x in xs.clone() {
                    plot(x, y);
                }
            }
        } else if dy == 0 {
            let Some(ys) = clip(y1 + off_lo, y1 + off_hi, 0, max_y) else {
                return;
            };
            let Some(xs) = clip(x1.min(x2), x1.max(x2), 0, max_x) else {
                return;
            };
            for x in xs {
                for y in ys.clone() {
                    plot(x, y);
                }
            }
        } else if dx.abs() > dy.abs() {
            let ((xa, ya), (xb, yb)) = if x1 > x2 {
                ((x2, y2), (x1, y1))
            } else {
                ((x1, y1), (x2, y2))
            };
            let Some(xs) = clip(xa, xb, 0, max_x) else {
                return;
            };
            for x in xs {
                let y = interpolate(ya, yb, x - xa, xb - xa);
                if let Some(ys) = clip(y + off_lo, y + off_hi, 0, max_y) {
                    for y in ys {
                        plot(x, y);
                    }
                }
            }
        } else {
            let ((xa, ya), (xb, yb)) = if y1 > y2 {
                ((x2, y2), (x1, y1))
            } else {
                ((x1, y1), (x2, y2))
            };
            let Some(ys) = clip(ya, yb, 0, max_y) else {
                return;
            };
            for y in ys {
                let x = interpolate(xa, xb, y - ya, yb - ya);
                if let Some(xs) = clip(x + off_lo, x + off_hi, 0, max_x) {
                    for x in xs {
                        plot(x, y);
                    }
                }
            }
        }
    }

    /// Fills `[x, x+w) x [y, y+h)`. Non-positive sizes draw nothing.
    pub fn draw_box(&mut self, x: i32, y: i32, w: i32, h: i32, color: Color) {
        self.target().fill_rect(Rect::new(x, y, w, h), color);
    }

    /// Filled discs cover every offset with `dx² + dy² <= r²`. Rings cover
    /// squared distances in `[inner², outer²]` where
    /// `inner = r - t/2` (clamped at 0) and `outer = r + (t-1)/2`.
    /// Offsets are only visited where they land inside the canvas.
    pub fn draw_circle(
        &mut self,
        x: i32,
        y: i32,
        r: i32,
        thickness: i32,
        filled: bool,
        color: Color,
    ) {
        if r < 0 {
            return;
        }
        let (max_x, max_y) = (self.width() as i64 - 1, self.height() as i64 - 1);
        let target = self.target();
        let (cx, cy, r) = (x as i64, y as i64, r as i64);

        let (inner, outer) = if filled {
            (0, r)
        } else {
            let t = thickness.max(1) as i64;
            ((r - t / 2).max(0), r + (t - 1) / 2)
        };
        // outer can exceed i32 range, so squares are taken in i128
        let (inner_sq, outer_sq) = ((inner as i128).pow(2), (outer as i128).pow(2));

        let Some(dys) = clip(-outer, outer, -cy, max_y - cy) else {
            return;
        };
        let Some(dxs) = clip(-outer, outer, -cx, max_x - cx) else {
            return;
        };
        for dy in dys {
            for dx in dxs.clone() {
                let dist_sq = (dx as i128).pow(2) + (dy as i128).pow(2);
                if dist_sq >= inner_sq && dist_sq <= outer_sq {
                    target.set_pixel((cx + dx) as i32, (cy + dy) as i32, color);
                }
            }
        }
    }

    /// Full-width rows every `v_spacing` and full-height columns every
    /// `h_spacing`, both starting at 0.
    pub fn draw_grid(
        &mut self,
        h_spacing: i32,
        v_spacing: i32,
        color: Color,
    ) -> Result<(), CanvasError> {
        if h_spacing <= 0 || v_spacing <= 0 {
            return Err(CanvasError::InvalidGridSpacing {
                horizontal: h_spacing,
                vertical: v_spacing,
            });
        }
        let (width, height) = (self.width() as i32, self.height() as i32);
        let target = self.target();
        for y in (0..height).step_by(v_spacing as usize) {
            target.fill_rect(Rect::new(0, y, width, 1), color);
        }
        for x in (0..width).step_by(h_spacing as usize) {
            target.fill_rect(Rect::new(x, 0, 1, height), color);
        }
        Ok(())
    }

    /// Opaque copy of `image` with its top-left corner at `(x, y)`.
    pub fn blit_image(&mut self, image: &PixelBuffer, x: i32, y: i32) {
        self.target().blit(image, x, y);
    }

    pub fn blit_image_region(&mut self, image: &PixelBuffer, region: Rect, x: i32, y: i32) {
        self.target().blit_region(image, region, x, y);
    }

    /// Clear the current layer and put `image` at the origin. The layer keeps
    /// the canvas size; parts of the image outside it are dropped.
    pub fn replace_with_image(&mut self, image: &PixelBuffer) {
        let target = self.target();
        target.clear();
        target.blit(image, 0, 0);
    }

    pub fn snapshot_region(&self, rect: Rect) -> PixelBuffer {
        self.current_pixels().region(rect)
    }

    pub fn restore_region(&mut self, snapshot: &PixelBuffer, x: i32, y: i32) {
        self.target().blit(snapshot, x, y);
    }
}

fn interpolate(start: i64, end: i64, step: i64, span: i64) -> i64 {
    // step * (end - start) can reach 2^64 for extreme endpoints
    (start as i128 + step as i128 * (end - start) as i128 / span as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn painted(canvas: &Canvas) -> HashSet<(i32, i32)> {
        let pixels = canvas.current_pixels();
        let mut set = HashSet::new();
        for y in 0..pixels.height() as i32 {
            for x in 0..pixels.width() as i32 {
                if pixels.pixel(x, y) != Some(Color::TRANSPARENT) {
                    set.insert((x, y));
                }
            }
        }
        set
    }

    #[test]
    fn vertical_line_is_inclusive_in_both_directions() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.draw_line(3, 7, 3, 2, 1, Color::RED);
        let expected: HashSet<_> = (2..=7).map(|y| (3, y)).collect();
        assert_eq!(painted(&canvas), expected);
    }

    #[test]
    fn diagonal_line_uses_truncating_interpolation() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.draw_line(0, 0, 4, 2, 1, Color::RED);
        // y = x * 2 / 4, truncated
        let expected: HashSet<_> = [(0, 0), (1, 0), (2, 1), (3, 1), (4, 2)].into();
        assert_eq!(painted(&canvas), expected);
    }

    #[test]
    fn steep_line_steps_along_y() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.draw_line(2, 6, 0, 0, 1, Color::RED);
        let set = painted(&canvas);
        assert_eq!(set.len(), 7);
        for y in 0..=6 {
            assert_eq!(set.iter().filter(|(_, py)| *py == y).count(), 1);
        }
    }

    #[test]
    fn thickness_spreads_around_centre() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.draw_line(1, 5, 3, 5, 3, Color::RED);
        let expected: HashSet<_> = (1..=3)
            .flat_map(|x| (4..=6).map(move |y| (x, y)))
            .collect();
        assert_eq!(painted(&canvas), expected);
    }

    #[test]
    fn box_covers_half_open_rectangle() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        canvas.draw_box(2, 3, 3, 2, Color::RED);
        let expected: HashSet<_> = (2..5).flat_map(|x| (3..5).map(move |y| (x, y))).collect();
        assert_eq!(painted(&canvas), expected);
    }

    #[test]
    fn filled_circle_matches_distance_predicate() {
        let mut canvas = Canvas::new(21, 21).unwrap();
        canvas.draw_circle(10, 10, 4, 0, true, Color::RED);
        let expected: HashSet<_> = (-4..=4)
            .flat_map(|dy| (-4..=4).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= 16)
            .map(|(dx, dy)| (10 + dx, 10 + dy))
            .collect();
        assert_eq!(painted(&canvas), expected);
    }

    #[test]
    fn ring_never_overlaps_smaller_disc() {
        for r in 2..9 {
            for t in 1..r {
                let mut ring = Canvas::new(41, 41).unwrap();
                ring.draw_circle(20, 20, r, t, false, Color::RED);
                let mut disc = Canvas::new(41, 41).unwrap();
                disc.draw_circle(20, 20, r - t, 0, true, Color::RED);
                assert!(
                    painted(&ring).is_disjoint(&painted(&disc)),
                    "r={r} t={t} overlaps"
                );
            }
        }
    }

    #[test]
    fn extreme_line_coordinates_do_not_overflow() {
        let mut canvas = Canvas::new(16, 16).unwrap();
        canvas.draw_line(0, 0, 1, i32::MIN, 1, Color::RED);
        canvas.draw_line(i32::MIN, i32::MIN, i32::MAX, i32::MAX, i32::MAX, Color::RED);
        canvas.draw_line(i32::MAX, 3, i32::MIN, 3, 1, Color::RED);
        canvas.draw_line(7, i32::MAX, 7, i32::MIN, 1, Color::RED);

        let painted = painted(&canvas);
        assert!(painted.contains(&(0, 0)));
        assert!((0..16).all(|x| painted.contains(&(x, 3))));
        assert!((0..16).all(|y| painted.contains(&(7, y))));
    }

    #[test]
    fn clipped_line_matches_unclipped_pixels() {
        let mut big = Canvas::new(64, 64).unwrap();
        big.draw_line(-20, 50, 60, 3, 3, Color::RED);
        let mut small = Canvas::new(16, 16).unwrap();
        small.draw_line(-20, 50, 60, 3, 3, Color::RED);

        let expected: HashSet<_> = painted(&big)
            .into_iter()
            .filter(|(x, y)| *x < 16 && *y < 16)
            .collect();
        assert_eq!(painted(&small), expected);
    }

    #[test]
    fn huge_radius_only_visits_the_canvas() {
        let mut canvas = Canvas::new(16, 16).unwrap();
        let started = std::time::Instant::now();
        canvas.draw_circle(5, 5, 200_000, 0, true, Color::RED);
        canvas.draw_circle(5, 5, i32::MAX, i32::MAX, false, Color::RED);
        assert!(started.elapsed() < std::time::Duration::from_secs(1));
        assert_eq!(painted(&canvas).len(), 256);

        let mut ring = Canvas::new(16, 16).unwrap();
        ring.draw_circle(5, 5, 200_000, 1, false, Color::RED);
        assert!(painted(&ring).is_empty());
    }

    #[test]
    fn grid_rejects_non_positive_spacing() {
        let mut canvas = Canvas::new(10, 10).unwrap();
        assert!(canvas.draw_grid(0, 5, Color::RED).is_err());
        assert!(canvas.draw_grid(5, -1, Color::RED).is_err());
        assert!(painted(&canvas).is_empty());
    }

    #[test]
    fn replace_with_image_keeps_canvas_size() {
        let mut canvas = Canvas::with_background(4, 4, Color::WHITE).unwrap();
        let image = PixelBuffer::filled(8, 2, Color::RED);
        canvas.replace_with_image(&image);

        assert_eq!(canvas.current_pixels().size(), (4, 4));
        assert_eq!(canvas.current_pixels().pixel(3, 1), Some(Color::RED));
        assert_eq!(canvas.current_pixels().pixel(0, 2), Some(Color::TRANSPARENT));
    }
}
