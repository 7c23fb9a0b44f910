//! Canvas composition
//!
//! Sizes the final canvas so no sprite is clipped, then alpha-composites the
//! tile layer and the depth-sorted objects onto it.

use crate::placer::{Bounds, PlacedObject};
use isomap_core::ImageFrame;

/// Extra margin around the base tile canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Padding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Padding {
    /// Margin needed for `bounds` to fit around a `base_w` x `base_h` canvas
    pub fn from_bounds(bounds: &Bounds, base_w: u32, base_h: u32) -> Self {
        let overhang = |v: i64| v.max(0) as u32;

        Self {
            left: overhang(-bounds.min_x),
            top: overhang(-bounds.min_y),
            right: overhang(bounds.max_x - base_w as i64),
            bottom: overhang(bounds.max_y - base_h as i64),
        }
    }

    /// Canvas size once the padding is applied
    pub fn padded_size(&self, base_w: u32, base_h: u32) -> (u32, u32) {
        (
            base_w + self.left + self.right,
            base_h + self.top + self.bottom,
        )
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Composite the base tile canvas and the sorted objects onto a padded canvas
pub fn compose_canvas(base: &ImageFrame, objects: &[PlacedObject<'_>], padding: Padding) -> ImageFrame {
    let (width, height) = padding.padded_size(base.width, base.height);
    let mut canvas = ImageFrame::new_rgba8(width, height);

    let origin_x = padding.left as i64;
    let origin_y = padding.top as i64;

    alpha_over(&mut canvas, base, origin_x, origin_y);

    for object in objects {
        alpha_over(
            &mut canvas,
            &object.sprite,
            origin_x + object.position.0,
            origin_y + object.position.1,
        );
    }

    canvas
}

/// Source-over composite of `src` onto `dst` with its top-left at `(x, y)`.
///
/// Parts of `src` outside `dst` are clipped.
pub fn alpha_over(dst: &mut ImageFrame, src: &ImageFrame, x: i64, y: i64) {
    let x_start = (-x).clamp(0, src.width as i64) as u32;
    let y_start = (-y).clamp(0, src.height as i64) as u32;
    let x_end = (dst.width as i64 - x).clamp(0, src.width as i64) as u32;
    let y_end = (dst.height as i64 - y).clamp(0, src.height as i64) as u32;

    for sy in y_start..y_end {
        for sx in x_start..x_end {
            let Some(src_px) = src.get_pixel(sx, sy) else {
                continue;
            };
            if src_px[3] == 0 {
                continue;
            }

            let dx = (x + sx as i64) as u32;
            let dy = (y + sy as i64) as u32;
            let dst_px = dst.get_pixel(dx, dy).unwrap_or([0, 0, 0, 0]);

            dst.set_pixel(dx, dy, blend_over(src_px, dst_px));
        }
    }
}

/// Straight-alpha Porter-Duff "over"
pub fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let src_a = src[3] as f32 / 255.0;

    if src_a <= 0.0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let dst_a = dst[3] as f32 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let blend = |s: u8, d: u8| -> u8 {
        let s = s as f32 / 255.0;
        let d = d as f32 / 255.0;
        let out = (s * src_a + d * dst_a * (1.0 - src_a)) / out_a;
        (out * 255.0).round().clamp(0.0, 255.0) as u8
    };

    [
        blend(src[0], dst[0]),
        blend(src[1], dst[1]),
        blend(src[2], dst[2]),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padding_from_bounds() {
        let (base_w, base_h) = (224, 112);
        let bounds = Bounds {
            min_x: -5,
            min_y: 0,
            max_x: base_w as i64 + 3,
            max_y: base_h as i64,
        };

        let padding = Padding::from_bounds(&bounds, base_w, base_h);

        assert_eq!(
            padding,
            Padding {
                left: 5,
                top: 0,
                right: 3,
                bottom: 0
            }
        );
        assert_eq!(padding.padded_size(base_w, base_h), (base_w + 8, base_h));
    }

    #[test]
    fn test_padding_never_negative() {
        // bounds strictly inside the base rectangle
        let bounds = Bounds {
            min_x: 10,
            min_y: 10,
            max_x: 20,
            max_y: 20,
        };
        assert!(Padding::from_bounds(&bounds, 100, 100).is_zero());
    }

    #[test]
    fn test_blend_over() {
        // opaque source replaces destination
        assert_eq!(blend_over([10, 20, 30, 255], [1, 2, 3, 255]), [10, 20, 30, 255]);
        // transparent source leaves destination
        assert_eq!(blend_over([10, 20, 30, 0], [1, 2, 3, 40]), [1, 2, 3, 40]);
        // half red over opaque blue
        let px = blend_over([255, 0, 0, 128], [0, 0, 255, 255]);
        assert_eq!(px[3], 255);
        assert_eq!(px[0], 128);
        assert_eq!(px[2], 127);
        // translucent over empty keeps color and alpha
        assert_eq!(blend_over([200, 100, 50, 77], [0, 0, 0, 0]), [200, 100, 50, 77]);
    }

    #[test]
    fn test_alpha_over_clips() {
        let mut dst = ImageFrame::new_rgba8(4, 4);
        let mut src = ImageFrame::new_rgba8(3, 3);
        src.fill([255, 255, 255, 255]);

        alpha_over(&mut dst, &src, -2, 2);

        assert_eq!(dst.get_pixel(0, 2), Some([255, 255, 255, 255]));
        assert_eq!(dst.get_pixel(0, 3), Some([255, 255, 255, 255]));
        assert_eq!(dst.get_pixel(1, 2), Some([0, 0, 0, 0]));
        assert_eq!(dst.get_pixel(0, 1), Some([0, 0, 0, 0]));

        // fully outside: no-op
        alpha_over(&mut dst, &src, 10, 10);
        alpha_over(&mut dst, &src, -10, 0);
    }
}
