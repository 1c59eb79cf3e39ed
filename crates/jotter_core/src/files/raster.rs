//! Drawing rasterization.
//!
//! Consecutive samples are joined by round-capped segments drawn in the
//! style of the first sample of each pair. A lone sample draws nothing.
//! Each segment is stamped into a coverage mask first, so a translucent
//! stroke blends onto the canvas once per segment.

use crate::model::drawing::{Point, Rgba, StrokeSample, StrokeStyle};
use image::{GrayImage, Luma, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

const COVERED: Luma<u8> = Luma([u8::MAX]);

/// Renders `samples` onto a white `width` x `height` canvas.
pub fn rasterize(samples: &[StrokeSample], width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, to_pixel(Rgba::WHITE));
    for pair in samples.windows(2) {
        draw_segment(&mut canvas, pair[0].position, pair[1].position, pair[0].style);
    }
    canvas
}

fn draw_segment(canvas: &mut RgbaImage, from: Point, to: Point, style: StrokeStyle) {
    if ![from.x, from.y, to.x, to.y, style.width].iter().all(|value| value.is_finite()) {
        return;
    }
    // Hairline for zero or negative widths.
    let radius = (style.width / 2.0).max(0.5);
    let max_x = canvas.width() as f32 - 1.0;
    let max_y = canvas.height() as f32 - 1.0;

    let left = (from.x.min(to.x) - radius).floor().max(0.0);
    let top = (from.y.min(to.y) - radius).floor().max(0.0);
    let right = (from.x.max(to.x) + radius).ceil().min(max_x);
    let bottom = (from.y.max(to.y) + radius).ceil().min(max_y);
    if right < left || bottom < top {
        return;
    }

    // Mask covers the clipped bounding box; shapes are shifted into it.
    let origin = Point::new(left, top);
    let mut mask = GrayImage::new((right - left) as u32 + 1, (bottom - top) as u32 + 1);
    // Caps at trimmed ends land outside the mask.
    let margin = radius + 1.0;
    let Some((from, to)) = clip_segment(
        offset(from, origin),
        offset(to, origin),
        Point::new(-margin, -margin),
        Point::new(mask.width() as f32 + margin, mask.height() as f32 + margin),
    ) else {
        return;
    };
    stamp_capsule(&mut mask, from, to, radius);

    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage.0[0] != 0 {
            blend(canvas, x + left as u32, y + top as u32, style.color);
        }
    }
}

// Segment body as a quad plus a disc at each end.
fn stamp_capsule(mask: &mut GrayImage, from: Point, to: Point, radius: f32) {
    let cap_radius = radius.round() as i32;
    for end in [from, to] {
        let center = to_pixel_point(end);
        draw_filled_circle_mut(mask, (center.x, center.y), cap_radius, COVERED);
    }

    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return;
    }
    let normal = Point::new(-dy / length * radius, dx / length * radius);
    let corners = [
        to_pixel_point(Point::new(from.x + normal.x, from.y + normal.y)),
        to_pixel_point(Point::new(to.x + normal.x, to.y + normal.y)),
        to_pixel_point(Point::new(to.x - normal.x, to.y - normal.y)),
        to_pixel_point(Point::new(from.x - normal.x, from.y - normal.y)),
    ];
    // Rounding can collapse a thin quad; the polygon fill rejects that shape.
    if corners[0] == corners[3] || corners[1] == corners[2] {
        draw_line_segment_mut(mask, (from.x, from.y), (to.x, to.y), COVERED);
        return;
    }
    draw_polygon_mut(mask, &corners, COVERED);
}

/// Liang-Barsky clip of `from -> to` against the box `min..=max`.
///
/// Runs in f64: with far-away endpoints the entry parameter sits within f32
/// rounding of 1.0.
fn clip_segment(from: Point, to: Point, min: Point, max: Point) -> Option<(Point, Point)> {
    let (x0, y0) = (f64::from(from.x), f64::from(from.y));
    let dx = f64::from(to.x) - x0;
    let dy = f64::from(to.y) - y0;
    let mut enter = 0.0_f64;
    let mut exit = 1.0_f64;
    let edges = [
        (-dx, x0 - f64::from(min.x)),
        (dx, f64::from(max.x) - x0),
        (-dy, y0 - f64::from(min.y)),
        (dy, f64::from(max.y) - y0),
    ];
    for (direction, distance) in edges {
        if direction == 0.0 {
            if distance < 0.0 {
                return None;
            }
            continue;
        }
        let t = distance / direction;
        if direction < 0.0 {
            if t > exit {
                return None;
            }
            enter = enter.max(t);
        } else if t < enter {
            return None;
        } else {
            exit = exit.min(t);
        }
    }
    let at = |t: f64| Point::new((x0 + t * dx) as f32, (y0 + t * dy) as f32);
    Some((at(enter), at(exit)))
}

fn offset(point: Point, origin: Point) -> Point {
    Point::new(point.x - origin.x, point.y - origin.y)
}

fn to_pixel_point(point: Point) -> PixelPoint<i32> {
    PixelPoint::new(point.x.round() as i32, point.y.round() as i32)
}

// Source-over compositing.
fn blend(canvas: &mut RgbaImage, x: u32, y: u32, color: Rgba) {
    let pixel = canvas.get_pixel_mut(x, y);
    let alpha = f32::from(color.a) / 255.0;
    let src = [color.r, color.g, color.b];
    for (channel, value) in src.iter().enumerate() {
        let dst = f32::from(pixel.0[channel]);
        pixel.0[channel] = (f32::from(*value) * alpha + dst * (1.0 - alpha)).round() as u8;
    }
    let dst_alpha = f32::from(pixel.0[3]) / 255.0;
    pixel.0[3] = ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8;
}

fn to_pixel(color: Rgba) -> image::Rgba<u8> {
    image::Rgba([color.r, color.g, color.b, color.a])
}

#[cfg(test)]
mod tests {
    use super::{clip_segment, rasterize};
    use crate::model::drawing::{Point, Rgba, StrokeSample, StrokeStyle};

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn sample(x: f32, y: f32, style: StrokeStyle) -> StrokeSample {
        StrokeSample::new(Point::new(x, y), style)
    }

    #[test]
    fn empty_input_is_blank_canvas() {
        let canvas = rasterize(&[], 500, 500);
        assert_eq!(canvas.dimensions(), (500, 500));
        assert!(canvas.pixels().all(|pixel| pixel.0 == WHITE));
    }

    #[test]
    fn single_sample_draws_nothing() {
        let canvas = rasterize(&[sample(10.0, 10.0, StrokeStyle::default())], 50, 50);
        assert!(canvas.pixels().all(|pixel| pixel.0 == WHITE));
    }

    #[test]
    fn segment_uses_style_of_first_sample() {
        let red = StrokeStyle {
            color: Rgba::opaque(255, 0, 0),
            width: 4.0,
        };
        let blue = StrokeStyle {
            color: Rgba::opaque(0, 0, 255),
            width: 4.0,
        };
        let canvas = rasterize(
            &[sample(10.0, 20.0, red), sample(40.0, 20.0, blue)],
            50,
            50,
        );

        assert_eq!(canvas.get_pixel(25, 19).0, [255, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(25, 40).0, WHITE);
    }

    #[test]
    fn out_of_bounds_segments_are_clipped() {
        let style = StrokeStyle::default();
        let canvas = rasterize(
            &[sample(-100.0, -100.0, style), sample(-50.0, -80.0, style)],
            20,
            20,
        );
        assert!(canvas.pixels().all(|pixel| pixel.0 == WHITE));

        let crossing = rasterize(
            &[sample(-10.0, 10.0, style), sample(30.0, 10.0, style)],
            20,
            20,
        );
        assert_eq!(crossing.get_pixel(0, 10).0, [0, 0, 0, 255]);
        assert_eq!(crossing.get_pixel(19, 10).0, [0, 0, 0, 255]);
    }

    #[test]
    fn translucent_segment_blends_once() {
        let style = StrokeStyle {
            color: Rgba {
                r: 0,
                g: 0,
                b: 0,
                a: 128,
            },
            width: 6.0,
        };
        let canvas = rasterize(
            &[sample(10.0, 20.0, style), sample(40.0, 20.0, style)],
            50,
            50,
        );

        // End caps overlap the body here; coverage still counts once.
        assert_eq!(canvas.get_pixel(10, 20).0, [127, 127, 127, 255]);
        assert_eq!(canvas.get_pixel(25, 20).0, [127, 127, 127, 255]);
    }

    #[test]
    fn far_off_canvas_endpoint_is_trimmed() {
        let canvas = rasterize(
            &[
                sample(-1.0e9, 5.0, StrokeStyle::default()),
                sample(5.0, 5.0, StrokeStyle::default()),
            ],
            10,
            10,
        );
        assert_eq!(canvas.get_pixel(0, 5).0, [0, 0, 0, 255]);
        assert_eq!(canvas.get_pixel(9, 5).0, WHITE);
    }

    #[test]
    fn clip_segment_trims_to_box() {
        let clipped = clip_segment(
            Point::new(-10.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(-2.0, -2.0),
            Point::new(2.0, 2.0),
        );
        assert_eq!(
            clipped,
            Some((Point::new(-2.0, 0.0), Point::new(2.0, 0.0)))
        );
        assert_eq!(
            clip_segment(
                Point::new(5.0, 5.0),
                Point::new(6.0, 6.0),
                Point::new(-2.0, -2.0),
                Point::new(2.0, 2.0),
            ),
            None
        );
    }
}
