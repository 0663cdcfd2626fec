use font8x8::{UnicodeFonts, BASIC_FONTS};
use lanetrack_image::Image;
use std::cmp::{max, min};

/// Width and height in pixels of an unscaled glyph.
pub const GLYPH_SIZE: i64 = 8;

/// Helper function to set a pixel's color, ignoring positions outside the image.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        if let Some(pixel) = img.as_slice_mut().get_mut(start..start + C) {
            pixel.copy_from_slice(&color);
        }
    }
}

/// Clip a segment to the rectangle `[x_min, x_max] × [y_min, y_max]` (Liang–Barsky).
///
/// Segments inside the rectangle are returned unchanged. Returns `None` when the segment
/// misses the rectangle.
fn clip_segment(
    p0: (i64, i64),
    p1: (i64, i64),
    (x_min, y_min): (i64, i64),
    (x_max, y_max): (i64, i64),
) -> Option<((i64, i64), (i64, i64))> {
    let inside = |(x, y): (i64, i64)| x >= x_min && x <= x_max && y >= y_min && y <= y_max;
    if inside(p0) && inside(p1) {
        return Some((p0, p1));
    }

    let (x0, y0) = (p0.0 as f64, p0.1 as f64);
    let (dx, dy) = (p1.0 as f64 - x0, p1.1 as f64 - y0);

    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, x0 - x_min as f64),
        (dx, x_max as f64 - x0),
        (-dy, y0 - y_min as f64),
        (dy, y_max as f64 - y0),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    if t0 > t1 {
        return None;
    }

    let at = |t: f64| {
        let x = (x0 + t * dx).round().clamp(x_min as f64, x_max as f64);
        let y = (y0 + t * dy).round().clamp(y_min as f64, y_max as f64);
        (x as i64, y as i64)
    };
    Some((at(t0), at(t1)))
}

/// Draws a line on an image inplace using a standard Bresenham's line algorithm.
///
/// The segment is clipped to the image first, so far away endpoints cost nothing.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `p0` - The start point of the line as a tuple of (x, y).
/// * `p1` - The end point of the line as a tuple of (x, y).
/// * `color` - The color of the line as an array of `C` elements.
/// * `thickness` - The thickness of the line. (Note: thickness > 1 is approximate).
pub fn draw_line<const C: usize>(
    img: &mut Image<u8, C>,
    p0: (i64, i64),
    p1: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let half_thickness = if thickness > 1 {
        thickness as i64 / 2
    } else {
        0
    };

    let (cols, rows) = (img.cols() as i64, img.rows() as i64);
    let Some(((mut x0, mut y0), (x1, y1))) = clip_segment(
        p0,
        p1,
        (-half_thickness, -half_thickness),
        (cols - 1 + half_thickness, rows - 1 + half_thickness),
    ) else {
        return;
    };

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();

    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };

    let mut err = dx - dy;

    loop {
        for i in -half_thickness..=half_thickness {
            for j in -half_thickness..=half_thickness {
                set_pixel(img, x0 + i, y0 + j, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draws a rectangle outline on an image inplace.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y).
/// * `color` - The color of the rectangle outline.
/// * `thickness` - The thickness of the lines.
pub fn draw_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
    thickness: usize,
) {
    let (x0, y0) = top_left;
    let (x1, y1) = bottom_right;

    let (lx0, lx1) = (min(x0, x1), max(x0, x1));
    let (ly0, ly1) = (min(y0, y1), max(y0, y1));

    draw_line(img, (lx0, ly0), (lx1, ly0), color, thickness); // top
    draw_line(img, (lx0, ly1), (lx1, ly1), color, thickness); // bottom
    draw_line(img, (lx0, ly0), (lx0, ly1), color, thickness); // left
    draw_line(img, (lx1, ly0), (lx1, ly1), color, thickness); // right
}

/// Draws a filled rectangle on an image inplace.
///
/// The bottom-right corner is exclusive.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y).
/// * `color` - The fill color of the rectangle.
pub fn draw_filled_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
) {
    let (x_start, y_start) = top_left;
    let (x_end, y_end) = bottom_right;

    // clamp coordinates to image bounds
    let x_min = max(0, min(x_start, x_end));
    let y_min = max(0, min(y_start, y_end));
    let x_max = min(img.cols() as i64, max(x_start, x_end));
    let y_max = min(img.rows() as i64, max(y_start, y_end));

    for y in y_min..y_max {
        for x in x_min..x_max {
            set_pixel(img, x, y, color);
        }
    }
}

/// Fills a closed polygon on an image inplace.
///
/// The interior is rasterized with an even-odd scanline rule sampled at pixel centers and
/// the outline is drawn on top, so boundary pixels are always covered.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `points` - The polygon vertices as (x, y); the last vertex connects to the first.
/// * `color` - The fill color.
pub fn fill_poly<const C: usize>(img: &mut Image<u8, C>, points: &[(i64, i64)], color: [u8; C]) {
    if points.is_empty() {
        return;
    }

    let y_min = points.iter().map(|p| p.1).min().unwrap_or(0).max(0);
    let y_max = points
        .iter()
        .map(|p| p.1)
        .max()
        .unwrap_or(0)
        .min(img.rows() as i64 - 1);

    let mut crossings = Vec::with_capacity(points.len());
    for y in y_min..=y_max {
        crossings.clear();
        let yc = y as f64;

        for (i, &(x0, y0)) in points.iter().enumerate() {
            let (x1, y1) = points[(i + 1) % points.len()];
            // half-open edges so shared vertices are counted once
            let (lo, hi) = (min(y0, y1), max(y0, y1));
            if y0 == y1 || y < lo || y >= hi {
                continue;
            }
            let t = (yc - y0 as f64) / (y1 - y0) as f64;
            crossings.push(x0 as f64 + t * (x1 - x0) as f64);
        }

        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let xa = span[0].ceil() as i64;
            let xb = span[1].floor() as i64;
            for x in max(xa, 0)..=min(xb, img.cols() as i64 - 1) {
                set_pixel(img, x, y, color);
            }
        }
    }

    for (i, &p0) in points.iter().enumerate() {
        let p1 = points[(i + 1) % points.len()];
        draw_line(img, p0, p1, color, 1);
    }
}

/// Draws ASCII text on an image inplace using an 8x8 bitmap font.
///
/// Characters without a glyph are skipped but still advance the cursor.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `text` - The text to render.
/// * `origin` - The bottom-left corner of the first character (x, y).
/// * `scale` - Integer upscaling factor of each glyph pixel, at least 1.
/// * `color` - The color of the text.
pub fn draw_text<const C: usize>(
    img: &mut Image<u8, C>,
    text: &str,
    origin: (i64, i64),
    scale: usize,
    color: [u8; C],
) {
    let scale = scale.max(1) as i64;
    let advance = GLYPH_SIZE * scale;
    let top = origin.1 - advance;

    for (n, ch) in text.chars().enumerate() {
        let left = origin.0 + n as i64 * advance;
        let Some(glyph) = BASIC_FONTS.get(ch) else {
            continue;
        };

        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_SIZE {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x = left + col * scale;
                let y = top + row as i64 * scale;
                draw_filled_rect(img, (x, y), (x + scale, y + scale), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lanetrack_image::{Image, ImageError, ImageSize};

    #[rustfmt::skip]
    #[test]
    fn test_draw_line() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_line(&mut img, (0, 0), (4, 4), [255], 1);
        assert_eq!(
            img.as_slice(),
            &[
                255,   0,   0,   0,   0,
                  0, 255,   0,   0,   0,
                  0,   0, 255,   0,   0,
                  0,   0,   0, 255,   0,
                  0,   0,   0,   0, 255,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_draw_line_far_outside() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([10, 10].into(), 0)?;

        let start = std::time::Instant::now();
        draw_line(&mut img, (-4_000_000_000_000, 5), (4_000_000_000_000, 5), [1], 1);
        draw_line(&mut img, (-5, -5), (14, 14), [2], 1);
        draw_line(&mut img, (-3_000_000_000, -7), (3_000_000_000, -7), [3], 1);
        assert!(start.elapsed() < std::time::Duration::from_secs(1));

        for x in 0..10 {
            let expected = if x == 5 { 2 } else { 1 };
            assert_eq!(*img.get_pixel(x, 5, 0)?, expected);
            assert_eq!(*img.get_pixel(x, x, 0)?, 2);
        }
        assert_eq!(img.count_nonzero(), 19);
        Ok(())
    }

    #[test]
    fn test_clip_segment() {
        let rect = ((0, 0), (9, 9));
        assert_eq!(
            clip_segment((2, 3), (7, 8), rect.0, rect.1),
            Some(((2, 3), (7, 8)))
        );
        assert_eq!(
            clip_segment((-10, 4), (20, 4), rect.0, rect.1),
            Some(((0, 4), (9, 4)))
        );
        assert_eq!(clip_segment((-10, -1), (20, -1), rect.0, rect.1), None);
        assert_eq!(clip_segment((-10, 30), (30, -10), rect.0, rect.1), None);
    }

    #[rustfmt::skip]
    #[test]
    fn test_draw_rect() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        draw_rect(&mut img, (1, 1), (3, 3), [1], 1);
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 0, 0,
                0, 1, 1, 1, 0,
                0, 1, 0, 1, 0,
                0, 1, 1, 1, 0,
                0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[rustfmt::skip]
    #[test]
    fn test_fill_poly_triangle() -> Result<(), ImageError> {
        let mut img = Image::new(
            ImageSize { width: 5, height: 5 }, vec![0u8; 25],
        )?;
        fill_poly(&mut img, &[(0, 0), (4, 4), (0, 4)], [1]);
        assert_eq!(
            img.as_slice(),
            &[
                1, 0, 0, 0, 0,
                1, 1, 0, 0, 0,
                1, 1, 1, 0, 0,
                1, 1, 1, 1, 0,
                1, 1, 1, 1, 1,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_fill_poly_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([4, 4].into(), 0)?;
        fill_poly(
            &mut img,
            &[(-10, -10), (10, -10), (10, 10), (-10, 10)],
            [0, 255, 0],
        );
        assert!(img.as_slice().chunks_exact(3).all(|p| p == [0, 255, 0]));
        Ok(())
    }

    #[test]
    fn test_draw_text() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([40, 20].into(), 0)?;
        draw_text(&mut img, "A", (2, 12), 1, [255]);

        let lit = img.count_nonzero();
        let glyph = BASIC_FONTS.get('A').map(|g| g.iter().map(|r| r.count_ones()).sum::<u32>());
        assert_eq!(Some(lit as u32), glyph);

        // nothing is drawn below the baseline
        for y in 12..20 {
            for x in 0..40 {
                assert_eq!(*img.get_pixel(x, y, 0)?, 0);
            }
        }

        let mut scaled = Image::<u8, 1>::from_size_val([40, 20].into(), 0)?;
        draw_text(&mut scaled, "A", (2, 18), 2, [255]);
        assert_eq!(scaled.count_nonzero(), 4 * lit);

        Ok(())
    }
}
