//! Pure calculation functions for image dimensions.

/// Dimensions that fit `source` inside a `max_dimension` square, keeping the
/// aspect ratio.
///
/// Returns `None` when the source already fits, so callers never upscale.
///
/// ```
/// use webpshelf_processing::fit_within;
///
/// assert_eq!(fit_within((2400, 1200), 1200), Some((1200, 600)));
/// assert_eq!(fit_within((800, 600), 1200), None);
/// ```
pub fn fit_within(source: (u32, u32), max_dimension: u32) -> Option<(u32, u32)> {
    let (width, height) = source;
    if width == 0 || height == 0 {
        return None;
    }

    let scale = f64::min(
        max_dimension as f64 / width as f64,
        max_dimension as f64 / height as f64,
    );
    if scale >= 1.0 {
        return None;
    }

    let scaled_width = ((width as f64 * scale).round() as u32).max(1);
    let scaled_height = ((height as f64 * scale).round() as u32).max(1);
    Some((scaled_width, scaled_height))
}
