//! Layout constants for the overview and the CPU detailed view.
//!
//! Defaults match the reference layout of the graphics tracing page; the CLI
//! overrides resolution and zoom.

/// Overview section geometry (pixels, except `resolution`).
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewConfig {
    /// Microseconds per pixel
    pub resolution: f64,
    pub top_band_height: f64,
    pub top_band_padding: f64,
    pub inner_band_height: f64,
    pub inner_band_padding: f64,
    /// Padding below the last inner band of a buffer
    pub last_inner_band_padding: f64,
    pub cpu_band_height: f64,
    pub cpu_band_padding: f64,
}

impl Default for OverviewConfig {
    fn default() -> Self {
        Self {
            resolution: 100.0,
            top_band_height: 16.0,
            top_band_padding: 4.0,
            inner_band_height: 12.0,
            inner_band_padding: 2.0,
            last_inner_band_padding: 12.0,
            cpu_band_height: 6.0,
            cpu_band_padding: 2.0,
        }
    }
}

/// CPU detailed view geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedViewConfig {
    /// Width of the label column left of the bands
    pub column_width: f64,
    pub scroll_bar_width: f64,
    /// Resolution of the detailed view is the overview resolution divided by this
    pub zoom_factor: f64,
    /// Share of the viewport width used for the bands
    pub viewport_fraction: f64,
    pub min_width: f64,
    pub thread_band_height: f64,
    pub process_row_height: f64,
    pub padding: f64,
    pub font_size: f64,
    pub process_text_inset: f64,
    pub thread_text_inset: f64,
}

impl Default for DetailedViewConfig {
    fn default() -> Self {
        Self {
            column_width: 140.0,
            scroll_bar_width: 3.0,
            zoom_factor: 4.0,
            viewport_fraction: 0.8,
            min_width: 600.0,
            thread_band_height: 14.0,
            process_row_height: 14.0,
            padding: 2.0,
            font_size: 12.0,
            process_text_inset: 2.0,
            thread_text_inset: 6.0,
        }
    }
}

impl DetailedViewConfig {
    /// Pixels available to the bands for a viewport of `viewport_width`.
    #[must_use]
    pub fn available_width(&self, viewport_width: f64) -> f64 {
        (viewport_width * self.viewport_fraction - self.column_width - self.scroll_bar_width)
            .max(self.min_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_width_has_a_floor() {
        let config = DetailedViewConfig::default();
        assert_eq!(config.available_width(100.0), 600.0);
        assert_eq!(config.available_width(1000.0), 657.0);
    }
}
