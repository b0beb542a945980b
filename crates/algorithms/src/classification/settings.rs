//! Classification settings shared by all cluster classifiers

/// Raw value that marks a band as no-data when [`NoDataMatch::Sentinel`] is used.
pub const NODATA_SENTINEL: f64 = 0.0;

/// Which value a pixel's bands are compared against for the no-data test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoDataMatch {
    /// Compare against [`NODATA_SENTINEL`], ignoring the configured value.
    ///
    /// This is the long-standing behavior; output for existing workflows
    /// depends on it.
    #[default]
    Sentinel,
    /// Compare against [`ClassificationSettings::nodata_value`]
    Configured,
}

/// Settings read by the classification kernel.
///
/// The meaning of `threshold` depends on the algorithm: a Mahalanobis
/// distance cutoff, or a probability percentage in `[0, 100]` for maximum
/// likelihood.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationSettings {
    /// Decision threshold
    pub threshold: f64,
    /// Output value for pixels no cluster accepts
    pub no_class_pixel_value: i32,
    /// Output value for invalid (no-data) pixels
    pub nodata_pixel_value: i32,
    /// Configured no-data input value
    pub nodata_value: f64,
    /// Whether invalid pixels are detected at all
    pub nodata_available: bool,
    /// Value the no-data test compares against
    pub nodata_match: NoDataMatch,
}

impl Default for ClassificationSettings {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            no_class_pixel_value: 0,
            nodata_pixel_value: 0,
            nodata_value: NODATA_SENTINEL,
            nodata_available: false,
            nodata_match: NoDataMatch::Sentinel,
        }
    }
}

impl ClassificationSettings {
    /// Raw value a band must equal to count as no-data
    pub fn nodata_reference(&self) -> f64 {
        match self.nodata_match {
            NoDataMatch::Sentinel => NODATA_SENTINEL,
            NoDataMatch::Configured => self.nodata_value,
        }
    }

    /// A pixel is invalid only if no-data is enabled and every band equals the reference.
    ///
    /// A NaN reference matches NaN band values.
    #[allow(clippy::float_cmp)]
    pub fn is_invalid(&self, pixel: &[f64]) -> bool {
        if !self.nodata_available {
            return false;
        }
        let reference = self.nodata_reference();
        if reference.is_nan() {
            pixel.iter().all(|v| v.is_nan())
        } else {
            pixel.iter().all(|&v| v == reference)
        }
    }
}
