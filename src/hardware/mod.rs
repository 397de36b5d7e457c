//!
//! Physical canvas/spool geometry and configuration handling
//!

pub mod error;
pub mod math;

use error::GeometryError;
use serde::{Deserialize, Serialize};

/// Cable length kept wound on the spool at minimum pay-out, in millimetres.
/// Added to the spool diameter when deriving the lower radius bound.
const SPOOL_SLACK_MM: f64 = 25.0;

///
/// The raw configuration consumed from the host options layer. Linear canvas
/// fields are in centimetres (they are multiplied by ten on the way into
/// `CanvasGeometry`); the spool diameter is in millimetres.
///
/// # Fields:
/// - `canvas_width`: The width of the canvas, in centimetres
/// - `canvas_height`: The height of the canvas, in centimetres
/// - `margin_x_left`: The left margin, in centimetres
/// - `margin_x_right`: The right margin, in centimetres
/// - `margin_y_top`: The top margin, in centimetres
/// - `steps_per_rev`: The number of motor steps per spool revolution
/// - `spool_diameter`: The diameter of the spool, in millimetres
/// - `smoothness`: The curve flattening tolerance, in canvas units
///
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasOptions {
    pub canvas_width: f64,
    pub canvas_height: f64,
    #[serde(rename = "marginXL")]
    pub margin_x_left: f64,
    #[serde(rename = "marginXR")]
    pub margin_x_right: f64,
    #[serde(rename = "marginYT")]
    pub margin_y_top: f64,
    pub steps_per_rev: f64,
    pub spool_diameter: f64,
    pub smoothness: f64,
}

impl Default for CanvasOptions {
    fn default() -> CanvasOptions {
        CanvasOptions {
            canvas_width: 122.0,
            canvas_height: 183.0,
            margin_x_left: 23.0,
            margin_x_right: 23.0,
            margin_y_top: 23.0,
            steps_per_rev: 48.0,
            spool_diameter: 63.0,
            smoothness: 0.2,
        }
    }
}

///
/// A container for the physical dimensions of the machine layout, plus the
/// quantities derived from them. All linear fields are in millimetres; the
/// radius bounds are in whole motor steps.
///
/// There is no bottom margin: the drawable page height only subtracts the top
/// margin. Hardware calibration depends on that asymmetry, so it is kept.
///
/// # Fields:
/// - `canvas_width`: The horizontal distance between the two spool anchors
/// - `canvas_height`: The height of the canvas
/// - `margin_x_left`: The left page margin
/// - `margin_x_right`: The right page margin
/// - `margin_y_top`: The top page margin
/// - `steps_per_rev`: The number of motor steps per spool revolution
/// - `spool_diameter`: The diameter of the spool
/// - `step_mm`: Millimetres of cable paid out per motor step
/// - `min_radius`: The smallest permitted cable length, in steps
/// - `max_radius`: The largest permitted cable length, in steps
///
#[derive(getset::Getters, Debug, Clone)]
#[get = "pub"]
pub struct CanvasGeometry {
    canvas_width: f64,
    canvas_height: f64,
    margin_x_left: f64,
    margin_x_right: f64,
    margin_y_top: f64,
    steps_per_rev: f64,
    spool_diameter: f64,

    step_mm: f64,
    min_radius: i64,
    max_radius: i64,
}

impl CanvasGeometry {
    ///
    /// Builds a geometry from millimetre dimensions, validating that the
    /// spool and canvas parameters are physically sensible before any derived
    /// quantity is computed.
    ///
    /// The radius bounds are tightened inward to whole steps so that clamped
    /// radii stay integral.
    ///
    /// # Returns:
    /// - A new `CanvasGeometry` instance
    /// - A `GeometryError` if any parameter is degenerate
    ///
    pub fn new(
        canvas_width: f64,
        canvas_height: f64,
        margin_x_left: f64,
        margin_x_right: f64,
        margin_y_top: f64,
        steps_per_rev: f64,
        spool_diameter: f64,
    ) -> Result<CanvasGeometry, GeometryError> {
        if !(spool_diameter > 0.0) {
            return Err(GeometryError::InvalidSpoolDiameter(spool_diameter));
        }
        if !(steps_per_rev > 0.0) {
            return Err(GeometryError::InvalidStepsPerRev(steps_per_rev));
        }
        if !(canvas_width > 0.0) || !(canvas_height > 0.0) {
            return Err(GeometryError::InvalidCanvas { width: canvas_width, height: canvas_height });
        }
        if margin_x_left + margin_x_right >= canvas_width || margin_y_top >= canvas_height {
            return Err(GeometryError::InvalidMargins {
                left: margin_x_left,
                right: margin_x_right,
                top: margin_y_top,
            });
        }

        let step_mm = math::step_length(spool_diameter, steps_per_rev);
        let min_radius = ((spool_diameter + SPOOL_SLACK_MM) / step_mm).ceil() as i64;
        let max_radius = (f64::hypot(canvas_width, canvas_height) / step_mm).floor() as i64;

        Ok(CanvasGeometry {
            canvas_width,
            canvas_height,
            margin_x_left,
            margin_x_right,
            margin_y_top,
            steps_per_rev,
            spool_diameter,
            step_mm,
            min_radius,
            max_radius,
        })
    }

    ///
    /// Builds a geometry from host options, converting the centimetre canvas
    /// fields to millimetres.
    ///
    /// # Returns:
    /// - A new `CanvasGeometry` instance
    /// - A `GeometryError` if any parameter is degenerate
    ///
    pub fn from_options(options: &CanvasOptions) -> Result<CanvasGeometry, GeometryError> {
        CanvasGeometry::new(
            10.0 * options.canvas_width,
            10.0 * options.canvas_height,
            10.0 * options.margin_x_left,
            10.0 * options.margin_x_right,
            10.0 * options.margin_y_top,
            options.steps_per_rev,
            options.spool_diameter,
        )
    }

    ///
    /// # Returns:
    /// - The width of the drawable page area, in millimetres
    ///
    pub fn page_width(&self) -> f64 {
        self.canvas_width - self.margin_x_left - self.margin_x_right
    }

    ///
    /// # Returns:
    /// - The height of the drawable page area, in millimetres
    ///
    pub fn page_height(&self) -> f64 {
        self.canvas_height - self.margin_y_top
    }
}
