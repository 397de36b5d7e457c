use thiserror::Error;

/// All errors emitted from the hardware module.
///
/// - `InvalidSpoolDiameter`: When the configured spool diameter is zero, negative or not a number
/// - `InvalidStepsPerRev`: When the configured steps per revolution is zero, negative or not a number
/// - `InvalidCanvas`: When a canvas dimension is not positive
///     Parameters:
///     - `width`: The configured canvas width, mm
///     - `height`: The configured canvas height, mm
/// - `InvalidMargins`: When the margins leave no drawable page area
/// - `InconsistentRadii`: When a pair of cable lengths describes no real pen position,
///   i.e. the inverse triangulation would take the square root of a negative number
///     Parameters:
///     - `left`: The left cable length, mm
///     - `right`: The right cable length, mm
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("The spool diameter must be positive, got {} mm", .0)]
    InvalidSpoolDiameter(f64),

    #[error("The steps per revolution must be positive, got {}", .0)]
    InvalidStepsPerRev(f64),

    #[error("The canvas dimensions must be positive, got {} x {} mm", .width, .height)]
    InvalidCanvas { width: f64, height: f64 },

    #[error("The margins (left {}, right {}, top {} mm) leave no drawable page area", .left, .right, .top)]
    InvalidMargins { left: f64, right: f64, top: f64 },

    #[error("The cable lengths <{:.1}, {:.1}> mm describe no real pen position", .left, .right)]
    InconsistentRadii { left: f64, right: f64 },
}
