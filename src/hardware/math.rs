use super::error::GeometryError;

///
/// Converts a cartesian position into the pair of cable lengths that place
/// the pen there. The left spool anchor sits at the origin and the right
/// anchor at `(spool_interspace, 0)`; coordinates grow rightwards/downwards.
/// All values are in millimetres.
///
/// # Parameters:
/// - `x`: The x parameter of the cartesian coordinate, horizontally relative to the left anchor
/// - `y`: The y parameter of the cartesian coordinate, vertically relative to the left anchor
/// - `spool_interspace`: The distance between the two spool anchors
///
/// # Returns:
/// - A tuple containing the left and right cable lengths, respectively
///
pub fn cartesian_to_radii(x: f64, y: f64, spool_interspace: f64) -> (f64, f64) {
    let left_length = f64::hypot(x, y);
    let right_length = f64::hypot(spool_interspace - x, y);

    (left_length, right_length)
}

///
/// Converts a pair of cable lengths back into a cartesian position, relative
/// to the left spool anchor (0, 0). This is the closed-form triangulation:
/// with both anchors on the y = 0 line separated by `w`,
///
/// ```text
///      x^2 + y^2 = l^2
///  (w-x)^2 + y^2 = r^2
/// ```
///
/// eliminate y^2 to get `x = (l^2 - r^2 + w^2) / 2w`, then `y = sqrt(l^2 - x^2)`.
/// All values are in millimetres.
///
/// # Parameters:
/// - `left_length`: The length of the left cable, relative to the left anchor
/// - `right_length`: The length of the right cable, relative to the right anchor
/// - `spool_interspace`: The distance between the two spool anchors
///
/// # Returns:
/// - A tuple containing the x and y coordinates, respectively
/// - A `GeometryError` if the lengths describe no real pen position
///
pub fn radii_to_cartesian(
    left_length: f64,
    right_length: f64,
    spool_interspace: f64,
) -> Result<(f64, f64), GeometryError> {
    let x = (f64::powi(left_length, 2) - f64::powi(right_length, 2)
        + f64::powi(spool_interspace, 2))
        / (2.0 * spool_interspace);

    let discriminant = f64::powi(left_length, 2) - f64::powi(x, 2);
    if discriminant < 0.0 {
        return Err(GeometryError::InconsistentRadii { left: left_length, right: right_length });
    }

    Ok((x, f64::sqrt(discriminant)))
}

///
/// Calculates the number of millimetres of cable paid out by one motor step,
/// from the spool circumference and the motor's steps per revolution.
///
/// # Parameters:
/// - `spool_diameter`: The diameter of the spool, in millimetres
/// - `steps_per_rev`: The number of motor steps per spool revolution
///
/// # Returns:
/// - The length of cable one step winds or unwinds, in millimetres
///
pub fn step_length(spool_diameter: f64, steps_per_rev: f64) -> f64 {
    spool_diameter * std::f64::consts::PI / steps_per_rev
}

///
/// Tests relating to the triangle maths.
///
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radii_at_left_anchor() {
        let (left, right) = cartesian_to_radii(0.0, 0.0, 1000.0);
        assert_eq!(left, 0.0);
        assert_eq!(right, 1000.0);
    }

    #[test]
    fn radii_round_trip() {
        let (left, right) = cartesian_to_radii(610.0, 1030.0, 1220.0);
        let (x, y) = radii_to_cartesian(left, right, 1220.0).unwrap();
        assert!((x - 610.0).abs() < 1e-9);
        assert!((y - 1030.0).abs() < 1e-9);
    }

    #[test]
    fn inconsistent_radii_rejected() {
        // lengths too short to reach any point between the anchors
        assert!(radii_to_cartesian(10.0, 10.0, 1000.0).is_err());
    }

    #[test]
    fn step_length_for_reference_spool() {
        assert!((step_length(63.0, 48.0) - 4.123_340_357_836_604).abs() < 1e-12);
    }
}
