//!
//! The kinematic state machine: radius bookkeeping, bound clipping and move
//! planning. All positions are in millimetres, all radii in whole motor steps.
//!

use serde::Serialize;
use tracing::debug;

use crate::hardware::CanvasGeometry;
use crate::hardware::error::GeometryError;
use crate::hardware::math;

///
/// A planned relative move, ready for transmission. The deltas are what goes
/// over the wire; the destinations are kept so a caller can audit or resume.
///
/// # Fields:
/// - `delta_r0`: The change in the left cable length, in steps
/// - `delta_r1`: The change in the right cable length, in steps
/// - `dest_r0`: The left cable length after the move, in steps
/// - `dest_r1`: The right cable length after the move, in steps
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoveCommand {
    pub delta_r0: i64,
    pub delta_r1: i64,
    pub dest_r0: i64,
    pub dest_r1: i64,
}

impl MoveCommand {
    ///
    /// # Returns:
    /// - The serial line that performs this move, `"r <delta_r0> <delta_r1>"`
    ///
    pub fn wire_line(&self) -> String {
        format!("r {} {}", self.delta_r0, self.delta_r1)
    }

    ///
    /// # Returns:
    /// - The larger of the two step deltas, by magnitude. The hardware travel
    ///   time, and therefore the pacing delay, is linear in this
    ///
    pub fn step_span(&self) -> i64 {
        self.delta_r0.abs().max(self.delta_r1.abs())
    }

    ///
    /// # Returns:
    /// - Whether the move leaves both cables untouched
    ///
    pub fn is_no_op(&self) -> bool {
        self.delta_r0 == 0 && self.delta_r1 == 0
    }
}

///
/// The mutable motion state of one plotting session. Owns the current pair of
/// cable radii and the canvas geometry they are measured against; every
/// radius change flows through the planning functions here so the radius
/// bounds invariant always holds.
///
/// # Fields:
/// - `geometry`: The immutable canvas/spool geometry for this session
/// - `r0`: The current left cable length, in steps
/// - `r1`: The current right cable length, in steps
/// - `initial_x`: The configured initial target, absolute x in millimetres
/// - `initial_y`: The configured initial target, absolute y in millimetres
///
pub struct MotionState {
    geometry: CanvasGeometry,
    r0: i64,
    r1: i64,
    initial_x: f64,
    initial_y: f64,
}

impl MotionState {
    ///
    /// Initialises the motion state from a validated geometry. The initial
    /// target is the centre of the margin-adjusted canvas, and the radii are
    /// derived from it, so a fresh state already satisfies the radius bounds.
    ///
    /// # Parameters:
    /// - `geometry`: The canvas/spool geometry to plot against
    ///
    /// # Returns:
    /// - A new `MotionState` positioned at the initial centred target
    ///
    pub fn configure(geometry: CanvasGeometry) -> MotionState {
        let initial_x =
            ((geometry.canvas_width() - geometry.margin_x_right()) + geometry.margin_x_left())
                / 2.0;
        let initial_y = (geometry.canvas_height() + geometry.margin_y_top()) / 2.0;

        let mut state = MotionState { geometry, r0: 0, r1: 0, initial_x, initial_y };
        state.r0 = state.radius_left(initial_x, initial_y);
        state.r1 = state.radius_right(initial_x, initial_y);

        debug!(
            r0 = state.r0,
            r1 = state.r1,
            initial_x,
            initial_y,
            "configured motion state"
        );

        state
    }

    ///
    /// # Returns:
    /// - The geometry this state was configured with
    ///
    pub fn geometry(&self) -> &CanvasGeometry {
        &self.geometry
    }

    ///
    /// # Returns:
    /// - The current left and right cable lengths, respectively, in steps
    ///
    pub fn radii(&self) -> (i64, i64) {
        (self.r0, self.r1)
    }

    ///
    /// # Returns:
    /// - The configured initial target in drawing-area coordinates; `home`
    ///   moves back here
    ///
    pub fn initial_area_target(&self) -> (f64, f64) {
        (self.initial_x - self.geometry.margin_x_left(), self.initial_y - self.geometry.margin_y_top())
    }

    ///
    /// Clamps an absolute canvas coordinate into the margin box
    /// `[marginXL, marginXL + pageW] x [marginYT, marginYT + pageH]`.
    ///
    /// # Parameters:
    /// - `x`: The absolute x coordinate, in millimetres
    /// - `y`: The absolute y coordinate, in millimetres
    ///
    /// # Returns:
    /// - The clamped coordinate pair, plus whether any clamping occurred
    ///
    pub fn clip_to_margins(&self, x: f64, y: f64) -> (f64, f64, bool) {
        let x_bounds = (
            *self.geometry.margin_x_left(),
            self.geometry.margin_x_left() + self.geometry.page_width(),
        );
        let y_bounds = (
            *self.geometry.margin_y_top(),
            self.geometry.margin_y_top() + self.geometry.page_height(),
        );

        let clipped_x = x.clamp(x_bounds.0, x_bounds.1);
        let clipped_y = y.clamp(y_bounds.0, y_bounds.1);

        let clipped = clipped_x != x || clipped_y != y;
        if clipped {
            debug!(x, y, clipped_x, clipped_y, "target outside margins, clipping");
        }

        (clipped_x, clipped_y, clipped)
    }

    ///
    /// Computes the left cable radius for an absolute coordinate: clip to the
    /// margins, take the Euclidean distance from the left anchor, divide by
    /// the step length, round, clamp into the physical radius bounds.
    ///
    /// Rounding is half-away-from-zero (`f64::round`). The hardware is
    /// calibrated against this exact rule; do not change it.
    ///
    /// # Parameters:
    /// - `x`: The absolute x coordinate, in millimetres
    /// - `y`: The absolute y coordinate, in millimetres
    ///
    /// # Returns:
    /// - The left cable length, in steps, within `[min_radius, max_radius]`
    ///
    pub fn radius_left(&self, x: f64, y: f64) -> i64 {
        let (x, y, _) = self.clip_to_margins(x, y);
        let (left_length, _) = math::cartesian_to_radii(x, y, *self.geometry.canvas_width());
        self.clamp_radius(left_length, "r0")
    }

    ///
    /// Computes the right cable radius for an absolute coordinate, measured
    /// from the right anchor at `(canvas_width, 0)`. Same clipping, rounding
    /// and clamping rules as `radius_left`.
    ///
    /// # Parameters:
    /// - `x`: The absolute x coordinate, in millimetres
    /// - `y`: The absolute y coordinate, in millimetres
    ///
    /// # Returns:
    /// - The right cable length, in steps, within `[min_radius, max_radius]`
    ///
    pub fn radius_right(&self, x: f64, y: f64) -> i64 {
        let (x, y, _) = self.clip_to_margins(x, y);
        let (_, right_length) = math::cartesian_to_radii(x, y, *self.geometry.canvas_width());
        self.clamp_radius(right_length, "r1")
    }

    /// Steps for a cable length in mm, clamped into the physical bounds.
    fn clamp_radius(&self, length_mm: f64, which: &str) -> i64 {
        let steps = (length_mm / self.geometry.step_mm()).round() as i64;
        let clamped = steps.clamp(*self.geometry.min_radius(), *self.geometry.max_radius());

        if clamped != steps {
            debug!(which, steps, clamped, "move would violate radius bounds, clipping");
        }

        clamped
    }

    ///
    /// Inverts the forward map: derives the absolute pen position from the
    /// current radii. The radii are converted back to millimetres before the
    /// triangulation so the units agree with the anchor spacing.
    ///
    /// # Returns:
    /// - The absolute (x, y) position, in millimetres
    /// - A `GeometryError` if the radii have become geometrically inconsistent
    ///
    pub fn abs_position(&self) -> Result<(f64, f64), GeometryError> {
        math::radii_to_cartesian(
            self.r0 as f64 * self.geometry.step_mm(),
            self.r1 as f64 * self.geometry.step_mm(),
            *self.geometry.canvas_width(),
        )
    }

    ///
    /// # Returns:
    /// - The pen position relative to the drawable page's top-left corner
    /// - A `GeometryError` if the radii have become geometrically inconsistent
    ///
    pub fn area_position(&self) -> Result<(f64, f64), GeometryError> {
        let (x, y) = self.abs_position()?;
        Ok((x - self.geometry.margin_x_left(), y - self.geometry.margin_y_top()))
    }

    ///
    /// Plans a move to a drawing-area target and commits it. This is the sole
    /// path by which the radii change during normal plotting: the target is
    /// converted to absolute coordinates, clipped, turned into a destination
    /// radius pair, and the state is updated to the destination.
    ///
    /// # Parameters:
    /// - `x`: The target x, relative to the page's top-left, in millimetres
    /// - `y`: The target y, relative to the page's top-left, in millimetres
    ///
    /// # Returns:
    /// - The `MoveCommand` to transmit
    ///
    pub fn move_to_area(&mut self, x: f64, y: f64) -> MoveCommand {
        let abs_x = x + self.geometry.margin_x_left();
        let abs_y = y + self.geometry.margin_y_top();

        let dest_r0 = self.radius_left(abs_x, abs_y);
        let dest_r1 = self.radius_right(abs_x, abs_y);

        self.commit(dest_r0, dest_r1)
    }

    ///
    /// Plans a manual jog of the two cables by raw step counts, with no
    /// geometric retargeting. The destination radii are still clamped into
    /// the physical bounds so the invariant survives calibration walks.
    ///
    /// # Parameters:
    /// - `n0`: The number of steps to walk the left cable, can be negative
    /// - `n1`: The number of steps to walk the right cable, can be negative
    ///
    /// # Returns:
    /// - The `MoveCommand` to transmit
    ///
    pub fn move_by_steps(&mut self, n0: i64, n1: i64) -> MoveCommand {
        let dest_r0 =
            (self.r0 + n0).clamp(*self.geometry.min_radius(), *self.geometry.max_radius());
        let dest_r1 =
            (self.r1 + n1).clamp(*self.geometry.min_radius(), *self.geometry.max_radius());

        self.commit(dest_r0, dest_r1)
    }

    ///
    /// Plans a move back to the configured initial centred target.
    ///
    /// # Returns:
    /// - The `MoveCommand` to transmit
    ///
    pub fn home(&mut self) -> MoveCommand {
        let (x, y) = self.initial_area_target();
        self.move_to_area(x, y)
    }

    /// Builds the command for a destination radius pair and updates the state.
    fn commit(&mut self, dest_r0: i64, dest_r1: i64) -> MoveCommand {
        let command = MoveCommand {
            delta_r0: dest_r0 - self.r0,
            delta_r1: dest_r1 - self.r1,
            dest_r0,
            dest_r1,
        };

        self.r0 = dest_r0;
        self.r1 = dest_r1;

        command
    }
}

///
/// Tests relating to the MotionState struct and associated functions.
///
#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::CanvasGeometry;

    fn state() -> MotionState {
        let geometry =
            CanvasGeometry::new(1220.0, 1830.0, 230.0, 230.0, 230.0, 48.0, 63.0).unwrap();
        MotionState::configure(geometry)
    }

    fn assert_in_bounds(state: &MotionState) {
        let (r0, r1) = state.radii();
        assert!(*state.geometry().min_radius() <= r0 && r0 <= *state.geometry().max_radius());
        assert!(*state.geometry().min_radius() <= r1 && r1 <= *state.geometry().max_radius());
    }

    #[test]
    fn initial_target_is_page_centre() {
        let state = state();
        let (x, y) = state.initial_area_target();
        assert_eq!(x, state.geometry().page_width() / 2.0);
        assert_eq!(y, state.geometry().page_height() / 2.0);
    }

    #[test]
    fn initial_radii_are_symmetric_and_in_bounds() {
        let state = state();
        let (r0, r1) = state.radii();
        assert_eq!(r0, 290);
        assert_eq!(r1, 290);
        assert_in_bounds(&state);
    }

    #[test]
    fn initial_area_position_is_near_centre() {
        let state = state();
        let step_mm = *state.geometry().step_mm();
        let (x, y) = state.area_position().unwrap();
        assert!((x - 380.0).abs() <= step_mm);
        assert!((y - 800.0).abs() <= step_mm);
    }

    #[test]
    fn move_then_read_back_round_trips_within_one_step() {
        let mut state = state();
        let step_mm = *state.geometry().step_mm();

        for (x, y) in [(380.0, 800.0), (100.0, 100.0), (700.0, 1500.0), (50.0, 1200.0)] {
            state.move_to_area(x, y);
            assert_in_bounds(&state);

            let (rx, ry) = state.area_position().unwrap();
            assert!((rx - x).abs() <= step_mm, "x drifted: {} vs {}", rx, x);
            assert!((ry - y).abs() <= step_mm, "y drifted: {} vs {}", ry, y);
        }
    }

    #[test]
    fn repeated_move_to_same_target_is_a_no_op() {
        let mut state = state();
        state.move_to_area(100.0, 100.0);
        let second = state.move_to_area(100.0, 100.0);
        assert!(second.is_no_op());
        assert_eq!(second.delta_r0, 0);
        assert_eq!(second.delta_r1, 0);
    }

    #[test]
    fn zero_step_jog_is_a_no_op() {
        let mut state = state();
        let before = state.radii();
        let command = state.move_by_steps(0, 0);
        assert!(command.is_no_op());
        assert_eq!(state.radii(), before);
    }

    #[test]
    fn clip_to_margins_is_idempotent() {
        let state = state();
        let (x, y, clipped) = state.clip_to_margins(-50.0, 5000.0);
        assert!(clipped);

        let (x2, y2, clipped2) = state.clip_to_margins(x, y);
        assert!(!clipped2);
        assert_eq!((x, y), (x2, y2));
    }

    #[test]
    fn in_bounds_point_is_not_clipped() {
        let state = state();
        let (x, y, clipped) = state.clip_to_margins(400.0, 900.0);
        assert!(!clipped);
        assert_eq!((x, y), (400.0, 900.0));
    }

    #[test]
    fn radius_bounds_survive_any_move_sequence() {
        let mut state = state();

        state.move_to_area(-10_000.0, -10_000.0);
        assert_in_bounds(&state);

        state.move_to_area(10_000.0, 10_000.0);
        assert_in_bounds(&state);

        state.move_by_steps(1_000_000, -1_000_000);
        assert_in_bounds(&state);

        state.move_by_steps(-1_000_000, 1_000_000);
        assert_in_bounds(&state);

        state.home();
        assert_in_bounds(&state);
    }

    #[test]
    fn out_of_bounds_target_matches_clipped_target() {
        let mut state = state();
        let wild = state.move_to_area(-500.0, 800.0);

        let mut clipped_state = self::state();
        let clipped = clipped_state.move_to_area(0.0, 800.0);

        assert_eq!(wild, clipped);
    }

    #[test]
    fn home_returns_to_initial_radii() {
        let mut state = state();
        let initial = state.radii();

        state.move_to_area(50.0, 50.0);
        assert_ne!(state.radii(), initial);

        state.home();
        assert_eq!(state.radii(), initial);
    }

    #[test]
    fn wire_line_format() {
        let command = MoveCommand { delta_r0: -12, delta_r1: 7, dest_r0: 278, dest_r1: 297 };
        assert_eq!(command.wire_line(), "r -12 7");
        assert_eq!(command.step_span(), 12);
        assert!(!command.is_no_op());
    }
}
