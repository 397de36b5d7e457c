//!
//! Core kinematics and motion planning for a two-spool, cable-suspended drawing
//! machine. The pen carriage hangs from two spooled cables; moving it to an
//! (x, y) canvas position means solving the triangle made by the two spool
//! anchors for a pair of cable lengths (in motor steps), then pushing the step
//! deltas to the controller over a line-oriented serial protocol.
//!

pub mod driver;
pub mod hardware;
pub mod motion;
pub mod path;
pub mod serial;
