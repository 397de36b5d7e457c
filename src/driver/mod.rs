//!
//! The plotting session: command wrappers around the motion state, serial
//! attach/detach, hardware pacing, and plot progress for resume support.
//!

pub mod error;

use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::hardware::{CanvasGeometry, CanvasOptions};
use crate::motion::{MotionState, MoveCommand};
use crate::serial::{self, NO_LINK_RESPONSE, SerialLink};
use error::DriverError;

/// Pacing delay per motor step of the largest delta in a move. The design is
/// open loop: the hardware gets real time to physically travel before the
/// next command lands.
const PACE_PER_STEP: Duration = Duration::from_millis(5);

/// The version reported when no firmware is attached to ask.
const OFFLINE_VERSION: &str = "v0.1";

///
/// A bookmark of plotting progress, reported on aborts and queryable at any
/// time so an external resume mechanism knows where to restart.
///
/// # Fields:
/// - `path_index`: The number of paths started so far
/// - `node_count`: The number of plotted nodes reached so far
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub path_index: u64,
    pub node_count: u64,
}

///
/// One plotting session. Owns the motion state for its whole lifetime and the
/// serial link while attached; the two lifecycles are independent, so
/// detaching the link never loses the radii.
///
/// The session is one of {unconfigured, configured without link, configured
/// with link}. `configure` enters the second, `attach_serial`/`attach_port`
/// the third, `detach_serial` drops back to the second. Move operations
/// require a configured session; without a link they plan and update state
/// but every query answers with a fixed placeholder instead of blocking.
///
#[derive(Default)]
pub struct Session {
    state: Option<MotionState>,
    link: Option<Box<dyn SerialLink>>,

    path_index: u64,
    node_count: u64,
    node_target: u64,
}

impl Session {
    pub fn new() -> Session {
        Session::default()
    }

    ///
    /// Configures (or reconfigures) the session's canvas geometry and resets
    /// the motion state to the initial centred target.
    ///
    /// # Parameters:
    /// - `options`: The host configuration, canvas fields in centimetres
    ///
    /// # Returns:
    /// - Void if the geometry was accepted
    /// - A `DriverError` if the options describe a degenerate machine
    ///
    pub fn configure(&mut self, options: &CanvasOptions) -> Result<(), DriverError> {
        let geometry = CanvasGeometry::from_options(options)?;
        self.state = Some(MotionState::configure(geometry));
        Ok(())
    }

    ///
    /// # Returns:
    /// - The motion state, if the session has been configured
    ///
    pub fn state(&self) -> Option<&MotionState> {
        self.state.as_ref()
    }

    ///
    /// # Returns:
    /// - Whether a real serial link is currently attached
    ///
    pub fn has_serial(&self) -> bool {
        self.link.is_some()
    }

    ///
    /// Attaches an already-open serial link. Any previously attached link is
    /// dropped; the motion state is untouched.
    ///
    pub fn attach_serial(&mut self, link: Box<dyn SerialLink>) {
        self.link = Some(link);
        debug!("attached serial link");
    }

    ///
    /// Opens a serial device and attaches it, consuming the one greeting line
    /// the firmware prints on connect.
    ///
    /// # Parameters:
    /// - `path`: The device path, e.g. `/dev/ttyUSB0`
    ///
    /// # Returns:
    /// - Void if the port was opened and greeted
    /// - A `DriverError` carrying progress if the port failed
    ///
    pub fn attach_port(&mut self, path: &str) -> Result<(), DriverError> {
        let mut link = serial::open_port(path).map_err(|source| self.link_failure(source))?;

        let greeting = link.read_line().map_err(|source| self.link_failure(source))?;
        debug!(greeting = %greeting, "serial link greeting");

        self.link = Some(Box::new(link));
        Ok(())
    }

    ///
    /// Detaches the serial link, switching queries back to the null
    /// substitute. Idempotent; the radii and geometry are preserved, so a
    /// later re-attach resumes exactly where the state left off.
    ///
    pub fn detach_serial(&mut self) {
        if self.link.take().is_some() {
            debug!("detached serial link");
        }
    }

    ///
    /// Runs a plotting closure with a port attached, releasing it afterwards
    /// no matter how the closure exits. Before the link is dropped a
    /// best-effort `scram` is sent, since the pen should not be left on the
    /// canvas after an abort.
    ///
    /// # Parameters:
    /// - `path`: The serial device path
    /// - `plot`: The plotting work to run against this session
    ///
    pub fn with_port<T, F>(&mut self, path: &str, plot: F) -> Result<T, DriverError>
    where
        F: FnOnce(&mut Session) -> Result<T, DriverError>,
    {
        self.attach_port(path)?;

        let outcome = plot(self);

        self.scram();
        self.detach_serial();
        outcome
    }

    ///
    /// Best-effort emergency stop: raise the pen so an aborted plot does not
    /// bleed ink. Failures are swallowed, the device may already be gone.
    ///
    pub fn scram(&mut self) {
        if let Some(link) = self.link.as_mut() {
            match link.write_line("p u") {
                Ok(()) => {
                    let _ = link.read_line();
                }
                Err(source) => warn!(error = %source, "scram pen-up was not delivered"),
            }
        }
    }

    ///
    /// Moves the pen to a drawing-area target, transmitting the step deltas
    /// and pacing for the hardware travel time. Counts one plotted node; while
    /// fast-forwarding a resumed plot the state still advances but nothing is
    /// transmitted.
    ///
    /// # Parameters:
    /// - `x`: The target x, relative to the page's top-left, in millimetres
    /// - `y`: The target y, relative to the page's top-left, in millimetres
    ///
    /// # Returns:
    /// - The planned `MoveCommand`
    /// - A `DriverError` if the session is unconfigured or the link failed
    ///
    pub fn move_to_area(&mut self, x: f64, y: f64) -> Result<MoveCommand, DriverError> {
        let state = self.state.as_mut().ok_or(DriverError::Unconfigured)?;
        let command = state.move_to_area(x, y);

        self.node_count += 1;
        if self.node_count <= self.node_target {
            debug!(node = self.node_count, "fast-forwarding past already-plotted node");
            return Ok(command);
        }

        self.transmit(&command)?;
        Ok(command)
    }

    ///
    /// Manually jogs the cables by raw step counts (calibration walks). Not
    /// counted as a plotted node.
    ///
    /// # Parameters:
    /// - `n0`: The number of steps to walk the left cable, can be negative
    /// - `n1`: The number of steps to walk the right cable, can be negative
    ///
    /// # Returns:
    /// - The planned `MoveCommand`
    /// - A `DriverError` if the session is unconfigured or the link failed
    ///
    pub fn move_by_steps(&mut self, n0: i64, n1: i64) -> Result<MoveCommand, DriverError> {
        let state = self.state.as_mut().ok_or(DriverError::Unconfigured)?;
        let command = state.move_by_steps(n0, n1);

        self.transmit(&command)?;
        Ok(command)
    }

    ///
    /// Moves the pen back to the configured initial centred target.
    ///
    pub fn home(&mut self) -> Result<MoveCommand, DriverError> {
        let state = self.state.as_mut().ok_or(DriverError::Unconfigured)?;
        let command = state.home();

        self.transmit(&command)?;
        Ok(command)
    }

    /// Raises the pen.
    pub fn pen_up(&mut self) -> Result<String, DriverError> {
        debug!("CMD: raise pen");
        self.query("p u")
    }

    /// Lowers the pen.
    pub fn pen_down(&mut self) -> Result<String, DriverError> {
        debug!("CMD: lower pen");
        self.query("p d")
    }

    ///
    /// Queries the firmware version, or a fixed placeholder when offline.
    ///
    pub fn version(&mut self) -> Result<String, DriverError> {
        debug!("CMD: version query");

        if self.link.is_some() { self.query("v") } else { Ok(OFFLINE_VERSION.to_owned()) }
    }

    ///
    /// Marks the start of the next path element; part of the progress
    /// bookmark the traversal layer records for resuming.
    ///
    pub fn advance_path(&mut self) {
        self.path_index += 1;
    }

    ///
    /// Sets the node count to fast-forward past when resuming an interrupted
    /// plot. Nodes up to and including the target update the radii without
    /// transmitting anything.
    ///
    pub fn set_resume_target(&mut self, nodes: u64) {
        self.node_target = nodes;
    }

    ///
    /// # Returns:
    /// - The current progress bookmark
    ///
    pub fn progress(&self) -> Progress {
        Progress { path_index: self.path_index, node_count: self.node_count }
    }

    /// Sends a planned move down the wire, then paces for the travel time.
    fn transmit(&mut self, command: &MoveCommand) -> Result<(), DriverError> {
        if let Ok(summary) = serde_json::to_string(command) {
            debug!(command = %summary, "CMD: walk");
        }

        self.query(&command.wire_line())?;

        if self.link.is_some() && !command.is_no_op() {
            thread::sleep(PACE_PER_STEP * command.step_span() as u32);
        }

        Ok(())
    }

    /// One protocol round trip, or the null substitute when detached.
    fn query(&mut self, line: &str) -> Result<String, DriverError> {
        match self.link.as_mut() {
            Some(link) => match link.write_line(line).and_then(|_| link.read_line()) {
                Ok(reply) => {
                    debug!(command = line, reply = %reply, "serial round trip");
                    Ok(reply)
                }
                Err(source) => Err(DriverError::Link {
                    path_index: self.path_index,
                    node_count: self.node_count,
                    source,
                }),
            },
            None => Ok(NO_LINK_RESPONSE.to_owned()),
        }
    }

    fn link_failure(&self, source: crate::serial::error::LinkError) -> DriverError {
        DriverError::Link {
            path_index: self.path_index,
            node_count: self.node_count,
            source,
        }
    }
}
