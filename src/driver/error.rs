use thiserror::Error;

use crate::hardware::error::GeometryError;
use crate::serial::error::LinkError;

/// All errors emitted from the driver module.
///
/// - `Unconfigured`: When a move operation is attempted before a canvas geometry
///   has been configured for the session
/// - `Geometry`: A configuration or inverse-kinematics failure, passed through
/// - `Link`: When the serial link failed mid-plot. Carries the progress snapshot
///   so an external resume mechanism can restart from the last reached node
///     Parameters:
///     - `path_index`: The index of the path being plotted when the link failed
///     - `node_count`: The node being attempted when the link failed
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("The session has no configured canvas geometry")]
    Unconfigured,

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("The serial link failed at path {}, node {}", .path_index, .node_count)]
    Link { path_index: u64, node_count: u64, source: LinkError },
}
