use thiserror::Error;

/// All errors emitted from the path module.
///
/// - `InvalidTolerance`: When a flattening tolerance is zero, negative or not a number;
///   subdivision could never terminate for such a tolerance
///     Parameters:
///     - `f64`: The requested tolerance
#[derive(Error, Debug)]
pub enum FlattenError {
    #[error("The flattening tolerance must be positive, got {}", .0)]
    InvalidTolerance(f64),
}
