use thiserror::Error;

/// Construction-time projection errors.
///
/// Steady-state math never returns an error: `set_ground`/`set_coordinate`
/// report singular, out-of-domain, and non-convergent conditions through
/// their boolean return and `is_good()`.
#[derive(Error, Debug)]
pub enum ProjError {
    #[error("invalid Mapping configuration: {0}")]
    Configuration(String),

    #[error("required mapping option [{0}] is missing")]
    MissingOption(String),

    #[error("unsupported projection [{0}]")]
    UnknownProjection(String),

    #[error("invalid radius: {0}")]
    InvalidRadius(String),

    #[error("invalid angle: {0}")]
    InvalidAngle(String),

    #[error("center latitude too close to a pole: {0}")]
    CenterAtPole(String),
}
