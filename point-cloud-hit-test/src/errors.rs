use thiserror::Error;

/// Failures surfaced by the hit testing subsystem.
#[derive(Debug, Error)]
pub enum HitTestError {
    /// Position buffers hold three coordinates per point.
    #[error("each point is expected to have three coordinates, got a buffer of {len} values")]
    MalformedPointSet { len: usize },

    /// Point indices are reported as `u32`.
    #[error("point cloud holds {count} points, more than a u32 index can address")]
    TooManyPoints { count: usize },

    #[error("hit test cannot work without a point cloud source")]
    MissingPointSource,

    /// In-place coordinate updates must keep the point count.
    #[error("coordinate update has {actual} values, the current point cloud has {expected}")]
    CoordinateCountMismatch { expected: usize, actual: usize },

    #[error("spatial index build failed: {0}")]
    BuildFailed(String),

    #[error("spatial index build was cancelled")]
    BuildCancelled,

    #[error("invalid hit test settings: {0}")]
    InvalidSettings(String),

    #[error("failed to parse hit test settings: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = HitTestError> = std::result::Result<T, E>;
