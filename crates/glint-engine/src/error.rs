use thiserror::Error;

/// Errors surfaced by the clustering and shading core.
///
/// Per-cluster light overflow and out-of-range cluster lookups are not errors;
/// they are handled by truncation and clamping respectively.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A buffer, image or pipeline could not be created with the requested size.
    #[error("failed to create {resource}: {reason}")]
    ResourceCreation {
        resource: &'static str,
        reason: String,
    },

    /// More lights were supplied than the light set buffer can hold.
    #[error("light count {count} exceeds light set capacity {capacity}")]
    LightCapacityExceeded { count: usize, capacity: usize },

    /// The surface or device ran out of memory while acquiring or submitting a frame.
    #[error("GPU out of memory")]
    OutOfMemory,

    /// The logical device was lost.
    #[error("GPU device lost: {0}")]
    DeviceLost(String),
}

impl RenderError {
    pub(crate) fn resource(resource: &'static str, reason: impl Into<String>) -> Self {
        Self::ResourceCreation {
            resource,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_error_names_both_numbers() {
        let e = RenderError::LightCapacityExceeded {
            count: 12,
            capacity: 8,
        };
        assert_eq!(e.to_string(), "light count 12 exceeds light set capacity 8");
    }

    #[test]
    fn resource_error_message() {
        let e = RenderError::resource("g-buffer", "width is zero");
        assert_eq!(e.to_string(), "failed to create g-buffer: width is zero");
    }
}
