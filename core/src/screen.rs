//! Screen sampling capability.
//!
//! Raw capture and template matching live outside this crate (platform
//! code, image pipelines). The engine only needs two questions answered:
//! "what is the average color of this rectangle right now?" and "does
//! this template currently match inside this rectangle?".

use keyrota_types::{Region, Rgb};

/// Errors from the capture backend.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The region lies (partly) outside the capturable screen area.
    #[error("region {0:?} is out of bounds")]
    OutOfBounds(Region),

    /// The template image could not be resolved by the backend.
    #[error("unknown template '{0}'")]
    UnknownTemplate(String),

    /// Backend-specific capture failure (display lost, permission, ...).
    #[error("capture failed: {0}")]
    Backend(String),
}

/// Synchronous screen sampling, injected into the engine.
///
/// Calls block the scheduler thread; implementations should be fast
/// (single-frame reads), not streaming captures.
pub trait ScreenSampler: Send + Sync {
    /// Average color over the region.
    fn average_color(&self, region: Region) -> Result<Rgb, CaptureError>;

    /// Whether `template` matches inside `region` with score >= `threshold`.
    ///
    /// `template` is an opaque identifier the backend resolves (typically
    /// an image path from the skill's icon config).
    fn template_match(
        &self,
        region: Region,
        template: &str,
        threshold: f32,
    ) -> Result<bool, CaptureError>;
}
