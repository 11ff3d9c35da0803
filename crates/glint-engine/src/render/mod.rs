//! GPU rendering: the two clustered shading strategies and their shared plumbing.
//!
//! Each renderer owns its pipelines and size-dependent images and borrows the
//! light clustering stage through an `Arc`. One frame = one encoder:
//! clustering dispatch, optional G-buffer pass, shading pass.
//!
//! Convention:
//! - geometry passes clear depth to 1.0 and test with the configured compare.
//! - shading happens in view space.

mod clustered_deferred;
mod ctx;
mod forward_plus;
mod pass;
mod pipeline;
mod strategy;
mod targets;

pub use clustered_deferred::ClusteredDeferredRenderer;
pub use ctx::{RenderCtx, RenderTarget};
pub use forward_plus::ForwardPlusRenderer;
pub use strategy::{RenderStrategy, StrategyKind};
pub use targets::{target_descriptor, validate_target_size, DepthTarget, GBuffer};
