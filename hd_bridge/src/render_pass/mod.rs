/// Render pass module - per-frame execution and presentation
///
/// A render pass owns everything it allocates: its shader cache, its
/// viewport-sized resource set and its presentation bridge. Nothing here is
/// process-wide, so several render passes can live side by side.

pub mod frame;
pub mod state;
pub mod config;
pub mod shader_cache;
pub mod viewport_resources;
pub mod sequencer;
pub mod host_context;
pub mod presentation;
pub mod render_pass;

#[cfg(test)]
pub mod mock_host_context;

pub use frame::*;
pub use state::*;
pub use config::*;
pub use shader_cache::*;
pub use viewport_resources::*;
pub use sequencer::*;
pub use host_context::*;
pub use presentation::*;
pub use render_pass::*;
