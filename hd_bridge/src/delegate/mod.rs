/// Delegate module - host-facing surface of the engine
///
/// Device ownership resolution, the keyed render settings the host uses to
/// talk to render passes, the prim factory and the render delegate itself.

pub mod driver;
pub mod settings;
pub mod mesh;
pub mod render_delegate;

pub use driver::*;
pub use settings::*;
pub use mesh::*;
pub use render_delegate::*;
