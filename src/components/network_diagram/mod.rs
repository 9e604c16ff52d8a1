//! Layered network diagram: graph model, layout, keyed SVG synchronisation
//! and viewport tracking.

mod component;
pub mod layout;
pub mod model;
pub mod params;
pub mod scale;
mod svg;
pub mod sync;
pub mod types;
pub mod viewport;

pub use component::NetworkDiagram;
pub use params::{Direction, EdgeShape, LayoutParams};
pub use types::Architecture;
pub use viewport::ViewportPolicy;
