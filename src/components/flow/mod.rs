mod component;
mod layout;
mod minimap;
mod path;
mod render;
mod state;
mod types;
mod viewport;

pub use component::FlowCanvas;
pub use layout::{LayoutDirection, LayoutOptions, LayoutStrategy};
#[cfg(test)]
pub use layout::layout_nodes;
pub use types::{EdgeCurve, FlowData, FlowEdge, FlowNode, NodeKind, NodeStyle, Position};
