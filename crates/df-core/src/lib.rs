pub mod change;
pub mod id;
pub mod model;
pub mod patch;
pub mod store;

pub use change::{EdgeChange, NodeChange};
pub use id::NodeId;
pub use model::*;
pub use patch::{EdgeStylePatch, Patch};
pub use store::{FlowStore, Snapshot, SubscriberId};
