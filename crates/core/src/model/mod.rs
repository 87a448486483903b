pub mod call_tree;
pub mod frame;
pub mod profile;

pub use call_tree::{CallTree, CallTreeNode};
pub use frame::{Frame, FrameRegistry};
pub use profile::Profile;
