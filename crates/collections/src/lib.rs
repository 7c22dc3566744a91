//! Small, domain-specific collections shared by the IR and the back end.

pub mod idx;

pub use idx::{Arena, Idx};
