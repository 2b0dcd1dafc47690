//! Top-level facade crate for scrapegate.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use scrapegate_core::*;
}

pub mod gateway {
    pub use scrapegate_gateway::*;
}
