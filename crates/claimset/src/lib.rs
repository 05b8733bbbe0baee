//! Top-level facade crate for claimset.
//!
//! Re-exports the core registry types and the server library so users can depend on a single crate.

pub mod core {
    pub use claimset_core::*;
}

pub mod server {
    pub use claimset_server::*;
}
