//! Permission negotiation and fix acquisition

pub mod permission;
pub mod fix;

pub use permission::PermissionNegotiator;
pub use fix::FixAcquirer;
