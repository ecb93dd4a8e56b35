//! Pure data structures: the channel partition and the tenant-scoped records around it.

pub mod channels;
pub mod tenant;

pub use channels::*;
pub use tenant::*;
