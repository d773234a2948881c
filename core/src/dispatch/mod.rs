//! The two dispatchers that sit between the event calendar and the
//! entities: admission (D_in), which routes a fresh arrival onto a free
//! server or into the buffer, and egress (D_out), which drains the
//! buffer in source-priority packets whenever a server frees up.

pub mod admission;
pub mod egress;

pub use admission::dispatch_admission;
pub use egress::EgressDispatcher;
