//! Domain types: immutable transaction records, source/server entities,
//! and the bounded admission buffer.

pub mod buffer;
pub mod server;
pub mod source;
pub mod transaction;

pub use buffer::Buffer;
pub use server::Server;
pub use source::Source;
pub use transaction::Transaction;
