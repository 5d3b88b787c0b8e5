// Application layer - ledger use cases over a record store

pub mod error;
mod locks;
mod service;

pub use error::*;
pub use locks::*;
pub use service::*;
