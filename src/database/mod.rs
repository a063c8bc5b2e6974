pub mod connection;
pub mod locks;

pub use connection::*;
pub use locks::*;
