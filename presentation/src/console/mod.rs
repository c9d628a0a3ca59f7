//! Terminal front end: transport, command parsing and the input session

pub mod command;
pub mod session;
pub mod transport;

pub use command::ConsoleCommand;
pub use session::{ConsoleSession, Flow};
pub use transport::ConsoleTransport;
