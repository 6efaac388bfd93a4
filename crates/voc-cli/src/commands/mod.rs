//! Command implementations for voc

pub mod cars;
pub mod charging;
pub mod info;
pub mod register;
pub mod remote;
pub mod version;

pub use cars::cars;
pub use charging::{charging, ChargingCommand};
pub use info::{attributes, position, status, trips};
pub use register::register;
pub use remote::{remote, RemoteCommand};
pub use version::version;
