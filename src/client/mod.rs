//! Scheduler Client
//!
//! The blocking contract every scheduler connection implements. Transport,
//! authentication and wire encoding live behind this trait.

mod remote;

pub use remote::{ClientError, ClientResult, Operation, RemoteClient};
