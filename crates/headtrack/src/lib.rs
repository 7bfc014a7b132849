//! `headtrack` - Track machine heads across a facility
//!
//! This library provides the core functionality for recording where each
//! embroidery/sewing machine head lives, who holds it, and what
//! accessories travel with it, plus the web interface and spreadsheet
//! export built on top.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod inventory;
pub mod logging;
pub mod record;
pub mod server;
pub mod store;

pub use auth::CredentialStore;
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{MachineFields, MachineRecord};
pub use store::Store;
