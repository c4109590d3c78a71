//! Process-level wiring: router assembly, serving and first-run setup.

mod bootstrap;
mod health;
mod server;

pub use bootstrap::*;
pub use health::*;
pub use server::*;
