//! The change-monitor task: polls `READ_SYSTEM_CHANGES` and reissues
//! whatever opcode reads it reports as changed, alongside independent
//! per-zone temperature and per-output power polling loops, all on one
//! cooperatively-scheduled task per connection.

mod config;
mod scheduler;

pub use config::{MonitorConfig, ReconfigScope, Reconfigurer};
pub use scheduler::ChangeMonitor;
