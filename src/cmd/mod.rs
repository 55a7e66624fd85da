//! CLI command implementations.
//!
//! | Module   | Commands handled             |
//! |----------|------------------------------|
//! | `serve`  | `Serve`, `Init`              |
//! | `scan`   | `Decode`, `Scan`, `Health`   |
//! | `config` | `Config`                     |

pub mod config;
pub mod scan;
pub mod serve;

pub use config::cmd_config;
pub use scan::{cmd_decode, cmd_health, cmd_scan};
pub use serve::{cmd_init, cmd_serve};
