//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module    | Commands handled |
//! |-----------|------------------|
//! | `play`    | `Play`           |
//! | `list`    | `List`           |
//! | `project` | `Init`           |
//! | `config`  | `Config`         |

pub mod config;
pub mod list;
pub mod play;
pub mod project;

pub use config::cmd_config;
pub use list::cmd_list;
pub use play::cmd_play;
pub use project::cmd_init;
