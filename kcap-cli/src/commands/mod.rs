//! Command implementations for the kcap CLI.

pub mod extract;
pub mod info;
pub mod list;
pub mod test;

pub use extract::{ExtractOptions, cmd_extract};
pub use info::cmd_info;
pub use list::{ListOptions, cmd_list};
pub use test::cmd_test;
