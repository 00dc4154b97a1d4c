#![allow(unused_imports)]

pub use collector_launcher_test_utils::builders::LaunchSettingsBuilder;
pub use collector_launcher_test_utils::fakes;
pub use collector_launcher_test_utils::{init_tracing, shell_payload, with_timeout, write_script};
