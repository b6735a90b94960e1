pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{assert_profile, expect_json, session_cookie_pair, session_set_cookie};
#[allow(unused_imports)]
pub use setup::{TestApp, TestAppBuilder};
