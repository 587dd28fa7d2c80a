// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session replay test utilities
//!
//! Every test annotated with [`logged_test`] or [`logged_tokio_test`] writes
//! its diagnostics to a unique file under `target/test-logs/<date>/`. Passing
//! tests print a single line; failing tests print the log path and size so
//! the full trace can be opened directly.

pub mod guard;
pub mod logging;

pub use guard::TestLoggerGuard;
pub use logging::{TestLogError, TestLogger, create_unique_test_log};
pub use sr_test_utils_macros::{logged_test, logged_tokio_test};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_unique_log_paths_do_not_collide() {
        let first = create_unique_test_log("collide_check");
        let second = create_unique_test_log("collide_check");
        assert_ne!(first, second);
        assert!(first.parent().unwrap().exists());

        fs::write(&first, "a").unwrap();
        fs::write(&second, "b").unwrap();
        assert_eq!(fs::read_to_string(&first).unwrap(), "a");
        assert_eq!(fs::read_to_string(&second).unwrap(), "b");

        fs::remove_file(&first).unwrap();
        fs::remove_file(&second).unwrap();
    }

    #[test]
    fn test_guard_finishes_successfully() {
        let mut guard = TestLoggerGuard::new("guard_finishes_successfully").unwrap();
        guard.logger().log("seeking to 250ms").unwrap();
        guard.logger().log_debug("frame", &(250u64, "hydrated")).unwrap();
        let path = guard.finish_success().unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert!(content.contains("seeking to 250ms"));
        assert!(content.contains("completed successfully"));
    }
}
