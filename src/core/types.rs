/*!
 * Core Types
 * Common types used across the crate
 */

/// Process ID type (OS-level pid of a spawned child)
pub type Pid = u32;

/// Exit code passed to completion handlers
///
/// Normal termination yields the process exit code. Death by signal is
/// reported as `128 + signo`, the shell convention.
pub type ExitCode = i32;
