//! Test utilities shared by unit and integration tests.
//!
//! The helpers write executable stubs and fake compilers so toolchain
//! discovery can be exercised without a real compiler installation.

pub mod exec;

pub use exec::{fake_compiler, write_exec};
