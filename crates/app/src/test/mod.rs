//! Shared fixtures for service integration tests.

mod db;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
