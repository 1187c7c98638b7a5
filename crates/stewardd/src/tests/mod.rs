//! Test suites for the supervisor bootstrap and runtime loop.

pub(crate) mod support;
