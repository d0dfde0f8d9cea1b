//! End-to-end tests - pagination driven through an in-memory query engine
//!
//! These tests exercise the whole stack: options validation, augmentation,
//! count execution, limit/offset execution and envelope assembly.

mod pagination_tests;
