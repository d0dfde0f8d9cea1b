//! Integration tests - full augmentation runs against a catalog fixture
//!
//! These tests assert complete composed query texts and parameter bindings.
