//! Unit test suite entry point.
