//! Single-level cache tests.
