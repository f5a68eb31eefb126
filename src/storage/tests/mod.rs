//! Test modules for the storage layer
