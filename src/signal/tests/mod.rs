//! Test modules for the signal layer
