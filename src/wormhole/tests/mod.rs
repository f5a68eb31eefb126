//! Test modules for the wormhole core

mod delivery;
