//! Test modules for the queue layer

mod edge_cases;
