//! Property-based tests

mod queue_order;
