//! Tests for the dispatcher and scenario layer
//!
//! - `dispatcher` - Background execution, latest-request-wins, cancellation
//! - `scenarios` - Scenario book, persistence records and scenario files
