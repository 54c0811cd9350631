//! SnapDB Integration Test Suite
//!
//! End-to-end tests through the public `snapdb` API:
//!
//! - **persistence**: commit, reopen, corruption handling, atomic replace
//! - **commits**: async commits, listeners, close semantics
//! - **queries**: read-only queries over mixed contents
//! - **type_guards**: value classification and kind checks
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test integration
//! ```

mod test_utils;

mod persistence;
mod queries;
mod type_guards;
