//! # Driver Events Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Simulated producers and recording listeners
//! └── integration/
//!     ├── dispatch.rs   # Delivery, ordering and failure contracts
//!     ├── concurrency.rs# Parallel subscribe/publish
//!     └── telemetry.rs  # Logging and metrics observers end to end
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p driver-tests
//!
//! # By category
//! cargo test -p driver-tests integration::concurrency::
//!
//! # Benchmarks
//! cargo bench -p driver-tests
//! ```

pub mod fixtures;
