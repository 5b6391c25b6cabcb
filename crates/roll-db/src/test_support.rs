//! Shared test utilities for roll-db tests.
