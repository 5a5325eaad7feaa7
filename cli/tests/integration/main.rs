//! Integration tests for the shaddox CLI
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every test points `SHADDOX_CONFIG` at a temp file so the user's own
//! configuration is never read or written.
