//! End-to-end integration tests for the Nova codec
//!
//! The tests in this crate drive the codec, the primitives and the vector
//! generator together: signed transactions carried in blocks, commitments
//! chained across slots, and output-ID proofs checked against the outputs
//! they were built from.

#![forbid(unsafe_code)]
