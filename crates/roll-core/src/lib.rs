//! # roll-core
//!
//! Core types, ID prefixes, and error types for Rollcall.
//!
//! This crate provides the foundational types shared across all Rollcall
//! crates:
//! - Entity structs for the domain objects (teachers, classes, subject
//!   assignments, attendance records, audit records)
//! - Action and status enums
//! - ID prefix constants
//! - Cross-cutting error types
//! - Typed audit detail payloads

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;
