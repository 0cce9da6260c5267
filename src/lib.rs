//! Boardkit - Ordered Widget Store with Rate Limiting
//!
//! This crate implements an in-memory store of widgets ordered by a unique
//! z-index (rank), together with a fixed-window rate limiter that gates
//! access to the store's operations. Both are safe to share across threads.
//!
//! The store keeps two coupled indexes (by identity and by rank) that are
//! always mutated inside a single critical section, under one of three
//! interchangeable locking strategies selected at construction time.

pub mod config;
pub mod error;
pub mod pagination;
pub mod ratelimit;
pub mod sync;
pub mod widget;
