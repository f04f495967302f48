//! Shared core of the velocipher cipher families.
//!
//! Every cipher family (ChaCha, Salsa, Threefish) ships several
//! interchangeable backends. A backend is identified by a [`Strategy`], and
//! each family owns one process-wide [`StrategyCache`] which probes the CPU
//! on first use, ranks the supported strategies by [`Strategy::priority`]
//! and remembers the winner for the lifetime of the process.
//!
//! The [`endian`] module holds the little-endian word conversions all of
//! the cipher states are built from.
//!
//! # Configuration
//!
//! Dispatch can be restricted at compile time with `RUSTFLAGS`:
//!
//! - `--cfg velocipher_force_soft`: only the portable backend is used.
//! - `--cfg velocipher_backend="sse2"` (or `"avx2"`, `"neon"`, `"soft"`):
//!   only the named backend and the portable fallback are considered.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

pub mod endian;
mod strategy;

pub use strategy::{Strategy, StrategyCache, UnsupportedStrategy};
