//! Build-time test-double generation for Kotlin type contracts.
//!
//! A batch of declaration documents flows through analysis into an
//! immutable structural model, gets fingerprinted for the generation
//! cache, has its generic parameters resolved to a representation
//! strategy, and comes out as compilable Kotlin fakes: a synthetic
//! implementation, a configuration builder, and a factory per
//! declaration.

pub mod cache;
pub mod defaults;
pub mod emit;
pub mod error;
pub mod generics;
pub mod model;
pub mod pipeline;
pub mod signature;
