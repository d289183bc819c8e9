// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Compiles a nesting chain of flat container views into one SQL query that
//! materializes a nested JSON document per top-level identifier.
//!
//! The pipeline is: rule lookup per view tag → base relation (correlated
//! lateral joins + projection) → optional root aggregation when the deepest
//! view is itself a multi-element container → one aggregation fold per level,
//! deepest to shallowest → final rename to `(id, data)`. Intermediate results
//! are an explicit relational fragment tree ([`relation::Relation`]);
//! serialization to SQL happens in a single final pass ([`render`]).

pub mod compile;
pub mod relation;
pub mod render;
pub mod rules;

pub use compile::{Options, compile, compile_rooted, compile_sql};
