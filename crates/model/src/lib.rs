// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Closed vocabulary of replicated container views and the nesting paths
//! accepted by the query compiler.

pub mod error;
pub mod path;
pub mod tag;

pub use error::Error;
pub use path::Path;
pub use tag::{Kind, MapMode, RegisterMode, SetMode, ViewTag};

pub type Result<T> = std::result::Result<T, Error>;
