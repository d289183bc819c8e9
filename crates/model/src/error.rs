// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	/// A raw tag matched no view of the closed vocabulary. The position is
	/// carried when the tag was resolved as part of a path.
	#[error("{}", unresolved_view_message(.tag, .position))]
	UnresolvedView {
		tag: String,
		position: Option<usize>,
	},

	#[error("path must contain at least one view")]
	EmptyPath,

	/// Counters hold scalar values, never references to child entities, so a
	/// Counter view is only valid at the deepest level of a path.
	#[error("Counter at path position {position} cannot have children")]
	CounterWithChildren {
		position: usize,
	},
}

fn unresolved_view_message(tag: &str, position: &Option<usize>) -> String {
	match position {
		Some(position) => format!("unknown view '{tag}' at path position {position}"),
		None => format!("unknown view '{tag}'"),
	}
}
