// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Relational fragment tree carried between compilation stages. Nodes hold
//! their column lists and grouping structure; nothing here is SQL text.

use viewfold_model::ViewTag;

/// A column of one per-level view, before aliasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnExpr {
	/// `t{level}.id`
	Id {
		level: usize,
	},
	/// `t{level}.data`, the element/value/scalar column of non-map views
	Data {
		level: usize,
	},
	/// `(t{level}.data).key`; map views expose a composite data column
	MapKey {
		level: usize,
	},
	/// `(t{level}.data).value`
	MapValue {
		level: usize,
	},
	/// `t{level}.pos`; list views carry an ordering position
	Pos {
		level: usize,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
	pub expr: ColumnExpr,
	pub alias: String,
}

/// Expression locating the rows of level `level + 1` from a row of `level`.
/// Multi-value views hold arrays, so their keys are membership tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKey {
	/// `t{level}.data`
	Data {
		level: usize,
	},
	/// `(t{level}.data).value`
	MapValue {
		level: usize,
	},
	/// `any(t{level}.data)`
	AnyData {
		level: usize,
	},
	/// `any((t{level}.data).value)`
	AnyMapValue {
		level: usize,
	},
}

/// One aggregation operation of a fold layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoldExpr {
	/// `jsonb_agg(input [ORDER BY order_by])`
	ArrayAgg {
		input: String,
		order_by: Option<String>,
	},
	/// `jsonb_object_agg(key, value)`
	ObjectAgg {
		key: String,
		value: String,
	},
	/// `(array_agg(input))[1]`, a pass-through for already-unique values
	PickFirst {
		input: String,
	},
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinLevel {
	pub view: ViewTag,
	/// Join-key expression of the parent level; `None` only at level 0.
	pub parent_key: Option<JoinKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
	/// The flat base relation: level 0 unconditioned, every deeper level a
	/// correlated lateral subquery keyed on its parent.
	Join {
		levels: Vec<JoinLevel>,
		projection: Vec<SelectItem>,
	},
	/// One derived aggregation layer. Output columns are exactly
	/// `group ++ ["data"]`; `group` must be a subset of the input's columns
	/// so that identifying columns of shallower levels survive every fold.
	Fold {
		input: Box<Relation>,
		group: Vec<String>,
		step: FoldExpr,
	},
	/// Final layer renaming the level-0 identifier to the public `id`,
	/// optionally restricted to one root identifier.
	Wrap {
		input: Box<Relation>,
		root_filter: Option<String>,
	},
}

impl Relation {
	/// Output column names, in projection order.
	pub fn columns(&self) -> Vec<String> {
		match self {
			Relation::Join {
				projection,
				..
			} => projection.iter().map(|item| item.alias.clone()).collect(),
			Relation::Fold {
				group,
				..
			} => {
				let mut columns = group.clone();
				columns.push("data".to_string());
				columns
			}
			Relation::Wrap {
				..
			} => vec!["id".to_string(), "data".to_string()],
		}
	}
}

#[cfg(test)]
mod tests {
	use viewfold_model::Path;

	use super::*;
	use crate::compile::compile;

	/// Every fold must find its grouping columns in the layer below it, so
	/// the identifying columns of shallower levels survive to the top.
	#[test]
	fn test_folds_retain_shallower_group_columns() {
		let path = Path::parse(&["MapAwMvr", "List", "SetAw", "Counter"]).unwrap();
		let mut relation = compile(&path);

		loop {
			match relation {
				Relation::Wrap {
					input,
					..
				} => relation = *input,
				Relation::Fold {
					input,
					group,
					..
				} => {
					let inner = input.columns();
					for column in &group {
						assert!(inner.contains(column), "{column} lost by a fold over {inner:?}");
					}
					relation = *input;
				}
				Relation::Join {
					..
				} => break,
			}
		}
	}
}
