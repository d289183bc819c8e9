// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! The rule registry: five independent tables keyed by view tag, each an
//! exhaustive match over the closed vocabulary. The four query-building
//! concerns (projection, join key, grouping, aggregation) vary
//! semi-independently across kinds; a map's join key differs between its
//! multi-value and resolved modes while its grouping columns do not, so the
//! tables stay separate.

use viewfold_model::{Kind, ViewTag};

use crate::relation::{ColumnExpr, FoldExpr, JoinKey, SelectItem};

/// One aggregation pass plus the number of leading group columns it retains.
/// Multi-value map modes need two passes per level; keeping the count here
/// keeps that decision in the table instead of the fold loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldStep {
	pub expr: FoldExpr,
	pub retained: usize,
}

fn item(expr: ColumnExpr, alias: String) -> SelectItem {
	SelectItem {
		expr,
		alias,
	}
}

/// Base projection of level `i`. Only the deepest level keeps its
/// behavior-determined value column; for every other level that column is the
/// join key pointing at the next level, not user-visible data.
pub fn base_projection(tag: ViewTag, level: usize, deepest: bool) -> Vec<SelectItem> {
	let mut items = vec![item(
		ColumnExpr::Id {
			level,
		},
		format!("id{level}"),
	)];

	match tag.kind() {
		Kind::Map => {
			items.push(item(
				ColumnExpr::MapKey {
					level,
				},
				format!("key{level}"),
			));
			if deepest {
				items.push(item(
					ColumnExpr::MapValue {
						level,
					},
					format!("value{level}"),
				));
			}
		}
		Kind::List => {
			items.push(item(
				ColumnExpr::Pos {
					level,
				},
				format!("pos{level}"),
			));
			if deepest {
				items.push(item(
					ColumnExpr::Data {
						level,
					},
					"data".to_string(),
				));
			}
		}
		Kind::Set | Kind::Register | Kind::Counter => {
			if deepest {
				items.push(item(
					ColumnExpr::Data {
						level,
					},
					"data".to_string(),
				));
			}
		}
	}

	items
}

/// Expression with which level `level` locates the rows of its child level.
/// `None` for Counter: counters hold scalars, never child references.
pub fn join_key(tag: ViewTag, level: usize) -> Option<JoinKey> {
	match tag {
		ViewTag::Map(_) if tag.is_multi_value() => Some(JoinKey::AnyMapValue {
			level,
		}),
		ViewTag::Map(_) => Some(JoinKey::MapValue {
			level,
		}),
		ViewTag::Register(_) if tag.is_multi_value() => Some(JoinKey::AnyData {
			level,
		}),
		ViewTag::Register(_) | ViewTag::Set(_) | ViewTag::List => Some(JoinKey::Data {
			level,
		}),
		ViewTag::Counter => None,
	}
}

/// Columns of level `level` that must survive every fold as grouping keys.
pub fn group_columns(tag: ViewTag, level: usize) -> Vec<String> {
	let mut columns = vec![format!("id{level}")];
	match tag.kind() {
		Kind::Map => columns.push(format!("key{level}")),
		Kind::List => columns.push(format!("pos{level}")),
		Kind::Set | Kind::Register | Kind::Counter => {}
	}

	columns
}

/// Aggregation passes collapsing one level into its parent of kind `tag`.
/// `columns` is the grouping prefix of all shallower levels followed by the
/// current `data` column.
pub fn fold_steps(tag: ViewTag, columns: &[String]) -> Vec<FoldStep> {
	let len = columns.len();
	match tag {
		// Multi-value maps fold twice: first collect the concurrent values
		// of each key into an array, then fold (key, array) pairs into one
		// mapping value.
		ViewTag::Map(_) if tag.is_multi_value() => vec![
			FoldStep {
				expr: FoldExpr::ArrayAgg {
					input: columns[len - 1].clone(),
					order_by: None,
				},
				retained: len - 1,
			},
			FoldStep {
				expr: FoldExpr::ObjectAgg {
					key: columns[len - 2].clone(),
					value: columns[len - 1].clone(),
				},
				retained: len - 2,
			},
		],
		ViewTag::Map(_) => vec![FoldStep {
			expr: FoldExpr::ObjectAgg {
				key: columns[len - 2].clone(),
				value: columns[len - 1].clone(),
			},
			retained: len - 2,
		}],
		ViewTag::Set(_) => vec![FoldStep {
			expr: FoldExpr::ArrayAgg {
				input: columns[len - 1].clone(),
				order_by: None,
			},
			retained: len - 1,
		}],
		ViewTag::Register(_) if tag.is_multi_value() => vec![FoldStep {
			expr: FoldExpr::ArrayAgg {
				input: columns[len - 1].clone(),
				order_by: None,
			},
			retained: len - 1,
		}],
		// The value is already unique per parent row; a single-row pick-first
		// keeps the fold shape uniform in case of upstream anomalies.
		ViewTag::Register(_) => vec![FoldStep {
			expr: FoldExpr::PickFirst {
				input: columns[len - 1].clone(),
			},
			retained: len - 1,
		}],
		ViewTag::List => vec![FoldStep {
			expr: FoldExpr::ArrayAgg {
				input: columns[len - 1].clone(),
				order_by: Some(columns[len - 2].clone()),
			},
			retained: len - 2,
		}],
		// A counter is always a leaf; a validated path never folds onto one.
		ViewTag::Counter => vec![],
	}
}

/// Extra fold applied before the per-level folds when the deepest view is
/// itself a multi-element container: its raw rows must first collapse into a
/// single value per parent key. Registers and counters are already
/// single-valued per row and skip this.
pub fn root_fold(tag: ViewTag, level: usize) -> Option<FoldExpr> {
	match tag.kind() {
		Kind::Map => Some(FoldExpr::ObjectAgg {
			key: format!("key{level}"),
			value: format!("value{level}"),
		}),
		Kind::List => Some(FoldExpr::ArrayAgg {
			input: "data".to_string(),
			order_by: Some(format!("pos{level}")),
		}),
		Kind::Set => Some(FoldExpr::ArrayAgg {
			input: "data".to_string(),
			order_by: None,
		}),
		Kind::Register | Kind::Counter => None,
	}
}

#[cfg(test)]
mod tests {
	use viewfold_model::{MapMode, RegisterMode, SetMode};

	use super::*;

	#[test]
	fn test_base_projection_map_deepest_keeps_value() {
		let items = base_projection(ViewTag::Map(MapMode::AwLww), 1, true);
		let aliases: Vec<&str> = items.iter().map(|i| i.alias.as_str()).collect();
		assert_eq!(aliases, ["id1", "key1", "value1"]);
	}

	#[test]
	fn test_base_projection_drops_value_of_inner_levels() {
		let map = base_projection(ViewTag::Map(MapMode::AwLww), 0, false);
		assert_eq!(map.iter().map(|i| i.alias.as_str()).collect::<Vec<_>>(), ["id0", "key0"]);

		let list = base_projection(ViewTag::List, 2, false);
		assert_eq!(list.iter().map(|i| i.alias.as_str()).collect::<Vec<_>>(), ["id2", "pos2"]);

		let set = base_projection(ViewTag::Set(SetMode::Rw), 1, false);
		assert_eq!(set.iter().map(|i| i.alias.as_str()).collect::<Vec<_>>(), ["id1"]);
	}

	#[test]
	fn test_join_keys_per_mode() {
		assert_eq!(
			join_key(ViewTag::Map(MapMode::AwMvr), 0),
			Some(JoinKey::AnyMapValue {
				level: 0
			})
		);
		assert_eq!(
			join_key(ViewTag::Map(MapMode::Lww), 0),
			Some(JoinKey::MapValue {
				level: 0
			})
		);
		assert_eq!(
			join_key(ViewTag::Register(RegisterMode::Mvr), 1),
			Some(JoinKey::AnyData {
				level: 1
			})
		);
		assert_eq!(
			join_key(ViewTag::List, 2),
			Some(JoinKey::Data {
				level: 2
			})
		);
		assert_eq!(join_key(ViewTag::Counter, 3), None);
	}

	#[test]
	fn test_multi_value_map_folds_twice() {
		let columns = ["id0", "key0", "data"].map(String::from);
		let steps = fold_steps(ViewTag::Map(MapMode::RwMvr), &columns);
		assert_eq!(steps.len(), 2);
		assert_eq!(
			steps[0],
			FoldStep {
				expr: FoldExpr::ArrayAgg {
					input: "data".to_string(),
					order_by: None
				},
				retained: 2,
			}
		);
		assert_eq!(
			steps[1],
			FoldStep {
				expr: FoldExpr::ObjectAgg {
					key: "key0".to_string(),
					value: "data".to_string()
				},
				retained: 1,
			}
		);
	}

	#[test]
	fn test_list_fold_orders_by_position() {
		let columns = ["id0", "pos0", "data"].map(String::from);
		let steps = fold_steps(ViewTag::List, &columns);
		assert_eq!(steps.len(), 1);
		assert_eq!(
			steps[0],
			FoldStep {
				expr: FoldExpr::ArrayAgg {
					input: "data".to_string(),
					order_by: Some("pos0".to_string())
				},
				retained: 1,
			}
		);
	}

	#[test]
	fn test_root_fold_only_for_containers() {
		assert!(root_fold(ViewTag::Map(MapMode::AwMvr), 1).is_some());
		assert!(root_fold(ViewTag::Set(SetMode::Lww), 1).is_some());
		assert!(root_fold(ViewTag::List, 1).is_some());
		assert!(root_fold(ViewTag::Register(RegisterMode::Mvr), 1).is_none());
		assert!(root_fold(ViewTag::Counter, 1).is_none());
	}
}
