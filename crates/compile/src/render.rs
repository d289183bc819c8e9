// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Single serialization pass from the relational fragment tree to SQL text.
//!
//! Every join after the first renders as a correlated lateral subquery with
//! an `OFFSET 0` barrier. The per-level views are themselves built from
//! aggregations and filters, so without the barrier the planner tends to
//! materialize each view in full and join the results in bulk, which defeats
//! any selectivity a filter on the outermost level provides. The barrier
//! pins a nested-loop strategy that pushes the parent's identifier into an
//! index lookup on the child view.

use crate::relation::{ColumnExpr, FoldExpr, JoinKey, Relation, SelectItem};

pub fn render(relation: &Relation) -> String {
	match relation {
		Relation::Join {
			levels,
			projection,
		} => {
			let items: Vec<String> = projection.iter().map(render_select_item).collect();

			let mut lines = vec![format!("{} AS t0", levels[0].view)];
			for (i, level) in levels.iter().enumerate().skip(1) {
				let key = level.parent_key.as_ref().expect("deeper levels carry a parent key");
				lines.push(format!(
					"(SELECT * FROM {} WHERE id = {} OFFSET 0) AS t{}",
					level.view,
					render_join_key(key),
					i
				));
			}

			format!("SELECT {}\nFROM {}", items.join(", "), lines.join(",\nLATERAL "))
		}
		Relation::Fold {
			input,
			group,
			step,
		} => {
			let mut items = group.clone();
			items.push(format!("{} AS data", render_fold_expr(step)));
			let ordinals: Vec<String> = (1..=group.len()).map(|i| i.to_string()).collect();

			format!(
				"SELECT {}\nFROM (\n  {}\n) t\nGROUP BY {}",
				items.join(", "),
				indent(&render(input)),
				ordinals.join(", ")
			)
		}
		Relation::Wrap {
			input,
			root_filter,
		} => {
			let mut query = format!("SELECT id0 AS id, data\nFROM (\n  {}\n) t", indent(&render(input)));
			if let Some(root) = root_filter {
				// The alias `id` is not visible to WHERE; filter on the
				// wrapped relation's own column.
				query.push_str(&format!("\nWHERE id0 = '{}'", root.replace('\'', "''")));
			}

			query
		}
	}
}

/// Collapse all whitespace runs into single spaces. Cosmetic only.
pub fn render_inline(relation: &Relation) -> String {
	render(relation).split_whitespace().collect::<Vec<_>>().join(" ")
}

// Re-indent a nested query by two spaces; the caller supplies the first
// line's indentation.
fn indent(query: &str) -> String {
	query.split('\n').collect::<Vec<_>>().join("\n  ")
}

fn render_select_item(item: &SelectItem) -> String {
	format!("{} AS {}", render_column_expr(&item.expr), item.alias)
}

fn render_column_expr(expr: &ColumnExpr) -> String {
	match expr {
		ColumnExpr::Id {
			level,
		} => format!("t{level}.id"),
		ColumnExpr::Data {
			level,
		} => format!("t{level}.data"),
		ColumnExpr::MapKey {
			level,
		} => format!("(t{level}.data).key"),
		ColumnExpr::MapValue {
			level,
		} => format!("(t{level}.data).value"),
		ColumnExpr::Pos {
			level,
		} => format!("t{level}.pos"),
	}
}

fn render_join_key(key: &JoinKey) -> String {
	match key {
		JoinKey::Data {
			level,
		} => format!("t{level}.data"),
		JoinKey::MapValue {
			level,
		} => format!("(t{level}.data).value"),
		JoinKey::AnyData {
			level,
		} => format!("any(t{level}.data)"),
		JoinKey::AnyMapValue {
			level,
		} => format!("any((t{level}.data).value)"),
	}
}

fn render_fold_expr(expr: &FoldExpr) -> String {
	match expr {
		FoldExpr::ArrayAgg {
			input,
			order_by: None,
		} => format!("jsonb_agg({input})"),
		FoldExpr::ArrayAgg {
			input,
			order_by: Some(order),
		} => format!("jsonb_agg({input} ORDER BY {order})"),
		FoldExpr::ObjectAgg {
			key,
			value,
		} => format!("jsonb_object_agg({key}, {value})"),
		FoldExpr::PickFirst {
			input,
		} => format!("(array_agg({input}))[1]"),
	}
}
