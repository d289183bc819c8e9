// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Direct evaluator for compiled relation trees. Joins run as nested loops
//! honoring the membership semantics of `any(...)` keys; folds group rows
//! and aggregate per fold expression. This is the second backend the
//! relational fragment tree admits besides the SQL renderer, and what the
//! round-trip testsuite runs against.

use serde_json::{Map as JsonMap, Value};
use viewfold_compile::relation::{ColumnExpr, FoldExpr, JoinKey, JoinLevel, Relation, SelectItem};

use crate::store::{ScanRow, Store};

/// Execute a compiled relation against a store, returning one `(id, data)`
/// pair per surviving row of the final layer.
pub fn evaluate(relation: &Relation, store: &Store) -> Vec<(String, Value)> {
	let table = eval(relation, store);
	table.rows
		.into_iter()
		.map(|mut row| {
			let data = row.pop().unwrap();
			let id = match row.pop().unwrap() {
				Value::String(id) => id,
				other => other.to_string(),
			};
			(id, data)
		})
		.collect()
}

struct Table {
	columns: Vec<String>,
	rows: Vec<Vec<Value>>,
}

impl Table {
	fn column(&self, name: &str) -> usize {
		self.columns
			.iter()
			.position(|c| c == name)
			.unwrap_or_else(|| panic!("column {name} not in {:?}", self.columns))
	}
}

fn eval(relation: &Relation, store: &Store) -> Table {
	match relation {
		Relation::Join {
			levels,
			projection,
		} => eval_join(levels, projection, store),
		Relation::Fold {
			input,
			group,
			step,
		} => eval_fold(eval(input, store), group, step),
		Relation::Wrap {
			input,
			root_filter,
		} => eval_wrap(eval(input, store), root_filter.as_deref()),
	}
}

fn eval_join(levels: &[JoinLevel], projection: &[SelectItem], store: &Store) -> Table {
	// Chains of one scan row per level, extended level by level.
	let mut chains: Vec<Vec<ScanRow>> = store.scan(levels[0].view).into_iter().map(|row| vec![row]).collect();

	for level in &levels[1..] {
		let key = level.parent_key.as_ref().expect("deeper levels carry a parent key");
		let children = store.scan(level.view);

		let mut extended = Vec::new();
		for chain in &chains {
			for child in &children {
				if key_matches(key, chain, &child.id) {
					let mut next = chain.clone();
					next.push(child.clone());
					extended.push(next);
				}
			}
		}
		chains = extended;
	}

	let columns = projection.iter().map(|item| item.alias.clone()).collect();
	let rows = chains
		.iter()
		.map(|chain| projection.iter().map(|item| eval_column(&item.expr, chain)).collect())
		.collect();

	Table {
		columns,
		rows,
	}
}

fn key_matches(key: &JoinKey, chain: &[ScanRow], child_id: &str) -> bool {
	let parent = |level: usize| &chain[level];
	match key {
		// The value of a resolved view is the child id itself.
		JoinKey::Data {
			level,
		}
		| JoinKey::MapValue {
			level,
		} => parent(*level).data == Value::String(child_id.to_string()),
		// Multi-value views hold every concurrent child id; the join is a
		// membership test.
		JoinKey::AnyData {
			level,
		}
		| JoinKey::AnyMapValue {
			level,
		} => match &parent(*level).data {
			Value::Array(ids) => ids.iter().any(|id| id == child_id),
			_ => false,
		},
	}
}

fn eval_column(expr: &ColumnExpr, chain: &[ScanRow]) -> Value {
	match expr {
		ColumnExpr::Id {
			level,
		} => Value::String(chain[*level].id.clone()),
		ColumnExpr::Data {
			level,
		}
		| ColumnExpr::MapValue {
			level,
		} => chain[*level].data.clone(),
		ColumnExpr::MapKey {
			level,
		} => Value::String(chain[*level].key.clone().expect("map rows carry a key")),
		ColumnExpr::Pos {
			level,
		} => Value::from(chain[*level].pos.expect("list rows carry a position")),
	}
}

fn eval_fold(input: Table, group: &[String], step: &FoldExpr) -> Table {
	let group_indexes: Vec<usize> = group.iter().map(|name| input.column(name)).collect();

	// Buckets keyed by grouping values, in first-seen order.
	let mut keys: Vec<Vec<Value>> = Vec::new();
	let mut buckets: Vec<Vec<&Vec<Value>>> = Vec::new();
	for row in &input.rows {
		let key: Vec<Value> = group_indexes.iter().map(|&i| row[i].clone()).collect();
		match keys.iter().position(|k| *k == key) {
			Some(at) => buckets[at].push(row),
			None => {
				keys.push(key);
				buckets.push(vec![row]);
			}
		}
	}

	let rows = keys
		.into_iter()
		.zip(buckets)
		.map(|(mut key, bucket)| {
			key.push(aggregate(&input, &bucket, step));
			key
		})
		.collect();

	let mut columns: Vec<String> = group.to_vec();
	columns.push("data".to_string());

	Table {
		columns,
		rows,
	}
}

fn aggregate(input: &Table, bucket: &[&Vec<Value>], step: &FoldExpr) -> Value {
	match step {
		FoldExpr::ArrayAgg {
			input: value,
			order_by,
		} => {
			let value_at = input.column(value);
			match order_by {
				Some(order) => {
					let order_at = input.column(order);
					let mut items: Vec<(i64, Value)> = bucket
						.iter()
						.map(|row| (row[order_at].as_i64().expect("order column is numeric"), row[value_at].clone()))
						.collect();
					items.sort_by_key(|(pos, _)| *pos);
					Value::Array(items.into_iter().map(|(_, value)| value).collect())
				}
				None => Value::Array(bucket.iter().map(|row| row[value_at].clone()).collect()),
			}
		}
		FoldExpr::ObjectAgg {
			key,
			value,
		} => {
			let key_at = input.column(key);
			let value_at = input.column(value);
			let mut object = JsonMap::new();
			for row in bucket {
				let key = match &row[key_at] {
					Value::String(key) => key.clone(),
					other => other.to_string(),
				};
				object.insert(key, row[value_at].clone());
			}
			Value::Object(object)
		}
		FoldExpr::PickFirst {
			input: value,
		} => {
			let value_at = input.column(value);
			bucket[0][value_at].clone()
		}
	}
}

fn eval_wrap(input: Table, root_filter: Option<&str>) -> Table {
	let id_at = input.column("id0");
	let data_at = input.column("data");

	let rows = input
		.rows
		.iter()
		.filter(|row| match root_filter {
			Some(root) => row[id_at] == Value::String(root.to_string()),
			None => true,
		})
		.map(|row| vec![row[id_at].clone(), row[data_at].clone()])
		.collect();

	Table {
		columns: vec!["id".to_string(), "data".to_string()],
		rows,
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;
	use viewfold_compile::compile_rooted;
	use viewfold_model::Path;

	use super::*;

	#[test]
	fn test_depth_one_counter() {
		let mut store = Store::new();
		store.counter_inc("c-0", 41);
		store.counter_inc("c-0", 1);

		let path = Path::parse(&["Counter"]).unwrap();
		let rows = evaluate(&compile_rooted(&path, None), &store);
		assert_eq!(rows, vec![("c-0".to_string(), json!(42))]);
	}

	#[test]
	fn test_set_of_counters() {
		let mut store = Store::new();
		store.set_add("s-0", "c-1");
		store.set_add("s-0", "c-2");
		store.counter_inc("c-1", 10);
		store.counter_inc("c-2", 20);

		let path = Path::parse(&["SetAw", "Counter"]).unwrap();
		let rows = evaluate(&compile_rooted(&path, Some("s-0")), &store);
		assert_eq!(rows, vec![("s-0".to_string(), json!([10, 20]))]);
	}

	#[test]
	fn test_root_filter_drops_other_roots() {
		let mut store = Store::new();
		store.set_add("s-0", "c-1");
		store.set_add("s-1", "c-2");
		store.counter_inc("c-1", 1);
		store.counter_inc("c-2", 2);

		let path = Path::parse(&["SetAw", "Counter"]).unwrap();
		let rows = evaluate(&compile_rooted(&path, Some("s-1")), &store);
		assert_eq!(rows, vec![("s-1".to_string(), json!([2]))]);
	}

	#[test]
	fn test_multi_value_register_membership_join() {
		let mut store = Store::new();
		store.register_set("r-0", "c-1");
		store.register_set_concurrent("r-0", "c-2");
		store.counter_inc("c-1", 5);
		store.counter_inc("c-2", 7);

		let path = Path::parse(&["RegisterMvr", "Counter"]).unwrap();
		let rows = evaluate(&compile_rooted(&path, None), &store);
		assert_eq!(rows, vec![("r-0".to_string(), json!([5, 7]))]);
	}

	#[test]
	fn test_parents_without_children_vanish() {
		let mut store = Store::new();
		store.set_add("s-0", "c-1");

		let path = Path::parse(&["SetAw", "Counter"]).unwrap();
		let rows = evaluate(&compile_rooted(&path, None), &store);
		assert!(rows.is_empty());
	}
}
