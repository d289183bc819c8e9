// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! In-memory stand-in for the storage engine. Writes go through the same
//! update operations the engine exposes; reads derive each per-level view on
//! the fly. Conflict resolution happens here, upstream of the compiled
//! query: last-writer-wins variants read the latest write, multi-value
//! variants read every concurrent write as an array, counters sum their
//! increments.

use std::collections::BTreeMap;

use serde_json::{Value, json};
use viewfold_model::{Kind, ViewTag};

/// One row of a per-level view. `key` is set for map views, `pos` for list
/// views; `data` holds the element / value / scalar (an array for
/// multi-value views).
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
	pub id: String,
	pub key: Option<String>,
	pub pos: Option<i64>,
	pub data: Value,
}

impl ScanRow {
	fn new(id: &str, data: Value) -> Self {
		Self {
			id: id.to_string(),
			key: None,
			pos: None,
			data,
		}
	}
}

#[derive(Debug, Clone, Default)]
struct MapSlot {
	key: String,
	/// Concurrent values for the key, oldest first. A causally-newer put
	/// replaces all of them.
	values: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Store {
	counters: BTreeMap<String, i64>,
	registers: BTreeMap<String, Vec<String>>,
	sets: BTreeMap<String, Vec<String>>,
	maps: BTreeMap<String, Vec<MapSlot>>,
	lists: BTreeMap<String, Vec<(i64, String)>>,
}

impl Store {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn counter_inc(&mut self, id: &str, delta: i64) {
		*self.counters.entry(id.to_string()).or_insert(0) += delta;
	}

	/// A causally-newer write: replaces every previous value.
	pub fn register_set(&mut self, id: &str, value: &str) {
		self.registers.insert(id.to_string(), vec![value.to_string()]);
	}

	/// A write concurrent with the existing ones: all of them survive until
	/// the next causally-newer write.
	pub fn register_set_concurrent(&mut self, id: &str, value: &str) {
		self.registers.entry(id.to_string()).or_default().push(value.to_string());
	}

	pub fn set_add(&mut self, id: &str, element: &str) {
		let elements = self.sets.entry(id.to_string()).or_default();
		if !elements.iter().any(|e| e == element) {
			elements.push(element.to_string());
		}
	}

	pub fn map_put(&mut self, id: &str, key: &str, value: &str) {
		let slots = self.maps.entry(id.to_string()).or_default();
		match slots.iter_mut().find(|slot| slot.key == key) {
			Some(slot) => slot.values = vec![value.to_string()],
			None => slots.push(MapSlot {
				key: key.to_string(),
				values: vec![value.to_string()],
			}),
		}
	}

	pub fn map_put_concurrent(&mut self, id: &str, key: &str, value: &str) {
		let slots = self.maps.entry(id.to_string()).or_default();
		match slots.iter_mut().find(|slot| slot.key == key) {
			Some(slot) => slot.values.push(value.to_string()),
			None => slots.push(MapSlot {
				key: key.to_string(),
				values: vec![value.to_string()],
			}),
		}
	}

	pub fn list_insert(&mut self, id: &str, pos: i64, value: &str) {
		self.lists.entry(id.to_string()).or_default().push((pos, value.to_string()));
	}

	pub fn list_append(&mut self, id: &str, value: &str) {
		let slots = self.lists.entry(id.to_string()).or_default();
		let pos = slots.iter().map(|(pos, _)| pos + 1).max().unwrap_or(0);
		slots.push((pos, value.to_string()));
	}

	/// Derive the rows of one read view.
	pub fn scan(&self, view: ViewTag) -> Vec<ScanRow> {
		match view.kind() {
			Kind::Counter => self.counters.iter().map(|(id, value)| ScanRow::new(id, json!(value))).collect(),
			Kind::Register => self
				.registers
				.iter()
				.filter(|(_, values)| !values.is_empty())
				.map(|(id, values)| {
					let data = if view.is_multi_value() {
						json!(values)
					} else {
						json!(values.last().unwrap())
					};
					ScanRow::new(id, data)
				})
				.collect(),
			Kind::Set => self
				.sets
				.iter()
				.flat_map(|(id, elements)| elements.iter().map(|e| ScanRow::new(id, json!(e))))
				.collect(),
			Kind::Map => self
				.maps
				.iter()
				.flat_map(|(id, slots)| {
					slots.iter().filter(|slot| !slot.values.is_empty()).map(|slot| {
						let data = if view.is_multi_value() {
							json!(slot.values)
						} else {
							json!(slot.values.last().unwrap())
						};
						ScanRow {
							id: id.clone(),
							key: Some(slot.key.clone()),
							pos: None,
							data,
						}
					})
				})
				.collect(),
			Kind::List => self
				.lists
				.iter()
				.flat_map(|(id, slots)| {
					slots.iter().map(|(pos, value)| ScanRow {
						id: id.clone(),
						key: None,
						pos: Some(*pos),
						data: json!(value),
					})
				})
				.collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use viewfold_model::{MapMode, RegisterMode, SetMode};

	use super::*;

	#[test]
	fn test_register_views_resolve_per_mode() {
		let mut store = Store::new();
		store.register_set("r-0", "old");
		store.register_set("r-0", "new");
		store.register_set_concurrent("r-0", "other");

		let lww = store.scan(ViewTag::Register(RegisterMode::Lww));
		assert_eq!(lww, vec![ScanRow::new("r-0", json!("other"))]);

		let mvr = store.scan(ViewTag::Register(RegisterMode::Mvr));
		assert_eq!(mvr, vec![ScanRow::new("r-0", json!(["new", "other"]))]);
	}

	#[test]
	fn test_set_scan_is_unique_by_construction() {
		let mut store = Store::new();
		store.set_add("s-0", "a");
		store.set_add("s-0", "a");
		store.set_add("s-0", "b");

		let rows = store.scan(ViewTag::Set(SetMode::Aw));
		assert_eq!(rows.len(), 2);
	}

	#[test]
	fn test_map_views_resolve_per_mode() {
		let mut store = Store::new();
		store.map_put("m-0", "k", "v1");
		store.map_put_concurrent("m-0", "k", "v2");

		let lww = store.scan(ViewTag::Map(MapMode::Lww));
		assert_eq!(lww[0].key.as_deref(), Some("k"));
		assert_eq!(lww[0].data, json!("v2"));

		let mvr = store.scan(ViewTag::Map(MapMode::AwMvr));
		assert_eq!(mvr[0].data, json!(["v1", "v2"]));
	}

	#[test]
	fn test_list_append_extends_positions() {
		let mut store = Store::new();
		store.list_append("l-0", "a");
		store.list_append("l-0", "b");
		store.list_insert("l-0", 7, "c");
		store.list_append("l-0", "d");

		let rows = store.scan(ViewTag::List);
		let positions: Vec<i64> = rows.iter().map(|r| r.pos.unwrap()).collect();
		assert_eq!(positions, [0, 1, 7, 8]);
	}

	#[test]
	fn test_counter_sums_increments() {
		let mut store = Store::new();
		store.counter_inc("c-0", 3);
		store.counter_inc("c-0", 4);

		let rows = store.scan(ViewTag::Counter);
		assert_eq!(rows, vec![ScanRow::new("c-0", json!(7))]);
	}
}
