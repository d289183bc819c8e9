// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Compiler entry point: orchestrates rule lookup, join assembly, the base
//! projection, the optional root aggregation, and the bottom-up fold chain
//! into one relational fragment tree.

use viewfold_model::Path;

use crate::{
	relation::{JoinLevel, Relation},
	render, rules,
};

#[derive(Debug, Clone, Default)]
pub struct Options {
	/// Collapse the query text onto a single line.
	pub inline: bool,
	/// Restrict the query to one top-level identifier.
	pub root_id: Option<String>,
}

/// Compile a validated path into a relational fragment tree. Pure and
/// deterministic; all failure modes surface at [`Path`] construction.
pub fn compile(path: &Path) -> Relation {
	compile_rooted(path, None)
}

/// Like [`compile`], with the final layer filtered to one root identifier.
pub fn compile_rooted(path: &Path, root_id: Option<&str>) -> Relation {
	Relation::Wrap {
		input: Box::new(fold_levels(path)),
		root_filter: root_id.map(str::to_string),
	}
}

/// Compile a validated path into one self-contained query text selecting
/// exactly two columns, `id` and `data`.
pub fn compile_sql(path: &Path, options: &Options) -> String {
	let relation = compile_rooted(path, options.root_id.as_deref());
	if options.inline {
		render::render_inline(&relation)
	} else {
		render::render(&relation)
	}
}

/// The flat base relation: level 0 unconditioned, each deeper level joined
/// as a correlated lateral subquery keyed on its parent's join expression.
fn base_relation(path: &Path) -> Relation {
	let depth = path.len();
	let mut levels = Vec::with_capacity(depth);
	let mut projection = Vec::new();

	for (i, tag) in path.iter().enumerate() {
		let parent_key = (i > 0)
			.then(|| rules::join_key(path[i - 1], i - 1).expect("validated path: non-leaf views have a join key"));
		levels.push(JoinLevel {
			view: *tag,
			parent_key,
		});
		projection.extend(rules::base_projection(*tag, i, i == depth - 1));
	}

	Relation::Join {
		levels,
		projection,
	}
}

fn fold_levels(path: &Path) -> Relation {
	let depth = path.len();
	let mut relation = base_relation(path);

	// A deepest-level container returns several raw rows per parent key;
	// fold them into a single value before the per-level folds begin,
	// grouped by every shallower level's identifying columns plus this
	// level's own identifier.
	if let Some(step) = rules::root_fold(path.deepest(), depth - 1) {
		let mut group = Vec::new();
		for (i, tag) in path.iter().take(depth - 1).enumerate() {
			group.extend(rules::group_columns(*tag, i));
		}
		group.push(format!("id{}", depth - 1));

		relation = Relation::Fold {
			input: Box::new(relation),
			group,
			step,
		};
	}

	// Collapse one nesting level at a time, deepest to shallowest. Each fold
	// retains the identifying columns of all shallower levels, which the
	// remaining folds and the final caller depend on.
	for i in (1..depth).rev() {
		let mut columns = Vec::new();
		for (j, tag) in path.iter().take(i).enumerate() {
			columns.extend(rules::group_columns(*tag, j));
		}
		columns.push("data".to_string());

		for step in rules::fold_steps(path[i - 1], &columns) {
			relation = Relation::Fold {
				input: Box::new(relation),
				group: columns[..step.retained].to_vec(),
				step: step.expr,
			};
		}
	}

	relation
}
