// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Failure modes surface at path resolution, before any query text exists.

use viewfold_compile::{Options, compile_sql};
use viewfold_model::{Error, Path};

#[test]
fn test_unknown_view_aborts_resolution() {
	let err = Path::parse(&["NotAKind"]).unwrap_err();
	assert_eq!(
		err,
		Error::UnresolvedView {
			tag: "NotAKind".to_string(),
			position: Some(0)
		}
	);
	assert_eq!(err.to_string(), "unknown view 'NotAKind' at path position 0");
}

#[test]
fn test_unknown_view_in_the_middle_of_a_path() {
	let err = Path::parse(&["SetAw", "Registre", "Counter"]).unwrap_err();
	assert_eq!(
		err,
		Error::UnresolvedView {
			tag: "Registre".to_string(),
			position: Some(1)
		}
	);
}

#[test]
fn test_empty_path_is_rejected() {
	assert_eq!(Path::parse::<&str>(&[]).unwrap_err(), Error::EmptyPath);
}

#[test]
fn test_counter_with_children_is_rejected() {
	let err = Path::parse(&["SetAw", "Counter", "RegisterLww"]).unwrap_err();
	assert_eq!(
		err,
		Error::CounterWithChildren {
			position: 1
		}
	);
}

#[test]
fn test_separately_parsed_paths_compile_identically() {
	let views = ["MapRwMvr", "List", "RegisterMvr", "Counter"];
	let first = compile_sql(&Path::parse(&views).unwrap(), &Options::default());
	let second = compile_sql(&Path::parse(&views).unwrap(), &Options::default());
	assert_eq!(first, second);
}
