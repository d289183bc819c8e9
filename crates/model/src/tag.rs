// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

use std::{
	fmt,
	fmt::{Display, Formatter},
	str::FromStr,
};

use crate::error::Error;

/// The five base shapes of a nestable, conflict-resolvable container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
	Map,
	Set,
	Register,
	List,
	Counter,
}

/// Read modes of a map view: add-wins / remove-wins crossed with
/// last-writer-wins / multi-value resolution of concurrent puts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
	AwLww,
	AwMvr,
	RwMvr,
	Lww,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetMode {
	Aw,
	Rw,
	Lww,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterMode {
	Lww,
	Mvr,
}

/// One concrete (kind, mode) pair. The `Display` form is the name of the
/// per-level view the storage engine exposes for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewTag {
	Map(MapMode),
	Set(SetMode),
	Register(RegisterMode),
	List,
	Counter,
}

impl ViewTag {
	/// Every view the storage engine exposes.
	pub const ALL: [ViewTag; 11] = [
		ViewTag::Map(MapMode::AwLww),
		ViewTag::Map(MapMode::AwMvr),
		ViewTag::Map(MapMode::RwMvr),
		ViewTag::Map(MapMode::Lww),
		ViewTag::Set(SetMode::Aw),
		ViewTag::Set(SetMode::Rw),
		ViewTag::Set(SetMode::Lww),
		ViewTag::Register(RegisterMode::Lww),
		ViewTag::Register(RegisterMode::Mvr),
		ViewTag::List,
		ViewTag::Counter,
	];

	pub fn kind(&self) -> Kind {
		match self {
			ViewTag::Map(_) => Kind::Map,
			ViewTag::Set(_) => Kind::Set,
			ViewTag::Register(_) => Kind::Register,
			ViewTag::List => Kind::List,
			ViewTag::Counter => Kind::Counter,
		}
	}

	/// Multi-value read modes surface every concurrent write, so their value
	/// column holds an array instead of a single resolved value.
	pub fn is_multi_value(&self) -> bool {
		matches!(
			self,
			ViewTag::Map(MapMode::AwMvr) | ViewTag::Map(MapMode::RwMvr) | ViewTag::Register(RegisterMode::Mvr)
		)
	}

	/// Kinds that return multiple rows per identifier and therefore need the
	/// root aggregation when they sit at the deepest level of a path.
	pub fn is_container(&self) -> bool {
		matches!(self.kind(), Kind::Map | Kind::Set | Kind::List)
	}

	pub fn view_name(&self) -> &'static str {
		match self {
			ViewTag::Map(MapMode::AwLww) => "MapAwLww",
			ViewTag::Map(MapMode::AwMvr) => "MapAwMvr",
			ViewTag::Map(MapMode::RwMvr) => "MapRwMvr",
			ViewTag::Map(MapMode::Lww) => "MapLww",
			ViewTag::Set(SetMode::Aw) => "SetAw",
			ViewTag::Set(SetMode::Rw) => "SetRw",
			ViewTag::Set(SetMode::Lww) => "SetLww",
			ViewTag::Register(RegisterMode::Lww) => "RegisterLww",
			ViewTag::Register(RegisterMode::Mvr) => "RegisterMvr",
			ViewTag::List => "List",
			ViewTag::Counter => "Counter",
		}
	}
}

impl Display for ViewTag {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.view_name())
	}
}

impl FromStr for ViewTag {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ViewTag::ALL.into_iter().find(|tag| tag.view_name() == s).ok_or_else(|| Error::UnresolvedView {
			tag: s.to_string(),
			position: None,
		})
	}
}
