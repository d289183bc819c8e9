// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 Viewfold

//! Command-line front end: resolves the view tags given as positional
//! arguments into a path and prints the compiled query on stdout.

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use viewfold_compile::{Options, compile_sql};
use viewfold_model::Path;

/// Emit one SQL query that materializes a nested document from a chain of
/// replicated container views.
#[derive(Debug, Parser)]
#[command(name = "viewfold", version)]
struct Args {
	/// Nested views, outermost first (e.g. MapAwLww SetRw Counter)
	#[arg(required = true)]
	views: Vec<String>,

	/// Print the query inline, with whitespace collapsed
	#[arg(short, long)]
	inline: bool,

	/// Restrict the query to one top-level identifier
	#[arg(long, value_name = "ID")]
	root: Option<String>,
}

fn main() {
	init_tracing();
	let args = Args::parse();

	match run(&args) {
		Ok(query) => println!("{query}"),
		Err(err) => {
			eprintln!("error: {err}");
			std::process::exit(1);
		}
	}
}

fn run(args: &Args) -> viewfold_model::Result<String> {
	let path = Path::parse(&args.views)?;
	debug!(depth = path.len(), "compiling nested view query");

	Ok(compile_sql(
		&path,
		&Options {
			inline: args.inline,
			root_id: args.root.clone(),
		},
	))
}

fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.try_init();
}
