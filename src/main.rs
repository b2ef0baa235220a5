mod builtin;
mod config;
mod error;
mod eval;
mod fd;
mod job;
mod parser;
mod queue;
mod redirect;
mod types;
mod ui;
mod validate;

use std::io::{self, IsTerminal};
use std::{env, process};

use log::{debug, warn};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use config::Config;
use ui::Painter;

fn init_logging(config: &Config) {
	let _ = TermLogger::init(
		config.log.level_filter(),
		simplelog::Config::default(),
		TerminalMode::Stderr,
		ColorChoice::Auto,
	);
}

/// Runs one line to completion and prints what the user needs to see.
fn process_line(line: &str, config: &Config, painter: Painter) -> bool {
	match eval::execute_line(line, config.parser.max_tokens) {
		Ok(job) => {
			for (pid, failure) in job.failures() {
				eprintln!("{}", painter.exit_report(pid, failure));
			}
			true
		},
		Err(e) => {
			eprintln!("{}", painter.error(&e));
			false
		},
	}
}

fn run(config: &Config) -> rustyline::Result<()> {
	let painter = Painter::new(config.prompt.color && io::stderr().is_terminal());
	let editor_config = rustyline::Config::builder()
		.max_history_size(config.history.max_entries)?
		.auto_add_history(false)
		.build();
	let mut editor = DefaultEditor::with_config(editor_config)?;
	let history = config.history_path();
	if let Some(path) = &history {
		if let Err(e) = editor.load_history(path) {
			debug!("no history loaded from {}: {}", path.display(), e);
		}
	}

	loop {
		let cwd = if config.prompt.show_cwd { env::current_dir().ok() } else { None };
		let prompt = painter.prompt(cwd.as_deref(), &config.prompt.symbol);
		match editor.readline(&prompt) {
			Ok(line) => {
				if line.trim().is_empty() {
					continue;
				}
				let _ = editor.add_history_entry(line.as_str());
				if !process_line(&line, config, painter) {
					debug!("line failed: {}", line);
				}
			},
			Err(ReadlineError::Interrupted) => continue,
			Err(ReadlineError::Eof) => {
				println!("^D");
				break;
			},
			Err(e) => return Err(e),
		}
	}

	if let Some(path) = &history {
		if let Err(e) = editor.save_history(path) {
			warn!("could not save history to {}: {}", path.display(), e);
		}
	}
	Ok(())
}

fn main() {
	let config = Config::load();
	init_logging(&config);
	if let Err(e) = run(&config) {
		eprintln!("ubash: {}", e);
		process::exit(1);
	}
}
