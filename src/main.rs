//! bi-rs: a vi-style binary editor
//!
//! Edits any file as a flat sequence of bytes through a compact command
//! language, either interactively or from a script.

mod app;
mod editor;
mod settings;

use app::console::{ConsoleSink, HexDump, ShellRunner, StdinInput};
use app::App;
use editor::{file, EditorSession, ScriptFlags, Status};
use settings::EditorSettings;
use std::env;
use std::path::PathBuf;
use std::process;

/// Parsed command-line options
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    file: PathBuf,
    script: Option<PathBuf>,
    verbose: bool,
    write: bool,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map_or("bi", String::as_str);

    let options = match parse_args(&args) {
        Ok(Some(options)) => options,
        Ok(None) => {
            print_usage(program);
            return;
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            print_usage(program);
            process::exit(1);
        }
    };

    let settings = EditorSettings::load();

    let loaded = file::load(&options.file).unwrap_or_else(|e| {
        eprintln!("{}: {}", options.file.display(), e);
        process::exit(1);
    });

    let mut session = EditorSession::new(
        options.file.clone(),
        loaded.bytes,
        &settings,
        Box::new(ConsoleSink),
        Box::new(ShellRunner),
    );
    if options.script.is_some() {
        session.set_flags(ScriptFlags {
            verbose: options.verbose,
            scripting: true,
        });
    }
    if loaded.new_file {
        session.report(&Status::Info("<new file>".to_string()));
    }

    let mut app = App::new(
        session,
        Box::new(StdinInput),
        Box::new(HexDump::new(settings.dump_rows)),
        settings.emergency_save_path.clone(),
    );

    let result = match &options.script {
        Some(script) => app.run_script(script, options.write),
        None => app.run_interactive(),
    };
    if let Err(e) = result {
        eprintln!("{}", e);
        process::exit(1);
    }
}

/// Parse arguments; `Ok(None)` means help was requested
fn parse_args(args: &[String]) -> Result<Option<Options>, String> {
    let mut options = Options::default();
    let mut file = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--script" | "-s" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --script".to_string());
                }
                options.script = Some(PathBuf::from(&args[i]));
            }
            "--verbose" | "-v" => options.verbose = true,
            "--write" | "-w" => options.write = true,
            "--help" | "-h" => return Ok(None),
            other if other.starts_with('-') => {
                return Err(format!("Unknown argument: {}", other));
            }
            other => {
                if file.is_some() {
                    return Err(format!("Unexpected argument: {}", other));
                }
                file = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }

    options.file = file.ok_or_else(|| "Missing file to edit".to_string())?;
    Ok(Some(options))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} FILE [OPTIONS]", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --script <FILE>   Run a bi script instead of editing interactively");
    eprintln!("  -v, --verbose         Echo script lines and messages");
    eprintln!("  -w, --write           Write the file after the script if it changed");
    eprintln!("  -h, --help            Show this help message");
}
