//! flatdb - interactive client
//!
//! A thin REPL front end over the engine: it feeds program text in and
//! renders results and diagnostics out. No engine logic lives here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::EnvFilter;

use flatdb::sql::Parser;
use flatdb::storage::Value;
use flatdb::{Error, Interpreter, StatementResult};

/// Print welcome banner
fn print_banner(dir: &Path) {
    println!(
        r#"
  __ _       _      _ _
 / _| | __ _| |_ __| | |__
| |_| |/ _` | __/ _` | '_ \
|  _| | (_| | || (_| | |_) |
|_| |_|\__,_|\__\__,_|_.__/

 A minimal query engine over flat text tables
 Working directory: {}
 Type '.help' for help, '.quit' to exit
"#,
        dir.display()
    );
}

/// Print help message
fn print_help() {
    println!(
        r#"
Commands:
  .help              Show this help message
  .tables            List all tables
  .quit              Exit flatdb

Statements:
  create table <t> (primary key <col>, <col>, ...);
  describe <t>;
  insert into <t> set <col>=<value>, ...;
  select <col>, ... from <t> [where <col>=<value> [and ...]]
                             [order by <col> asc|desc] [limit <n>];
  select <arithmetic expression>;

Examples:
  create table users (primary key uid, name, age);
  insert into users set uid=1, name='Alice', age=30;
  select name from users where age=30 order by name asc limit 10;
  select 2*(3+2)*3;
"#
    );
}

struct Options {
    dir: PathBuf,
    json: bool,
}

fn parse_args() -> Options {
    let mut options = Options {
        dir: PathBuf::from("tables"),
        json: false,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dir" | "-d" => {
                if let Some(path) = args.next() {
                    options.dir = PathBuf::from(path);
                }
            }
            "--json" => options.json = true,
            other => {
                eprintln!("Unknown option: {}", other);
                eprintln!("Usage: flatdb-cli [--dir <path>] [--json]");
                std::process::exit(2);
            }
        }
    }

    options
}

/// List table names from the working directory
fn list_tables(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut tables = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().map_or(false, |ext| ext == "csv") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                tables.push(stem.to_string());
            }
        }
    }
    tables.sort();
    Ok(tables)
}

/// Handle special dot commands; returns true on .quit
fn handle_special_command(cmd: &str, options: &Options) -> bool {
    match cmd {
        ".help" => print_help(),
        ".quit" | ".exit" => return true,
        ".tables" => match list_tables(&options.dir) {
            Ok(tables) if tables.is_empty() => println!("No tables found."),
            Ok(tables) => {
                println!("Tables:");
                for table in tables {
                    println!("  {}", table);
                }
            }
            Err(err) => eprintln!("Error: {}", err),
        },
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Type '.help' for available commands.");
        }
    }
    false
}

/// Format a row matrix as an aligned grid
fn format_rows(rows: &[Vec<Value>]) -> String {
    if rows.is_empty() {
        return "0 row(s) returned\n".to_string();
    }

    // Calculate column widths
    let mut widths = vec![0usize; rows[0].len()];
    for row in rows {
        for (i, value) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(value.to_string().len());
            }
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| "-".repeat(*w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+\n", separator);

    let mut output = String::new();
    output.push_str(&separator);
    for row in rows {
        let row_str: String = row
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!(" {:>width$} ", value.to_string(), width = *width))
            .collect::<Vec<_>>()
            .join("|");
        output.push_str(&format!("|{}|\n", row_str));
    }
    output.push_str(&separator);
    output.push_str(&format!("{} row(s) returned\n", rows.len()));

    output
}

/// Render one statement result
fn render(result: &StatementResult, json: bool) {
    if json {
        match serde_json::to_string(result) {
            Ok(line) => println!("{}", line),
            Err(err) => eprintln!("Error: {}", err),
        }
        return;
    }

    match result {
        StatementResult::Created(true) => println!("Table created"),
        StatementResult::Created(false) => println!("Table already exists"),
        StatementResult::Schema(schema) => println!("{}", schema.join(", ")),
        StatementResult::Inserted => println!("1 row inserted"),
        StatementResult::Scalar(value) => println!("{}", value),
        StatementResult::Rows(rows) => print!("{}", format_rows(rows)),
    }
}

/// Report an engine error with its pipeline stage
fn report(err: &Error, json: bool) {
    if json {
        let line = serde_json::json!({
            "domain": err.domain().to_string(),
            "error": err.to_string(),
        });
        eprintln!("{}", line);
    } else {
        eprintln!("{}", err);
    }
}

/// Parse and run one buffered program
fn run_program(interpreter: &Interpreter, text: &str, json: bool) {
    let program = match Parser::new(text).and_then(|mut parser| parser.parse()) {
        Ok(program) => program,
        Err(err) => {
            report(&err, json);
            return;
        }
    };

    match interpreter.run(&program) {
        Ok(results) => {
            for result in &results {
                render(result, json);
            }
        }
        Err(err) => report(&err, json),
    }
}

/// Main REPL loop
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = parse_args();
    if !options.dir.exists() {
        std::fs::create_dir_all(&options.dir).with_context(|| {
            format!("cannot create working directory {}", options.dir.display())
        })?;
    }
    let interpreter = Interpreter::new(&options.dir).context("engine setup failed")?;

    print_banner(&options.dir);

    let mut editor = DefaultEditor::new()?;
    let mut buffer = String::new();

    loop {
        let prompt = if buffer.is_empty() { "flatdb> " } else { "   ...> " };

        match editor.readline(prompt) {
            Ok(line) => {
                let trimmed = line.trim();

                if buffer.is_empty() && trimmed.starts_with('.') {
                    editor.add_history_entry(trimmed).ok();
                    if handle_special_command(trimmed, &options) {
                        break;
                    }
                    continue;
                }

                if trimmed.is_empty() {
                    continue;
                }

                editor.add_history_entry(trimmed).ok();
                buffer.push_str(&line);
                buffer.push('\n');

                // A statement is complete once the line ends with a semicolon.
                if trimmed.ends_with(';') {
                    let text = std::mem::take(&mut buffer);
                    run_program(&interpreter, &text, options.json);
                }
            }
            Err(ReadlineError::Interrupted) => {
                buffer.clear();
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error reading input: {}", err);
                break;
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}
