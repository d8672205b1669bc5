use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use monkey::parser::Error as ParseError;
use monkey::{evaluate, parse, tokenize_file, tokenize_string, Environment, Object};

const PROMPT: &str = ">> ";

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("line editor failed: {0}")]
    Readline(#[from] ReadlineError),
}

fn main() -> Result<(), RunError> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        run_repl()
    } else {
        run_script(&args)
    }
}

/// Installs a stderr subscriber, but only when `RUST_LOG` asks for one.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Evaluates every file against one shared environment, so later files see
/// the bindings of earlier ones.
fn run_script(files: &[String]) -> Result<(), RunError> {
    let env = Environment::new();
    for file in files {
        println!("Evaluating file {}", file);
        let tokens = tokenize_file(file).map_err(|source| RunError::Io {
            path: file.clone(),
            source,
        })?;
        let (program, errors) = parse(tokens);
        if !errors.is_empty() {
            print_parse_errors(&errors);
            continue;
        }
        let result = evaluate(&program, &env);
        if result.is_error() {
            println!("{}", result);
        }
    }
    Ok(())
}

fn run_repl() -> Result<(), RunError> {
    let mut rl = DefaultEditor::new()?;
    let env = Environment::new();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                record_history(rl.add_history_entry(line.as_str()));
                let (program, errors) = parse(tokenize_string(&line));
                if !errors.is_empty() {
                    print_parse_errors(&errors);
                    continue;
                }
                match evaluate(&program, &env) {
                    Object::Null => {}
                    result => println!("{}", result),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// A lost history entry is logged and the session goes on.
fn record_history(result: rustyline::Result<bool>) -> bool {
    match result {
        Ok(added) => added,
        Err(err) => {
            tracing::warn!(error = %err, "could not record history entry");
            false
        }
    }
}

fn print_parse_errors(errors: &[ParseError]) {
    println!("parser errors:");
    for error in errors {
        println!("\t{}", error);
    }
}
