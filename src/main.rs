use clap::Parser;
use lisp_interaction::env::global_env;
use lisp_interaction::reader::Reader;
use std::path::PathBuf;
use std::process::ExitCode;

/// Emacs-flavored Lisp interpreter
#[derive(Parser, Debug)]
#[command(name = "lisp-interaction")]
#[command(version)]
#[command(about = "Evaluates a file of Lisp forms in the global environment")]
struct CliArgs {
    /// Script file to evaluate
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = CliArgs::parse();

    let Some(script) = args.script else {
        eprintln!("usage: lisp-interaction <file>");
        return ExitCode::FAILURE;
    };

    let source = match std::fs::read_to_string(&script) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cannot read {}: {}", script.display(), e);
            return ExitCode::FAILURE;
        }
    };

    run_script(&source)
}

/// Evaluates every top-level form. An evaluation error aborts the current
/// form only; a parse error ends the run since the rest of the stream
/// cannot be trusted.
fn run_script(source: &str) -> ExitCode {
    let env = global_env();
    let mut reader = Reader::new(source.chars());
    loop {
        match reader.next_expr() {
            Ok(None) => return ExitCode::SUCCESS,
            Ok(Some(expr)) => {
                log::debug!("evaluating {expr}");
                if let Err(e) = env.eval(&expr) {
                    eprintln!("{e}");
                }
            }
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        }
    }
}
