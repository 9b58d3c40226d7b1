use std::{fs, path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use reckoner::{
    Environment, ExecutionContext, Interpreter, ReckonerError, Repl, runtime::is_valid_name,
};

#[derive(Parser)]
#[command(author, version, about = "Arithmetic expression calculator")]
struct Args {
    /// Longest accepted expression in characters (0 disables the limit)
    #[arg(long, default_value_t = reckoner::runtime::DEFAULT_MAX_INPUT_LEN)]
    max_len: usize,

    /// Predefine a variable, e.g. `--var rate=0.2` (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    vars: Vec<(String, f64)>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate a single expression
    Eval {
        #[arg(allow_hyphen_values = true)]
        expression: String,
    },
    /// Evaluate a file with one expression or `name = expression` per line
    Run { script: PathBuf },
    /// Start an interactive session
    Repl,
    /// List operators, constants, and functions
    List,
}

fn parse_assignment(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{raw}`"))?;
    let name = name.trim();
    if !is_valid_name(name) {
        return Err(format!("`{name}` is not a valid variable name"));
    }
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|err| format!("invalid value for `{name}`: {err}"))?;
    Ok((name.to_string(), value))
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env("RECKONER_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ReckonerError::Diagnostic(diag)) => {
            eprintln!("{:?}: {}", diag.kind, diag.to_reply());
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), ReckonerError> {
    let limit = (args.max_len > 0).then_some(args.max_len);
    let env = Arc::new(Environment::new());
    for (name, value) in args.vars {
        env.assign_variable(name, value);
    }
    let interpreter =
        Interpreter::with_environment(env, ExecutionContext::default().with_max_input_len(limit));

    match args.command.unwrap_or(Command::Repl) {
        Command::Eval { expression } => {
            let value = interpreter.eval_source(&expression)?;
            println!("{value}");
        }
        Command::Run { script } => run_script(&interpreter, script)?,
        Command::Repl => Repl::with_interpreter(interpreter).run()?,
        Command::List => println!("{}", reckoner::help_text(interpreter.environment())),
    }
    Ok(())
}

fn run_script(interpreter: &Interpreter, path: PathBuf) -> Result<(), ReckonerError> {
    let source = fs::read_to_string(&path)?;
    for line in source.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match interpreter.eval_line(line)? {
            (Some(name), value) => println!("{name} = {value}"),
            (None, value) => println!("{value}"),
        }
    }
    Ok(())
}
