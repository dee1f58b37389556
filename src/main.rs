use std::path::PathBuf;

use anyhow::Context;
use lispy::{parse_program, EvaluationContext, Expression, InterpreterConfig};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};

async fn query(stdout: &mut io::Stdout, lines: &mut io::Lines<io::BufReader<io::Stdin>>, prompt: &str) -> io::Result<Option<String>> {
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    lines.next_line().await
}

/// Config comes from the first argument, else `LISPY_CONFIG`, else defaults.
fn load_config() -> anyhow::Result<InterpreterConfig> {
    let path = std::env::args_os().nth(1)
        .or_else(|| std::env::var_os("LISPY_CONFIG"))
        .map(PathBuf::from);

    let Some(path) = path else { return Ok(InterpreterConfig::default()) };
    let source = std::fs::read_to_string(&path)
        .with_context(|| format!("reading config {}", path.display()))?;
    InterpreterConfig::from_json(&source)
        .with_context(|| format!("parsing config {}", path.display()))
}

// Only installed when RUST_LOG is set, e.g. `RUST_LOG=lispy=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn run_line(context: &mut EvaluationContext, line: &str) {
    let expressions = match parse_program(line) {
        Ok(expressions) => expressions,
        Err(err) => return println!("Error: {}", err),
    };

    for expression in &expressions {
        match context.evaluate_expression(expression) {
            Ok(Expression::Unspecified) => {}
            Ok(value) => println!("{}", value),
            Err(err) => return println!("Error: {}", err),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = load_config()?;
    let prompt = config.prompt.clone();

    let mut context = EvaluationContext::with_config(config);
    let mut lines = io::BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    while let Some(line) = query(&mut stdout, &mut lines, &prompt).await? {
        match line.trim() {
            "" => {}
            ":quit" => break,
            ":env" => println!("{}", context.global().symbols().join(" ")),
            source => run_line(&mut context, source),
        }
    }

    Ok(())
}
