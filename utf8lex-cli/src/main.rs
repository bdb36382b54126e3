use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fs_err as fs;

/// utf8lex: generate a UTF-8-aware tokenizer from a spec file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Spec file to process; must end in `.l`.
    spec: PathBuf,
    /// Path to write the generated source. Defaults to the spec's stem
    /// with an `.rs` extension, next to the spec.
    #[arg(long, short)]
    output: Option<PathBuf>,
    /// Write per-rule pre/post trace records to stdout while parsing.
    #[arg(long)]
    tracing: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("utf8lex: {err:#}");
            ExitCode::from(error_code(&err).clamp(1, 255) as u8)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if args.spec.extension().map(|ext| ext != "l").unwrap_or(true) {
        return Err(utf8lex::Error::FileOpen(format!(
            "{}: spec files must end in .l",
            args.spec.display()
        ))
        .into());
    }

    let spec = fs::read_to_string(&args.spec)?;
    if spec.is_empty() {
        return Err(utf8lex::Error::FileEmpty(args.spec.display().to_string()).into());
    }

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => args.spec.with_extension("rs"),
    };

    let generated = utf8lex_codegen::generate(&spec, args.tracing)
        .with_context(|| format!("failed to generate from {}", args.spec.display()))?;

    if let Err(err) = fs::write(&output_path, &generated) {
        // Never leave a partially written output behind.
        let _ = fs::remove_file(&output_path);
        return Err(err.into());
    }
    Ok(())
}

/// Map a failure back to its closed-taxonomy exit code.
fn error_code(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(engine) = cause.downcast_ref::<utf8lex::Error>() {
            return engine.code();
        }
        if let Some(codegen) = cause.downcast_ref::<utf8lex_codegen::Error>() {
            return codegen.code();
        }
    }
    1
}
