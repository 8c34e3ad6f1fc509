//! `pyson` — evaluate, inspect and normalize PYSON expressions.
//!
//! Usage:
//!   pyson eval '<expr>' [--context '<json>'] [--now 2010-02-12T10:30:00]
//!   pyson show '<expr>'
//!   pyson encode [--sort-keys] < expr.json
//!
//! When `<expr>` is omitted it is read from stdin. Set `RUST_LOG=pyson=debug`
//! to see validation and decoding diagnostics on stderr.

use anyhow::Context as _;
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use pyson::{Context, Decoder, DecoderOptions, Encoder, EncoderOptions};
use std::io::{self, Read};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "pyson", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode an expression, evaluating it against a context.
    Eval(EvalArgs),
    /// Print an expression in its readable `Class(args)` form.
    Show(ShowArgs),
    /// Re-encode an expression in canonical wire form.
    Encode(EncodeArgs),
}

#[derive(Parser, Debug)]
struct EvalArgs {
    /// Encoded expression; read from stdin when omitted.
    expr: Option<String>,

    /// Context bindings as a JSON object.
    #[arg(long)]
    context: Option<String>,

    /// Fixed clock for `Date`/`DateTime` without a start value.
    #[arg(long)]
    now: Option<NaiveDateTime>,
}

#[derive(Parser, Debug)]
struct ShowArgs {
    /// Encoded expression; read from stdin when omitted.
    expr: Option<String>,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Encoded expression; read from stdin when omitted.
    expr: Option<String>,

    /// Emit object keys in sorted order.
    #[arg(long)]
    sort_keys: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Eval(args) => cmd_eval(args),
        Command::Show(args) => cmd_show(args),
        Command::Encode(args) => cmd_encode(args),
    }
}

fn read_expr(expr: Option<String>) -> anyhow::Result<String> {
    match expr {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read expression from stdin")?;
            Ok(buf)
        }
    }
}

fn cmd_eval(args: EvalArgs) -> anyhow::Result<()> {
    let text = read_expr(args.expr)?;
    let context = match &args.context {
        Some(json) => Context::from_json(json).context("parse --context")?,
        None => Context::new(),
    };
    let mut decoder = Decoder::new(context);
    if let Some(now) = args.now {
        decoder = decoder.with_now(Arc::new(move || now));
    }
    let value = decoder.decode(text.trim()).context("decode expression")?;
    println!("{}", Encoder::new().encode(&value)?);
    Ok(())
}

fn cmd_show(args: ShowArgs) -> anyhow::Result<()> {
    let text = read_expr(args.expr)?;
    let node = Decoder::noeval()
        .decode_node(text.trim())
        .context("decode expression")?;
    println!("{node}");
    Ok(())
}

fn cmd_encode(args: EncodeArgs) -> anyhow::Result<()> {
    let text = read_expr(args.expr)?;
    let decoder = Decoder::with_options(Context::new(), DecoderOptions { noeval: true });
    let value = decoder.decode(text.trim()).context("decode expression")?;
    let encoder = Encoder::with_options(EncoderOptions {
        sort_keys: args.sort_keys,
    });
    println!("{}", encoder.encode(&value)?);
    Ok(())
}
