//! `print` and the sink it writes to.

use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

use tracing::info;

use crate::runner::ds::error::ErrorType;
use crate::runner::ds::value::Value;
use crate::runner::plugin::config::PrintTarget;
use crate::runner::plugin::types::EvalContext;

/// Where `print` output goes.
#[derive(Clone, Debug)]
pub enum PrintSink {
    Stdout,
    Stderr,
    /// `tracing::info!` with target `lune::print`.
    Log,
    /// In-memory buffer, for hosts and tests that read the output back.
    Capture(Rc<RefCell<String>>),
}

impl PrintSink {
    /// A capture sink together with the buffer it appends to.
    pub fn capture() -> (PrintSink, Rc<RefCell<String>>) {
        let buffer = Rc::new(RefCell::new(String::new()));
        (PrintSink::Capture(buffer.clone()), buffer)
    }

    pub fn from_target(target: PrintTarget) -> PrintSink {
        match target {
            PrintTarget::Stdout => PrintSink::Stdout,
            PrintTarget::Stderr => PrintSink::Stderr,
            PrintTarget::Log => PrintSink::Log,
        }
    }

    pub fn write_line(&self, line: &str) -> Result<(), ErrorType> {
        match self {
            PrintSink::Stdout => {
                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                writeln!(out, "{}", line)?;
            }
            PrintSink::Stderr => {
                let stderr = std::io::stderr();
                let mut out = stderr.lock();
                writeln!(out, "{}", line)?;
            }
            PrintSink::Log => info!(target: "lune::print", "{}", line),
            PrintSink::Capture(buffer) => {
                let mut buffer = buffer.borrow_mut();
                buffer.push_str(line);
                buffer.push('\n');
            }
        }
        Ok(())
    }
}

impl Default for PrintSink {
    fn default() -> Self {
        PrintSink::Stdout
    }
}

/// Concatenate the default string form of every argument, with no
/// separator. `nil` contributes nothing.
pub fn format_print_line(args: &[Value]) -> String {
    let mut line = String::new();
    for arg in args {
        if !arg.is_nil() {
            line.push_str(&arg.to_string());
        }
    }
    line
}

/// print(...)
pub fn print(ctx: &mut EvalContext, args: Vec<Value>) -> Result<Vec<Value>, ErrorType> {
    if args.is_empty() {
        return Ok(vec![]);
    }
    let line = format_print_line(&args);
    match &ctx.global {
        Some(env) => env.sink().write_line(&line)?,
        None => PrintSink::Stdout.write_line(&line)?,
    }
    Ok(vec![])
}
