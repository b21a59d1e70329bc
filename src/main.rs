use std::{
    fs,
    io::{self, BufRead, Write},
    process,
};

use clap::Parser;
use env_logger::Env;
use log::info;
use quanta::{CancellationToken, Context, Engine, EngineOptions, TernaryMode};

/// quanta is a small calculator language for complex numbers, vectors,
/// strings and dates.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Tells quanta to look at a file instead of a script.
    #[arg(short, long)]
    file: bool,

    /// Loads `name=value` lines from this file before evaluating.
    #[arg(short, long, value_name = "PATH")]
    constants: Option<String>,

    /// Prints the compiled postfix program instead of evaluating.
    #[arg(long)]
    rpn: bool,

    /// Resolves conditionals by rewriting the source text rather than by
    /// compiled jumps.
    #[arg(long)]
    rewrite_ternaries: bool,

    /// Maximum nesting of recursive evaluations.
    #[arg(long, value_name = "N", default_value_t = quanta::interpreter::evaluator::core::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// The expression or script to evaluate. Starts a line-by-line session on
    /// standard input when omitted.
    contents: Option<String>,
}

fn read_or_exit(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| {
                                eprintln!("Failed to read the input file '{path}': {e}");
                                process::exit(1);
                            })
}

fn print_rpn(engine: &Engine, source: &str) -> bool {
    match engine.compile(source) {
        Ok(program) => {
            println!("{program}");
            true
        },
        Err(e) => {
            eprintln!("{e}");
            false
        },
    }
}

fn repl(engine: &Engine, context: &mut Context, rpn: bool) {
    let cancel = CancellationToken::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        // A closed stdout leaves nothing to report to.
        if stdout.flush().is_err() {
            return;
        }

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => return,
            Ok(_) => {},
            Err(e) => {
                eprintln!("Failed to read input: {e}");
                return;
            },
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if rpn {
            print_rpn(engine, line);
            continue;
        }
        match engine.evaluate(line, context, &cancel) {
            Ok(value) => println!("{value}"),
            Err(e) => eprintln!("{e}"),
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    let options = EngineOptions { ternary_mode: if args.rewrite_ternaries {
                                      TernaryMode::Rewrite
                                  } else {
                                      TernaryMode::Compiled
                                  },
                                  max_depth:    args.max_depth, };
    let engine = Engine::new(options);
    let mut context = Context::new();

    if let Some(path) = &args.constants {
        match context.load_constants(&read_or_exit(path)) {
            Ok(count) => info!("loaded {count} constants from '{path}'"),
            Err(e) => {
                eprintln!("{path}: {e}");
                process::exit(1);
            },
        }
    }

    let Some(contents) = args.contents else {
        repl(&engine, &mut context, args.rpn);
        return;
    };

    let script = if args.file { read_or_exit(&contents) } else { contents };

    if args.rpn {
        let mut ok = true;
        for line in script.lines().map(str::trim).filter(|l| !l.is_empty()) {
            ok &= print_rpn(&engine, line);
        }
        if !ok {
            process::exit(1);
        }
        return;
    }

    match engine.run_script(&script, &mut context, &CancellationToken::new()) {
        Ok(Some(value)) => println!("{value}"),
        Ok(None) => {},
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        },
    }
}
