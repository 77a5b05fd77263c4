#![deny(unused_must_use)]
#![warn(clippy::pedantic)]

mod args;

use args::{Args, Mode};

use std::fs;
use std::process;

use anyhow::{Context, Result};
use splc::{ast_print, codegen, ir, lexer, parser, semantic};

fn main() {
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let filename = args.input.to_string_lossy().into_owned();
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("Could not open input file \"{filename}\""))?;

    let tokens = lexer::lex(&source, &filename)?;
    let program = parser::parse(&tokens, &filename)?;

    match args.mode {
        Mode::PrintAst => {
            ast_print::print_tree(&program);
            return Ok(());
        }
        Mode::PrintAstGraph => {
            ast_print::print_graph(&program);
            return Ok(());
        }
        _ => (),
    }

    let sem = semantic::build_symtab(&program)?;
    if args.mode == Mode::PrintSymtab {
        print!("{}", sem.arena.to_csv(sem.global));
        return Ok(());
    }

    let ir = ir::emit_ir(&program, &sem);
    if args.mode == Mode::PrintIr {
        print!("{ir}");
        return Ok(());
    }

    // -o is accepted for compatibility; there is no optimiser yet, so it
    // compiles like the default mode
    let asm = codegen::codegen(&ir);
    print!("{asm}");
    Ok(())
}
