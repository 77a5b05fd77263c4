/*!
This crate is a single-pass compiler for SimpleP, a small Pascal-like
language, targeting x86-64. It follows these ideas and goals:
  * **Plain driver** - The whole tool chain up to the emitted `.s` file is in this crate; assembling and linking (against a C library for `printf`/`scanf`) stay with the platform tools.
  * **Reusable modules** - Every stage except [ast] is hidden behind a feature flag with the same name, so any prefix of the pipeline can be reused as a library (e.g. for lexing or parsing SimpleP code).
  * **No unstable features** - The crate compiles with the stable Rust toolchain.

## Command-line options
```shell
Usage: splc [options] <filename>

Options:
   -p    print AST
   -g    print AST as graph (DOT/graphviz)
   -s    print symbol table information
   -h    print high-level instruction translation
   -o    perform optimization on emitted assembly
```
With no option (or an unrecognised one) the driver compiles the file and
writes the assembly to stdout. `-o` is accepted and currently equivalent to a
plain compile; there is no optimiser yet.

## Compilation stages
1. **Tokenization(lexing)** - [lex](lexer::lex) scans the source for known token types and produces [Tokens](lexer::Tokens) - a collection of [LocatedToken](lexer::LocatedToken) - a structure which carries the token and its position in the file. An unknown character raises [LexError](lexer::LexError).
2. **Parsing** - [parse](parser::parse) takes the tokens and produces the [Program](ast::Program) syntax tree. Any syntactic error (e.g. a missing `THEN`) raises a located [ParseError](parser::ParseError). The `-p` and `-g` modes stop here and dump the tree via [ast_print].
3. **Semantic analysis** - [build_symtab](semantic::build_symtab) walks the tree once and produces [SemanticOutput](semantic::SemanticOutput): the scope tree with every name resolved and given a storage offset, plus a node-to-type side table. Name errors raise [SemanticError](semantic::SemanticError). The `-s` mode prints the symbol table as CSV and stops.
4. **IR generation** - [emit_ir](ir::emit_ir) linearises the program into three-address code over virtual registers ([IrProgram](ir::IrProgram)). From this stage on any error means a bug in the compiler and raises [panic!] instead of producing a typed error. The `-h` mode prints the IR and stops.
5. **Lowering** - [codegen](codegen::codegen) translates the IR into x86-64, backing every virtual register with one 8-byte stack slot ([AsmProgram](codegen::AsmProgram)).
6. **Emission** - the [emission] module provides the [Display] implementations that render an [AsmProgram](codegen::AsmProgram) as a complete AT&T-syntax assembly file; the driver prints it to stdout.

## Diagnostics
Every error in stages 1-3 renders as `<file>:<line>:<col>: Error: <message>`
on stderr and ends the compilation; there is no recovery.

[panic!]: https://doc.rust-lang.org/std/macro.panic.html
[Display]: https://doc.rust-lang.org/std/fmt/trait.Display.html
*/

#![deny(unused_must_use)]
#![warn(clippy::pedantic)]
#![allow(clippy::wildcard_imports)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod ast;
#[cfg(feature = "ast_print")]
pub mod ast_print;
#[cfg(feature = "codegen")]
pub mod codegen;
#[cfg(feature = "emission")]
pub mod emission;
#[cfg(feature = "ir")]
pub mod ir;
#[cfg(feature = "lexer")]
pub mod lexer;
#[cfg(feature = "parser")]
pub mod parser;
#[cfg(feature = "semantic")]
pub mod semantic;
#[cfg(feature = "semantic")]
pub mod symtab;
#[cfg(feature = "semantic")]
pub mod types;
