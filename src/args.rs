use std::env;
use std::path::PathBuf;
use std::process::exit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    PrintAst,
    PrintAstGraph,
    PrintSymtab,
    PrintIr,
    Optimize,
    Compile,
}

pub struct Args {
    pub mode: Mode,
    pub input: PathBuf,
}

impl Args {
    pub fn parse() -> Self {
        let mut mode = Mode::Compile;
        let mut input = None;

        for arg in env::args().skip(1) {
            match arg.as_str() {
                "-p" => mode = Mode::PrintAst,
                "-g" => mode = Mode::PrintAstGraph,
                "-s" => mode = Mode::PrintSymtab,
                "-h" => mode = Mode::PrintIr,
                "-o" => mode = Mode::Optimize,
                // unrecognised flags fall through to a plain compile
                other if other.starts_with('-') => (),
                _ => {
                    if input.is_some() {
                        Self::usage();
                    }
                    input = Some(PathBuf::from(arg));
                }
            }
        }

        let input = input.unwrap_or_else(|| Self::usage());
        Self { mode, input }
    }

    fn usage() -> ! {
        eprint!(concat!(
            "Usage: splc [options] <filename>\n",
            "Options:\n",
            "   -p    print AST\n",
            "   -g    print AST as graph (DOT/graphviz)\n",
            "   -s    print symbol table information\n",
            "   -h    print high-level instruction translation\n",
            "   -o    perform optimization on emitted assembly\n",
        ));
        exit(1)
    }
}
