use std::env;
use std::fs;

use anyhow::{bail, Context};

use monkey_interpreter::environment::Environment;
use monkey_interpreter::evaluator::eval;
use monkey_interpreter::lexer::Lexer;
use monkey_interpreter::object::Object;
use monkey_interpreter::parser::Parser;
use monkey_interpreter::repl;

// With no arguments drops into the REPL; otherwise evaluates each file
// in a single shared environment, printing the last file's value.
fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        repl::start();
        return Ok(());
    }
    run_all_files(args)
}

fn run_all_files(paths: Vec<String>) -> Result<(), anyhow::Error> {
    let env = Environment::new();
    let mut result = None;
    for path in &paths {
        let source =
            fs::read_to_string(path).with_context(|| format!("failed to open {}", path))?;
        let lexer = Lexer::new(&source);
        let mut parser = Parser::new(lexer);
        let program = parser.parse();
        if !parser.errors().is_empty() {
            for err in parser.errors() {
                eprintln!("parser error: {}", err);
            }
            bail!("{}: {} parse error(s)", path, parser.errors().len());
        }
        let evaluated = eval(&program, &env);
        if let Object::Error(message) = &*evaluated {
            bail!("{}: {}", path, message);
        }
        result = Some(evaluated);
    }
    if let Some(result) = result {
        println!("{}", result);
    }
    Ok(())
}
