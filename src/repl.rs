use crate::environment::Environment;
use crate::evaluator::eval;
use crate::lexer::Lexer;
use crate::parser::Parser;
use std::io;
use std::io::Write;

const PROMPT: &'static str = ">> ";

pub fn start() {
    let env = Environment::new();
    loop {
        print!("{}", PROMPT);
        io::stdout().flush().unwrap();
        let mut input = String::new();
        let read = io::stdin().read_line(&mut input).unwrap();
        if read == 0 {
            // EOF
            return;
        }
        let input = input.trim_end();
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse();
        if !parser.errors().is_empty() {
            println!("parser errors:");
            for err in parser.errors() {
                println!("\t{}", err);
            }
            continue;
        }
        let evaluated = eval(&program, &env);
        println!("{}", evaluated);
    }
}
