use monkey_interpreter::environment::Environment;
use monkey_interpreter::evaluator::eval;
use monkey_interpreter::lexer::Lexer;
use monkey_interpreter::parser::Parser;
use std::time::Instant;

fn main() {
    let input = "
        let fib = fn(n) {
            if (n == 0) {
                return 0;
            } else {
                if (n == 1) {
                    return 1;
                } else {
                    return fib(n - 1) + fib(n - 2);
                }
            }
        };
        fib(25);
    ";
    let lexer = Lexer::new(input);
    let mut parser = Parser::new(lexer);
    let program = parser.parse();
    assert!(parser.errors().is_empty(), "{:?}", parser.errors());
    let env = Environment::new();

    let start = Instant::now();
    let result = eval(&program, &env);
    let end = Instant::now();

    println!("Program");
    println!("{}", input);
    println!("took {} seconds", end.duration_since(start).as_secs_f64());
    println!("result: {}", result);
}
