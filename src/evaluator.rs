use crate::ast::{Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::environment::Environment;
use crate::object::{new_error, FunctionObject, Object, BUILTINS};
use std::rc::Rc;

// Reduces a program to a value. Return wrappers are unwrapped here, so a
// top-level `return 1;` yields 1; errors abort the remaining statements.
pub fn eval(program: &Program, env: &Rc<Environment>) -> Rc<Object> {
    let mut result = null_object();
    for stmt in program.statements() {
        result = eval_statement(stmt, env);
        match &*result {
            Object::ReturnValue(value) => return Rc::clone(value),
            Object::Error(..) => return result,
            _ => {}
        }
    }
    result
}

fn eval_statement(stmt: &Statement, env: &Rc<Environment>) -> Rc<Object> {
    match stmt {
        Statement::LetStatement { name, value } => {
            let value = eval_expression(value, env);
            if is_error(&value) {
                return value;
            }
            env.set(name.to_string(), value);
            null_object()
        }
        Statement::ReturnStatement(value) => {
            let value = eval_expression(value, env);
            if is_error(&value) {
                return value;
            }
            Rc::new(Object::ReturnValue(value))
        }
        Statement::ExpressionStatement(exp) => eval_expression(exp, env),
        Statement::BlockStatement(statements) => eval_block_statement(statements, env),
    }
}

// Unlike eval, keeps return wrappers intact so they unwind through
// nested blocks up to the enclosing function call.
fn eval_block_statement(statements: &[Statement], env: &Rc<Environment>) -> Rc<Object> {
    let mut result = null_object();
    for stmt in statements {
        result = eval_statement(stmt, env);
        match &*result {
            Object::ReturnValue(..) | Object::Error(..) => return result,
            _ => {}
        }
    }
    result
}

fn eval_expression(exp: &Expression, env: &Rc<Environment>) -> Rc<Object> {
    use Expression::*;
    match exp {
        Identifier(name) => eval_identifier(name, env),
        IntegerLiteral(value) => Rc::new(Object::Integer(*value)),
        Boolean(value) => boolean_object(*value),
        StringLiteral(value) => Rc::new(Object::MonkeyString(value.to_string())),
        ArrayLiteral(elements) => match eval_expressions(elements, env) {
            Ok(elements) => Rc::new(Object::ArrayObject(elements)),
            Err(err) => err,
        },
        PrefixExpression { operator, right } => {
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        InfixExpression {
            left,
            operator,
            right,
        } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        IfExpression {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env);
            if is_error(&condition) {
                return condition;
            }
            if is_truthy(&condition) {
                eval_statement(consequence, env)
            } else if let Some(alt) = alternative {
                eval_statement(alt, env)
            } else {
                null_object()
            }
        }
        FunctionLiteral { parameters, body } => Rc::new(Object::Function(FunctionObject::new(
            parameters.clone(),
            Rc::clone(body),
            Rc::clone(env),
        ))),
        CallExpression {
            function,
            arguments,
        } => {
            let function = eval_expression(function, env);
            if is_error(&function) {
                return function;
            }
            let arguments = match eval_expressions(arguments, env) {
                Ok(arguments) => arguments,
                Err(err) => return err,
            };
            apply_function(&function, arguments)
        }
        IndexExpression { left, index } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let index = eval_expression(index, env);
            if is_error(&index) {
                return index;
            }
            eval_index_expression(&left, &index)
        }
    }
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> Rc<Object> {
    if let Some(obj) = env.get(name) {
        return obj;
    }
    if let Some(builtin) = BUILTINS.get(name) {
        return Rc::new(Object::Builtin(builtin.clone()));
    }
    new_error(format!("identifier not found: {}", name))
}

// Left to right; the first error aborts the remaining expressions and
// becomes the value of the containing call or array literal.
fn eval_expressions(
    expressions: &[Expression],
    env: &Rc<Environment>,
) -> Result<Vec<Rc<Object>>, Rc<Object>> {
    let mut result = Vec::with_capacity(expressions.len());
    for exp in expressions {
        let evaluated = eval_expression(exp, env);
        if is_error(&evaluated) {
            return Err(evaluated);
        }
        result.push(evaluated);
    }
    Ok(result)
}

fn eval_prefix_expression(operator: &PrefixOperator, right: Rc<Object>) -> Rc<Object> {
    match operator {
        PrefixOperator::BANG => eval_bang_operator(right),
        PrefixOperator::MINUS => eval_minus_operator(right),
    }
}

fn eval_bang_operator(right: Rc<Object>) -> Rc<Object> {
    match &*right {
        Object::Boolean(value) => boolean_object(!value),
        Object::Null => boolean_object(true),
        _ => boolean_object(false),
    }
}

fn eval_minus_operator(right: Rc<Object>) -> Rc<Object> {
    match &*right {
        Object::Integer(value) => Rc::new(Object::Integer(-value)),
        other => new_error(format!("unknown operator: -{}", other.r#type())),
    }
}

fn eval_infix_expression(
    operator: &InfixOperator,
    left: Rc<Object>,
    right: Rc<Object>,
) -> Rc<Object> {
    use InfixOperator::*;
    match (&*left, &*right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::MonkeyString(l), Object::MonkeyString(r)) if *operator == PLUS => {
            Rc::new(Object::MonkeyString(format!("{}{}", l, r)))
        }
        (l, r) if l.r#type() != r.r#type() => new_error(format!(
            "type mismatch: {} {} {}",
            l.r#type(),
            operator,
            r.r#type()
        )),
        _ => match operator {
            EQ => boolean_object(objects_identical(&left, &right)),
            NEQ => boolean_object(!objects_identical(&left, &right)),
            _ => new_error(format!(
                "unknown operator: {} {} {}",
                left.r#type(),
                operator,
                right.r#type()
            )),
        },
    }
}

// Equality outside the integer table mirrors pointer identity on the
// shared sentinels: booleans and null compare by value, anything else by
// reference identity.
fn objects_identical(left: &Rc<Object>, right: &Rc<Object>) -> bool {
    match (&**left, &**right) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        _ => Rc::ptr_eq(left, right),
    }
}

fn eval_integer_infix_expression(operator: &InfixOperator, left: i64, right: i64) -> Rc<Object> {
    use InfixOperator::*;
    match operator {
        PLUS => Rc::new(Object::Integer(left + right)),
        MINUS => Rc::new(Object::Integer(left - right)),
        ASTERISK => Rc::new(Object::Integer(left * right)),
        SLASH => {
            if right == 0 {
                new_error("division by zero".to_string())
            } else {
                Rc::new(Object::Integer(left / right))
            }
        }
        LT => boolean_object(left < right),
        GT => boolean_object(left > right),
        EQ => boolean_object(left == right),
        NEQ => boolean_object(left != right),
    }
}

fn apply_function(function: &Rc<Object>, arguments: Vec<Rc<Object>>) -> Rc<Object> {
    match &**function {
        Object::Function(function) => {
            if arguments.len() != function.parameters().len() {
                return new_error(format!(
                    "wrong number of arguments. got={}, want={}",
                    arguments.len(),
                    function.parameters().len()
                ));
            }
            let env = extend_function_env(function, arguments);
            let value = eval_statement(function.body(), &env);
            unwrap_return_value(value)
        }
        Object::Builtin(builtin) => builtin.apply(&arguments),
        other => new_error(format!("not a function: {}", other.r#type())),
    }
}

fn extend_function_env(function: &FunctionObject, arguments: Vec<Rc<Object>>) -> Rc<Environment> {
    let env = Environment::new_enclosed(Rc::clone(function.env()));
    for (parameter, argument) in function.parameters().iter().zip(arguments) {
        env.set(parameter.to_string(), argument);
    }
    env
}

// The one boundary where a return wrapper is opened: without this, a
// return inside a called function would unwind the caller too.
fn unwrap_return_value(value: Rc<Object>) -> Rc<Object> {
    match &*value {
        Object::ReturnValue(inner) => Rc::clone(inner),
        _ => value,
    }
}

fn eval_index_expression(left: &Rc<Object>, index: &Rc<Object>) -> Rc<Object> {
    match (&**left, &**index) {
        (Object::ArrayObject(elements), Object::Integer(i)) => {
            if *i < 0 || *i >= elements.len() as i64 {
                null_object()
            } else {
                Rc::clone(&elements[*i as usize])
            }
        }
        (_, index) => new_error(format!(
            "index operator not supported: {}",
            index.r#type()
        )),
    }
}

fn is_truthy(obj: &Object) -> bool {
    !matches!(obj, Object::Boolean(false) | Object::Null)
}

fn is_error(obj: &Object) -> bool {
    matches!(obj, Object::Error(..))
}

fn boolean_object(value: bool) -> Rc<Object> {
    Rc::new(Object::Boolean(value))
}

fn null_object() -> Rc<Object> {
    Rc::new(Object::Null)
}

#[cfg(test)]
mod tests {
    use crate::environment::Environment;
    use crate::evaluator::eval;
    use crate::lexer::Lexer;
    use crate::object::Object;
    use crate::parser::Parser;
    use std::rc::Rc;

    fn eval_input(input: &str) -> Rc<Object> {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        let program = parser.parse();
        assert!(
            parser.errors().is_empty(),
            "parser errors: {:?}",
            parser.errors()
        );
        let env = Environment::new();
        eval(&program, &env)
    }

    fn test_integer_object(obj: &Object, expected: i64) {
        match obj {
            Object::Integer(value) => assert_eq!(*value, expected),
            other => panic!(
                "object is not Integer. got={} ({:?})",
                other.r#type(),
                other
            ),
        }
    }

    fn test_boolean_object(obj: &Object, expected: bool) {
        match obj {
            Object::Boolean(value) => assert_eq!(*value, expected),
            other => panic!(
                "object is not Boolean. got={} ({:?})",
                other.r#type(),
                other
            ),
        }
    }

    fn test_null_object(obj: &Object) {
        match obj {
            Object::Null => {}
            other => panic!("object is not Null. got={} ({:?})", other.r#type(), other),
        }
    }

    fn test_error_object(obj: &Object, expected: &str) {
        match obj {
            Object::Error(message) => assert_eq!(message, expected),
            other => panic!("object is not Error. got={} ({:?})", other.r#type(), other),
        }
    }

    #[test]
    fn test_eval_integer_expression() {
        let tests = vec![
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("3 * (3 * 3) + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("-7 / 2", -3),
        ];
        for (input, expected) in tests {
            test_integer_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_eval_boolean_expression() {
        let tests = vec![
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 < 1", false),
            ("1 > 1", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("false != true", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
            ("(1 > 2) == true", false),
            ("(1 > 2) == false", true),
        ];
        for (input, expected) in tests {
            test_boolean_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_bang_operator() {
        let tests = vec![
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
        ];
        for (input, expected) in tests {
            test_boolean_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_if_else_expressions() {
        let tests = vec![
            ("if (true) { 10 }", Some(10)),
            ("if (false) { 10 }", None),
            ("if (1) { 10 }", Some(10)),
            ("if (1 < 2) { 10 }", Some(10)),
            ("if (1 > 2) { 10 }", None),
            ("if (1 > 2) { 10 } else { 20 }", Some(20)),
            ("if (1 < 2) { 10 } else { 20 }", Some(10)),
        ];
        for (input, expected) in tests {
            let evaluated = eval_input(input);
            match expected {
                Some(value) => test_integer_object(&evaluated, value),
                None => test_null_object(&evaluated),
            }
        }
    }

    #[test]
    fn test_return_statements() {
        let tests = vec![
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "if (10 > 1) { if (10 > 1) { return 10; } return 1; }",
                10,
            ),
            ("let f = fn(x) { return x; x + 10; }; f(10);", 10),
            (
                "let f = fn(x) { let result = x + 10; return result; return 10; }; f(15);",
                25,
            ),
        ];
        for (input, expected) in tests {
            test_integer_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_error_handling() {
        let tests = vec![
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            (
                "if (10 > 1) { if (10 > 1) { return true + false; } return 1; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            (r#""Hello" - "World""#, "unknown operator: STRING - STRING"),
            (
                "[1, 2, 3][fn(x) { x }];",
                "index operator not supported: FUNCTION",
            ),
            ("5 / 0", "division by zero"),
            ("let x = 10 / 0; x;", "division by zero"),
        ];
        for (input, expected) in tests {
            test_error_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_error_short_circuits_arguments() {
        let evaluated = eval_input("len(foobar, 1 / 0)");
        test_error_object(&evaluated, "identifier not found: foobar");
    }

    #[test]
    fn test_let_statements() {
        let tests = vec![
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ];
        for (input, expected) in tests {
            test_integer_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_trailing_let_yields_null() {
        test_null_object(&eval_input("let a = 5;"));
    }

    #[test]
    fn test_empty_program_yields_null() {
        test_null_object(&eval_input(""));
    }

    #[test]
    fn test_function_object() {
        let evaluated = eval_input("fn(x) { x + 2; };");
        match &*evaluated {
            Object::Function(function) => {
                assert_eq!(function.parameters(), vec!["x".to_string()]);
                assert_eq!(function.body().to_string(), "(x + 2)");
            }
            other => panic!(
                "object is not Function. got={} ({:?})",
                other.r#type(),
                other
            ),
        }
        assert_eq!(evaluated.to_string(), "fn(x) {\n(x + 2)\n}");
    }

    #[test]
    fn test_function_application() {
        let tests = vec![
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            (
                "let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));",
                20,
            ),
            ("fn(x) { x; }(5)", 5),
        ];
        for (input, expected) in tests {
            test_integer_object(&eval_input(input), expected);
        }
    }

    #[test]
    fn test_closures() {
        let input = "
            let adder = fn(x) { fn(y) { x + y } };
            let addTwo = adder(2);
            addTwo(3);
        ";
        test_integer_object(&eval_input(input), 5);
    }

    #[test]
    fn test_closure_environments_are_independent() {
        let input = "
            let adder = fn(x) { fn(y) { x + y } };
            let addTwo = adder(2);
            let addTen = adder(10);
            addTwo(3) + addTen(3);
        ";
        test_integer_object(&eval_input(input), 18);
    }

    #[test]
    fn test_recursive_function() {
        let input = "
            let fib = fn(n) { if (n < 2) { n } else { fib(n - 1) + fib(n - 2) } };
            fib(10);
        ";
        test_integer_object(&eval_input(input), 55);
    }

    #[test]
    fn test_wrong_number_of_arguments() {
        let evaluated = eval_input("let add = fn(x, y) { x + y }; add(1);");
        test_error_object(&evaluated, "wrong number of arguments. got=1, want=2");
    }

    #[test]
    fn test_not_a_function() {
        let evaluated = eval_input("5();");
        test_error_object(&evaluated, "not a function: INTEGER");
    }

    #[test]
    fn test_string_literal() {
        let evaluated = eval_input(r#""Hello World!""#);
        assert_eq!(&*evaluated, &Object::MonkeyString("Hello World!".to_string()));
    }

    #[test]
    fn test_string_concatenation() {
        let evaluated = eval_input(r#""Hello" + " " + "World!""#);
        assert_eq!(&*evaluated, &Object::MonkeyString("Hello World!".to_string()));
    }

    #[test]
    fn test_builtin_functions() {
        let integer = |value| Object::Integer(value);
        let error = |message: &str| Object::Error(message.to_string());
        let array = |values: Vec<i64>| {
            Object::ArrayObject(
                values
                    .into_iter()
                    .map(|value| Rc::new(Object::Integer(value)))
                    .collect(),
            )
        };
        let tests = vec![
            (r#"len("")"#, integer(0)),
            (r#"len("four")"#, integer(4)),
            (r#"len("hello world")"#, integer(11)),
            ("len([1, 2, 3])", integer(3)),
            ("len([])", integer(0)),
            ("len(1)", error("argument to `len` not supported, got INTEGER")),
            (
                r#"len("one", "two")"#,
                error("wrong number of arguments. got=2, want=1"),
            ),
            ("first([1, 2, 3])", integer(1)),
            ("first([])", Object::Null),
            (
                "first(1)",
                error("argument to `first` not supported, got INTEGER"),
            ),
            ("last([1, 2, 3])", integer(3)),
            ("last([])", Object::Null),
            (
                "last(1)",
                error("argument to `last` not supported, got INTEGER"),
            ),
            ("rest([1, 2, 3])", array(vec![2, 3])),
            ("rest([1])", Object::Null),
            ("rest([])", Object::Null),
            (
                "rest(1)",
                error("argument to `rest` not supported, got INTEGER"),
            ),
            ("push([], 1)", array(vec![1])),
            ("push([1, 2], 3)", array(vec![1, 2, 3])),
            (
                "push(1, 1)",
                error("argument to `push` not supported, got INTEGER"),
            ),
            (
                "push([1])",
                error("wrong number of arguments. got=1, want=2"),
            ),
        ];
        for (input, expected) in tests {
            assert_eq!(&*eval_input(input), &expected, "input: {}", input);
        }
    }

    #[test]
    fn test_builtins_do_not_mutate_their_argument() {
        let input = "
            let a = [1, 2];
            let b = push(a, 3);
            len(a) + len(b);
        ";
        test_integer_object(&eval_input(input), 5);
    }

    #[test]
    fn test_array_literals() {
        let evaluated = eval_input("[1, 2 * 2, 3 + 3]");
        match &*evaluated {
            Object::ArrayObject(elements) => {
                assert_eq!(elements.len(), 3);
                test_integer_object(&elements[0], 1);
                test_integer_object(&elements[1], 4);
                test_integer_object(&elements[2], 6);
            }
            other => panic!("object is not Array. got={} ({:?})", other.r#type(), other),
        }
    }

    #[test]
    fn test_array_index_expressions() {
        let tests = vec![
            ("[1, 2, 3][0]", Some(1)),
            ("[1, 2, 3][1]", Some(2)),
            ("[1, 2, 3][2]", Some(3)),
            ("let i = 0; [1][i];", Some(1)),
            ("[1, 2, 3][1 + 1];", Some(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Some(3)),
            (
                "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
                Some(6),
            ),
            (
                "let myArray = [1, 2, 3]; let i = myArray[0]; myArray[i]",
                Some(2),
            ),
            ("[1, 2, 3][3]", None),
            ("[1, 2, 3][-1]", None),
            ("[1, 2, 3][99]", None),
        ];
        for (input, expected) in tests {
            let evaluated = eval_input(input);
            match expected {
                Some(value) => test_integer_object(&evaluated, value),
                None => test_null_object(&evaluated),
            }
        }
    }
}
