use std::fmt::{Display, Formatter};
use std::rc::Rc;

#[derive(Debug)]
pub struct Program {
    pub(crate) statements: Vec<Statement>,
}

impl Program {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Statement {
    LetStatement { name: String, value: Expression },
    ReturnStatement(Expression),
    ExpressionStatement(Expression),
    BlockStatement(Vec<Statement>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Identifier(String),
    IntegerLiteral(i64),
    Boolean(bool),
    StringLiteral(String),
    ArrayLiteral(Vec<Expression>),
    PrefixExpression {
        operator: PrefixOperator,
        right: Box<Expression>,
    },
    InfixExpression {
        left: Box<Expression>,
        operator: InfixOperator,
        right: Box<Expression>,
    },
    IfExpression {
        condition: Box<Expression>,
        consequence: Box<Statement>,
        alternative: Option<Box<Statement>>,
    },
    FunctionLiteral {
        parameters: Vec<String>,
        body: Rc<Statement>,
    },
    CallExpression {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    IndexExpression {
        left: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum InfixOperator {
    PLUS,
    MINUS,
    ASTERISK,
    SLASH,
    LT,
    GT,
    EQ,
    NEQ,
}

#[derive(Debug, PartialEq, Clone)]
pub enum PrefixOperator {
    MINUS,
    BANG,
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for stmt in &self.statements {
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Statement::*;
        match self {
            LetStatement { name, value } => {
                write!(f, "let {} = {};", name, value)
            }
            ReturnStatement(value) => {
                write!(f, "return {};", value)
            }
            ExpressionStatement(exp) => {
                write!(f, "{}", exp)
            }
            BlockStatement(statements) => {
                for stmt in statements {
                    write!(f, "{}", stmt)?;
                }
                Ok(())
            }
        }
    }
}

fn join(expressions: &[Expression]) -> String {
    expressions
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<String>>()
        .join(", ")
}

impl Display for Expression {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Expression::*;
        match self {
            Identifier(name) => {
                write!(f, "{}", name)
            }
            IntegerLiteral(value) => {
                write!(f, "{}", value)
            }
            Boolean(value) => {
                write!(f, "{}", value)
            }
            StringLiteral(value) => {
                write!(f, "{}", value)
            }
            ArrayLiteral(elements) => {
                write!(f, "[{}]", join(elements))
            }
            PrefixExpression { operator, right } => {
                write!(f, "({}{})", operator, right)
            }
            InfixExpression {
                left,
                operator,
                right,
            } => {
                write!(f, "({} {} {})", left, operator, right)
            }
            IfExpression {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{} {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, "else {}", alt)?;
                }
                Ok(())
            }
            FunctionLiteral { parameters, body } => {
                write!(f, "fn({}){}", parameters.join(", "), body)
            }
            CallExpression {
                function,
                arguments,
            } => {
                write!(f, "{}({})", function, join(arguments))
            }
            IndexExpression { left, index } => {
                write!(f, "({}[{}])", left, index)
            }
        }
    }
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use PrefixOperator::*;
        match self {
            MINUS => {
                write!(f, "-")
            }
            BANG => {
                write!(f, "!")
            }
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use InfixOperator::*;
        match self {
            PLUS => {
                write!(f, "+")
            }
            MINUS => {
                write!(f, "-")
            }
            ASTERISK => {
                write!(f, "*")
            }
            SLASH => {
                write!(f, "/")
            }
            LT => {
                write!(f, "<")
            }
            GT => {
                write!(f, ">")
            }
            EQ => {
                write!(f, "==")
            }
            NEQ => {
                write!(f, "!=")
            }
        }
    }
}
