use crate::ast::Statement;
use crate::environment::Environment;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    MonkeyString(String),
    ArrayObject(Vec<Rc<Object>>),
    ReturnValue(Rc<Object>),
    Error(String),
    Function(FunctionObject),
    Builtin(Builtin),
    Null,
}

impl Object {
    pub fn r#type(&self) -> &'static str {
        use Object::*;
        match self {
            Integer(..) => "INTEGER",
            Boolean(..) => "BOOLEAN",
            MonkeyString(..) => "STRING",
            ArrayObject(..) => "ARRAY",
            ReturnValue(..) => "RETURN_VALUE",
            Error(..) => "ERROR",
            Function(..) => "FUNCTION",
            Builtin(..) => "BUILTIN",
            Null => "NULL",
        }
    }
}

// Functions and builtins only compare equal to themselves; everything
// else compares by content.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        use Object::*;
        match (self, other) {
            (Integer(l), Integer(r)) => l == r,
            (Boolean(l), Boolean(r)) => l == r,
            (MonkeyString(l), MonkeyString(r)) => l == r,
            (ArrayObject(l), ArrayObject(r)) => l == r,
            (ReturnValue(l), ReturnValue(r)) => l == r,
            (Error(l), Error(r)) => l == r,
            (Function(l), Function(r)) => Rc::ptr_eq(l.body(), r.body()),
            (Builtin(l), Builtin(r)) => l == r,
            (Null, Null) => true,
            _ => false,
        }
    }
}

// Inspect: the canonical textual rendering used by the REPL and tests.
impl Display for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Object::*;
        match self {
            Integer(value) => {
                write!(f, "{}", value)
            }
            Boolean(value) => {
                write!(f, "{}", value)
            }
            MonkeyString(value) => {
                write!(f, "{}", value)
            }
            ArrayObject(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                write!(f, "[{}]", elements)
            }
            ReturnValue(value) => {
                write!(f, "{}", value)
            }
            Error(message) => {
                write!(f, "Error: {}", message)
            }
            Function(function) => {
                write!(
                    f,
                    "fn({}) {{\n{}\n}}",
                    function.parameters().join(", "),
                    function.body()
                )
            }
            Builtin(..) => {
                write!(f, "builtin function")
            }
            Null => {
                write!(f, "null")
            }
        }
    }
}

#[derive(Clone)]
pub struct FunctionObject {
    parameters: Rc<Vec<String>>,
    body: Rc<Statement>,
    env: Rc<Environment>,
}

impl FunctionObject {
    pub fn new(parameters: Vec<String>, body: Rc<Statement>, env: Rc<Environment>) -> Self {
        Self {
            parameters: Rc::new(parameters),
            body,
            env,
        }
    }
    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }
    pub fn body(&self) -> &Rc<Statement> {
        &self.body
    }
    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }
}

// The captured environment may hold this very function, so dumping it
// would never terminate.
impl Debug for FunctionObject {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionObject")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish()
    }
}

pub type BuiltinFunction = fn(&[Rc<Object>]) -> Rc<Object>;

#[derive(Clone)]
pub struct Builtin {
    name: &'static str,
    function: BuiltinFunction,
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn apply(&self, args: &[Rc<Object>]) -> Rc<Object> {
        (self.function)(args)
    }
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builtin").field("name", &self.name).finish()
    }
}

pub(crate) fn new_error(message: String) -> Rc<Object> {
    Rc::new(Object::Error(message))
}

pub static BUILTINS: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    let mut builtins = HashMap::new();
    for builtin in [
        Builtin {
            name: "len",
            function: builtin_len,
        },
        Builtin {
            name: "first",
            function: builtin_first,
        },
        Builtin {
            name: "last",
            function: builtin_last,
        },
        Builtin {
            name: "rest",
            function: builtin_rest,
        },
        Builtin {
            name: "push",
            function: builtin_push,
        },
    ] {
        builtins.insert(builtin.name, builtin);
    }
    builtins
});

fn builtin_len(args: &[Rc<Object>]) -> Rc<Object> {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &*args[0] {
        Object::MonkeyString(value) => Rc::new(Object::Integer(value.len() as i64)),
        Object::ArrayObject(elements) => Rc::new(Object::Integer(elements.len() as i64)),
        other => new_error(format!(
            "argument to `len` not supported, got {}",
            other.r#type()
        )),
    }
}

fn builtin_first(args: &[Rc<Object>]) -> Rc<Object> {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &*args[0] {
        Object::ArrayObject(elements) => match elements.first() {
            Some(element) => Rc::clone(element),
            None => Rc::new(Object::Null),
        },
        other => new_error(format!(
            "argument to `first` not supported, got {}",
            other.r#type()
        )),
    }
}

fn builtin_last(args: &[Rc<Object>]) -> Rc<Object> {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &*args[0] {
        Object::ArrayObject(elements) => match elements.last() {
            Some(element) => Rc::clone(element),
            None => Rc::new(Object::Null),
        },
        other => new_error(format!(
            "argument to `last` not supported, got {}",
            other.r#type()
        )),
    }
}

// A one-element array yields null, not an empty array.
fn builtin_rest(args: &[Rc<Object>]) -> Rc<Object> {
    if args.len() != 1 {
        return new_error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &*args[0] {
        Object::ArrayObject(elements) => {
            if elements.len() > 1 {
                Rc::new(Object::ArrayObject(elements[1..].to_vec()))
            } else {
                Rc::new(Object::Null)
            }
        }
        other => new_error(format!(
            "argument to `rest` not supported, got {}",
            other.r#type()
        )),
    }
}

fn builtin_push(args: &[Rc<Object>]) -> Rc<Object> {
    if args.len() != 2 {
        return new_error(format!(
            "wrong number of arguments. got={}, want=2",
            args.len()
        ));
    }
    match &*args[0] {
        Object::ArrayObject(elements) => {
            let mut elements = elements.clone();
            elements.push(Rc::clone(&args[1]));
            Rc::new(Object::ArrayObject(elements))
        }
        other => new_error(format!(
            "argument to `push` not supported, got {}",
            other.r#type()
        )),
    }
}
