use crate::object::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// A scope in the environment chain. Closures keep their defining scope
// alive through the Rc handle; each call builds a fresh child scope.
#[derive(Debug)]
pub struct Environment {
    store: RefCell<HashMap<String, Rc<Object>>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Environment> {
        Rc::new(Self {
            store: RefCell::new(HashMap::new()),
            outer: None,
        })
    }
    pub fn new_enclosed(outer: Rc<Environment>) -> Rc<Environment> {
        Rc::new(Self {
            store: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }
    pub fn get(&self, name: &str) -> Option<Rc<Object>> {
        match self.store.borrow().get(name) {
            Some(obj) => Some(Rc::clone(obj)),
            None => self.outer.as_ref().and_then(|outer| outer.get(name)),
        }
    }
    // Always writes the local scope, never an outer one.
    pub fn set(&self, name: String, value: Rc<Object>) {
        self.store.borrow_mut().insert(name, value);
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::Environment;
    use crate::object::Object;
    use std::rc::Rc;

    #[test]
    fn test_get_and_set() {
        let env = Environment::new();
        assert_eq!(env.get("a"), None);
        env.set("a".to_string(), Rc::new(Object::Integer(1)));
        assert_eq!(env.get("a").as_deref(), Some(&Object::Integer(1)));
    }

    #[test]
    fn test_enclosed_lookup_walks_outer() {
        let outer = Environment::new();
        outer.set("a".to_string(), Rc::new(Object::Integer(1)));
        let inner = Environment::new_enclosed(Rc::clone(&outer));
        assert_eq!(inner.get("a").as_deref(), Some(&Object::Integer(1)));
    }

    #[test]
    fn test_set_shadows_without_touching_outer() {
        let outer = Environment::new();
        outer.set("a".to_string(), Rc::new(Object::Integer(1)));
        let inner = Environment::new_enclosed(Rc::clone(&outer));
        inner.set("a".to_string(), Rc::new(Object::Integer(2)));
        assert_eq!(inner.get("a").as_deref(), Some(&Object::Integer(2)));
        assert_eq!(outer.get("a").as_deref(), Some(&Object::Integer(1)));
    }
}
