use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

use crate::environment::EnvArena;
use crate::error::Unwind;
use crate::function::Function;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};

// Immutable once the declaration has evaluated.
#[derive(Debug)]
pub struct Class {
    pub name: String,
    pub superclass: Option<Rc<Class>>,
    pub methods: HashMap<String, Function>,
}

impl Class {
    pub fn new(
        name: String,
        superclass: Option<Rc<Class>>,
        methods: HashMap<String, Function>,
    ) -> Self {
        Class { name, superclass, methods }
    }

    pub fn find_method(&self, name: &str) -> Option<&Function> {
        match self.methods.get(name) {
            Some(method) => Some(method),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }
}

impl Callable for Rc<Class> {
    fn arity(&self) -> usize {
        self.find_method("init").map_or(0, |initializer| initializer.arity())
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Object>,
    ) -> Result<Object, Unwind> {
        let instance = Rc::new(RefCell::new(Instance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method("init") {
            initializer
                .bind(&instance, &mut interpreter.envs)
                .call(interpreter, arguments)?;
        }

        Ok(Object::Instance(instance))
    }
}

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug)]
pub struct Instance {
    pub class: Rc<Class>,
    pub fields: HashMap<String, Object>,
}

impl Instance {
    pub fn new(class: Rc<Class>) -> Self {
        Instance { class, fields: HashMap::new() }
    }

    // Fields shadow methods; a method comes back bound to the instance.
    pub fn get(
        instance: &Rc<RefCell<Instance>>,
        name: &str,
        envs: &mut EnvArena,
    ) -> Option<Object> {
        if let Some(field) = instance.borrow().fields.get(name) {
            return Some(field.clone());
        }

        let class = Rc::clone(&instance.borrow().class);
        let method = class.find_method(name)?.bind(instance, envs);
        Some(Object::Function(Rc::new(method)))
    }

    // Writes always land in the field map, never in a method slot.
    pub fn set(&mut self, name: &str, value: Object) {
        self.fields.insert(name.to_owned(), value);
    }
}

impl Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.class.name)
    }
}
