use std::cell::RefCell;
use std::fmt::{self, Display};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::class::Instance;
use crate::environment::{EnvArena, EnvRef};
use crate::error::Unwind;
use crate::interpreter::Interpreter;
use crate::object::{Callable, Object};
use crate::stmt::{FunctionDecl, FunctionKind};

#[derive(Debug, Clone)]
pub struct Function {
    pub declaration: Rc<FunctionDecl>,
    pub closure: EnvRef, // Environment captured where the function was declared
}

impl Function {
    pub fn new(declaration: Rc<FunctionDecl>, closure: EnvRef) -> Self {
        Function { declaration, closure }
    }

    pub fn is_initializer(&self) -> bool {
        self.declaration.kind == FunctionKind::Initializer
    }

    // Slides a one-entry frame binding `this` under the captured
    // environment.
    pub fn bind(&self, receiver: &Rc<RefCell<Instance>>, envs: &mut EnvArena) -> Function {
        let frame = envs.nest(self.closure);
        envs.define(frame, "this", Object::Instance(Rc::clone(receiver)));
        Function::new(Rc::clone(&self.declaration), frame)
    }
}

impl Callable for Function {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Object>,
    ) -> Result<Object, Unwind> {
        let frame = interpreter.envs.nest(self.closure);
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            interpreter.envs.define(frame, &param.lexeme, argument);
        }

        match interpreter.execute_block(&self.declaration.body, frame) {
            Ok(()) => {}
            Err(Unwind::Return(value)) => {
                if !self.is_initializer() {
                    return Ok(value);
                }
            }
            Err(other) => return Err(other),
        }

        if self.is_initializer() {
            // An initializer answers with its receiver no matter how the
            // body finished.
            let receiver = interpreter
                .envs
                .get(self.closure, "this")
                .expect("initializers to be called bound to an instance");
            Ok(receiver)
        } else {
            Ok(Object::nil())
        }
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.declaration.name.lexeme)
    }
}

#[derive(Debug)]
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub function: fn(&mut Interpreter<'_>, Vec<Object>) -> Result<Object, Unwind>,
}

impl NativeFunction {
    pub fn supplied() -> Vec<NativeFunction> {
        vec![NativeFunction {
            name: "clock",
            arity: 0,
            function: |_, _| {
                let seconds = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|elapsed| elapsed.as_secs_f64())
                    .unwrap_or_default();
                Ok(Object::from(seconds))
            },
        }]
    }
}

impl Callable for NativeFunction {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter<'_>,
        arguments: Vec<Object>,
    ) -> Result<Object, Unwind> {
        (self.function)(interpreter, arguments)
    }
}

impl Display for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn>")
    }
}
