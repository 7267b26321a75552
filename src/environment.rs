use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::class::Class;
use crate::object::Object;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvRef(usize);

#[derive(Debug)]
struct Frame {
    parent: Option<EnvRef>,
    values: HashMap<String, Object>,
}

// Every scope frame lives in one arena, addressed by index handle, so
// closures and the frames that store them can reference each other
// without ownership cycles.
#[derive(Debug, Default)]
pub struct EnvArena {
    frames: Vec<Option<Frame>>,
    free: Vec<usize>,
}

impl EnvArena {
    pub fn new() -> Self {
        EnvArena::default()
    }

    fn alloc(&mut self, parent: Option<EnvRef>) -> EnvRef {
        let frame = Frame { parent, values: HashMap::new() };

        match self.free.pop() {
            Some(index) => {
                self.frames[index] = Some(frame);
                EnvRef(index)
            }
            None => {
                self.frames.push(Some(frame));
                EnvRef(self.frames.len() - 1)
            }
        }
    }

    pub fn root(&mut self) -> EnvRef {
        self.alloc(None)
    }

    pub fn nest(&mut self, parent: EnvRef) -> EnvRef {
        self.alloc(Some(parent))
    }

    fn frame(&self, env: EnvRef) -> &Frame {
        self.frames[env.0].as_ref().expect("frame handles to point at live frames")
    }

    fn frame_mut(&mut self, env: EnvRef) -> &mut Frame {
        self.frames[env.0].as_mut().expect("frame handles to point at live frames")
    }

    pub fn define(&mut self, env: EnvRef, name: &str, value: Object) {
        self.frame_mut(env).values.insert(name.to_owned(), value);
    }

    // Frame-local only, never a chain search. Resolved access jumps to
    // the owning frame first; global access only consults the root.
    pub fn get(&self, env: EnvRef, name: &str) -> Option<Object> {
        self.frame(env).values.get(name).cloned()
    }

    pub fn assign(&mut self, env: EnvRef, name: &str, value: Object) -> bool {
        match self.frame_mut(env).values.get_mut(name) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn ancestor(&self, env: EnvRef, distance: usize) -> EnvRef {
        let mut env = env;
        for _ in 0..distance {
            env = self.frame(env).parent.expect("resolved distances to stay within the chain");
        }
        env
    }

    pub fn get_at(&self, env: EnvRef, distance: usize, name: &str) -> Option<Object> {
        self.get(self.ancestor(env, distance), name)
    }

    pub fn assign_at(&mut self, env: EnvRef, distance: usize, name: &str, value: Object) -> bool {
        let target = self.ancestor(env, distance);
        self.assign(target, name, value)
    }

    pub fn allocated(&self) -> usize {
        self.frames.len() - self.free.len()
    }

    // Mark and sweep. The caller must guarantee no live frame is
    // reachable only from values currently held on the Rust stack; the
    // interpreter collects between top-level statements only.
    pub fn collect(&mut self, roots: &[EnvRef]) {
        let mut marked = vec![false; self.frames.len()];
        let mut pending: Vec<EnvRef> = roots.to_vec();
        let mut seen = Traced::default();

        while let Some(env) = pending.pop() {
            if marked[env.0] {
                continue;
            }
            marked[env.0] = true;

            let frame = self.frames[env.0].as_ref().expect("reachable frames to be live");
            if let Some(parent) = frame.parent {
                pending.push(parent);
            }
            for value in frame.values.values() {
                trace_object(value, &mut pending, &mut seen);
            }
        }

        for (index, slot) in self.frames.iter_mut().enumerate() {
            if slot.is_some() && !marked[index] {
                *slot = None;
                self.free.push(index);
            }
        }
    }
}

// Revisit guards so field graphs with cycles terminate.
#[derive(Default)]
struct Traced {
    instances: HashSet<usize>,
    classes: HashSet<usize>,
}

fn trace_object(object: &Object, pending: &mut Vec<EnvRef>, seen: &mut Traced) {
    match object {
        Object::Literal(_) | Object::NativeFunction(_) => {}
        Object::Function(function) => pending.push(function.closure),
        Object::Class(class) => trace_class(class, pending, seen),
        Object::Instance(instance) => {
            if seen.instances.insert(Rc::as_ptr(instance) as usize) {
                let instance = instance.borrow();
                trace_class(&instance.class, pending, seen);
                for value in instance.fields.values() {
                    trace_object(value, pending, seen);
                }
            }
        }
    }
}

fn trace_class(class: &Rc<Class>, pending: &mut Vec<EnvRef>, seen: &mut Traced) {
    if seen.classes.insert(Rc::as_ptr(class) as usize) {
        for method in class.methods.values() {
            pending.push(method.closure);
        }
        if let Some(superclass) = &class.superclass {
            trace_class(superclass, pending, seen);
        }
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use super::*;
    use crate::function::Function;
    use crate::stmt::{FunctionDecl, FunctionKind};
    use crate::token::{Location, Token, TokenKind};

    fn function_at(closure: EnvRef) -> Object {
        let declaration = Rc::new(FunctionDecl {
            name: Token::new(TokenKind::Identifier, "f", None, Location::new(1, 1)),
            params: vec![],
            body: vec![],
            kind: FunctionKind::Function,
        });
        Object::Function(Rc::new(Function::new(declaration, closure)))
    }

    #[test]
    fn define_then_get_in_the_same_frame() {
        let mut envs = EnvArena::new();
        let globals = envs.root();

        envs.define(globals, "a", Object::from(1.0));

        assert_eq!(envs.get(globals, "a"), Some(Object::from(1.0)));
        assert_eq!(envs.get(globals, "b"), None);
    }

    #[test]
    fn get_never_searches_the_chain() {
        let mut envs = EnvArena::new();
        let globals = envs.root();
        let inner = envs.nest(globals);

        envs.define(globals, "a", Object::from(1.0));

        assert_eq!(envs.get(inner, "a"), None);
        assert_eq!(envs.get_at(inner, 1, "a"), Some(Object::from(1.0)));
    }

    #[test]
    fn assign_fails_when_the_name_is_absent() {
        let mut envs = EnvArena::new();
        let globals = envs.root();

        assert!(!envs.assign(globals, "a", Object::from(1.0)));

        envs.define(globals, "a", Object::from(1.0));
        assert!(envs.assign(globals, "a", Object::from(2.0)));
        assert_eq!(envs.get(globals, "a"), Some(Object::from(2.0)));
    }

    #[test]
    fn assign_at_writes_the_skipped_to_frame() {
        let mut envs = EnvArena::new();
        let globals = envs.root();
        let middle = envs.nest(globals);
        let inner = envs.nest(middle);

        envs.define(middle, "a", Object::from(1.0));
        envs.define(inner, "a", Object::from(2.0));

        assert!(envs.assign_at(inner, 1, "a", Object::from(3.0)));
        assert_eq!(envs.get(middle, "a"), Some(Object::from(3.0)));
        assert_eq!(envs.get(inner, "a"), Some(Object::from(2.0)));
    }

    #[test]
    fn collect_frees_unreachable_frames() {
        let mut envs = EnvArena::new();
        let globals = envs.root();
        let dead = envs.nest(globals);
        envs.define(dead, "x", Object::from(1.0));

        envs.collect(&[globals]);

        assert_eq!(envs.allocated(), 1);
        assert_eq!(envs.get(globals, "x"), None);
    }

    #[test]
    fn collect_keeps_frames_captured_by_closures() {
        let mut envs = EnvArena::new();
        let globals = envs.root();
        let captured = envs.nest(globals);
        envs.define(captured, "i", Object::from(0.0));
        envs.define(globals, "counter", function_at(captured));

        envs.collect(&[globals]);

        assert_eq!(envs.allocated(), 2);
        assert_eq!(envs.get(captured, "i"), Some(Object::from(0.0)));
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut envs = EnvArena::new();
        let globals = envs.root();
        let dead = envs.nest(globals);

        envs.collect(&[globals]);
        let recycled = envs.nest(globals);

        assert_eq!(recycled, dead);
        assert_eq!(envs.allocated(), 2);
    }
}
