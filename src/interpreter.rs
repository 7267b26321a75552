use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use crate::class::{Class, Instance};
use crate::environment::{EnvArena, EnvRef};
use crate::error::{Report, RuntimeError, Unwind};
use crate::expr::*;
use crate::function::{Function, NativeFunction};
use crate::literal::Literal;
use crate::object::{Callable, Object};
use crate::stmt::*;
use crate::token::{Token, TokenKind};

type EvalResult = Result<Object, Unwind>;
type ExecResult = Result<(), Unwind>;

// Arenas smaller than this are never worth sweeping.
const GC_FLOOR: usize = 64;

pub struct Interpreter<'a> {
    pub envs: EnvArena,
    pub globals: EnvRef,
    environment: EnvRef,
    locals: HashMap<Token, usize>,
    gc_threshold: usize,
    out: &'a mut dyn Write,
}

impl<'a> Interpreter<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        let mut envs = EnvArena::new();
        let globals = envs.root();

        for native in NativeFunction::supplied() {
            let name = native.name;
            envs.define(globals, name, Object::NativeFunction(Rc::new(native)));
        }

        Interpreter {
            envs,
            globals,
            environment: globals,
            locals: HashMap::new(),
            gc_threshold: GC_FLOOR,
            out,
        }
    }

    // Distances must be complete before interpret runs.
    pub fn resolve(&mut self, name: &Token, distance: usize) {
        self.locals.insert(name.clone(), distance);
    }

    pub fn interpret(&mut self, statements: &[Stmt]) {
        for statement in statements {
            match self.execute(statement) {
                Ok(()) => self.collect_garbage(),
                Err(Unwind::Error(error)) => {
                    error.report();
                    return;
                }
                Err(Unwind::Return(_) | Unwind::Break) => {
                    unreachable!("resolver rejects return and break outside their constructs")
                }
            }
        }
    }

    fn execute(&mut self, stmt: &Stmt) -> ExecResult {
        stmt.accept(self)
    }

    fn evaluate(&mut self, expr: &Expr) -> EvalResult {
        expr.accept(self)
    }

    pub fn execute_block(&mut self, statements: &[Stmt], environment: EnvRef) -> ExecResult {
        let previous = self.environment;
        self.environment = environment;

        let result = statements.iter().try_for_each(|statement| self.execute(statement));

        self.environment = previous;
        result
    }

    // Only safe between top-level statements: mid-evaluation, a value on
    // the Rust stack may hold the only path to a frame.
    fn collect_garbage(&mut self) {
        if self.envs.allocated() < self.gc_threshold {
            return;
        }

        self.envs.collect(&[self.globals, self.environment]);
        self.gc_threshold = (self.envs.allocated() * 2).max(GC_FLOOR);
    }

    fn look_up_variable(&self, name: &Token) -> EvalResult {
        let value = match self.locals.get(name) {
            Some(&distance) => self.envs.get_at(self.environment, distance, &name.lexeme),
            None => self.envs.get(self.globals, &name.lexeme),
        };

        value.ok_or_else(|| undefined_variable(name))
    }
}

fn runtime_error(token: &Token, message: impl Into<String>) -> Unwind {
    Unwind::Error(RuntimeError {
        token: token.clone(),
        message: message.into(),
    })
}

fn undefined_variable(name: &Token) -> Unwind {
    runtime_error(name, format!("Undefined variable '{}'", name.lexeme))
}

fn numeric_operands(operator: &Token, left: &Object, right: &Object) -> Result<(f64, f64), Unwind> {
    match (left.as_number(), right.as_number()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(runtime_error(operator, "Operands must be numbers")),
    }
}

impl ExprVisitor<EvalResult> for Interpreter<'_> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> EvalResult {
        Ok(Object::Literal(literal.clone()))
    }

    fn visit_unary_expr(&mut self, unary: &UnaryExpr) -> EvalResult {
        let operand = self.evaluate(&unary.operand)?;

        match unary.operator.kind {
            TokenKind::Minus => match operand.as_number() {
                Some(value) => Ok(Object::from(-value)),
                None => Err(runtime_error(&unary.operator, "Operand must be a number")),
            },
            TokenKind::Bang => Ok(Object::from(!operand.is_truthy())),
            _ => unreachable!("parser only builds unary nodes for '!' and '-'"),
        }
    }

    fn visit_binary_expr(&mut self, binary: &BinaryExpr) -> EvalResult {
        let left = self.evaluate(&binary.left)?;
        let right = self.evaluate(&binary.right)?;
        let operator = &binary.operator;

        match operator.kind {
            TokenKind::Plus => match (&left, &right) {
                (Object::Literal(Literal::Number(l)), Object::Literal(Literal::Number(r))) => {
                    Ok(Object::from(l + r))
                }
                // One string operand pulls the other over to its textual
                // form, so "n = " + 3 concatenates.
                _ if left.is_string() || right.is_string() => {
                    Ok(Object::from(format!("{left}{right}")))
                }
                _ => Err(runtime_error(
                    operator,
                    format!("Cannot add operands of types {} and {}", left.type_name(), right.type_name()),
                )),
            },
            TokenKind::Minus => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l - r))
            }
            TokenKind::Star => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l * r))
            }
            // Division by zero is not an error; the result follows the
            // doubles (inf, -inf, or NaN).
            TokenKind::Slash => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l / r))
            }
            TokenKind::Greater => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l > r))
            }
            TokenKind::GreaterEqual => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l >= r))
            }
            TokenKind::Less => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l < r))
            }
            TokenKind::LessEqual => {
                let (l, r) = numeric_operands(operator, &left, &right)?;
                Ok(Object::from(l <= r))
            }
            TokenKind::EqualEqual => Ok(Object::from(left == right)),
            TokenKind::BangEqual => Ok(Object::from(left != right)),
            _ => unreachable!("parser only builds binary nodes for binary operators"),
        }
    }

    fn visit_logical_expr(&mut self, logical: &LogicalExpr) -> EvalResult {
        let left = self.evaluate(&logical.left)?;

        let short_circuits = match logical.operator.kind {
            TokenKind::Or => left.is_truthy(),
            TokenKind::And => !left.is_truthy(),
            _ => unreachable!("parser only builds logical nodes for 'and' and 'or'"),
        };

        if short_circuits {
            Ok(left)
        } else {
            self.evaluate(&logical.right)
        }
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingExpr) -> EvalResult {
        self.evaluate(&grouping.expr)
    }

    fn visit_variable_expr(&mut self, variable: &VariableExpr) -> EvalResult {
        self.look_up_variable(&variable.name)
    }

    fn visit_assign_expr(&mut self, assign: &AssignExpr) -> EvalResult {
        let value = self.evaluate(&assign.value)?;

        match self.locals.get(&assign.name) {
            Some(&distance) => {
                if !self.envs.assign_at(self.environment, distance, &assign.name.lexeme, value.clone()) {
                    return Err(undefined_variable(&assign.name));
                }
            }
            // An unresolved assignment lands in the global scope,
            // creating the name when it is not bound yet.
            None => self.envs.define(self.globals, &assign.name.lexeme, value.clone()),
        }

        Ok(value)
    }

    fn visit_call_expr(&mut self, call: &CallExpr) -> EvalResult {
        let callee = self.evaluate(&call.callee)?;

        let mut arguments = Vec::with_capacity(call.arguments.len());
        for argument in &call.arguments {
            arguments.push(self.evaluate(argument)?);
        }

        let callable: &dyn Callable = match &callee {
            Object::Function(function) => function.as_ref(),
            Object::NativeFunction(native) => native.as_ref(),
            Object::Class(class) => class,
            _ => return Err(runtime_error(&call.paren, "Can only call functions and classes")),
        };

        if arguments.len() != callable.arity() {
            return Err(runtime_error(
                &call.paren,
                format!("Expected {} arguments but got {}", callable.arity(), arguments.len()),
            ));
        }

        callable.call(self, arguments)
    }

    fn visit_get_expr(&mut self, get: &GetExpr) -> EvalResult {
        let object = self.evaluate(&get.object)?;

        let Object::Instance(instance) = object else {
            return Err(runtime_error(&get.name, "Only instances have properties"));
        };

        Instance::get(&instance, &get.name.lexeme, &mut self.envs).ok_or_else(|| {
            runtime_error(&get.name, format!("Undefined property '{}'", get.name.lexeme))
        })
    }

    fn visit_set_expr(&mut self, set: &SetExpr) -> EvalResult {
        let object = self.evaluate(&set.object)?;

        let Object::Instance(instance) = object else {
            return Err(runtime_error(&set.name, "Only instances have fields"));
        };

        let value = self.evaluate(&set.value)?;
        instance.borrow_mut().set(&set.name.lexeme, value.clone());
        Ok(value)
    }

    fn visit_this_expr(&mut self, this: &ThisExpr) -> EvalResult {
        self.look_up_variable(&this.keyword)
    }

    fn visit_super_expr(&mut self, sup: &SuperExpr) -> EvalResult {
        let distance = *self
            .locals
            .get(&sup.keyword)
            .expect("resolver to record a distance for every 'super'");

        let Some(Object::Class(superclass)) = self.envs.get_at(self.environment, distance, "super")
        else {
            unreachable!("'super' to be bound to the superclass at its distance")
        };
        // The receiver's frame sits directly inside the superclass frame.
        let Some(Object::Instance(receiver)) =
            self.envs.get_at(self.environment, distance - 1, "this")
        else {
            unreachable!("'this' to be bound below 'super'")
        };

        let Some(method) = superclass.find_method(&sup.method.lexeme) else {
            return Err(runtime_error(
                &sup.method,
                format!("Undefined property '{}'", sup.method.lexeme),
            ));
        };

        let bound = method.bind(&receiver, &mut self.envs);
        Ok(Object::Function(Rc::new(bound)))
    }
}

impl StmtVisitor<ExecResult> for Interpreter<'_> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> ExecResult {
        self.evaluate(&stmt.expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, stmt: &PrintStmt) -> ExecResult {
        let value = self.evaluate(&stmt.expr)?;
        writeln!(self.out, "{value}").ok();
        Ok(())
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) -> ExecResult {
        let value = match &stmt.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Object::nil(),
        };

        self.envs.define(self.environment, &stmt.name.lexeme, value);
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) -> ExecResult {
        let frame = self.envs.nest(self.environment);
        self.execute_block(&stmt.statements, frame)
    }

    fn visit_if_stmt(&mut self, stmt: &IfStmt) -> ExecResult {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            self.execute(&stmt.then_branch)
        } else if let Some(else_branch) = &stmt.else_branch {
            self.execute(else_branch)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) -> ExecResult {
        while self.evaluate(&stmt.condition)?.is_truthy() {
            match self.execute(&stmt.body) {
                Ok(()) => {}
                // break leaves exactly this loop; an outer loop keeps
                // running.
                Err(Unwind::Break) => break,
                Err(other) => return Err(other),
            }
        }

        Ok(())
    }

    fn visit_function_stmt(&mut self, decl: &Rc<FunctionDecl>) -> ExecResult {
        let function = Function::new(Rc::clone(decl), self.environment);
        self.envs.define(
            self.environment,
            &decl.name.lexeme,
            Object::Function(Rc::new(function)),
        );
        Ok(())
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) -> ExecResult {
        let value = match &stmt.value {
            Some(value) => self.evaluate(value)?,
            None => Object::nil(),
        };

        Err(Unwind::Return(value))
    }

    fn visit_break_stmt(&mut self, _stmt: &BreakStmt) -> ExecResult {
        Err(Unwind::Break)
    }

    fn visit_class_stmt(&mut self, stmt: &ClassStmt) -> ExecResult {
        let superclass = match &stmt.superclass {
            Some(variable) => match self.look_up_variable(&variable.name)? {
                Object::Class(class) => Some(class),
                _ => return Err(runtime_error(&variable.name, "Superclass must be a class")),
            },
            None => None,
        };

        // Methods close over an extra frame binding `super` when there is
        // a superclass; `super` lookups hit it by resolved distance.
        let method_env = match &superclass {
            Some(superclass) => {
                let frame = self.envs.nest(self.environment);
                self.envs.define(frame, "super", Object::Class(Rc::clone(superclass)));
                frame
            }
            None => self.environment,
        };

        let mut methods = HashMap::new();
        for declaration in &stmt.methods {
            let function = Function::new(Rc::clone(declaration), method_env);
            methods.insert(declaration.name.lexeme.clone(), function);
        }

        let class = Class::new(stmt.name.lexeme.clone(), superclass, methods);
        self.envs.define(self.environment, &stmt.name.lexeme, Object::Class(Rc::new(class)));
        Ok(())
    }
}
