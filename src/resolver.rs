use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use crate::error::{Report, ResolveError};
use crate::expr::*;
use crate::interpreter::Interpreter;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingState {
    Declared, // Name is taken but its initializer has not finished
    Defined,
}

#[derive(Debug, Clone, Copy)]
enum ClassContext {
    Class,
    Subclass,
}

// The static pass between parsing and evaluation. Records the frame
// distance for every local variable use into the interpreter's side
// table; the distances must be final before execution starts, which is
// what keeps captured bindings stable under later shadowing.
pub struct Resolver<'a, 'o> {
    interpreter: &'a mut Interpreter<'o>,
    scopes: Vec<HashMap<String, BindingState>>,
    current_function: Option<FunctionKind>,
    current_class: Option<ClassContext>,
    // Entering a function body starts over at zero, so break cannot
    // cross a call boundary.
    loop_depth: usize,
}

impl<'a, 'o> Resolver<'a, 'o> {
    pub fn new(interpreter: &'a mut Interpreter<'o>) -> Self {
        Resolver {
            interpreter,
            scopes: vec![],
            current_function: None,
            current_class: None,
            loop_depth: 0,
        }
    }

    pub fn resolve(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_stmt(statement);
        }
    }

    fn resolve_stmt(&mut self, stmt: &Stmt) {
        stmt.accept(self);
    }

    fn resolve_expr(&mut self, expr: &Expr) {
        expr.accept(self);
    }

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        self.scopes.pop();
    }

    // Top-level declarations are not tracked: globals may redeclare.
    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else { return };

        if scope.insert(name.lexeme.clone(), BindingState::Declared).is_some() {
            ResolveError {
                token: name.clone(),
                message: format!("A variable named '{}' already exists in this scope", name.lexeme),
            }
            .report();
        }
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.lexeme.clone(), BindingState::Defined);
        }
    }

    // No hit means the reference falls through to the globals and gets
    // no annotation.
    fn resolve_local(&mut self, name: &Token) {
        for (distance, scope) in self.scopes.iter().rev().enumerate() {
            if scope.contains_key(&name.lexeme) {
                self.interpreter.resolve(name, distance);
                return;
            }
        }
    }

    fn resolve_function(&mut self, declaration: &FunctionDecl) {
        let enclosing_function = mem::replace(&mut self.current_function, Some(declaration.kind));
        let enclosing_loops = mem::replace(&mut self.loop_depth, 0);

        self.begin_scope();
        for param in &declaration.params {
            self.declare(param);
            self.define(param);
        }
        self.resolve(&declaration.body);
        self.end_scope();

        self.loop_depth = enclosing_loops;
        self.current_function = enclosing_function;
    }

    fn bind_keyword(&mut self, keyword: &str) {
        self.scopes
            .last_mut()
            .expect("a scope to have just been pushed")
            .insert(keyword.to_owned(), BindingState::Defined);
    }
}

impl ExprVisitor<()> for Resolver<'_, '_> {
    fn visit_literal_expr(&mut self, _literal: &Literal) {}

    fn visit_unary_expr(&mut self, unary: &UnaryExpr) {
        self.resolve_expr(&unary.operand);
    }

    fn visit_binary_expr(&mut self, binary: &BinaryExpr) {
        self.resolve_expr(&binary.left);
        self.resolve_expr(&binary.right);
    }

    fn visit_logical_expr(&mut self, logical: &LogicalExpr) {
        self.resolve_expr(&logical.left);
        self.resolve_expr(&logical.right);
    }

    fn visit_grouping_expr(&mut self, grouping: &GroupingExpr) {
        self.resolve_expr(&grouping.expr);
    }

    fn visit_variable_expr(&mut self, variable: &VariableExpr) {
        if let Some(scope) = self.scopes.last() {
            if scope.get(&variable.name.lexeme) == Some(&BindingState::Declared) {
                ResolveError {
                    token: variable.name.clone(),
                    message: "Cannot read local variable in its own initializer".to_string(),
                }
                .report();
                return;
            }
        }

        self.resolve_local(&variable.name);
    }

    fn visit_assign_expr(&mut self, assign: &AssignExpr) {
        self.resolve_expr(&assign.value);
        self.resolve_local(&assign.name);
    }

    fn visit_call_expr(&mut self, call: &CallExpr) {
        self.resolve_expr(&call.callee);
        for argument in &call.arguments {
            self.resolve_expr(argument);
        }
    }

    fn visit_get_expr(&mut self, get: &GetExpr) {
        // Property names are looked up on the object at run time.
        self.resolve_expr(&get.object);
    }

    fn visit_set_expr(&mut self, set: &SetExpr) {
        self.resolve_expr(&set.value);
        self.resolve_expr(&set.object);
    }

    fn visit_this_expr(&mut self, this: &ThisExpr) {
        if self.current_class.is_none() {
            ResolveError {
                token: this.keyword.clone(),
                message: "Cannot use 'this' outside of a class".to_string(),
            }
            .report();
            return;
        }

        self.resolve_local(&this.keyword);
    }

    fn visit_super_expr(&mut self, sup: &SuperExpr) {
        match self.current_class {
            Some(ClassContext::Subclass) => self.resolve_local(&sup.keyword),
            Some(ClassContext::Class) => ResolveError {
                token: sup.keyword.clone(),
                message: "Cannot use 'super' in a class with no superclass".to_string(),
            }
            .report(),
            None => ResolveError {
                token: sup.keyword.clone(),
                message: "Cannot use 'super' outside of a class".to_string(),
            }
            .report(),
        }
    }
}

impl StmtVisitor<()> for Resolver<'_, '_> {
    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) {
        self.resolve_expr(&stmt.expr);
    }

    fn visit_print_stmt(&mut self, stmt: &PrintStmt) {
        self.resolve_expr(&stmt.expr);
    }

    fn visit_var_stmt(&mut self, stmt: &VarStmt) {
        self.declare(&stmt.name);
        if let Some(initializer) = &stmt.initializer {
            self.resolve_expr(initializer);
        }
        self.define(&stmt.name);
    }

    fn visit_block_stmt(&mut self, stmt: &BlockStmt) {
        self.begin_scope();
        self.resolve(&stmt.statements);
        self.end_scope();
    }

    fn visit_if_stmt(&mut self, stmt: &IfStmt) {
        self.resolve_expr(&stmt.condition);
        self.resolve_stmt(&stmt.then_branch);
        if let Some(else_branch) = &stmt.else_branch {
            self.resolve_stmt(else_branch);
        }
    }

    fn visit_while_stmt(&mut self, stmt: &WhileStmt) {
        self.resolve_expr(&stmt.condition);

        self.loop_depth += 1;
        self.resolve_stmt(&stmt.body);
        self.loop_depth -= 1;
    }

    fn visit_function_stmt(&mut self, decl: &Rc<FunctionDecl>) {
        // Defined before the body resolves so the function can recurse.
        self.declare(&decl.name);
        self.define(&decl.name);

        self.resolve_function(decl);
    }

    fn visit_return_stmt(&mut self, stmt: &ReturnStmt) {
        if self.current_function.is_none() {
            ResolveError {
                token: stmt.keyword.clone(),
                message: "Cannot return from top-level code".to_string(),
            }
            .report();
        }

        if let Some(value) = &stmt.value {
            if self.current_function == Some(FunctionKind::Initializer) {
                ResolveError {
                    token: stmt.keyword.clone(),
                    message: "Cannot return a value from an initializer".to_string(),
                }
                .report();
                return;
            }

            self.resolve_expr(value);
        }
    }

    fn visit_break_stmt(&mut self, stmt: &BreakStmt) {
        if self.loop_depth == 0 {
            ResolveError {
                token: stmt.keyword.clone(),
                message: "Cannot use 'break' outside of a loop".to_string(),
            }
            .report();
        }
    }

    fn visit_class_stmt(&mut self, stmt: &ClassStmt) {
        let enclosing_class = mem::replace(&mut self.current_class, Some(ClassContext::Class));

        self.declare(&stmt.name);
        self.define(&stmt.name);

        if let Some(superclass) = &stmt.superclass {
            if superclass.name.lexeme == stmt.name.lexeme {
                ResolveError {
                    token: superclass.name.clone(),
                    message: "A class cannot inherit from itself".to_string(),
                }
                .report();
            }

            self.current_class = Some(ClassContext::Subclass);
            self.resolve_local(&superclass.name);

            self.begin_scope();
            self.bind_keyword("super");
        }

        self.begin_scope();
        self.bind_keyword("this");

        for method in &stmt.methods {
            self.resolve_function(method);
        }

        self.end_scope();

        if stmt.superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }
}
