use crate::literal::Literal;
use crate::token::Token;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Logical(LogicalExpr),
    Grouping(GroupingExpr),
    Variable(VariableExpr),
    Assign(AssignExpr),
    Call(CallExpr),
    Get(GetExpr),
    Set(SetExpr),
    This(ThisExpr),
    Super(SuperExpr),
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub operator: Token,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct LogicalExpr {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct GroupingExpr {
    pub expr: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct VariableExpr {
    pub name: Token,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub paren: Token, // Closing parenthesis, blamed for call-site errors
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct GetExpr {
    pub object: Box<Expr>,
    pub name: Token,
}

#[derive(Debug, Clone)]
pub struct SetExpr {
    pub object: Box<Expr>,
    pub name: Token,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct ThisExpr {
    pub keyword: Token,
}

#[derive(Debug, Clone)]
pub struct SuperExpr {
    pub keyword: Token,
    pub method: Token,
}

impl Expr {
    pub fn accept<T>(&self, visitor: &mut dyn ExprVisitor<T>) -> T {
        match self {
            Expr::Literal(literal) => visitor.visit_literal_expr(literal),
            Expr::Unary(unary) => visitor.visit_unary_expr(unary),
            Expr::Binary(binary) => visitor.visit_binary_expr(binary),
            Expr::Logical(logical) => visitor.visit_logical_expr(logical),
            Expr::Grouping(grouping) => visitor.visit_grouping_expr(grouping),
            Expr::Variable(variable) => visitor.visit_variable_expr(variable),
            Expr::Assign(assign) => visitor.visit_assign_expr(assign),
            Expr::Call(call) => visitor.visit_call_expr(call),
            Expr::Get(get) => visitor.visit_get_expr(get),
            Expr::Set(set) => visitor.visit_set_expr(set),
            Expr::This(this) => visitor.visit_this_expr(this),
            Expr::Super(sup) => visitor.visit_super_expr(sup),
        }
    }
}

pub trait ExprVisitor<T> {
    fn visit_literal_expr(&mut self, literal: &Literal) -> T;
    fn visit_unary_expr(&mut self, unary: &UnaryExpr) -> T;
    fn visit_binary_expr(&mut self, binary: &BinaryExpr) -> T;
    fn visit_logical_expr(&mut self, logical: &LogicalExpr) -> T;
    fn visit_grouping_expr(&mut self, grouping: &GroupingExpr) -> T;
    fn visit_variable_expr(&mut self, variable: &VariableExpr) -> T;
    fn visit_assign_expr(&mut self, assign: &AssignExpr) -> T;
    fn visit_call_expr(&mut self, call: &CallExpr) -> T;
    fn visit_get_expr(&mut self, get: &GetExpr) -> T;
    fn visit_set_expr(&mut self, set: &SetExpr) -> T;
    fn visit_this_expr(&mut self, this: &ThisExpr) -> T;
    fn visit_super_expr(&mut self, sup: &SuperExpr) -> T;
}
