use std::rc::Rc;

use crate::error::{ParseError, Report};
use crate::expr::*;
use crate::literal::Literal;
use crate::stmt::*;
use crate::token::{Token, TokenKind};

type ParseResult<T> = Result<T, ParseError>;

/// A recursive descent parser over the scanner's token stream.
///
/// Grammar, declarations first:
///
/// - program     -> declaration* EOF ;
/// - declaration -> classDecl | funDecl | varDecl | statement ;
/// - classDecl   -> "class" IDENTIFIER ( "<" IDENTIFIER )? "{" function* "}" ;
/// - funDecl     -> "fun" function ;
/// - function    -> IDENTIFIER "(" parameters? ")" block ;
/// - varDecl     -> "var" IDENTIFIER ( "=" expression )? ";" ;
/// - statement   -> exprStmt | forStmt | ifStmt | printStmt | returnStmt
///                | breakStmt | whileStmt | block ;
/// - forStmt     -> "for" "(" ( varDecl | exprStmt | ";" )
///                  expression? ";" expression? ")" statement ;
/// - breakStmt   -> "break" ";" ;
///
/// and expressions by rising precedence:
///
/// - expression  -> assignment ;
/// - assignment  -> ( call "." )? IDENTIFIER "=" assignment | logicOr ;
/// - logicOr     -> logicAnd ( "or" logicAnd )* ;
/// - logicAnd    -> equality ( "and" equality )* ;
/// - equality    -> comparison ( ( "!=" | "==" ) comparison )* ;
/// - comparison  -> term ( ( ">" | ">=" | "<" | "<=" ) term )* ;
/// - term        -> factor ( ( "-" | "+" ) factor )* ;
/// - factor      -> unary ( ( "/" | "*" ) unary )* ;
/// - unary       -> ( "!" | "-" ) unary | call ;
/// - call        -> primary ( "(" arguments? ")" | "." IDENTIFIER )* ;
/// - primary     -> NUMBER | STRING | "true" | "false" | "nil" | "this"
///                | "(" expression ")" | IDENTIFIER | "super" "." IDENTIFIER ;
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, current: 0 }
    }

    /// Parses the whole token stream. Statements that fail to parse are
    /// reported and dropped after synchronizing to the next statement
    /// boundary; the driver must not evaluate when any were reported.
    pub fn parse(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        statements
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    /// Consumes the next token when its kind is one of `kinds`.
    fn advance_matching(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            return true;
        }
        false
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<&Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }

        Err(ParseError {
            token: self.peek().clone(),
            message: message.to_string(),
        })
    }

    fn error(&self, token: &Token, message: &str) -> ParseError {
        ParseError {
            token: token.clone(),
            message: message.to_string(),
        }
    }

    fn declaration(&mut self) -> Option<Stmt> {
        let statement = if self.advance_matching(&[TokenKind::Class]) {
            self.class_declaration()
        } else if self.advance_matching(&[TokenKind::Fun]) {
            self.function(FunctionKind::Function).map(Stmt::Function)
        } else if self.advance_matching(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match statement {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                error.report();
                self.synchronize();
                None
            }
        }
    }

    fn class_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect class name")?.clone();

        let superclass = if self.advance_matching(&[TokenKind::Less]) {
            let name = self.consume(TokenKind::Identifier, "Expect superclass name")?.clone();
            Some(VariableExpr { name })
        } else {
            None
        };

        self.consume(TokenKind::LeftBrace, "Expect '{' before class body")?;

        let mut methods = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            methods.push(self.function(FunctionKind::Method)?);
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after class body")?;

        Ok(Stmt::Class(ClassStmt { name, superclass, methods }))
    }

    fn function(&mut self, kind: FunctionKind) -> ParseResult<Rc<FunctionDecl>> {
        let what = kind.describe();
        let name = self
            .consume(TokenKind::Identifier, &format!("Expect {what} name"))?
            .clone();

        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {what} name"))?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.error(self.peek(), "Cannot have more than 255 parameters").report();
                }

                params.push(self.consume(TokenKind::Identifier, "Expect parameter name")?.clone());

                if !self.advance_matching(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters")?;

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {what} body"))?;
        let body = self.block()?;

        let kind = if kind == FunctionKind::Method && name.lexeme == "init" {
            FunctionKind::Initializer
        } else {
            kind
        };

        Ok(Rc::new(FunctionDecl { name, params, body, kind }))
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name")?.clone();

        let initializer = if self.advance_matching(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after variable declaration")?;
        Ok(Stmt::Var(VarStmt { name, initializer }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.advance_matching(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.advance_matching(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.advance_matching(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.advance_matching(&[TokenKind::Return]) {
            return self.return_statement();
        }
        if self.advance_matching(&[TokenKind::Break]) {
            return self.break_statement();
        }
        if self.advance_matching(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.advance_matching(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(BlockStmt { statements: self.block()? }));
        }

        self.expression_statement()
    }

    /// Desugars `for` into an optional initializer, a `while` with the
    /// condition (or `true` when absent), and the increment appended to
    /// the body block.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'")?;

        let initializer = if self.advance_matching(&[TokenKind::Semicolon]) {
            None
        } else if self.advance_matching(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition")?;

        let increment = if self.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(BlockStmt {
                statements: vec![body, Stmt::Expression(ExpressionStmt { expr: increment })],
            });
        }

        body = Stmt::While(WhileStmt {
            condition: condition.unwrap_or(Expr::Literal(Literal::Bool(true))),
            body: Box::new(body),
        });

        if let Some(initializer) = initializer {
            body = Stmt::Block(BlockStmt { statements: vec![initializer, body] });
        }

        Ok(body)
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.advance_matching(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt { condition, then_branch, else_branch }))
    }

    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after value")?;
        Ok(Stmt::Print(PrintStmt { expr }))
    }

    fn return_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();

        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(self.expression()?)
        };

        self.consume(TokenKind::Semicolon, "Expect ';' after return value")?;
        Ok(Stmt::Return(ReturnStmt { keyword, value }))
    }

    fn break_statement(&mut self) -> ParseResult<Stmt> {
        let keyword = self.previous().clone();
        self.consume(TokenKind::Semicolon, "Expect ';' after 'break'")?;
        Ok(Stmt::Break(BreakStmt { keyword }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'while'")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition")?;
        let body = self.statement()?;

        Ok(Stmt::While(WhileStmt { condition, body: Box::new(body) }))
    }

    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();

        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        self.consume(TokenKind::RightBrace, "Expect '}' after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expect ';' after expression")?;
        Ok(Stmt::Expression(ExpressionStmt { expr }))
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// Right-associative; only a variable or a property access is a valid
    /// target. An invalid target is reported but parsing keeps the left
    /// expression, so later errors still surface.
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.advance_matching(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            return match expr {
                Expr::Variable(variable) => Ok(Expr::Assign(AssignExpr {
                    name: variable.name,
                    value: Box::new(value),
                })),
                Expr::Get(get) => Ok(Expr::Set(SetExpr {
                    object: get.object,
                    name: get.name,
                    value: Box::new(value),
                })),
                _ => {
                    self.error(&equals, "Invalid assignment target").report();
                    Ok(expr)
                }
            };
        }

        Ok(expr)
    }

    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;

        while self.advance_matching(&[TokenKind::Or]) {
            let operator = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.advance_matching(&[TokenKind::And]) {
            let operator = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical(LogicalExpr {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[TokenKind::BangEqual, TokenKind::EqualEqual],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_level(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Minus, TokenKind::Plus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_level(&[TokenKind::Slash, TokenKind::Star], Self::unary)
    }

    /// One left-associative binary precedence level: `next ( op next )*`.
    fn binary_level(
        &mut self,
        operators: &[TokenKind],
        next: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = next(self)?;

        while self.advance_matching(operators) {
            let operator = self.previous().clone();
            let right = next(self)?;
            expr = Expr::Binary(BinaryExpr {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.advance_matching(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.previous().clone();
            let operand = self.unary()?;
            return Ok(Expr::Unary(UnaryExpr {
                operator,
                operand: Box::new(operand),
            }));
        }

        self.call()
    }

    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;

        loop {
            if self.advance_matching(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else if self.advance_matching(&[TokenKind::Dot]) {
                let name = self
                    .consume(TokenKind::Identifier, "Expect property name after '.'")?
                    .clone();
                expr = Expr::Get(GetExpr { object: Box::new(expr), name });
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut arguments = Vec::new();

        if !self.check(TokenKind::RightParen) {
            loop {
                if arguments.len() >= 255 {
                    self.error(self.peek(), "Cannot have more than 255 arguments").report();
                }

                arguments.push(self.expression()?);

                if !self.advance_matching(&[TokenKind::Comma]) {
                    break;
                }
            }
        }

        let paren = self
            .consume(TokenKind::RightParen, "Expect ')' after arguments")?
            .clone();

        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            paren,
            arguments,
        }))
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        if self.advance_matching(&[TokenKind::False]) {
            return Ok(Expr::Literal(Literal::Bool(false)));
        }
        if self.advance_matching(&[TokenKind::True]) {
            return Ok(Expr::Literal(Literal::Bool(true)));
        }
        if self.advance_matching(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Literal::Nil));
        }

        if self.advance_matching(&[TokenKind::Number, TokenKind::String]) {
            let literal = self
                .previous()
                .literal
                .clone()
                .expect("number and string tokens to carry a literal");
            return Ok(Expr::Literal(literal));
        }

        if self.advance_matching(&[TokenKind::Super]) {
            let keyword = self.previous().clone();
            self.consume(TokenKind::Dot, "Expect '.' after 'super'")?;
            let method = self
                .consume(TokenKind::Identifier, "Expect superclass method name")?
                .clone();
            return Ok(Expr::Super(SuperExpr { keyword, method }));
        }

        if self.advance_matching(&[TokenKind::This]) {
            return Ok(Expr::This(ThisExpr { keyword: self.previous().clone() }));
        }

        if self.advance_matching(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(VariableExpr { name: self.previous().clone() }));
        }

        if self.advance_matching(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression")?;
            return Ok(Expr::Grouping(GroupingExpr { expr: Box::new(expr) }));
        }

        Err(self.error(self.peek(), "Expect expression"))
    }

    /// Panic-mode recovery: discard tokens until just past a `;` or just
    /// before a keyword that can begin a statement.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }

            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Break
                | TokenKind::Return => return,
                _ => self.advance(),
            };
        }
    }
}
