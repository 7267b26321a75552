use std::sync::atomic::{AtomicBool, Ordering};

use crate::object::Object;
use crate::token::{Location, Token, TokenKind};

static HAD_ERROR: AtomicBool = AtomicBool::new(false);
static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Whether a scan, parse, or resolve diagnostic has been reported.
pub fn had_error() -> bool {
    HAD_ERROR.load(Ordering::Relaxed)
}

/// Whether a runtime diagnostic has been reported.
pub fn had_runtime_error() -> bool {
    HAD_RUNTIME_ERROR.load(Ordering::Relaxed)
}

/// Clears both flags. The REPL calls this after every line so one bad
/// entry does not poison the session.
pub fn reset() {
    HAD_ERROR.store(false, Ordering::Relaxed);
    HAD_RUNTIME_ERROR.store(false, Ordering::Relaxed);
}

/// A diagnostic that can print itself and raise the matching error flag.
/// Reporting never aborts the stage that found the problem; each stage
/// finishes its pass so a single run can surface several diagnostics.
pub trait Report {
    fn report(&self);
}

/// A problem found while scanning, located by position alone since there
/// is no token to blame yet.
#[derive(Debug)]
pub struct ScanError {
    pub location: Location,
    pub message: String,
}

impl Report for ScanError {
    fn report(&self) {
        eprintln!(
            "[line {}:{}] Error: {}",
            self.location.line, self.location.column, self.message
        );
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// A problem found while parsing, blamed on the token that broke the
/// grammar.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl Report for ParseError {
    fn report(&self) {
        if self.token.kind == TokenKind::Eof {
            eprintln!(
                "[line {}:{}] Error at end: {}",
                self.token.location.line, self.token.location.column, self.message
            );
        } else {
            eprintln!(
                "[line {}:{}] Error at '{}': {}",
                self.token.location.line,
                self.token.location.column,
                self.token.lexeme,
                self.message
            );
        }
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// A statically detectable semantic problem, found by the resolver on
/// syntactically valid code.
#[derive(Debug)]
pub struct ResolveError {
    pub token: Token,
    pub message: String,
}

impl Report for ResolveError {
    fn report(&self) {
        eprintln!(
            "[line {}:{}] Error at '{}': {}",
            self.token.location.line,
            self.token.location.column,
            self.token.lexeme,
            self.message
        );
        HAD_ERROR.store(true, Ordering::Relaxed);
    }
}

/// A problem only observable while the program runs.
#[derive(Debug)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl Report for RuntimeError {
    fn report(&self) {
        eprintln!(
            "[line {}:{}] Error at '{}': {}",
            self.token.location.line,
            self.token.location.column,
            self.token.lexeme,
            self.message
        );
        HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
    }
}

/// The evaluator's non-local exits. `Return` unwinds to the nearest call
/// boundary, `Break` to the nearest enclosing `while`; both are absorbed
/// there. `Error` unwinds all the way to the driver. The resolver rejects
/// any program in which `Return` or `Break` could escape its construct.
#[derive(Debug)]
pub enum Unwind {
    Error(RuntimeError),
    Return(Object),
    Break,
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}
