//! Gravlax is a tree-walk interpreter for Lox, a small dynamically typed
//! object-oriented scripting language with lexical scoping, first-class
//! functions and closures, and single-inheritance classes.
//!
//! Source runs through four stages, each feeding the next:
//!
//! 1. The [`scanner`] turns the raw text into a flat token stream,
//!    reporting stray characters and unterminated strings as it goes.
//! 2. The [`parser`] builds a syntax tree by recursive descent. A parse
//!    error inside a statement is reported and the parser resynchronizes
//!    at the next statement boundary, so one run can surface several
//!    errors.
//! 3. The [`resolver`] walks the finished tree once and records, for
//!    every variable use, how many scope frames separate the use from
//!    its binding. Doing this before execution pins each reference to
//!    the binding that was visible where the code was *written*, which
//!    is what makes closures immune to later shadowing. The resolver
//!    also rejects code that is grammatical but meaningless, like
//!    `return` at the top level or `break` outside a loop.
//! 4. The [`interpreter`] executes the annotated tree. Scope frames live
//!    in an arena indexed by handle ([`environment`]), which lets
//!    closures and the environments that store them reference each other
//!    without ownership cycles; unreachable frames are swept between
//!    top-level statements.
//!
//! The first three stages report through shared error flags in [`error`];
//! evaluation only begins when the flags are clean. A runtime error stops
//! the program with the offending line. The [`Gravlax`] driver wires the
//! stages together for both script files and the interactive prompt.

use std::fs;
use std::io::{self, Write};

pub mod class;
pub mod environment;
pub mod error;
pub mod expr;
pub mod function;
pub mod interpreter;
pub mod literal;
pub mod object;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod stmt;
pub mod token;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use interpreter::Interpreter;
use parser::Parser;
use resolver::Resolver;
use scanner::Scanner;

/// The driver. Owns one interpreter for its whole lifetime, so in the
/// interactive mode globals persist from line to line. Program output
/// goes to the injected sink; diagnostics go to stderr.
pub struct Gravlax<'a> {
    interpreter: Interpreter<'a>,
}

impl<'a> Gravlax<'a> {
    pub fn new(out: &'a mut dyn Write) -> Self {
        Gravlax { interpreter: Interpreter::new(out) }
    }

    /// Runs a script file to completion. The caller decides the exit
    /// status from the error flags afterwards.
    pub fn run_file(&mut self, path: &str) -> io::Result<()> {
        let source = fs::read_to_string(path)?;
        self.run(&source);
        Ok(())
    }

    /// The interactive session: one line at a time through the full
    /// pipeline. Errors of any kind are reported and forgotten so the
    /// session continues. History lives in the user's home directory.
    pub fn run_prompt(&mut self) {
        let mut editor = match DefaultEditor::new() {
            Ok(editor) => editor,
            Err(err) => {
                eprintln!("gravlax: cannot start the prompt: {err}");
                return;
            }
        };

        let history = home::home_dir().map(|dir| dir.join(".gravlax_history"));
        if let Some(path) = &history {
            let _ = editor.load_history(path);
        }

        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    self.run(&line);
                    error::reset();
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("gravlax: {err}");
                    break;
                }
            }
        }

        if let Some(path) = &history {
            let _ = editor.save_history(path);
        }
    }

    /// One trip through scan, parse, resolve, evaluate. Each stage only
    /// starts when the previous ones finished without reporting.
    pub fn run(&mut self, source: &str) {
        let tokens = Scanner::new(source).scan_tokens();
        if error::had_error() {
            return;
        }

        let statements = Parser::new(tokens).parse();
        if error::had_error() {
            return;
        }

        Resolver::new(&mut self.interpreter).resolve(&statements);
        if error::had_error() {
            return;
        }

        self.interpreter.interpret(&statements);
    }
}
