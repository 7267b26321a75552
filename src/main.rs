use std::io;
use std::{env, process};

use gravlax::{error, Gravlax};

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut stdout = io::stdout();
    let mut gravlax = Gravlax::new(&mut stdout);

    match args.len() {
        n if n > 2 => {
            eprintln!("Usage: gravlax [script]");
            process::exit(64);
        }
        2 => {
            if let Err(err) = gravlax.run_file(&args[1]) {
                eprintln!("gravlax: {}: {err}", args[1]);
                process::exit(66);
            }
            if error::had_error() {
                process::exit(65);
            }
            if error::had_runtime_error() {
                process::exit(70);
            }
        }
        _ => gravlax.run_prompt(),
    }
}
