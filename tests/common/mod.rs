/// Runs a program in-process and asserts exactly what `print` wrote, one
/// argument per expected line.
#[macro_export]
macro_rules! expect_output {
    ($name:ident: $source:expr $(, $expected:expr)*) => {
        #[test]
        fn $name() {
            let mut output = Vec::new();
            let mut gravlax = gravlax::Gravlax::new(&mut output);

            gravlax.run($source);

            // Release the interpreter's borrow of the buffer.
            drop(gravlax);

            let expected: Vec<&str> = vec![$($expected),*];
            let expected = if expected.is_empty() {
                String::new()
            } else {
                format!("{}\n", expected.join("\n"))
            };

            assert_eq!(expected, String::from_utf8(output).unwrap());
        }
    };
}

/// Runs a fixture script through the real binary and asserts the exit
/// code and the full diagnostic output on stderr, one argument per line.
#[macro_export]
macro_rules! expect_failure {
    ($name:ident: $script:expr, code $code:expr $(, $stderr:expr)+) => {
        #[test]
        fn $name() {
            use assert_cmd::Command;

            let stderr = vec![$($stderr),+].join("\n");

            Command::cargo_bin("gravlax")
                .unwrap()
                .arg(format!("tests/scripts/{}", $script))
                .assert()
                .code($code)
                .stderr(format!("{stderr}\n"));
        }
    };
}
