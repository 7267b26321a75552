#[macro_use]
mod common;

mod function {
    expect_output! {
        declares_and_calls:
        "fun add(a, b) { print a + b; } add(1, 2);",
        "3"
    }

    expect_output! {
        returns_a_value:
        "fun square(n) { return n * n; } print square(4);",
        "16"
    }

    expect_output! {
        falling_off_the_body_returns_nil:
        "fun noop() {} print noop();",
        "nil"
    }

    expect_output! {
        recursion:
        "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(10);",
        "55"
    }

    expect_output! {
        functions_print_with_their_name:
        "fun greet() {} print greet;",
        "<fn greet>"
    }

    expect_output! {
        arguments_evaluate_left_to_right:
        "var trace = \"\"; fun note(label) { trace = trace + label; } fun three(a, b, c) {} three(note(\"a\"), note(\"b\"), note(\"c\")); print trace;",
        "abc"
    }

    expect_failure! {
        calling_a_non_callable: "call_non_callable.lox", code 70,
        "[line 2:3] Error at ')': Can only call functions and classes"
    }

    expect_failure! {
        wrong_arity: "wrong_arity.lox", code 70,
        "[line 2:6] Error at ')': Expected 2 arguments but got 1"
    }
}
