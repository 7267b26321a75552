#[macro_use]
mod common;

mod break_statement {
    expect_output! {
        stops_the_loop:
        "for (var i = 0; i < 10; i = i + 1) { if (i == 3) break; print i; }",
        "0", "1", "2"
    }

    expect_output! {
        leaves_exactly_one_loop:
        "for (var i = 0; i < 2; i = i + 1) { while (true) { print \"inside\"; break; } print i; }",
        "inside", "0", "inside", "1"
    }

    expect_output! {
        breaks_out_of_while:
        "var i = 0; while (true) { i = i + 1; if (i == 2) break; } print i;",
        "2"
    }

    expect_failure! {
        break_outside_a_loop: "break_outside_loop.lox", code 65,
        "[line 2:1] Error at 'break': Cannot use 'break' outside of a loop"
    }

    expect_failure! {
        break_cannot_cross_a_function_boundary: "break_in_nested_function.lox", code 65,
        "[line 3:5] Error at 'break': Cannot use 'break' outside of a loop"
    }
}
