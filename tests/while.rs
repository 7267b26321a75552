#[macro_use]
mod common;

mod while_loop {
    expect_output! {
        counts_down:
        "var i = 3; while (i > 0) { print i; i = i - 1; }",
        "3", "2", "1"
    }

    expect_output! {
        false_condition_never_runs_the_body:
        "while (false) print \"never\"; print \"done\";",
        "done"
    }

    expect_output! {
        body_may_be_a_single_statement:
        "var i = 0; while (i < 2) i = i + 1; print i;",
        "2"
    }
}
