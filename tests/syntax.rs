#[macro_use]
mod common;

mod syntax {
    expect_failure! {
        recovery_reports_several_errors: "two_parse_errors.lox", code 65,
        "[line 1:5] Error at '=': Expect variable name",
        "[line 3:1] Error at 'var': Expect ';' after value"
    }

    expect_failure! {
        missing_closing_paren: "missing_paren.lox", code 65,
        "[line 1:10] Error at 'print': Expect ')' after if condition"
    }

    expect_failure! {
        expression_cut_off_at_the_end: "expect_expression_at_end.lox", code 65,
        "[line 2:1] Error at end: Expect expression"
    }

    expect_failure! {
        invalid_assignment_target: "invalid_assignment_target.lox", code 65,
        "[line 1:3] Error at '=': Invalid assignment target"
    }
}
