#[macro_use]
mod common;

mod comment {
    expect_output! {
        line_comments_are_skipped:
        "// nothing here\nprint 1; // trailing\n// bye",
        "1"
    }

    expect_output! {
        block_comments_may_span_lines:
        "/* one\ntwo\nthree */ print \"after\";",
        "after"
    }

    expect_output! {
        block_comment_between_tokens:
        "print 1 /* gap */ + 2;",
        "3"
    }

    expect_failure! {
        unexpected_character: "unexpected_character.lox", code 65,
        "[line 1:9] Error: Unexpected character '@'"
    }

    expect_failure! {
        unterminated_block_comment: "unterminated_block_comment.lox", code 65,
        "[line 2:1] Error: Unterminated block comment"
    }

    expect_failure! {
        unterminated_string: "unterminated_string.lox", code 65,
        "[line 1:7] Error: Unterminated string"
    }
}
