#[macro_use]
mod common;

mod string {
    expect_output! {
        concatenation:
        "print \"foo\" + \"bar\";",
        "foobar"
    }

    expect_output! {
        a_string_operand_coerces_the_other:
        "var a = 4; print \"Expected '\" + a + \"'\";",
        "Expected '4'"
    }

    expect_output! {
        coercion_applies_on_either_side:
        "print 3 + \" items\"; print \"n = \" + 2.5;",
        "3 items", "n = 2.5"
    }

    expect_output! {
        nil_and_booleans_coerce_too:
        "print \"got \" + nil; print \"is \" + true;",
        "got nil", "is true"
    }

    expect_output! {
        strings_may_span_lines:
        "print \"one\ntwo\";",
        "one", "two"
    }

    expect_output! {
        empty_string_is_truthy:
        "if (\"\") print \"yes\";",
        "yes"
    }
}
