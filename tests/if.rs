#[macro_use]
mod common;

mod if_statement {
    expect_output! {
        takes_the_truthy_branch:
        "if (1 < 2) print \"then\"; else print \"else\";",
        "then"
    }

    expect_output! {
        takes_the_else_branch:
        "if (nil) print \"then\"; else print \"else\";",
        "else"
    }

    expect_output! {
        zero_and_empty_string_are_truthy:
        "if (0) print \"zero\"; if (\"\") print \"empty\";",
        "zero", "empty"
    }

    expect_output! {
        dangling_else_binds_to_the_nearest_if:
        "if (true) if (false) print \"inner\"; else print \"dangling\";",
        "dangling"
    }
}
