#[macro_use]
mod common;

mod block {
    expect_output! {
        scoped_shadowing:
        "var b = 3; { var b = 4; print b; } print b + 3;",
        "4", "6"
    }

    expect_output! {
        outer_binding_survives_shadowing:
        "var b = 3; { var b = 4; print b; } print b;",
        "4", "3"
    }

    expect_output! {
        blocks_nest:
        "var a = \"global\"; { var a = \"outer\"; { var a = \"inner\"; print a; } print a; } print a;",
        "inner", "outer", "global"
    }

    expect_failure! {
        block_bindings_do_not_escape: "block_scope_ends.lox", code 70,
        "[line 4:7] Error at 'hidden': Undefined variable 'hidden'"
    }
}
