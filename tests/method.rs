#[macro_use]
mod common;

mod method {
    expect_output! {
        methods_bind_this:
        "class Person { greet() { print \"hi, \" + this.name; } } var p = Person(); p.name = \"Ada\"; p.greet();",
        "hi, Ada"
    }

    expect_output! {
        bound_methods_remember_their_receiver:
        "class Counter { bump() { this.n = this.n + 1; return this.n; } } var c = Counter(); c.n = 0; var bump = c.bump; bump(); print bump();",
        "2"
    }

    expect_output! {
        a_field_write_does_not_rebind_an_extracted_method:
        "class C { m() { return \"method\"; } } var c = C(); var m = c.m; c.m = \"field\"; print m();",
        "method"
    }

    expect_output! {
        methods_can_create_fields:
        "class Tracker { visit() { this.visited = true; } } var t = Tracker(); t.visit(); print t.visited;",
        "true"
    }
}
