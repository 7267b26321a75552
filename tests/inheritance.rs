#[macro_use]
mod common;

mod inheritance {
    expect_output! {
        methods_are_inherited:
        "class A { hello() { print \"hello\"; } } class B < A {} B().hello();",
        "hello"
    }

    expect_output! {
        a_subclass_overrides:
        "class A { speak() { print \"A\"; } } class B < A { speak() { print \"B\"; } } B().speak();",
        "B"
    }

    expect_output! {
        lookup_walks_the_whole_chain:
        "class A { a() { print \"a\"; } } class B < A { b() { print \"b\"; } } class C < B {} var c = C(); c.a(); c.b();",
        "a", "b"
    }

    expect_output! {
        init_is_inherited:
        "class A { init(n) { this.n = n; } } class B < A {} print B(7).n;",
        "7"
    }

    expect_failure! {
        inheriting_from_itself: "inherit_self.lox", code 65,
        "[line 1:13] Error at 'Foo': A class cannot inherit from itself"
    }

    expect_failure! {
        inheriting_from_a_non_class: "inherit_non_class.lox", code 70,
        "[line 2:13] Error at 'NotAClass': Superclass must be a class"
    }
}
