#[macro_use]
mod common;

mod class {
    expect_output! {
        classes_print_as_their_name:
        "class Muffin {} print Muffin;",
        "Muffin"
    }

    expect_output! {
        instances_print_with_the_class_name:
        "class Muffin {} print Muffin();",
        "<Muffin instance>"
    }

    expect_output! {
        fields_are_per_instance:
        "class Box {} var a = Box(); var b = Box(); a.value = 1; b.value = 2; print a.value; print b.value;",
        "1", "2"
    }

    expect_output! {
        instances_compare_by_identity:
        "class Box {} var a = Box(); var b = a; print a == b; print a == Box();",
        "true", "false"
    }

    expect_output! {
        fields_shadow_methods:
        "class C { m() { return \"method\"; } } var c = C(); c.m = \"field\"; print c.m;",
        "field"
    }

    expect_failure! {
        undefined_property: "undefined_property.lox", code 70,
        "[line 2:9] Error at 'missing': Undefined property 'missing'"
    }

    expect_failure! {
        property_access_on_a_non_instance: "property_on_non_instance.lox", code 70,
        "[line 2:3] Error at 'field': Only instances have properties"
    }
}
