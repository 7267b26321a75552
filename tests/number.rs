#[macro_use]
mod common;

mod number {
    expect_output! {
        integral_values_print_without_decimal_point:
        "print 3.0; print 1275; print -0.5;",
        "3", "1275", "-0.5"
    }

    expect_output! {
        shortest_round_trip_form:
        "print 0.1 + 0.2;",
        "0.30000000000000004"
    }

    expect_output! {
        fraction_lexing:
        "print 12.34; print 0.25 * 4;",
        "12.34", "1"
    }
}
