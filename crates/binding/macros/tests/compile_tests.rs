//! Compile-time tests for nebula-binding-macros.
//!
//! These tests use trybuild to verify that the derive generates code
//! that compiles against nebula-binding.

#[test]
fn test_validate_derive() {
    let t = trybuild::TestCases::new();
    t.pass("tests/ui/validate_pass.rs");
}
