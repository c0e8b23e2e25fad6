use super::*;

crate::define_id! {
    pub struct TestId;
}

#[yare::parameterized(
    longer_than_n = { "0123456789abcdef", 8, "01234567" },
    shorter_than_n = { "abc", 8, "abc" },
    exactly_n = { "12345678", 8, "12345678" },
)]
fn short_truncates_to_at_most_n_chars(input: &str, n: usize, expected: &str) {
    let id = TestId::new(input);
    assert_eq!(id.short(n), expected);
}

#[test]
fn display_matches_inner_string() {
    let id = TestId::new("run-1");
    assert_eq!(id.to_string(), "run-1");
}

#[test]
fn sequential_id_gen_increments() {
    let gen = SequentialIdGen::new("run");
    assert_eq!(gen.next(), "run-1");
    assert_eq!(gen.next(), "run-2");
}

#[test]
fn uuid_id_gen_produces_unique_ids() {
    let gen = UuidIdGen;
    assert_ne!(gen.next(), gen.next());
}
