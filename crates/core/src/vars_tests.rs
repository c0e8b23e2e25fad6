use super::*;

#[test]
fn finds_all_references_including_duplicates() {
    let refs = find_references("${FOO} and ${BAR} and ${FOO}");
    assert_eq!(refs, vec!["FOO", "BAR", "FOO"]);
}

#[test]
fn substitutes_known_variables() {
    let mut vars = BTreeMap::new();
    vars.insert("NAME".to_string(), "pipeforge".to_string());
    assert_eq!(substitute("hello ${NAME}", &vars), "hello pipeforge");
}

#[test]
fn leaves_unknown_references_literal() {
    let vars = BTreeMap::new();
    assert_eq!(substitute("hello ${MISSING}", &vars), "hello ${MISSING}");
}

#[test]
fn ignores_malformed_references() {
    assert!(find_references("$FOO ${} ${1abc}").is_empty());
}
