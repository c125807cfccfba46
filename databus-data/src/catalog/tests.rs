//! Unit tests for catalog lookups.

use rstest::rstest;

use super::*;
use crate::test_support::{StubSparql, block_on_for_tests};

#[rstest]
fn unbound_key_empties_the_result() {
    let body = br#"{"head": {"vars": ["v"]}, "results": {"bindings": [
        {"v": {"type": "literal", "value": "1"}},
        {"w": {"type": "literal", "value": "2"}}
    ]}}"#;
    let results = SparqlResults::parse("stub", body.to_vec()).expect("valid JSON");
    assert_eq!(results.len(), 2);
    assert!(results.values_for_key("v").is_empty());
}

#[rstest]
fn malformed_results_are_a_parse_error() {
    let err = SparqlResults::parse("https://d.org/sparql", b"<html>".to_vec())
        .expect_err("not JSON");
    assert!(matches!(err, CatalogError::Parse { url, .. } if url == "https://d.org/sparql"));
}

#[rstest]
#[case("https://d.org/alice#this", true)]
#[case("https://d.org/a b", false)]
#[case("https://d.org/a> . ?s ?p ?o", false)]
#[case("", false)]
fn identifiers_must_be_safe_iris(#[case] candidate: &str, #[case] accepted: bool) {
    assert_eq!(groups_query(candidate).is_ok(), accepted);
}

#[rstest]
fn groups_query_names_the_publisher() {
    let query = groups_query("https://d.org/alice#this").expect("valid IRI");
    assert!(query.contains("?dataset dct:publisher <https://d.org/alice#this> ."));
    assert!(query.contains("SELECT DISTINCT ?group WHERE"));
}

#[rstest]
fn file_lookup_escapes_literals() {
    let query = file_lookup_query("https://d.org/a/g/art", "2024\"x", "ttl").expect("valid IRI");
    assert!(query.contains(r#"?dataset dct:hasVersion "2024\"x" ."#));
    assert!(query.contains(r#"?dist dataid:formatExtension "ttl" ."#));
}

#[rstest]
#[case("https://databus.example.org", CompletionLevel::Accounts)]
#[case("https://databus.example.org/alice", CompletionLevel::Groups)]
#[case("https://databus.example.org/alice/group/", CompletionLevel::Artifacts)]
#[case("https://databus.example.org/alice/group/art", CompletionLevel::Versions)]
#[case("https://databus.example.org/alice/group/art/1.0 ", CompletionLevel::Files)]
#[case("https://databus.example.org/alice/group/art/1.0/f.ttl", CompletionLevel::Complete)]
fn segment_count_selects_the_level(#[case] input: &str, #[case] expected: CompletionLevel) {
    let partial = PartialIdentifier::parse(input);
    assert_eq!(partial.level(), expected);
    assert_eq!(partial.endpoint(), "https://databus.example.org/sparql");
}

#[rstest]
fn groups_are_listed_for_an_account() {
    let endpoint = StubSparql::default().answering(
        "dct:publisher <https://databus.example.org/alice#this>",
        StubSparql::bindings("group", &["https://databus.example.org/alice/g1"]),
    );
    let partial = PartialIdentifier::parse("https://databus.example.org/alice/");
    let suggestions = block_on_for_tests(complete_identifier(&endpoint, &partial));
    assert_eq!(suggestions, vec!["https://databus.example.org/alice/g1"]);
}

#[rstest]
fn versions_are_listed_for_an_artifact() {
    let endpoint = StubSparql::default().answering(
        "dataid:artifact <https://databus.example.org/alice/group/art>",
        StubSparql::bindings("version", &["v1", "v2"]),
    );
    let partial = PartialIdentifier::parse("https://databus.example.org/alice/group/art/");
    let suggestions = block_on_for_tests(complete_identifier(&endpoint, &partial));
    assert_eq!(suggestions, vec!["v1", "v2"]);
}

#[rstest]
#[case("https://databus.example.org/alice")]
#[case("https://databus.example.org/alice/group/art/1.0/f.ttl")]
fn failures_and_complete_identifiers_echo_the_input(#[case] input: &str) {
    let endpoint = StubSparql::default();
    let partial = PartialIdentifier::parse(input);
    let suggestions = block_on_for_tests(complete_identifier(&endpoint, &partial));
    assert_eq!(suggestions, vec![input]);
}

#[rstest]
#[case(Facet::Format, "", vec!["ttl", "nt", "TTL.bz2"])]
#[case(Facet::Format, "TT", vec!["ttl", "TTL.bz2"])]
#[case(Facet::Format, "xml", vec![])]
fn facet_values_filter_case_insensitively(
    #[case] facet: Facet,
    #[case] term: &str,
    #[case] expected: Vec<&str>,
) {
    let endpoint = StubSparql::default().answering(
        "dataid:formatExtension ?facet",
        StubSparql::bindings("facet", &["ttl", "nt", "TTL.bz2"]),
    );
    let found = block_on_for_tests(facet_values(
        &endpoint,
        "https://d.org/a/g/art",
        facet,
        term,
    ))
    .expect("lookup succeeds");
    assert_eq!(found, expected);
}

#[rstest]
fn version_facet_queries_has_version() {
    let query = facet_query("https://d.org/a/g/art", Facet::Version).expect("valid IRI");
    assert!(query.contains("?dataset dct:hasVersion ?facet ."));
}

#[rstest]
fn search_hits_take_the_first_value_of_each_field() {
    let body = br#"{"docs": [
        {"typeName": ["Artifact"], "score": ["1.5"], "label": ["Cities"], "resource": ["https://d.org/a/g/cities"]},
        {"typeName": ["Group"], "score": [2], "label": ["Geo", "ignored"], "resource": ["https://d.org/a/geo"]}
    ]}"#;
    let hits = parse_search_response("stub", body.to_vec()).expect("valid response");
    let summary: Vec<(String, String, String)> = hits
        .into_iter()
        .map(|hit| (hit.type_name, hit.score.to_string(), hit.label))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Artifact".to_owned(), "1.5".to_owned(), "Cities".to_owned()),
            ("Group".to_owned(), "2".to_owned(), "Geo".to_owned()),
        ]
    );
}

#[rstest]
fn search_hit_without_label_is_rejected() {
    let body = br#"{"docs": [{"typeName": ["Artifact"], "score": [1], "resource": ["r"]}]}"#;
    let err = parse_search_response("stub", body.to_vec()).expect_err("missing label");
    assert!(matches!(err, CatalogError::MissingField { field: "label" }));
}

#[rstest]
fn search_url_encodes_the_query() {
    let url = search_url("https://databus.example.org/", "open data").expect("valid base");
    assert_eq!(
        url.as_str(),
        "https://databus.example.org/api/search?query=open+data"
    );
}
