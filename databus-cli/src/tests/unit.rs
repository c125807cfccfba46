//! Focused unit tests covering command configuration and output.

use super::*;
use crate::catalog::{FacetsArgs, FacetsConfig, parse_facet, run_complete_with, run_facets_with, search_line};
use crate::load::{ENV_FILE_ID, LoadConfig, LoadDestination, run_load_with};
use crate::publish::{ARG_TITLE, PublishConfig, run_publish_with};
use camino::Utf8PathBuf;
use databus_core::{ChunkSize, DEFAULT_CHUNK_SIZE, MalformedPathError};
use databus_data::catalog::{Facet, PartialIdentifier, SearchResult};
use databus_data::test_support::{StubDeployer, StubSource, StubSparql, StubWebDav};
use databus_data::transfer::{BufferMode, FileTarget, TerminalState};
use rstest::{fixture, rstest};
use tempfile::TempDir;

fn file_load_args(path: &str) -> LoadArgs {
    LoadArgs {
        file_id: Some("https://databus.example.org/alice/g/a/1/a.ttl".to_owned()),
        output: Some(Utf8PathBuf::from(path)),
        ..LoadArgs::default()
    }
}

#[rstest]
fn load_requires_a_file_id() {
    let err = LoadConfig::try_from(LoadArgs::default()).expect_err("missing file id");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, "file-id");
            assert_eq!(env, ENV_FILE_ID);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
#[case(None, Some("https://example.org/sparql"), ARG_GRAPH)]
#[case(Some("https://example.org/graph"), None, ARG_GRAPH_ENDPOINT)]
fn graph_destination_needs_graph_and_endpoint(
    #[case] graph: Option<&str>,
    #[case] endpoint: Option<&str>,
    #[case] missing: &'static str,
) {
    let args = LoadArgs {
        file_id: Some("https://databus.example.org/f.ttl".to_owned()),
        graph: graph.map(str::to_owned),
        graph_endpoint: endpoint.map(str::to_owned),
        ..LoadArgs::default()
    };
    match LoadConfig::try_from(args).expect_err("incomplete destination") {
        CliError::MissingArgument { field, .. } => assert_eq!(field, missing),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn graph_and_output_conflict() {
    let args = LoadArgs {
        graph: Some("https://example.org/graph".to_owned()),
        ..file_load_args("out.ttl")
    };
    assert!(matches!(
        LoadConfig::try_from(args),
        Err(CliError::ConflictingArguments {
            first: "output",
            second: "graph"
        })
    ));
}

#[rstest]
fn zero_chunk_size_is_rejected() {
    let args = LoadArgs {
        chunk_size: Some(0),
        ..file_load_args("out.ttl")
    };
    assert!(matches!(
        LoadConfig::try_from(args),
        Err(CliError::InvalidChunkSize(_))
    ));
}

#[rstest]
fn load_defaults_stream_in_mebibyte_chunks() {
    let config = LoadConfig::try_from(file_load_args("out.ttl")).expect("valid config");
    assert_eq!(config.request.chunk_size.get(), DEFAULT_CHUNK_SIZE);
    assert_eq!(config.request.mode, BufferMode::Streaming);
    assert!(config.follow_redirects);
    assert_eq!(
        config.destination,
        LoadDestination::File {
            path: Utf8PathBuf::from("out.ttl"),
            overwrite: false
        }
    );
}

#[rstest]
fn load_flags_select_buffering_and_redirects() {
    let args = LoadArgs {
        file_id: Some("https://databus.example.org/f.ttl".to_owned()),
        graph: Some("https://example.org/graph".to_owned()),
        graph_endpoint: Some("https://example.org/sparql-graph-crud".to_owned()),
        chunk_size: Some(4096),
        buffer_in_memory: true,
        no_redirects: true,
        token: Some("secret".to_owned()),
        ..LoadArgs::default()
    };
    let config = LoadConfig::try_from(args).expect("valid config");
    assert_eq!(config.request.mode, BufferMode::InMemory);
    assert_eq!(
        config.request.chunk_size,
        ChunkSize::new(4096).expect("non-zero")
    );
    assert!(!config.follow_redirects);
    assert_eq!(config.token.as_deref(), Some("secret"));
    assert!(matches!(
        config.destination,
        LoadDestination::GraphStore { .. }
    ));
}

#[fixture]
fn temp_dir() -> TempDir {
    TempDir::new().expect("tempdir")
}

fn utf8(dir: &TempDir, name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().join(name)).expect("utf-8 temp path")
}

#[rstest]
fn load_reports_bytes_and_checksum(temp_dir: TempDir) {
    let path = utf8(&temp_dir, "graph.ttl");
    let config = LoadConfig::try_from(file_load_args(path.as_str())).expect("valid config");
    let source = StubSource::with_bytes("abc");
    let target = FileTarget::new(path.clone(), false);
    let mut output = Vec::new();
    run_load_with(&config, &source, &target, &mut output).expect("load succeeds");
    let text = String::from_utf8(output).expect("utf-8 output");
    assert!(text.starts_with("loaded 3 bytes from https://databus.example.org/file.ttl"));
    assert!(
        text.contains("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"),
        "missing checksum in {text:?}"
    );
    assert_eq!(std::fs::read(&path).expect("written file"), b"abc");
}

#[rstest]
#[case(StubSource::failing(404, "missing"), false, TerminalState::DownloadFailed)]
#[case(StubSource::with_bytes("abc"), true, TerminalState::UploadFailed)]
fn load_failures_carry_their_terminal_state(
    temp_dir: TempDir,
    #[case] source: StubSource,
    #[case] file_exists: bool,
    #[case] expected: TerminalState,
) {
    let path = utf8(&temp_dir, "graph.ttl");
    if file_exists {
        std::fs::write(&path, b"old").expect("seed file");
    }
    let config = LoadConfig::try_from(file_load_args(path.as_str())).expect("valid config");
    let target = FileTarget::new(path, false);
    let mut output = Vec::new();
    match run_load_with(&config, &source, &target, &mut output) {
        Err(CliError::TransferFailed { state, .. }) => assert_eq!(state, expected),
        other => panic!("expected TransferFailed, found {other:?}"),
    }
    assert!(output.is_empty());
}

fn publish_args() -> PublishArgs {
    PublishArgs {
        artifact_uri: Some("https://databus.example.org/alice/animals/cats".to_owned()),
        api_key: Some("key".to_owned()),
        license: Some("http://creativecommons.org/licenses/by/4.0/".to_owned()),
        graph: Some("https://example.org/cats".to_owned()),
        graph_endpoint: Some("https://example.org/graph-store".to_owned()),
        title: Some("Cats".to_owned()),
        description: Some("All the cats. Even the grumpy ones.".to_owned()),
        version: Some("2024.01.01".to_owned()),
        ..PublishArgs::default()
    }
}

#[rstest]
fn publish_defaults_to_turtle_without_variants() {
    let config = PublishConfig::try_from(publish_args()).expect("valid config");
    assert_eq!(config.request.format, "ttl");
    assert!(config.request.content_variants.is_empty());
    assert_eq!(config.request.version.as_str(), "2024.01.01");
    assert_eq!(config.request.metadata.abstract_text(), "All the cats.");
}

#[rstest]
fn publish_requires_a_title() {
    let args = PublishArgs {
        title: None,
        ..publish_args()
    };
    match PublishConfig::try_from(args).expect_err("missing title") {
        CliError::MissingArgument { field, .. } => assert_eq!(field, ARG_TITLE),
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn publish_rejects_short_artifact_uris() {
    let args = PublishArgs {
        artifact_uri: Some("https://databus.example.org/alice/animals".to_owned()),
        ..publish_args()
    };
    assert!(matches!(
        PublishConfig::try_from(args),
        Err(CliError::InvalidArtifact(MalformedPathError::SegmentCount { .. }))
    ));
}

#[rstest]
#[case("lang")]
#[case("tag=a#b")]
fn publish_rejects_malformed_variants(#[case] cvs: &str) {
    let args = PublishArgs {
        cvs: Some(cvs.to_owned()),
        ..publish_args()
    };
    assert!(matches!(
        PublishConfig::try_from(args),
        Err(CliError::InvalidContentVariants(_))
    ));
}

#[rstest]
fn publish_prints_version_and_download_url() {
    let args = PublishArgs {
        cvs: Some("lang=en".to_owned()),
        ..publish_args()
    };
    let config = PublishConfig::try_from(args).expect("valid config");
    let source = StubSource::with_bytes("<a> <b> <c> .\n");
    let store = StubWebDav::default();
    let deployer = StubDeployer::default();
    let mut output = Vec::new();
    run_publish_with(&config.request, &source, &store, &deployer, &mut output)
        .expect("publish succeeds");
    let text = String::from_utf8(output).expect("utf-8 output");
    assert_eq!(
        text,
        "https://databus.example.org/alice/animals/cats/2024.01.01\n\
         https://databus.example.org/dav/alice/animals/cats/2024.01.01/cats_lang=en.ttl\n"
    );
    assert_eq!(deployer.documents().len(), 1);
}

#[rstest]
fn rejected_deploy_is_a_publish_error() {
    let config = PublishConfig::try_from(publish_args()).expect("valid config");
    let source = StubSource::with_bytes("<a> <b> <c> .\n");
    let store = StubWebDav::default();
    let deployer = StubDeployer::rejecting(400);
    let mut output = Vec::new();
    let err = run_publish_with(&config.request, &source, &store, &deployer, &mut output)
        .expect_err("deploy rejected");
    assert!(matches!(err, CliError::Publish(_)));
    assert!(output.is_empty());
}

#[rstest]
#[case("format", Facet::Format)]
#[case("Version", Facet::Version)]
#[case(" version ", Facet::Version)]
fn facet_names_parse(#[case] raw: &str, #[case] expected: Facet) {
    assert_eq!(parse_facet(raw).expect("known facet"), expected);
}

#[rstest]
fn unknown_facet_is_rejected() {
    assert!(matches!(
        parse_facet("licence"),
        Err(CliError::InvalidFacet { value }) if value == "licence"
    ));
}

#[rstest]
fn facets_query_the_sparql_endpoint_of_the_databus() {
    let args = FacetsArgs {
        databus: Some("https://databus.example.org/".to_owned()),
        artifact: Some("https://databus.example.org/alice/animals/cats".to_owned()),
        facet: Some("format".to_owned()),
        term: None,
    };
    let config = FacetsConfig::try_from(args).expect("valid config");
    assert_eq!(config.endpoint, "https://databus.example.org/sparql");
    assert_eq!(config.term, "");
}

#[rstest]
fn facets_print_matching_values() {
    let config = FacetsConfig {
        endpoint: "https://databus.example.org/sparql".to_owned(),
        artifact: "https://databus.example.org/alice/animals/cats".to_owned(),
        facet: Facet::Format,
        term: "T".to_owned(),
    };
    let endpoint = StubSparql::default().answering(
        "formatExtension",
        StubSparql::bindings("facet", &["ttl", "nt", "json"]),
    );
    let mut output = Vec::new();
    run_facets_with(&config, &endpoint, &mut output).expect("facets listed");
    assert_eq!(String::from_utf8(output).expect("utf-8"), "ttl\nnt\n");
}

#[rstest]
fn completion_prints_one_suggestion_per_line() {
    let partial = PartialIdentifier::parse("https://databus.example.org/alice/animals/");
    let endpoint = StubSparql::default().answering(
        "dataid:group",
        StubSparql::bindings(
            "artifact",
            &[
                "https://databus.example.org/alice/animals/cats",
                "https://databus.example.org/alice/animals/dogs",
            ],
        ),
    );
    let mut output = Vec::new();
    run_complete_with(&partial, &endpoint, &mut output).expect("completion written");
    assert_eq!(
        String::from_utf8(output).expect("utf-8"),
        "https://databus.example.org/alice/animals/cats\n\
         https://databus.example.org/alice/animals/dogs\n"
    );
}

#[rstest]
fn completion_echoes_input_when_lookup_fails() {
    let partial = PartialIdentifier::parse("https://databus.example.org/alice/");
    let mut output = Vec::new();
    run_complete_with(&partial, &StubSparql::default(), &mut output).expect("completion written");
    assert_eq!(
        String::from_utf8(output).expect("utf-8"),
        "https://databus.example.org/alice/\n"
    );
}

#[rstest]
fn search_hits_are_tab_separated() {
    let hit = SearchResult {
        type_name: "Artifact".to_owned(),
        score: 2.5,
        label: "cats".to_owned(),
        resource: "https://databus.example.org/alice/animals/cats".to_owned(),
    };
    assert_eq!(
        search_line(&hit),
        "Artifact\t2.5\tcats\thttps://databus.example.org/alice/animals/cats"
    );
}

#[rstest]
fn subcommands_parse_their_flags() {
    let cli = Cli::try_parse_from([
        "databus",
        "random-values",
        "--entities",
        "3",
        "--values",
        "2",
    ])
    .expect("valid invocation");
    match cli.command {
        Command::RandomValues(args) => {
            assert_eq!(args.entities, Some(3));
            assert_eq!(args.values, Some(2));
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[rstest]
fn complete_takes_a_positional_identifier() {
    let cli = Cli::try_parse_from(["databus", "complete", "https://databus.example.org/"])
        .expect("valid invocation");
    assert!(matches!(
        cli.command,
        Command::Complete(args) if args.partial == "https://databus.example.org/"
    ));
}
