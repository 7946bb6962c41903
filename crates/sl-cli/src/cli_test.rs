use super::*;
use clap::CommandFactory;

#[test]
fn verify_cli_args() {
    Cli::command().debug_assert();
}

#[test]
fn test_ingest_extensions() {
    let cli = Cli::try_parse_from(["sluice", "ingest", "docs/", "a.txt", "--ext", "md,txt"]).unwrap();
    match cli.command {
        Commands::Ingest(args) => {
            assert_eq!(args.paths.len(), 2);
            assert_eq!(args.ext, vec!["md", "txt"]);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_ids_require_table() {
    assert!(Cli::try_parse_from(["sluice", "clear", "--ids", "1,2", "--yes"]).is_err());
    let cli =
        Cli::try_parse_from(["sluice", "clear", "--table", "faqs", "--ids", "1,2", "--yes"]).unwrap();
    match cli.command {
        Commands::Clear(args) => assert_eq!(args.ids, vec![1, 2]),
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "sluice",
        "ask",
        "math departmant",
        "--output",
        "json",
        "--database-url",
        "duckdb://uni.duckdb",
    ])
    .unwrap();
    assert_eq!(cli.global.output, OutputFormat::Json);
    assert_eq!(cli.global.database_url.as_deref(), Some("duckdb://uni.duckdb"));
}

#[test]
fn test_ingest_requires_path() {
    assert!(Cli::try_parse_from(["sluice", "ingest"]).is_err());
}
