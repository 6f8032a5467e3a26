use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["quill-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_migrate_command() {
    let cli = Cli::try_parse_from(["quill-cli", "migrate"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Migrate)));
}

#[test]
fn seed_topics_path_is_optional() {
    let cli = Cli::try_parse_from(["quill-cli", "seed-topics"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::SeedTopics { path: None })
    ));

    let cli = Cli::try_parse_from(["quill-cli", "seed-topics", "--path", "topics.yaml"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::SeedTopics { path: Some(ref p) }) if p == &PathBuf::from("topics.yaml")
    ));
}

#[test]
fn write_without_topic_claims_next() {
    let cli = Cli::try_parse_from(["quill-cli", "write"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Write { topic: None })));
}

#[test]
fn write_with_topic_targets_one() {
    let cli =
        Cli::try_parse_from(["quill-cli", "write", "--topic", "42"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Write { topic: Some(42) })
    ));
}

#[test]
fn write_rejects_non_numeric_topic() {
    assert!(Cli::try_parse_from(["quill-cli", "write", "--topic", "abc"]).is_err());
}

#[test]
fn parses_publish_and_run() {
    let cli = Cli::try_parse_from(["quill-cli", "publish"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Publish)));

    let cli = Cli::try_parse_from(["quill-cli", "run"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Run)));
}

#[test]
fn parses_suggest_command() {
    let cli = Cli::try_parse_from(["quill-cli", "suggest"]).expect("expected valid cli args");
    assert!(matches!(cli.command, Some(Commands::Suggest)));
}

#[test]
fn investigate_defaults_priority_to_zero() {
    let cli = Cli::try_parse_from(["quill-cli", "investigate", "composite decking"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Investigate { ref idea, priority: 0 }) if idea == "composite decking"
    ));
}

#[test]
fn investigate_accepts_priority() {
    let cli = Cli::try_parse_from(["quill-cli", "investigate", "fence stains", "--priority", "5"])
        .expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Investigate { priority: 5, .. })
    ));
}

#[test]
fn investigate_requires_an_idea() {
    assert!(Cli::try_parse_from(["quill-cli", "investigate"]).is_err());
}
