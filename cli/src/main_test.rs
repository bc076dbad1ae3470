use super::*;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("portal-cli").chain(args.iter().copied())).unwrap()
}

// =============================================================================
// Argument parsing
// =============================================================================

#[test]
fn global_flags_are_read() {
    let cli = parse(&["--base-url", "https://api.school.edu", "--session-file", "/tmp/s.json", "--timeout-secs", "5", "whoami"]);
    assert_eq!(cli.base_url, "https://api.school.edu");
    assert_eq!(cli.session_file, PathBuf::from("/tmp/s.json"));
    assert_eq!(cli.timeout_secs, 5);
    assert!(matches!(cli.command, Command::Whoami));
}

#[test]
fn resource_kind_accepts_singular_and_plural() {
    let cli = parse(&["resource", "student", "get", "12"]);
    let Command::Resource(resource) = cli.command else {
        panic!("expected resource command");
    };
    assert_eq!(resource.kind, ResourceKind::Student);
    assert!(matches!(resource.command, ResourceSubcommand::Get { ref id } if id == "12"));

    let cli = parse(&["resource", "adminaccess", "list"]);
    let Command::Resource(resource) = cli.command else {
        panic!("expected resource command");
    };
    assert_eq!(resource.kind, ResourceKind::AdminAccess);
}

#[test]
fn unknown_resource_kind_is_rejected() {
    let err = Cli::try_parse_from(["portal-cli", "resource", "courses", "list"]).unwrap_err();
    assert!(err.to_string().contains("unknown resource"));
}

#[test]
fn update_requires_data() {
    assert!(Cli::try_parse_from(["portal-cli", "resource", "colleges", "update", "3"]).is_err());
}

#[test]
fn token_inspect_takes_optional_token() {
    let cli = parse(&["token", "inspect"]);
    let Command::Token(TokenCommand { command: TokenSubcommand::Inspect { token } }) = cli.command else {
        panic!("expected token inspect");
    };
    assert_eq!(token, None);
}

// =============================================================================
// Payload helpers
// =============================================================================

#[test]
fn parse_object_accepts_objects_only() {
    let map = parse_object(r#"{"name":"North","code":"N1"}"#).unwrap();
    assert_eq!(map["code"], "N1");
    assert!(matches!(parse_object("[1,2]"), Err(CliError::NotAnObject)));
    assert!(matches!(parse_object("{oops"), Err(CliError::InvalidJson(_))));
}

#[test]
fn lead_draft_omits_blank_optionals() {
    let draft = lead_draft(LeadArgs {
        name: " Ada ".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: Some("  ".to_owned()),
        service: Some("lms-setup".to_owned()),
        message: "Need a quote".to_owned(),
    });
    assert_eq!(draft["name"], "Ada");
    assert_eq!(draft["service"], "lms-setup");
    assert!(!draft.contains_key("phone"));
    assert!(ResourceKind::Lead.validate(session::resource::DraftMode::Create, &draft).is_ok());
}
