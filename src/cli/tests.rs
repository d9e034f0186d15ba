use super::*;
use crate::api::{ApiError, Chat, Role};
use crate::cli::say::reply_after;
use async_trait::async_trait;

fn parse_args(argv: &[&str]) -> Args {
    Args::try_parse_from(argv)
        .unwrap_or_else(|err| panic!("argv={argv:?} should parse successfully: {err}"))
}

fn message(id: i64, role: Role, content: &str) -> Message {
    Message {
        id,
        chat_id: 1,
        role,
        content: content.to_string(),
        created_at: String::new(),
    }
}

#[test]
fn no_subcommand_means_interactive_chat() {
    let args = parse_args(&["chatline"]);
    assert!(args.command.is_none());
    assert!(args.server.is_none());
    assert!(args.log.is_none());
}

#[test]
fn global_flags_parse_before_and_after_subcommand() {
    let args = parse_args(&["chatline", "--server", "http://h:1", "list"]);
    assert_eq!(args.server.as_deref(), Some("http://h:1"));
    assert_eq!(args.command, Some(Commands::List));

    let args = parse_args(&["chatline", "health", "-s", "h:2", "-l", "out.log"]);
    assert_eq!(args.server.as_deref(), Some("h:2"));
    assert_eq!(args.log, Some(PathBuf::from("out.log")));
}

#[test]
fn new_joins_title_words_and_allows_none() {
    let args = parse_args(&["chatline", "new", "Trip", "to", "Lisbon"]);
    assert_eq!(
        args.command,
        Some(Commands::New {
            title: vec!["Trip".into(), "to".into(), "Lisbon".into()]
        })
    );

    let args = parse_args(&["chatline", "new"]);
    assert_eq!(args.command, Some(Commands::New { title: vec![] }));
}

#[test]
fn say_requires_a_message() {
    assert!(Args::try_parse_from(["chatline", "say", "abc"]).is_err());

    let args = parse_args(&["chatline", "say", "abc", "hello", "-there"]);
    assert_eq!(
        args.command,
        Some(Commands::Say {
            session_id: "abc".into(),
            message: vec!["hello".into(), "-there".into()],
        })
    );
}

#[test]
fn set_and_unset_parse_keys() {
    let args = parse_args(&["chatline", "set", "server", "http://h:9"]);
    assert_eq!(
        args.command,
        Some(Commands::Set {
            key: "server".into(),
            value: vec!["http://h:9".into()],
        })
    );
    let args = parse_args(&["chatline", "unset", "theme"]);
    assert_eq!(
        args.command,
        Some(Commands::Unset {
            key: "theme".into()
        })
    );
}

#[test]
fn reply_follows_sent_message() {
    let history = vec![
        message(1, Role::User, "earlier"),
        message(2, Role::Assistant, "old reply"),
        message(3, Role::User, "hi"),
        message(4, Role::Assistant, "hello!"),
    ];
    let reply = reply_after(&history, &message(3, Role::User, "hi"));
    assert_eq!(reply, &history[3..]);
}

#[test]
fn reply_falls_back_to_matching_content() {
    let history = vec![
        message(10, Role::User, "hi"),
        message(11, Role::Assistant, "first"),
        message(12, Role::User, "hi"),
        message(13, Role::Assistant, "second"),
    ];
    let reply = reply_after(&history, &message(99, Role::User, "hi"));
    assert_eq!(reply.len(), 1);
    assert_eq!(reply[0].content, "second");

    assert!(reply_after(&history, &message(99, Role::User, "unknown")).is_empty());
}

struct EchoBackend;

#[async_trait]
impl ChatBackend for EchoBackend {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
        Ok(Vec::new())
    }

    async fn create_chat(&self, _title: &str) -> Result<Chat, ApiError> {
        Err(ApiError::Envelope("unused".into()))
    }

    async fn get_history(&self, _session_id: &str) -> Result<Vec<Message>, ApiError> {
        Ok(vec![
            message(1, Role::User, "ping"),
            message(2, Role::Assistant, "pong"),
        ])
    }

    async fn send_message(&self, _session_id: &str, content: &str) -> Result<Message, ApiError> {
        Ok(message(1, Role::User, content))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[tokio::test]
async fn say_prints_only_the_reply() {
    let reply = run_say(&EchoBackend, "s1", "ping").await.expect("say");
    assert_eq!(reply.len(), 1);
    assert_eq!(reply[0].content, "pong");
}
