use clap::Parser;
use infrastructure::config::{Config, ENV_API_KEY, ENV_BASE_URL, ENV_CHAT_MODEL};
use presentation::cli::{Cli, CliApp};
use tests::StubServer;

const ONE_EMBEDDING: &str = r#"{"data":[{"index":0,"embedding":[1.0,0.0]}]}"#;

fn config(base_url: &str, chat_model: &str) -> Config {
    Config::from_lookup(|key| match key {
        ENV_API_KEY => Some("sk-test".to_string()),
        ENV_BASE_URL => Some(base_url.to_string()),
        ENV_CHAT_MODEL => Some(chat_model.to_string()),
        _ => None,
    })
    .unwrap()
}

#[tokio::test]
async fn rank_works_with_a_chat_model_without_tokenizer() {
    let server = StubServer::start(vec![(200, ONE_EMBEDDING), (200, ONE_EMBEDDING)]).await;
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("reviews.txt");
    std::fs::write(&corpus, "please add dark mode\n").unwrap();

    let cli = Cli::try_parse_from([
        "review-rag",
        "rank",
        "--corpus",
        corpus.to_str().unwrap(),
        "dark",
        "mode",
    ])
    .unwrap();
    CliApp::with_config(config(&server.base_url, "llama3"))
        .run(cli)
        .await
        .unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].json()["input"][0], "dark mode");
}

#[tokio::test]
async fn ask_surfaces_a_failing_answer_call() {
    let server = StubServer::start(vec![
        (200, ONE_EMBEDDING),
        (200, ONE_EMBEDDING),
        (429, r#"{"error":{"message":"Rate limit reached"}}"#),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let corpus = dir.path().join("reviews.txt");
    std::fs::write(&corpus, "please add dark mode\n").unwrap();

    let cli = Cli::try_parse_from([
        "review-rag",
        "ask",
        "--print-message",
        "--corpus",
        corpus.to_str().unwrap(),
        "dark",
        "mode?",
    ])
    .unwrap();
    let err = CliApp::with_config(config(&server.base_url, "gpt-3.5-turbo"))
        .run(cli)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "answering question");
    let requests = server.requests();
    assert_eq!(requests.len(), 3);
    let prompt = requests[2].json()["messages"][1]["content"].clone();
    assert!(prompt.as_str().unwrap().contains("please add dark mode"));
}
