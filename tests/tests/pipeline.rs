use application::rag_service::{
    AskOptions, RagService, ANSWER_SYSTEM_PROMPT, REWRITE_SYSTEM_PROMPT,
};
use application::review_service::{GenerateOptions, ReviewRewriteService, RewriteSummary};
use domain::error::RagError;
use domain::models::TextEmbeddingPair;
use infrastructure::corpus::sample_reviews;
use infrastructure::embedder::Embedder;
use infrastructure::prompt_builder::{question_suffix, review_block, DEFAULT_INTRODUCTION};
use infrastructure::search::SearchEngine;
use tests::{keyword_vector, FakeApi};

fn words(text: &str) -> usize {
    text.split_whitespace().count()
}

type WordCounter = fn(&str) -> usize;

fn rag(api: &FakeApi, budget: usize) -> RagService<FakeApi, FakeApi, WordCounter> {
    let mut options = AskOptions::new("gpt-3.5-turbo");
    options.token_budget = budget;
    RagService::new(
        Embedder::new(api.clone(), "text-embedding-ada-002"),
        api.clone(),
        words as WordCounter,
        options,
    )
}

#[tokio::test]
async fn dark_mode_question_over_sample_reviews() {
    let api = FakeApi::default();
    let service = rag(&api, 3_596);
    let corpus = service.build_corpus(sample_reviews()).await.unwrap();
    assert_eq!(corpus.len(), 11);

    let ranked = service.rank("Do people want dark mode?", &corpus, 3).await.unwrap();
    assert_eq!(ranked.len(), 3);
    assert!(ranked.iter().all(|r| r.text.to_lowercase().contains("dark")));

    let outcome = service.ask("Do people want dark mode?", &corpus).await.unwrap();
    assert!(outcome.prompt.starts_with(DEFAULT_INTRODUCTION));
    assert!(outcome
        .prompt
        .ends_with(&question_suffix("Do people want dark mode?")));
    assert!(words(&outcome.prompt) <= 3_596);
    assert_eq!(outcome.first_person, "I ask for a dark mode.");

    let calls = api.chat_calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0][0].content, ANSWER_SYSTEM_PROMPT);
    assert_eq!(calls[1][0].content, REWRITE_SYSTEM_PROMPT);
    assert_eq!(calls[1][1].content, review_block(&outcome.answer));
}

#[tokio::test]
async fn small_budget_keeps_only_the_best_reviews() {
    let api = FakeApi::default();
    let question = "Is a dark mode planned?";
    let skeleton = words(&format!("{DEFAULT_INTRODUCTION}{}", question_suffix(question)));
    // "please add dark mode, ..." is 16 words plus three for the block markers.
    let service = rag(&api, skeleton + 30);
    let corpus = service.build_corpus(sample_reviews()).await.unwrap();

    let prompt = service.query_message(question, &corpus).await.unwrap();

    assert!(words(&prompt) <= skeleton + 30);
    assert!(prompt.contains("Review:"));
    assert!(!prompt.contains("payments menu"));
}

#[tokio::test]
async fn skeleton_budget_returns_bare_prompt() {
    let api = FakeApi::default();
    let question = "What about the design of the app?";
    let bare = format!("{DEFAULT_INTRODUCTION}{}", question_suffix(question));
    let service = rag(&api, words(&bare));
    let corpus = service.build_corpus(sample_reviews()).await.unwrap();

    assert_eq!(service.query_message(question, &corpus).await.unwrap(), bare);
}

#[tokio::test]
async fn budget_below_skeleton_is_rejected_before_chat() {
    let api = FakeApi::default();
    let service = rag(&api, 5);
    let corpus = service.build_corpus(sample_reviews()).await.unwrap();

    let err = service.ask("dark mode?", &corpus).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RagError>(),
        Some(RagError::BudgetTooSmall { budget: 5, .. })
    ));
    assert!(api.chat_calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn corpus_is_embedded_in_batches() {
    let api = FakeApi::default();
    let texts: Vec<String> = (0..2500).map(|i| format!("review {i} is slow")).collect();
    let embedder = Embedder::new(api.clone(), "text-embedding-ada-002");

    let corpus = embedder.embed_corpus(texts.clone()).await.unwrap();

    assert_eq!(*api.embedding_batches.lock().unwrap(), vec![1000, 1000, 500]);
    let back: Vec<&str> = corpus.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(back, texts.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn axis_vectors_rank_as_expected() {
    let corpus = vec![
        TextEmbeddingPair::new("a", vec![1.0, 0.0]),
        TextEmbeddingPair::new("b", vec![0.0, 1.0]),
        TextEmbeddingPair::new("c", vec![1.0, 1.0]),
    ];
    let ranked = SearchEngine::rank(&[1.0, 0.0], &corpus, 3).unwrap();
    let order: Vec<&str> = ranked.iter().map(|r| r.text.as_str()).collect();
    assert_eq!(order, vec!["a", "c", "b"]);
}

#[test]
fn keyword_vectors_are_never_zero() {
    assert!(SearchEngine::relatedness(&keyword_vector(""), &keyword_vector("dark")).is_ok());
}

#[tokio::test]
async fn dataset_rewrite_survives_a_failing_row() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("dataset.csv");
    let output = dir.path().join("processed.csv");
    std::fs::write(
        &input,
        "\
dateUpdated,reviews.rating,reviews.title,reviews.text,reviews.username
2018-01-03,5,Lovely,Great stay near the beach,ann
2018-02-11,2,Noisy,UPSTREAM-DOWN thin walls,bob
2018-03-20,4,Good value,Breakfast included,cy
",
    )
    .unwrap();

    let api = FakeApi::default().fail_completions_containing("UPSTREAM-DOWN");
    let service = ReviewRewriteService::new(api.clone(), GenerateOptions::new("car", "text-davinci-003"));

    let summary = service.run(&input, &output).await.unwrap();
    assert_eq!(summary, RewriteSummary { total: 3, failed: 1 });
    assert_eq!(api.completion_prompts.lock().unwrap().len(), 3);

    let mut rdr = csv::Reader::from_path(&output).unwrap();
    let header: Vec<&str> = rdr.headers().unwrap().iter().collect();
    assert_eq!(
        header,
        vec!["dateUpdated", "reviews.rating", "reviews.title", "reviews.text", "what-to-run", "result"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][5], "Rewritten: Review description: Great stay near the beach");
    assert_eq!(&rows[1][5], "");
    assert!(rows[2][4].starts_with("Change the following customer review so that it is about a car."));
}
