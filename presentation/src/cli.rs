use anyhow::Context;
use application::rag_service::{AskOptions, RagService, DEFAULT_TOKEN_BUDGET, DEFAULT_TOP_N};
use application::review_service::{GenerateOptions, ReviewRewriteService};
use clap::{Parser, Subcommand};
use colored::Colorize;
use infrastructure::config::Config;
use infrastructure::corpus::{load_corpus, sample_reviews};
use infrastructure::embedder::Embedder;
use infrastructure::openai_client::OpenAiClient;
use infrastructure::search::SearchEngine;
use infrastructure::tokenizer::TiktokenCounter;
use shared::confirmation::{ask_confirmation, ask_text};
use shared::types::Result;
use shared::utils::preview;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "review-rag")]
#[command(about = "Ask questions about app reviews, or rewrite a review dataset", long_about = None)]
pub struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Answer a question from the most related reviews, in first person
    Ask {
        /// Review file: JSON array of strings, or one review per line
        #[arg(long)]
        corpus: Option<PathBuf>,

        /// How many ranked reviews are offered to the prompt
        #[arg(long, default_value_t = DEFAULT_TOP_N)]
        top_n: usize,

        /// Token budget for the assembled prompt
        #[arg(long, default_value_t = DEFAULT_TOKEN_BUDGET)]
        token_budget: usize,

        /// Print the prompt before sending it
        #[arg(long)]
        print_message: bool,

        /// The question (asked interactively when empty)
        #[arg(trailing_var_arg = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// List reviews ranked by relatedness to a query
    Rank {
        #[arg(long)]
        corpus: Option<PathBuf>,

        #[arg(long, default_value_t = 5)]
        top_n: usize,

        #[arg(trailing_var_arg = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Rewrite every review of a CSV dataset so it is about another topic
    Generate {
        #[arg(short, long, default_value = "dataset.csv")]
        input: PathBuf,

        #[arg(short, long, default_value = "processed.csv")]
        output: PathBuf,

        /// Target topic (defaults to TARGET_TOPIC)
        #[arg(long)]
        topic: Option<String>,

        #[arg(long, default_value_t = 150)]
        max_tokens: u32,

        /// Overwrite the output file without asking
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    /// Loads configuration. Fails on a missing API key before anything
    /// touches the network.
    pub fn from_env() -> Result<Self> {
        let config = Config::load()?;
        info!(?config, "configuration loaded");
        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        match cli.command {
            Command::Ask {
                corpus,
                top_n,
                token_budget,
                print_message,
                question,
            } => {
                self.run_ask(corpus.as_deref(), top_n, token_budget, print_message, question)
                    .await
            }
            Command::Rank {
                corpus,
                top_n,
                query,
            } => self.run_rank(corpus.as_deref(), top_n, query).await,
            Command::Generate {
                input,
                output,
                topic,
                max_tokens,
                yes,
            } => self.run_generate(&input, &output, topic, max_tokens, yes).await,
        }
    }

    fn rag_service(
        &self,
        top_n: usize,
        token_budget: usize,
    ) -> Result<RagService<OpenAiClient, OpenAiClient, TiktokenCounter>> {
        let client = OpenAiClient::new(&self.config);
        let counter = TiktokenCounter::for_model(&self.config.chat_model)?;
        let mut options = AskOptions::new(&self.config.chat_model);
        options.top_n = top_n;
        options.token_budget = token_budget;
        Ok(RagService::new(
            Embedder::new(client.clone(), &self.config.embedding_model),
            client,
            counter,
            options,
        ))
    }

    async fn run_ask(
        &self,
        corpus: Option<&Path>,
        top_n: usize,
        token_budget: usize,
        print_message: bool,
        question: Vec<String>,
    ) -> Result<()> {
        let question = read_text(question, "Question")?;
        let texts = load_texts(corpus)?;
        let service = self.rag_service(top_n, token_budget)?;

        let corpus = service.build_corpus(texts).await?;
        let outcome = service
            .ask_with(&question, &corpus, |prompt| {
                if print_message {
                    println!("{}", "Prompt:".bold());
                    println!("{}\n", prompt.dimmed());
                }
            })
            .await?;
        println!("{}", outcome.first_person.green());
        Ok(())
    }

    /// Ranking needs embeddings only, so no tokenizer is loaded here.
    async fn run_rank(&self, corpus: Option<&Path>, top_n: usize, query: Vec<String>) -> Result<()> {
        let query = read_text(query, "Query")?;
        let texts = load_texts(corpus)?;
        let embedder = Embedder::new(OpenAiClient::new(&self.config), &self.config.embedding_model);

        let corpus = embedder
            .embed_corpus(texts)
            .await
            .context("embedding corpus")?;
        let query_embedding = embedder.embed_query(&query).await.context("embedding query")?;
        for result in SearchEngine::rank(&query_embedding, &corpus, top_n)? {
            println!(
                "{} {}",
                format!("{:.3}", result.relatedness).cyan(),
                preview(&result.text, 100)
            );
        }
        Ok(())
    }

    async fn run_generate(
        &self,
        input: &Path,
        output: &Path,
        topic: Option<String>,
        max_tokens: u32,
        yes: bool,
    ) -> Result<()> {
        let topic = match topic {
            Some(topic) => topic,
            None => self.config.require_topic()?.to_string(),
        };

        if output.exists() && !yes {
            let prompt = format!("{} exists. Overwrite?", output.display());
            if !ask_confirmation(&prompt, false)? {
                println!("{}", "Aborted.".yellow());
                return Ok(());
            }
        }

        let mut options = GenerateOptions::new(topic, &self.config.completion_model);
        options.max_tokens = max_tokens;
        let service = ReviewRewriteService::new(OpenAiClient::new(&self.config), options);

        let summary = service
            .run(input, output)
            .await
            .with_context(|| format!("rewriting {}", input.display()))?;

        let line = format!(
            "Rewrote {} reviews into {}",
            summary.total,
            output.display()
        );
        println!("{}", line.green());
        if summary.failed > 0 {
            println!(
                "{}",
                format!("{} rows failed and have an empty result", summary.failed).yellow()
            );
        }
        Ok(())
    }
}

fn read_text(words: Vec<String>, label: &str) -> Result<String> {
    if words.is_empty() {
        ask_text(label)
    } else {
        Ok(words.join(" "))
    }
}

fn load_texts(corpus: Option<&Path>) -> Result<Vec<String>> {
    match corpus {
        Some(path) => load_corpus(path),
        None => Ok(sample_reviews()),
    }
}
