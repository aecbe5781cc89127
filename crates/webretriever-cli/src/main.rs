//! Web Retriever CLI - Command-line interface for LLM-ready URL summaries

mod mcp;

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;
use webretriever::{PipelineConfig, RetrieveRequest, RetrieveResponse, Tool, TOOL_LLMTXT};

/// Output format for fetch subcommand
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    /// Rendered text_content/images block
    #[default]
    Text,
    /// JSON response with metadata
    Json,
}

/// Web Retriever - fetch a URL and summarize it for an LLM
#[derive(Parser, Debug)]
#[command(name = "webretriever")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

/// Budget flags shared by every subcommand that builds a tool
#[derive(clap::Args, Debug, Clone)]
struct BudgetArgs {
    /// Maximum characters of extracted text
    #[arg(long, default_value_t = webretriever::DEFAULT_TEXT_BUDGET)]
    text_budget: usize,

    /// Maximum characters of the serialized image list
    #[arg(long, default_value_t = webretriever::DEFAULT_IMAGE_BUDGET, conflicts_with = "max_images")]
    image_budget: usize,

    /// Cap images by count instead of characters (legacy mode)
    #[arg(long)]
    max_images: Option<usize>,

    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,
}

impl BudgetArgs {
    fn config(&self) -> PipelineConfig {
        let config = PipelineConfig::default().with_text_budget(self.text_budget);
        match self.max_images {
            Some(max) => config.with_max_images(max),
            None => config.with_image_budget(self.image_budget),
        }
    }

    fn build_tool(&self) -> Tool {
        let mut builder = Tool::builder().config(self.config());
        if let Some(ref ua) = self.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        builder.build()
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp {
        #[command(flatten)]
        budgets: BudgetArgs,
    },
    /// Fetch URL and print its bounded summary
    Fetch {
        /// URL to fetch
        url: String,

        /// Output format
        #[arg(long, short, default_value = "text")]
        output: OutputFormat,

        #[command(flatten)]
        budgets: BudgetArgs,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays clean for tool output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Mcp { budgets }) => {
            mcp::run_server(budgets.build_tool()).await;
        }
        Some(Commands::Fetch {
            url,
            output,
            budgets,
        }) => {
            run_fetch(&url, output, budgets.build_tool()).await;
        }
        None => {
            eprintln!("Usage: webretriever fetch <URL>");
            eprintln!("   or: webretriever mcp");
            eprintln!("   or: webretriever --help");
            std::process::exit(1);
        }
    }
}

async fn run_fetch(url: &str, output: OutputFormat, tool: Tool) {
    match tool.execute(RetrieveRequest::new(url)).await {
        Ok(response) => match output {
            OutputFormat::Text => writeln_safe(&format_text(&response)),
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&response).unwrap_or_else(|e| {
                    eprintln!("Error serializing response: {}", e);
                    std::process::exit(1);
                });
                writeln_safe(&json);
            }
        },
        Err(e) => {
            tracing::error!(url, error = %e, "Retrieve failed");
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}

/// Rendered block without the trailing newline (writeln adds one)
fn format_text(response: &RetrieveResponse) -> String {
    response
        .content
        .as_deref()
        .unwrap_or_default()
        .trim_end_matches('\n')
        .to_string()
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webretriever::{FormatTag, ImageLimit};

    #[test]
    fn test_format_text_strips_trailing_newline() {
        let response = RetrieveResponse {
            url: "https://example.com".to_string(),
            status_code: 200,
            format: Some(FormatTag::Plain),
            content: Some("text_content: |\n  Hello\n".to_string()),
            ..Default::default()
        };

        assert_eq!(format_text(&response), "text_content: |\n  Hello");
    }

    #[test]
    fn test_format_text_without_content() {
        let response = RetrieveResponse::default();
        assert_eq!(format_text(&response), "");
    }

    #[test]
    fn test_fetch_args_default_budgets() {
        let cli = Cli::parse_from(["webretriever", "fetch", "https://example.com"]);
        let Some(Commands::Fetch { url, budgets, .. }) = cli.command else {
            panic!("expected fetch subcommand");
        };

        assert_eq!(url, "https://example.com");
        assert_eq!(budgets.config(), PipelineConfig::default());
    }

    #[test]
    fn test_fetch_args_legacy_mode() {
        let cli = Cli::parse_from([
            "webretriever",
            "fetch",
            "https://example.com",
            "--text-budget",
            "200",
            "--max-images",
            "3",
        ]);
        let Some(Commands::Fetch { budgets, .. }) = cli.command else {
            panic!("expected fetch subcommand");
        };

        let config = budgets.config();
        assert_eq!(config.text_budget, 200);
        assert_eq!(config.image_limit, ImageLimit::Count(3));
    }

    #[test]
    fn test_image_budget_conflicts_with_max_images() {
        let result = Cli::try_parse_from([
            "webretriever",
            "fetch",
            "https://example.com",
            "--image-budget",
            "100",
            "--max-images",
            "3",
        ]);
        assert!(result.is_err());
    }
}
