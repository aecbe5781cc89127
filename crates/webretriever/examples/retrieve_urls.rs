//! Example: Retrieve various URLs and display the rendered summaries
//!
//! Run with: cargo run -p webretriever --example retrieve_urls
//!
//! Set `RUST_LOG=webretriever=debug` to see format detection and truncation.

use tracing_subscriber::EnvFilter;
use webretriever::{FormatTag, RetrieveRequest, RetrieveResponse, Tool};

/// Example case definition
struct Case {
    url: &'static str,
    description: &'static str,
    expect_format: Option<FormatTag>,
    expect_contains: Option<&'static str>,
}

const CASES: &[Case] = &[
    Case {
        url: "https://example.com",
        description: "Simple HTML page",
        expect_format: Some(FormatTag::Html),
        expect_contains: Some("This domain is for use"),
    },
    Case {
        url: "https://httpbin.org/json",
        description: "JSON endpoint",
        expect_format: Some(FormatTag::Json),
        expect_contains: Some("slideshow"),
    },
    Case {
        url: "https://httpbin.org/html",
        description: "HTML endpoint",
        expect_format: Some(FormatTag::Html),
        expect_contains: Some("Herman Melville"),
    },
    Case {
        url: "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf",
        description: "PDF document",
        expect_format: Some(FormatTag::Pdf),
        expect_contains: Some("Dummy"),
    },
    Case {
        url: "https://raw.githubusercontent.com/rust-lang/rust/master/README.md",
        description: "Raw markdown file",
        expect_format: Some(FormatTag::Plain),
        expect_contains: Some("Rust"),
    },
];

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    println!("Web Retriever Examples");
    println!("======================\n");

    let tool = Tool::default();
    let mut passed = 0;
    let mut failed = 0;

    for (i, case) in CASES.iter().enumerate() {
        println!("{}. {}", i + 1, case.description);
        println!("   URL: {}", case.url);

        match tool.execute(RetrieveRequest::new(case.url)).await {
            Ok(response) => {
                print_response_summary(&response);

                if check_expectations(case, &response) {
                    println!("   ✓ PASS\n");
                    passed += 1;
                } else {
                    println!("   ✗ FAIL (expectations not met)\n");
                    failed += 1;
                }
            }
            Err(e) => {
                println!("   Error: {}", e);
                println!("   ✗ FAIL\n");
                failed += 1;
            }
        }
    }

    println!("======================");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed > 0 {
        std::process::exit(1);
    }
}

fn print_response_summary(response: &RetrieveResponse) {
    println!("   Status: {}", response.status_code);

    if let Some(format) = response.format {
        println!("   Format: {}", format);
    }

    if let Some(ref ct) = response.content_type {
        println!("   Content-Type: {}", ct);
    }

    if let Some(count) = response.image_count {
        println!("   Images: {}", count);
    }

    if let Some(ref content) = response.content {
        let preview = content.chars().take(100).collect::<String>();
        let preview = preview.replace('\n', " ");
        println!(
            "   Preview: {}{}",
            preview,
            if content.chars().count() > 100 { "..." } else { "" }
        );
    }
}

fn check_expectations(case: &Case, response: &RetrieveResponse) -> bool {
    if let Some(expected_format) = case.expect_format {
        if response.format != Some(expected_format) {
            println!(
                "   Expected format '{}', got '{:?}'",
                expected_format, response.format
            );
            return false;
        }
    }

    if let Some(expected_text) = case.expect_contains {
        let content = response.content.as_deref().unwrap_or("");
        if !content.contains(expected_text) {
            println!("   Expected content to contain '{}'", expected_text);
            return false;
        }
    }

    true
}
