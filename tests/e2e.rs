//! End-to-end tests against the live OpenAI API.
//!
//! These make real, billable calls. They are gated behind the `E2E_ENABLED`
//! environment variable (plus `OPENAI_API_KEY`) so they do not run in CI
//! unless explicitly requested.
//!
//! Run with:
//!   E2E_ENABLED=1 OPENAI_API_KEY=sk-... cargo test --test e2e -- --nocapture

mod common;

use common::{init_tracing, pdf_page_lines, white_jpeg};
use whiteboard_summary::{
    run_session, Credential, ExportFormat, ImageSource, SessionOutcome, SummaryConfig,
    SummaryError,
};

/// Skip this test unless E2E_ENABLED and an API key are both set.
macro_rules! e2e_skip_unless_ready {
    () => {{
        if std::env::var("E2E_ENABLED").is_err() {
            println!("SKIP: set E2E_ENABLED=1 to run e2e tests");
            return;
        }
        match std::env::var("OPENAI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => key,
            _ => {
                println!("SKIP: OPENAI_API_KEY is not set");
                return;
            }
        }
    }};
}

#[tokio::test]
async fn test_live_blank_board() {
    let key = e2e_skip_unless_ready!();
    init_tracing();

    let config = SummaryConfig::builder().build().unwrap();
    let source = ImageSource::Bytes(white_jpeg(100, 100));
    let outcome = run_session(Some(key.as_str()), source, &config)
        .await
        .expect("live summary failed");

    let SessionOutcome::Completed(output) = outcome else {
        panic!("credential was supplied");
    };
    println!("Summary ({} tokens out):\n{}", output.stats.output_tokens, output.summary);

    assert!(!output.summary.trim().is_empty());
    assert!(output.stats.output_tokens <= 300);

    let txt = output.artifact(ExportFormat::Text).unwrap();
    assert_eq!(txt.bytes, output.summary.as_bytes());

    let pdf = output.artifact(ExportFormat::Pdf).unwrap();
    assert!(!pdf_page_lines(&pdf.bytes).is_empty());
}

#[tokio::test]
async fn test_live_invalid_key_is_auth_error() {
    let _ = e2e_skip_unless_ready!();
    init_tracing();

    let credential = Credential::new("sk-invalid-key-for-testing").unwrap();
    let err = whiteboard_summary::summarize_bytes(
        &white_jpeg(10, 10),
        &credential,
        &SummaryConfig::default(),
    )
    .await
    .unwrap_err();

    match err {
        SummaryError::Auth { status, message } => {
            assert_eq!(status, 401);
            assert!(!message.is_empty());
        }
        other => panic!("expected Auth, got {other:?}"),
    }
}
