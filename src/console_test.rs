use super::*;
use crate::browser::BrowserFacade;
use crate::browser::test_driver::FakeDriver;
use crate::config::ConsoleConfig;
use crate::driver::{PageDriver, PageLauncher};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

struct StaticLauncher;

#[async_trait]
impl PageLauncher for StaticLauncher {
    async fn launch(&self) -> anyhow::Result<Box<dyn PageDriver>> {
        let driver = FakeDriver::new();
        driver.page().title = "Example Domain".to_string();
        driver.page().items = json!([{
            "tag": "a",
            "text": "More information",
            "href": "/info",
            "resolvedHref": "https://example.com/info",
            "elementId": "info",
            "path": []
        }]);
        Ok(Box::new(driver))
    }
}

struct BrokenLauncher;

#[async_trait]
impl PageLauncher for BrokenLauncher {
    async fn launch(&self) -> anyhow::Result<Box<dyn PageDriver>> {
        anyhow::bail!("WebDriver session could not be created")
    }
}

fn console(launcher: Box<dyn PageLauncher>, format: OutputFormat) -> Console<BrowserFacade> {
    let config = ConsoleConfig {
        output_dir: std::env::temp_dir(),
        ..ConsoleConfig::default()
    };
    Console::new(BrowserFacade::new(launcher, &config), format)
}

async fn run(
    console: &mut Console<BrowserFacade>,
    input: &str,
    mode: Mode,
) -> (Result<RunSummary, ConsoleError>, String) {
    let mut output = Vec::new();
    let result = console.run(input.as_bytes(), &mut output, mode).await;
    (result, String::from_utf8(output).unwrap())
}

#[tokio::test(start_paused = true)]
async fn test_interactive_session_prompts_and_exits() {
    let mut console = console(Box::new(StaticLauncher), OutputFormat::Simple);

    let (result, output) = run(
        &mut console,
        "links\nnavigate https://example.com/\nprint title\nexit\nprint url\n",
        Mode::Interactive,
    )
    .await;

    let summary = result.unwrap();
    assert_eq!(summary, RunSummary { succeeded: 3, failed: 1 });
    assert_eq!(
        output,
        "> Error: No page loaded. Use 'navigate <url>' first.\n\
         > Navigate to https://example.com/\n{\"url\":\"https://example.com/\"}\n\
         > Current title\nExample Domain\n\
         > "
    );
    assert_eq!(
        console.state().current_url.as_deref(),
        Some("https://example.com/")
    );
}

#[tokio::test(start_paused = true)]
async fn test_interactive_prompt_is_flushed_before_each_read() {
    let mut console = console(Box::new(StaticLauncher), OutputFormat::Simple);
    let reader = tokio::io::BufReader::new(
        tokio_test::io::Builder::new()
            .read(b"help\n")
            .read(b"exit\n")
            .build(),
    );
    let mut writer = tokio_test::io::Builder::new()
        .write(PROMPT.as_bytes())
        .write(crate::dispatch::HELP_MESSAGE.as_bytes())
        .write(b"\n")
        .write(PROMPT.as_bytes())
        .build();

    let summary = console
        .run(reader, &mut writer, Mode::Interactive)
        .await
        .unwrap();

    assert_eq!(summary, RunSummary { succeeded: 2, failed: 0 });
}

#[tokio::test(start_paused = true)]
async fn test_parse_errors_do_not_stop_the_loop() {
    let mut console = console(Box::new(StaticLauncher), OutputFormat::Simple);

    let (result, output) = run(&mut console, "frobnicate\n\nhelp\n", Mode::Interactive).await;

    assert_eq!(result.unwrap(), RunSummary { succeeded: 1, failed: 2 });
    assert!(output.contains("Error: Unknown command: frobnicate"));
    assert!(output.contains("Error: Empty command"));
    assert!(output.contains("Available commands:"));
}

#[tokio::test(start_paused = true)]
async fn test_batch_skips_comments_and_reports_summary() {
    let mut console = console(Box::new(StaticLauncher), OutputFormat::Simple);
    let script = "# open the site\n\nnavigate https://example.com/\n  links  \nmove forward\n";

    let (result, output) = run(&mut console, script, Mode::Batch).await;

    assert_eq!(result.unwrap(), RunSummary { succeeded: 2, failed: 1 });
    assert_eq!(
        output,
        "> navigate https://example.com/\n\
         Navigate to https://example.com/\n{\"url\":\"https://example.com/\"}\n\
         > links\n\
         Found 1 interactive elements\n\
         [0] <a> More information -> https://example.com/info\n\
         > move forward\n\
         Error: Cannot move forward from the current page\n\
         Ran 3 commands: 2 succeeded, 1 failed\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_batch_stop_on_error_halts_at_first_failure() {
    let mut console =
        console(Box::new(StaticLauncher), OutputFormat::Simple).stop_on_error(true);

    let (result, output) = run(&mut console, "print url\nhelp\n", Mode::Batch).await;

    assert_eq!(result.unwrap(), RunSummary { succeeded: 0, failed: 1 });
    assert!(!output.contains("Available commands"));
    assert!(output.ends_with("Ran 1 commands: 0 succeeded, 1 failed\n"));
}

#[tokio::test(start_paused = true)]
async fn test_launch_failure_ends_the_loop() {
    let mut console = console(Box::new(BrokenLauncher), OutputFormat::Simple);

    let (result, output) = run(
        &mut console,
        "navigate https://example.com/\nhelp\n",
        Mode::Interactive,
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(!output.contains("Available commands"));
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_forgets_listed_elements() {
    let mut console = console(Box::new(StaticLauncher), OutputFormat::Simple);
    let (result, _) = run(
        &mut console,
        "navigate https://example.com/\nlinks\n",
        Mode::Interactive,
    )
    .await;
    result.unwrap();

    console.shutdown().await.unwrap();

    let (result, exit) = console.execute_line("act 0").await.unwrap();
    assert!(!exit);
    assert_eq!(
        result.error(),
        Some("No cached element list found. Run `links` first.")
    );
}

#[test]
fn test_render_failure() {
    let result = DispatchResult::fail("Failed to take screenshot");
    assert_eq!(
        render(&result, OutputFormat::Json),
        "Error: Failed to take screenshot"
    );
}

#[test]
fn test_render_bare_success_is_empty() {
    assert_eq!(render(&DispatchResult::bare(), OutputFormat::Simple), "");
}

#[test]
fn test_render_json_data_is_pretty() {
    let result = DispatchResult::ok_with_data("Current URL", json!({ "url": "https://example.com/" }));
    assert_eq!(
        render(&result, OutputFormat::Json),
        "Current URL\n{\n  \"url\": \"https://example.com/\"\n}"
    );
}

#[test]
fn test_render_simple_items_fall_back_to_raw_href() {
    let result = DispatchResult::ok_with_data(
        "Found 2 interactive elements",
        json!([
            { "id": 0, "tag": "button", "text": "Save", "selector": "#save" },
            { "id": 1, "tag": "a", "text": "Mail", "href": "mailto:a@b.c", "selector": "#mail" }
        ]),
    );
    assert_eq!(
        render(&result, OutputFormat::Simple),
        "Found 2 interactive elements\n[0] <button> Save\n[1] <a> Mail -> mailto:a@b.c"
    );
}

#[test]
fn test_render_simple_non_item_array_is_compact_json() {
    let result = DispatchResult::ok_with_data("Numbers", json!([1, 2]));
    assert_eq!(render(&result, OutputFormat::Simple), "Numbers\n[1,2]");
}
