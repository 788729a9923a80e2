use super::*;
use crate::browser::test_driver::{FakeDriver, FakeElement};
use pretty_assertions::assert_eq;
use serde_json::json;

fn step(tag: &str, nth: usize) -> PathStep {
    PathStep {
        tag: tag.to_string(),
        nth: Some(nth),
    }
}

fn field(selector: &str, candidates: &[&str]) -> FillableField {
    FillableField {
        selector: selector.to_string(),
        tag: "input".to_string(),
        kind: Some("text".to_string()),
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
    }
}

#[test]
fn test_selector_prefers_element_id() {
    assert_eq!(synthesize_selector("email", &[step("input", 1)]), "#email");
    assert_eq!(synthesize_selector("2fa code", &[]), "#\\32 fa\\ code");
}

#[test]
fn test_selector_positional_path() {
    let path = vec![step("body", 1), step("div", 2), step("a", 1)];
    assert_eq!(
        synthesize_selector("", &path),
        "body:nth-of-type(1) > div:nth-of-type(2) > a:nth-of-type(1)"
    );

    let detached = vec![
        PathStep {
            tag: "section".to_string(),
            nth: None,
        },
        step("button", 3),
    ];
    assert_eq!(
        synthesize_selector("", &detached),
        "section > button:nth-of-type(3)"
    );
}

#[test]
fn test_css_escape() {
    assert_eq!(css_escape("main-nav_2"), "main-nav_2");
    assert_eq!(css_escape("1st"), "\\31 st");
    assert_eq!(css_escape("-1x"), "-\\31 x");
    assert_eq!(css_escape("-"), "\\-");
    assert_eq!(css_escape("a.b:c"), "a\\.b\\:c");
    assert_eq!(css_escape("naïve"), "naïve");
    assert_eq!(css_escape("tab\there"), "tab\\9 here");
    assert_eq!(css_escape("nul\0"), "nul\u{FFFD}");
}

#[test]
fn test_escape_for_css_attribute() {
    assert_eq!(escape_for_css(r#"/search?q="x""#), r#"/search?q=\"x\""#);
    assert_eq!(escape_for_css(r"a\b"), r"a\\b");
}

#[test]
fn test_normalize_text() {
    assert_eq!(normalize_text("  Email\n  Address "), "email address");
    assert_eq!(normalize_text("   "), "");
    assert_eq!(collapse_whitespace(" Sign \t in "), "Sign in");
}

#[test]
fn test_find_field_exact_match_wins_over_earlier_partial() {
    let fields = vec![
        field("#email-confirm", &["Confirm email"]),
        field("#email", &["Email", "email"]),
    ];
    assert_eq!(
        find_field_by_name(&fields, "  EMAIL ").map(|f| f.selector.as_str()),
        Some("#email")
    );
}

#[test]
fn test_find_field_containment_either_way() {
    let fields = vec![
        field("#name", &["Full name"]),
        field("#phone", &["Phone"]),
    ];
    // candidate contains query
    assert_eq!(
        find_field_by_name(&fields, "name").map(|f| f.selector.as_str()),
        Some("#name")
    );
    // query contains candidate
    assert_eq!(
        find_field_by_name(&fields, "mobile phone number").map(|f| f.selector.as_str()),
        Some("#phone")
    );
    assert_eq!(find_field_by_name(&fields, "address"), None);
    assert_eq!(find_field_by_name(&fields, "   "), None);
}

#[tokio::test]
async fn test_collect_interactive_items_assigns_ids_and_selectors() {
    let driver = FakeDriver::on("https://example.com/");
    driver.page().items = json!([
        {
            "tag": "a",
            "text": "  Read\n the   docs ",
            "href": "/docs",
            "resolvedHref": "https://example.com/docs",
            "elementId": "",
            "path": [{ "tag": "body", "nth": 1 }, { "tag": "a", "nth": 1 }]
        },
        {
            "tag": "button",
            "text": "Subscribe",
            "href": null,
            "resolvedHref": null,
            "elementId": "subscribe",
            "path": [{ "tag": "body", "nth": 1 }, { "tag": "button", "nth": 1 }]
        }
    ]);

    let items = collect_interactive_items(&driver).await.unwrap();
    assert_eq!(
        items,
        vec![
            InteractiveItem {
                id: 0,
                tag: "a".to_string(),
                text: "Read the docs".to_string(),
                href: Some("/docs".to_string()),
                resolved_href: Some("https://example.com/docs".to_string()),
                selector: "body:nth-of-type(1) > a:nth-of-type(1)".to_string(),
            },
            InteractiveItem {
                id: 1,
                tag: "button".to_string(),
                text: "Subscribe".to_string(),
                href: None,
                resolved_href: None,
                selector: "#subscribe".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn test_collect_fillable_fields_drops_blank_candidates() {
    let driver = FakeDriver::on("https://example.com/");
    driver.page().fields = json!([
        {
            "tag": "input",
            "type": "email",
            "elementId": "email",
            "path": [],
            "candidates": ["Email\n address", "", "  ", "you@example.com", "email", "email"]
        }
    ]);

    let fields = collect_fillable_fields(&driver).await.unwrap();
    assert_eq!(
        fields,
        vec![FillableField {
            selector: "#email".to_string(),
            tag: "input".to_string(),
            kind: Some("email".to_string()),
            candidates: vec![
                "Email address".to_string(),
                "you@example.com".to_string(),
                "email".to_string(),
                "email".to_string(),
            ],
        }]
    );
}

#[tokio::test]
async fn test_malformed_discovery_result_is_an_error() {
    let driver = FakeDriver::on("https://example.com/");
    driver.page().items = json!({ "unexpected": true });
    assert!(collect_interactive_items(&driver).await.is_err());
}

#[tokio::test]
async fn test_fill_by_tag() {
    let driver = FakeDriver::on("https://example.com/");
    driver.element("#email", FakeElement::new("input"));
    driver.element("#bio", FakeElement::new("textarea"));
    driver.element("#card", FakeElement::new("div"));
    let timeout = Duration::from_millis(100);

    assert!(fill_by_locator(&driver, &Locator::css("#email"), "a@b.c", timeout).await);
    assert!(fill_by_locator(&driver, &Locator::css("#bio"), "hello", timeout).await);
    assert!(!fill_by_locator(&driver, &Locator::css("#card"), "x", timeout).await);
    assert!(!fill_by_locator(&driver, &Locator::css("#missing"), "x", timeout).await);

    assert_eq!(
        driver.page().filled,
        vec![
            ("#email".to_string(), "a@b.c".to_string()),
            ("#bio".to_string(), "hello".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_select_tries_label_then_value() {
    let driver = FakeDriver::on("https://example.com/");
    let mut country = FakeElement::new("select");
    country.options = vec![
        ("Germany".to_string(), "de".to_string()),
        ("France".to_string(), "fr".to_string()),
    ];
    driver.element("#country", country);
    let locator = Locator::css("#country");
    let timeout = Duration::from_millis(100);

    assert!(fill_by_locator(&driver, &locator, "France", timeout).await);
    assert!(fill_by_locator(&driver, &locator, "de", timeout).await);
    assert!(!fill_by_locator(&driver, &locator, "Spain", timeout).await);

    assert_eq!(
        driver.page().filled,
        vec![
            ("#country".to_string(), "fr".to_string()),
            ("#country".to_string(), "de".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_fill_fails_for_invisible_element() {
    let driver = FakeDriver::on("https://example.com/");
    let mut hidden = FakeElement::new("input");
    hidden.visible = false;
    driver.element("#secret", hidden);

    assert!(!fill_by_locator(&driver, &Locator::css("#secret"), "x", Duration::from_secs(7)).await);
    assert!(driver.page().filled.is_empty());
}
