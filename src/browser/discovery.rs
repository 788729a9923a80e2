//! Element and field discovery, selector synthesis and fuzzy field matching.
//!
//! The in-page scripts only collect raw facts (tags, texts, the element's `id`
//! and its position path). Selectors and normalized text are built here so the
//! rules stay testable without a browser.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::driver::{DriverResult, Locator, OptionChoice, PageDriver};
use crate::intent::ElementState;
use crate::types::{FillableField, InteractiveItem};

const PATH_JS: &str = r#"
const pathOf = (el) => {
  const steps = [];
  let current = el;
  while (current && current.nodeType === 1 && current.tagName.toLowerCase() !== "html") {
    const tag = current.tagName.toLowerCase();
    const parent = current.parentElement;
    if (!parent) {
      steps.unshift({ tag, nth: null });
      break;
    }
    const same = Array.from(parent.children).filter((child) => child.tagName === current.tagName);
    steps.unshift({ tag, nth: same.indexOf(current) + 1 });
    current = parent;
  }
  return steps;
};
const isShown = (el) => {
  const style = window.getComputedStyle(el);
  const hidden = style.display === "none" || style.visibility === "hidden" || Number(style.opacity) === 0;
  return !hidden && el.getClientRects().length > 0;
};
"#;

const INTERACTIVE_ITEMS_BODY: &str = r#"
return Array.from(document.querySelectorAll("a, button, input, textarea, select, [onclick], [role='button']"))
  .filter(isShown)
  .map((el) => {
    const href = el.getAttribute("href");
    let resolvedHref = null;
    if (href) {
      try {
        resolvedHref = new URL(href, window.location.href).toString();
      } catch (error) {
        resolvedHref = null;
      }
    }
    return {
      tag: el.tagName.toLowerCase(),
      text: el.innerText || el.textContent || el.getAttribute("aria-label") || el.getAttribute("title") || el.getAttribute("value") || "",
      href,
      resolvedHref,
      elementId: el.id || "",
      path: pathOf(el),
    };
  });
"#;

const FILLABLE_FIELDS_BODY: &str = r#"
return Array.from(document.querySelectorAll("input, textarea, select"))
  .filter((el) => !el.disabled && el.type !== "hidden" && isShown(el))
  .map((el) => {
    const labelText = (label) => label.innerText || label.textContent || "";
    const byFor = el.id
      ? Array.from(document.querySelectorAll("label")).filter((l) => l.htmlFor === el.id).map(labelText)
      : [];
    const wrapping = el.closest("label");
    return {
      tag: el.tagName.toLowerCase(),
      type: el.type || null,
      elementId: el.id || "",
      path: pathOf(el),
      candidates: [
        ...byFor,
        wrapping ? labelText(wrapping) : "",
        el.getAttribute("aria-label") || "",
        el.getAttribute("placeholder") || "",
        el.getAttribute("name") || "",
        el.id || "",
      ],
    };
  });
"#;

pub fn interactive_items_script() -> String {
    format!("{}{}", PATH_JS, INTERACTIVE_ITEMS_BODY)
}

pub fn fillable_fields_script() -> String {
    format!("{}{}", PATH_JS, FILLABLE_FIELDS_BODY)
}

/// One step from the document root towards an element
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathStep {
    pub tag: String,
    /// 1-based position among same-tag siblings, absent for a parentless node
    pub nth: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    tag: String,
    #[serde(default)]
    text: String,
    href: Option<String>,
    resolved_href: Option<String>,
    #[serde(default)]
    element_id: String,
    #[serde(default)]
    path: Vec<PathStep>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawField {
    tag: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    element_id: String,
    #[serde(default)]
    path: Vec<PathStep>,
    #[serde(default)]
    candidates: Vec<String>,
}

/// `#id` when the element has one, else the `tag:nth-of-type(n)` chain below `html`
pub fn synthesize_selector(element_id: &str, path: &[PathStep]) -> String {
    if !element_id.is_empty() {
        return format!("#{}", css_escape(element_id));
    }

    path.iter()
        .map(|step| match step.nth {
            Some(nth) => format!("{}:nth-of-type({})", step.tag, nth),
            None => step.tag.clone(),
        })
        .collect::<Vec<_>>()
        .join(" > ")
}

/// Serialize a CSS identifier (CSSOM `CSS.escape`)
pub fn css_escape(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());

    for (index, &ch) in chars.iter().enumerate() {
        let code = ch as u32;
        let leading_digit = ch.is_ascii_digit()
            && (index == 0 || (index == 1 && chars[0] == '-'));

        if ch == '\0' {
            out.push('\u{FFFD}');
        } else if (0x01..=0x1F).contains(&code) || code == 0x7F || leading_digit {
            out.push_str(&format!("\\{:x} ", code));
        } else if index == 0 && ch == '-' && chars.len() == 1 {
            out.push_str("\\-");
        } else if code >= 0x80 || ch == '-' || ch == '_' || ch.is_ascii_alphanumeric() {
            out.push(ch);
        } else {
            out.push('\\');
            out.push(ch);
        }
    }

    out
}

/// Escape a value for a double-quoted CSS attribute selector
pub fn escape_for_css(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Collapse whitespace runs to one space and trim
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace-collapsed, trimmed, lowercase form used for fuzzy matching
pub fn normalize_text(value: &str) -> String {
    collapse_whitespace(value).to_lowercase()
}

/// Exact candidate match first, then containment either way; discovery order breaks ties
pub fn find_field_by_name<'a>(fields: &'a [FillableField], name: &str) -> Option<&'a FillableField> {
    let wanted = normalize_text(name);
    if wanted.is_empty() {
        return None;
    }

    let exact = fields.iter().find(|field| {
        field
            .candidates
            .iter()
            .any(|candidate| normalize_text(candidate) == wanted)
    });
    if exact.is_some() {
        return exact;
    }

    fields.iter().find(|field| {
        field.candidates.iter().any(|candidate| {
            let candidate = normalize_text(candidate);
            candidate.contains(&wanted) || wanted.contains(&candidate)
        })
    })
}

/// Fresh listing of visible interactive elements, ids `0..n-1` in document order
pub async fn collect_interactive_items(page: &dyn PageDriver) -> DriverResult<Vec<InteractiveItem>> {
    let raw = page.evaluate(&interactive_items_script(), vec![]).await?;
    let items: Vec<RawItem> = serde_json::from_value(raw)
        .map_err(|e| crate::driver::DriverError::Script(e.to_string()))?;

    debug!("Discovered {} interactive elements", items.len());
    Ok(items
        .into_iter()
        .enumerate()
        .map(|(id, raw)| InteractiveItem {
            id,
            selector: synthesize_selector(&raw.element_id, &raw.path),
            tag: raw.tag,
            text: collapse_whitespace(&raw.text),
            href: raw.href,
            resolved_href: raw.resolved_href,
        })
        .collect())
}

/// Enabled, visible form controls with their name hints
pub async fn collect_fillable_fields(page: &dyn PageDriver) -> DriverResult<Vec<FillableField>> {
    let raw = page.evaluate(&fillable_fields_script(), vec![]).await?;
    let fields: Vec<RawField> = serde_json::from_value(raw)
        .map_err(|e| crate::driver::DriverError::Script(e.to_string()))?;

    Ok(fields
        .into_iter()
        .map(|raw| FillableField {
            selector: synthesize_selector(&raw.element_id, &raw.path),
            tag: raw.tag,
            kind: raw.kind,
            candidates: raw
                .candidates
                .iter()
                .map(|c| collapse_whitespace(c))
                .filter(|c| !c.is_empty())
                .collect(),
        })
        .collect())
}

/// Set a control's value by tag. Any failure along the way is reported as `false`.
pub async fn fill_by_locator(
    page: &dyn PageDriver,
    locator: &Locator,
    value: &str,
    visible_timeout: Duration,
) -> bool {
    match try_fill(page, locator, value, visible_timeout).await {
        Ok(filled) => filled,
        Err(e) => {
            debug!("Fill of {} failed: {}", locator.selector, e);
            false
        }
    }
}

async fn try_fill(
    page: &dyn PageDriver,
    locator: &Locator,
    value: &str,
    visible_timeout: Duration,
) -> DriverResult<bool> {
    if page.count(locator).await? == 0 {
        return Ok(false);
    }

    page.scroll_into_view(locator).await?;
    page.wait_for(locator, ElementState::Visible, visible_timeout)
        .await?;

    match page.tag_name(locator).await?.as_str() {
        "select" => {
            if page
                .select_option(locator, OptionChoice::Label(value))
                .await
                .is_err()
            {
                page.select_option(locator, OptionChoice::Value(value))
                    .await?;
            }
        }
        "input" | "textarea" => page.fill(locator, value).await?,
        _ => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
#[path = "discovery_test.rs"]
mod discovery_test;
