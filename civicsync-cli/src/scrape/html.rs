//! Minimal, tolerant HTML scanning.
//!
//! Just enough structure for the calendar page: find an element by class,
//! walk a container's direct children, read attributes and text content.
//! Tag and attribute names are matched case-insensitively.

use std::sync::LazyLock;

use regex::Regex;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<(/?)([a-zA-Z][a-zA-Z0-9]*)\b([^>]*?)(/?)>").expect("valid tag regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([a-zA-Z_:][-a-zA-Z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// One element located in a document.
#[derive(Debug, Clone, PartialEq)]
pub struct Element<'a> {
    /// Lowercased tag name
    pub name: String,
    /// Raw attribute text of the opening tag
    pub attrs: &'a str,
    /// Markup between the opening and closing tags
    pub inner: &'a str,
    /// Byte offset just past the element
    end: usize,
}

impl Element<'_> {
    pub fn attr(&self, name: &str) -> Option<String> {
        attr(self.attrs, name)
    }

    pub fn has_class(&self, class: &str) -> bool {
        has_class(self.attrs, class)
    }

    /// Text content, tags stripped and whitespace collapsed.
    pub fn text(&self) -> String {
        text(self.inner)
    }
}

/// Read an attribute value from an opening tag's attribute text.
pub fn attr(attrs: &str, name: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        let key = caps.get(1)?.as_str();
        if !key.eq_ignore_ascii_case(name) {
            return None;
        }
        let value = caps.get(2).or(caps.get(3)).or(caps.get(4))?.as_str();
        Some(decode_entities(value))
    })
}

/// Element starting at the opening tag matched by `open`, with its extent resolved.
fn element_at<'a>(html: &'a str, open: regex::Captures<'a>) -> Option<Element<'a>> {
    let whole = open.get(0)?;
    let name = open.get(2)?.as_str().to_ascii_lowercase();
    let attrs = open.get(3)?.as_str();
    let self_closing = !open.get(4)?.as_str().is_empty();

    if self_closing || VOID_ELEMENTS.contains(&name.as_str()) {
        return Some(Element {
            name,
            attrs,
            inner: "",
            end: whole.end(),
        });
    }

    // Count nested same-name tags until the matching close
    let mut depth = 1usize;
    for tag in TAG_RE.captures_iter(&html[whole.end()..]) {
        let (Some(all), Some(tag_name)) = (tag.get(0), tag.get(2)) else {
            continue;
        };
        if !tag_name.as_str().eq_ignore_ascii_case(&name) {
            continue;
        }
        let closing = tag.get(1).is_some_and(|m| !m.as_str().is_empty());
        let self_closed = tag.get(4).is_some_and(|m| !m.as_str().is_empty());

        if closing {
            depth -= 1;
            if depth == 0 {
                let inner_end = whole.end() + all.start();
                return Some(Element {
                    name,
                    attrs,
                    inner: &html[whole.end()..inner_end],
                    end: whole.end() + all.end(),
                });
            }
        } else if !self_closed {
            depth += 1;
        }
    }

    // Unclosed: runs to the end of the input
    Some(Element {
        name,
        attrs,
        inner: &html[whole.end()..],
        end: html.len(),
    })
}

/// First element (in document order) whose opening tag satisfies `pred(name, attrs)`.
pub fn find<'a>(html: &'a str, pred: impl Fn(&str, &str) -> bool) -> Option<Element<'a>> {
    let open = TAG_RE.captures_iter(html).find(|caps| {
        let opening = caps.get(1).is_some_and(|m| m.as_str().is_empty());
        match (caps.get(2), caps.get(3)) {
            (Some(name), Some(attrs)) => opening && pred(name.as_str(), attrs.as_str()),
            _ => false,
        }
    })?;
    element_at(html, open)
}

/// First element carrying `class`.
pub fn find_by_class<'a>(html: &'a str, class: &str) -> Option<Element<'a>> {
    find(html, |_, attrs| has_class(attrs, class))
}

fn has_class(attrs: &str, class: &str) -> bool {
    attr(attrs, "class").is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
}

/// Direct child elements of a container's inner markup, in order.
pub fn children(html: &str) -> Vec<Element<'_>> {
    let mut children = Vec::new();
    let mut pos = 0;

    while pos < html.len() {
        let Some(open) = TAG_RE
            .captures_iter(&html[pos..])
            .find(|caps| caps.get(1).is_some_and(|m| m.as_str().is_empty()))
        else {
            break;
        };

        // Re-anchor the match on the full string so offsets stay absolute
        let Some(start) = open.get(0).map(|m| pos + m.start()) else {
            break;
        };
        let Some(caps) = TAG_RE.captures_at(html, start) else {
            break;
        };
        let Some(element) = element_at(html, caps) else {
            break;
        };

        pos = element.end.max(start + 1);
        children.push(element);
    }

    children
}

/// Text content of a fragment: comments and tags removed, entities decoded,
/// whitespace collapsed.
pub fn text(html: &str) -> String {
    let without_comments = COMMENT_RE.replace_all(html, "");
    let without_tags = TAG_RE.replace_all(&without_comments, "");
    let decoded = decode_entities(&without_tags);
    WHITESPACE_RE.replace_all(&decoded, " ").trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &rest[1..semi];
            decode_entity(entity).map(|c| (c, semi + 1))
        });

        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = entity.strip_prefix('#') {
        return dec.parse().ok().and_then(char::from_u32);
    }

    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        "ndash" => Some('\u{2013}'),
        "mdash" => Some('\u{2014}'),
        "rsquo" => Some('\u{2019}'),
        _ => None,
    }
}
