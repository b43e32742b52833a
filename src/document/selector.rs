use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static COMPOUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<tag>\*|[A-Za-z][A-Za-z0-9-]*)?(?P<rest>(?:[#.][A-Za-z_][A-Za-z0-9_-]*)*)$")
        .expect("static regex")
});
static QUALIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([#.])([A-Za-z_][A-Za-z0-9_-]*)").expect("static regex"));

/// One compound selector: `tag#id.class.class`, every part optional.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl Compound {
    pub fn matches(&self, tag: &str, id: Option<&str>, classes: &[String]) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(wanted) = &self.id {
            if id != Some(wanted.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| classes.contains(c))
    }
}

/// Subset of CSS selectors: compound selectors joined by the descendant
/// combinator (whitespace), e.g. `#gallery .card img`.
///
/// The last compound must match the element itself, the others must match
/// ancestors, in order, walking upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<Compound>,
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self> {
        let invalid = || Error::InvalidSelector(selector.to_owned());

        let parts = selector
            .split_whitespace()
            .map(|part| {
                let caps = COMPOUND.captures(part).ok_or_else(invalid)?;
                let mut compound = Compound {
                    tag: caps
                        .name("tag")
                        .map(|m| m.as_str())
                        .filter(|t| *t != "*")
                        .map(str::to_ascii_lowercase),
                    ..Default::default()
                };
                let rest = caps.name("rest").map(|m| m.as_str()).unwrap_or_default();
                for q in QUALIFIER.captures_iter(rest) {
                    match &q[1] {
                        "#" if compound.id.is_some() => return Err(invalid()),
                        "#" => compound.id = Some(q[2].to_owned()),
                        _ => compound.classes.push(q[2].to_owned()),
                    }
                }
                Ok(compound)
            })
            .collect::<Result<Vec<_>>>()?;

        if parts.is_empty() {
            return Err(invalid());
        }
        Ok(Self { parts })
    }

    /// The compound the matched element itself must satisfy
    pub fn subject(&self) -> &Compound {
        self.parts.last().expect("parse rejects empty selectors")
    }

    /// Compounds the ancestors must satisfy, innermost first
    pub fn ancestors(&self) -> impl Iterator<Item = &Compound> {
        self.parts.iter().rev().skip(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        let s = Selector::parse("#gallery").unwrap();
        assert_eq!(s.subject().id.as_deref(), Some("gallery"));
        assert_eq!(s.subject().tag, None);
        assert_eq!(s.ancestors().count(), 0);
    }

    #[test]
    fn test_parse_compound() {
        let s = Selector::parse("DIV.panel.wide#main").unwrap();
        let subject = s.subject();
        assert_eq!(subject.tag.as_deref(), Some("div"));
        assert_eq!(subject.id.as_deref(), Some("main"));
        assert_eq!(subject.classes, vec!["panel".to_owned(), "wide".to_owned()]);
    }

    #[test]
    fn test_parse_descendant() {
        let s = Selector::parse("  #gallery   .card img ").unwrap();
        assert_eq!(s.subject().tag.as_deref(), Some("img"));
        let ancestors: Vec<_> = s.ancestors().collect();
        assert_eq!(ancestors.len(), 2);
        assert_eq!(ancestors[0].classes, vec!["card".to_owned()]);
        assert_eq!(ancestors[1].id.as_deref(), Some("gallery"));
    }

    #[test]
    fn test_universal() {
        let s = Selector::parse("*").unwrap();
        assert!(s.subject().matches("span", None, &[]));
    }

    #[test]
    fn test_invalid() {
        for bad in [
            "",
            "   ",
            "div > p",
            "#",
            ".1abc",
            "a[href]",
            "p:first-child",
            "#a#b",
            "div#a.x#a",
        ] {
            assert!(
                matches!(Selector::parse(bad), Err(Error::InvalidSelector(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_matches() {
        let s = Selector::parse("div.panel").unwrap();
        let classes = vec!["panel".to_owned(), "other".to_owned()];
        assert!(s.subject().matches("div", None, &classes));
        assert!(s.subject().matches("DIV", Some("x"), &classes));
        assert!(!s.subject().matches("span", None, &classes));
        assert!(!s.subject().matches("div", None, &[]));
    }
}
