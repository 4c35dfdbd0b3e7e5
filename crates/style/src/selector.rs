//! A small selector language for resolving configuration constraints.
//!
//! Supported: type, `*`, `#id`, `.class`, `[attr]`, `[attr=value]`, compound
//! selectors, descendant (whitespace) and child (`>`) combinators, and
//! comma-separated lists.

use crate::parsers::{StyleParseError, ident, ws};
use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::{char, multispace1};
use nom::combinator::{all_consuming, map, opt};
use nom::multi::{many1, separated_list1};
use nom::sequence::{delimited, pair, preceded};
use nom::{IResult, Parser};

/// The document view a selector is matched against.
pub trait SelectorSubject {
    type Handle: Copy;

    fn tag_name(&self, node: Self::Handle) -> Option<&str>;
    fn attribute(&self, node: Self::Handle, name: &str) -> Option<&str>;
    fn parent_element(&self, node: Self::Handle) -> Option<Self::Handle>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Handle) -> bool {
        match self {
            SimpleSelector::Universal => subject.tag_name(node).is_some(),
            SimpleSelector::Tag(tag) => subject
                .tag_name(node)
                .is_some_and(|t| t.eq_ignore_ascii_case(tag)),
            SimpleSelector::Id(id) => subject.attribute(node, "id") == Some(id.as_str()),
            SimpleSelector::Class(class) => subject
                .attribute(node, "class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            SimpleSelector::Attribute { name, value } => match (subject.attribute(node, name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A complex selector. `compounds` run left to right; the last one is the subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Vec<SimpleSelector>>,
    combinators: Vec<Combinator>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, StyleParseError> {
        all_consuming(ws(complex))
            .parse(input)
            .map(|(_, selector)| selector)
            .map_err(|e| StyleParseError::Parse(format!("{input:?}: {e}")))
    }

    pub fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Handle) -> bool {
        self.matches_at(subject, node, self.compounds.len() - 1)
    }

    fn matches_at<S: SelectorSubject>(&self, subject: &S, node: S::Handle, index: usize) -> bool {
        if !self.compounds[index].iter().all(|s| s.matches(subject, node)) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match self.combinators[index - 1] {
            Combinator::Child => subject
                .parent_element(node)
                .is_some_and(|parent| self.matches_at(subject, parent, index - 1)),
            Combinator::Descendant => {
                let mut ancestor = subject.parent_element(node);
                while let Some(candidate) = ancestor {
                    if self.matches_at(subject, candidate, index - 1) {
                        return true;
                    }
                    ancestor = subject.parent_element(candidate);
                }
                false
            }
        }
    }
}

/// A comma-separated selector list, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorList(Vec<Selector>);

impl SelectorList {
    /// Parses a selector list. Blank input yields an empty list.
    pub fn parse(input: &str) -> Result<Self, StyleParseError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        all_consuming(ws(separated_list1(ws(char(',')), complex)))
            .parse(input)
            .map(|(_, selectors)| SelectorList(selectors))
            .map_err(|e| StyleParseError::Parse(format!("{input:?}: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn push(&mut self, selector: Selector) {
        self.0.push(selector);
    }

    pub fn matches<S: SelectorSubject>(&self, subject: &S, node: S::Handle) -> bool {
        self.0.iter().any(|s| s.matches(subject, node))
    }
}

// --- Parsers ---

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_while(|c: char| c != '"'), char('"')),
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        ident,
    ))
    .parse(input)
}

fn attribute(input: &str) -> IResult<&str, SimpleSelector> {
    map(
        delimited(
            char('['),
            pair(ws(ident), opt(preceded(ws(char('=')), ws(quoted)))),
            char(']'),
        ),
        |(name, value)| SimpleSelector::Attribute {
            name: name.to_string(),
            value: value.map(str::to_string),
        },
    )
    .parse(input)
}

fn simple(input: &str) -> IResult<&str, SimpleSelector> {
    alt((
        map(char('*'), |_| SimpleSelector::Universal),
        map(preceded(char('#'), ident), |id| SimpleSelector::Id(id.to_string())),
        map(preceded(char('.'), ident), |class| {
            SimpleSelector::Class(class.to_string())
        }),
        attribute,
        map(ident, |tag| SimpleSelector::Tag(tag.to_string())),
    ))
    .parse(input)
}

fn compound(input: &str) -> IResult<&str, Vec<SimpleSelector>> {
    many1(simple).parse(input)
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        map(ws(char('>')), |_| Combinator::Child),
        map(multispace1, |_| Combinator::Descendant),
    ))
    .parse(input)
}

fn complex(input: &str) -> IResult<&str, Selector> {
    let (mut input, first) = compound(input)?;
    let mut compounds = vec![first];
    let mut combinators = Vec::new();
    loop {
        match pair(combinator, compound).parse(input) {
            Ok((rest, (comb, next))) => {
                combinators.push(comb);
                compounds.push(next);
                input = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    Ok((
        input,
        Selector {
            compounds,
            combinators,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// A flat tree: index -> (tag, attributes, parent).
    struct Tree(Vec<(&'static str, HashMap<&'static str, &'static str>, Option<usize>)>);

    impl SelectorSubject for Tree {
        type Handle = usize;

        fn tag_name(&self, node: usize) -> Option<&str> {
            Some(self.0[node].0)
        }

        fn attribute(&self, node: usize, name: &str) -> Option<&str> {
            self.0[node].1.get(name).copied()
        }

        fn parent_element(&self, node: usize) -> Option<usize> {
            self.0[node].2
        }
    }

    fn tree() -> Tree {
        Tree(vec![
            ("section", HashMap::from([("id", "intro")]), None),
            ("div", HashMap::from([("class", "note wide")]), Some(0)),
            ("h2", HashMap::from([("data-role", "title")]), Some(1)),
        ])
    }

    #[test]
    fn simple_selectors_match() {
        let t = tree();
        assert!(Selector::parse("h2").unwrap().matches(&t, 2));
        assert!(Selector::parse("H2").unwrap().matches(&t, 2));
        assert!(Selector::parse(".wide").unwrap().matches(&t, 1));
        assert!(Selector::parse("#intro").unwrap().matches(&t, 0));
        assert!(Selector::parse("[data-role]").unwrap().matches(&t, 2));
        assert!(Selector::parse("[data-role='title']").unwrap().matches(&t, 2));
        assert!(!Selector::parse("[data-role=body]").unwrap().matches(&t, 2));
        assert!(Selector::parse("div.note.wide").unwrap().matches(&t, 1));
    }

    #[test]
    fn combinators_walk_ancestors() {
        let t = tree();
        assert!(Selector::parse("section h2").unwrap().matches(&t, 2));
        assert!(Selector::parse("div > h2").unwrap().matches(&t, 2));
        assert!(!Selector::parse("section > h2").unwrap().matches(&t, 2));
        assert!(Selector::parse("#intro > .note h2").unwrap().matches(&t, 2));
    }

    #[test]
    fn lists_split_on_commas() {
        let list = SelectorList::parse("h1, .note ,h2").unwrap();
        assert_eq!(list.len(), 3);
        assert!(list.matches(&tree(), 1));
        assert!(SelectorList::parse("  ").unwrap().is_empty());
        assert!(SelectorList::parse("h1,,").is_err());
    }
}
