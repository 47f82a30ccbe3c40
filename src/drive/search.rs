//! Criteria-based search over a folder's children.
//!
//! A [`Criteria`] is a set of attribute-name → expectation terms. A child
//! matches iff every term holds against its cached snapshot. An attribute
//! that does not exist on an item variant is an explicit non-match, never
//! an error: search is lenient by design, while genuine remote failures
//! from the underlying fetches still propagate.

use std::borrow::Cow;
use std::fmt;

use regex::Regex;
use serde_json::Value;

use super::node::{Node, NodeId};
use super::Drive;
use crate::api::RemoteApi;
use crate::error::Result;

/// One expectation against an attribute value.
pub enum Criterion {
    /// Exact JSON value equality.
    Equals(Value),
    /// Regex match against string-valued attributes; non-strings never
    /// match.
    Pattern(Regex),
    /// Arbitrary caller-supplied test.
    Predicate(Box<dyn Fn(&Value) -> bool>),
}

impl Criterion {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Criterion::Equals(expected) => value == expected,
            Criterion::Pattern(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Criterion::Predicate(test) => test(value),
        }
    }
}

impl fmt::Debug for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::Equals(v) => f.debug_tuple("Equals").field(v).finish(),
            Criterion::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            Criterion::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Attribute-name → expectation map used to filter items.
///
/// Two names are resolved specially: `"type"` reads the item's
/// file/folder discriminator, and `"id"` falls back to the stable remote
/// id when the snapshot carries no `id` attribute. Everything else reads
/// the attribute snapshot directly.
#[derive(Debug, Default)]
pub struct Criteria {
    terms: Vec<(String, Criterion)>,
}

impl Criteria {
    pub fn new() -> Self {
        Criteria::default()
    }

    /// Require exact equality on an attribute.
    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.terms.push((key.into(), Criterion::Equals(value.into())));
        self
    }

    /// Require a regex match on a string attribute.
    pub fn pattern(mut self, key: impl Into<String>, pattern: Regex) -> Self {
        self.terms.push((key.into(), Criterion::Pattern(pattern)));
        self
    }

    /// Require an arbitrary predicate on an attribute value.
    pub fn predicate(
        mut self,
        key: impl Into<String>,
        test: impl Fn(&Value) -> bool + 'static,
    ) -> Self {
        self.terms
            .push((key.into(), Criterion::Predicate(Box::new(test))));
        self
    }

    /// Whether a node satisfies every term. Empty criteria match anything.
    pub(crate) fn matches_node(&self, node: &Node) -> bool {
        self.terms.iter().all(|(key, criterion)| {
            match lookup(node, key) {
                Some(value) => criterion.matches(&value),
                // Attribute not applicable to this item variant: non-match.
                None => false,
            }
        })
    }
}

fn lookup<'a>(node: &'a Node, key: &str) -> Option<Cow<'a, Value>> {
    match key {
        "type" => Some(Cow::Owned(Value::String(node.kind().as_str().to_string()))),
        "id" => node
            .attr("id")
            .map(Cow::Borrowed)
            .or_else(|| Some(Cow::Owned(Value::String(node.remote_id().to_string())))),
        _ => node.attr(key).map(Cow::Borrowed),
    }
}

impl<A: RemoteApi> Drive<A> {
    /// Collect the children of a folder matching `criteria`.
    ///
    /// Non-recursive search ensures one level via `info`; recursive search
    /// fetches the whole subtree first via `tree` (one expensive call
    /// instead of N one-level calls — the caller opts in).
    ///
    /// Order: direct matches first, files then folders in collection
    /// order; then, when recursive, each child folder's own match set in
    /// folder order, depth-first, appended after all direct matches.
    pub fn find(
        &mut self,
        id: NodeId,
        criteria: &Criteria,
        recursive: bool,
    ) -> Result<Vec<NodeId>> {
        if recursive {
            self.tree(id, false)?;
        } else {
            self.info(id, false)?;
        }
        let mut matches = Vec::new();
        self.collect_matches(id, criteria, recursive, &mut matches)?;
        Ok(matches)
    }

    fn collect_matches(
        &self,
        id: NodeId,
        criteria: &Criteria,
        recursive: bool,
        out: &mut Vec<NodeId>,
    ) -> Result<()> {
        let node = self.get(id)?;
        let files = node.subfiles().to_vec();
        let folders = node.subfolders().to_vec();
        for child in files.iter().chain(folders.iter()) {
            if criteria.matches_node(self.get(*child)?) {
                out.push(*child);
            }
        }
        if recursive {
            for folder in folders {
                self.collect_matches(folder, criteria, recursive, out)?;
            }
        }
        Ok(())
    }
}
