//! Recursive descent parser and serializer for the bracket notation.
//!
//! ```text
//! forest    := tree* arrow*
//! tree      := '[' NUMBER? ( ']' | LABEL tree* ']' )
//! arrow     := '<' NUMBER NUMBER '>'
//! LABEL     := '"' [^"]* '"'
//! NUMBER    := [0-9]+
//! ```
//!
//! Parsing is all-or-nothing: any error discards the partially built forest.
//! Nesting deeper than [`MAX_DEPTH`] is rejected so that every later walk over
//! a parsed tree stays within the stack.

#[cfg(test)]
#[path = "parse_test.rs"]
mod parse_test;

use std::collections::HashMap;

use regex::Regex;
use tracing::debug;

use crate::error::ErrorCode;
use crate::forest::{Arrow, Forest, Node, NodeId, Tree};
use crate::tokeniser::Tokeniser;

// =============================================================================
// TYPES
// =============================================================================

/// Deepest node level accepted by the parser; roots are level 0.
pub const MAX_DEPTH: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("expected {expected} at offset {offset}")]
    Expected { expected: &'static str, offset: usize },
    #[error("expected a quoted label or ']' at offset {offset}")]
    MissingLabel { offset: usize },
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("numeric label {0} is used more than once")]
    DuplicateNumericLabel(u32),
    #[error("arrow references undefined numeric label {0}")]
    DanglingArrow(u32),
    #[error("nesting deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
    #[error("trailing input at offset {offset}")]
    TrailingInput { offset: usize },
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ErrorCode for ParseError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Expected { .. } | Self::MissingLabel { .. } | Self::InvalidNumber { .. } => "E_SYNTAX",
            Self::DuplicateNumericLabel(_) => "E_DUPLICATE_LABEL",
            Self::DanglingArrow(_) => "E_DANGLING_ARROW",
            Self::TooDeep { .. } => "E_DEPTH",
            Self::TrailingInput { .. } => "E_TRAILING_INPUT",
            Self::Pattern(_) => "E_PATTERN",
        }
    }
}

/// Compiled token patterns for the notation.
#[derive(Debug, Clone)]
struct Grammar {
    open: Regex,
    close: Regex,
    label: Regex,
    number: Regex,
    arrow_open: Regex,
    arrow_close: Regex,
}

impl Grammar {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            open: Regex::new(r"^\[")?,
            close: Regex::new(r"^\]")?,
            label: Regex::new(r#"^"([^"]*)""#)?,
            number: Regex::new(r"^[0-9]+")?,
            arrow_open: Regex::new(r"^<")?,
            arrow_close: Regex::new(r"^>")?,
        })
    }
}

/// Reusable parser; holds the compiled patterns.
#[derive(Debug, Clone)]
pub struct Parser {
    grammar: Grammar,
}

/// Numeric label → node, shared across all trees of one parse.
type NumberTable = HashMap<u32, NodeId>;

// =============================================================================
// PARSING
// =============================================================================

/// Parse bracket notation into a forest.
///
/// # Errors
///
/// Returns a [`ParseError`] describing the first violation found.
pub fn parse(text: &str) -> Result<Forest, ParseError> {
    Parser::new()?.parse(text)
}

impl Parser {
    /// # Errors
    ///
    /// Returns [`ParseError::Pattern`] if a token pattern fails to compile.
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self { grammar: Grammar::new()? })
    }

    /// Parse bracket notation into a forest.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] describing the first violation found.
    pub fn parse(&self, text: &str) -> Result<Forest, ParseError> {
        let g = &self.grammar;
        let mut tok = Tokeniser::new(text);
        let mut forest = Forest::new();
        let mut numbers = NumberTable::new();

        while tok.has(&g.open) {
            forest.push_tree(self.parse_tree(&mut tok, &mut numbers)?);
        }

        while tok.next(&g.arrow_open).is_some() {
            let start = self.resolve(&mut tok, &numbers)?;
            let end = self.resolve(&mut tok, &numbers)?;
            require(&mut tok, &g.arrow_close, "'>'")?;
            forest.add_arrow(Arrow { start, end, label: None });
        }

        tok.skip_whitespace();
        if tok.has_next() {
            return Err(ParseError::TrailingInput { offset: tok.position() });
        }

        debug!(trees = forest.tree_count(), nodes = forest.node_count(), "parsed forest");
        Ok(forest)
    }

    fn parse_tree(&self, tok: &mut Tokeniser<'_>, numbers: &mut NumberTable) -> Result<Tree, ParseError> {
        let (root, has_body) = self.parse_head(tok, numbers)?;
        let root_id = root.id;
        let mut tree = Tree::new(root);
        if has_body {
            self.parse_children(tok, &mut tree, root_id, 0, numbers)?;
        }
        Ok(tree)
    }

    /// Consume `'[' NUMBER?` and then either the closing `']'` of an empty
    /// node or a label. The flag reports whether children and a closing
    /// bracket still follow.
    fn parse_head(&self, tok: &mut Tokeniser<'_>, numbers: &mut NumberTable) -> Result<(Node, bool), ParseError> {
        let g = &self.grammar;
        require(tok, &g.open, "'['")?;
        let number = self.number(tok)?;

        let (mut node, has_body) = if tok.next(&g.close).is_some() {
            (Node::new(""), false)
        } else if let Some(label) = tok.next_group(&g.label, 1) {
            (Node::new(label), true)
        } else {
            tok.skip_whitespace();
            return Err(ParseError::MissingLabel { offset: tok.position() });
        };

        if let Some(n) = number {
            if numbers.insert(n, node.id).is_some() {
                return Err(ParseError::DuplicateNumericLabel(n));
            }
            node.numerical_label = Some(n);
        }
        Ok((node, has_body))
    }

    fn parse_children(
        &self,
        tok: &mut Tokeniser<'_>,
        tree: &mut Tree,
        parent: NodeId,
        level: usize,
        numbers: &mut NumberTable,
    ) -> Result<(), ParseError> {
        let g = &self.grammar;
        while tok.has(&g.open) {
            if level >= MAX_DEPTH {
                tok.skip_whitespace();
                return Err(ParseError::TooDeep { limit: MAX_DEPTH, offset: tok.position() });
            }
            let (child, has_body) = self.parse_head(tok, numbers)?;
            let child_id = child.id;
            tree.attach(child, parent);
            if has_body {
                self.parse_children(tok, tree, child_id, level + 1, numbers)?;
            }
        }
        require(tok, &g.close, "']'")
    }

    fn number(&self, tok: &mut Tokeniser<'_>) -> Result<Option<u32>, ParseError> {
        let offset = tok.position();
        let Some(text) = tok.next(&self.grammar.number) else {
            return Ok(None);
        };
        text.parse::<u32>()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber { text: text.to_owned(), offset })
    }

    fn resolve(&self, tok: &mut Tokeniser<'_>, numbers: &NumberTable) -> Result<NodeId, ParseError> {
        let Some(n) = self.number(tok)? else {
            tok.skip_whitespace();
            return Err(ParseError::Expected { expected: "a numeric label", offset: tok.position() });
        };
        numbers.get(&n).copied().ok_or(ParseError::DanglingArrow(n))
    }
}

fn require(tok: &mut Tokeniser<'_>, pattern: &Regex, expected: &'static str) -> Result<(), ParseError> {
    if tok.next(pattern).is_some() {
        return Ok(());
    }
    tok.skip_whitespace();
    Err(ParseError::Expected { expected, offset: tok.position() })
}

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Render a forest back to bracket notation.
///
/// Trees are written one per line, then one line per arrow. Arrows with a
/// missing endpoint, or an endpoint without a numeric label, are skipped.
/// Double quotes inside labels are written as single quotes so the output
/// always parses again.
#[must_use]
pub fn unparse(forest: &Forest) -> String {
    let mut lines: Vec<String> = forest
        .trees()
        .filter_map(|tree| {
            let root = tree.root()?;
            let mut out = String::new();
            write_node(tree, root, &mut out);
            Some(out)
        })
        .collect();

    lines.extend(forest.live_arrows().filter_map(|arrow| {
        let start = forest.find_node(arrow.start)?.numerical_label?;
        let end = forest.find_node(arrow.end)?.numerical_label?;
        Some(format!("<{start} {end}>"))
    }));

    lines.join("\n")
}

fn write_node(tree: &Tree, node: &Node, out: &mut String) {
    out.push('[');
    if let Some(n) = node.numerical_label {
        out.push_str(&n.to_string());
        if !(node.is_empty_slot() && node.is_leaf()) {
            out.push(' ');
        }
    }
    if node.is_empty_slot() && node.is_leaf() {
        out.push(']');
        return;
    }
    out.push('"');
    out.push_str(&node.label.replace('"', "'"));
    out.push('"');
    if !node.is_leaf() {
        out.push(' ');
    }
    for child in node.children.iter().filter_map(|&id| tree.node(id)) {
        write_node(tree, child, out);
    }
    out.push(']');
}
