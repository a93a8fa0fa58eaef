//! Text rendering of a scene graph.
//!
//! One line per node in pre-order, indented with tree connectors, colored by
//! a priority-ordered table of name rules. Nodes whose name carries a
//! parenthesized `d` flag, and everything below them, are dimmed.

use std::convert::Infallible;
use std::fmt;
use std::io::{self, Write};
use std::sync::LazyLock;

use colored::{ColoredString, Colorize};
use regex::Regex;

use super::SceneNode;

/// Matches a parenthesized flag group containing `d`, e.g. `(d)` or `(xdz)`.
static DISABLED_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^)]*d[^)]*\)").expect("Invalid regex pattern for disabled flag"));

/// Visual category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Root,
    Layer,
    Workspace,
    View,
    Output,
}

impl Highlight {
    /// Apply this category's style to `text`.
    pub fn paint(self, text: &str) -> ColoredString {
        match self {
            Self::None => text.normal(),
            Self::Root => text.magenta().bold(),
            Self::Layer => text.blue(),
            Self::Workspace => text.green(),
            Self::View => text.yellow(),
            Self::Output => text.cyan(),
        }
    }
}

/// How a rule tests a node name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    Exact(&'static str),
    Contains(&'static str),
    Prefix(&'static str),
}

impl NamePattern {
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::Exact(s) => name == s,
            Self::Contains(s) => name.contains(s),
            Self::Prefix(s) => name.starts_with(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightRule {
    pub pattern: NamePattern,
    pub highlight: Highlight,
}

/// Built-in rules, highest priority first.
pub const DEFAULT_RULES: [HighlightRule; 5] = [
    HighlightRule {
        pattern: NamePattern::Exact("root ()"),
        highlight: Highlight::Root,
    },
    HighlightRule {
        pattern: NamePattern::Contains("layer_"),
        highlight: Highlight::Layer,
    },
    HighlightRule {
        pattern: NamePattern::Contains("workspace-set"),
        highlight: Highlight::Workspace,
    },
    HighlightRule {
        pattern: NamePattern::Contains("view-root-node"),
        highlight: Highlight::View,
    },
    HighlightRule {
        pattern: NamePattern::Prefix("output"),
        highlight: Highlight::Output,
    },
];

/// Whether `name` carries the disabled flag.
pub fn is_disabled_name(name: &str) -> bool {
    DISABLED_FLAG.is_match(name)
}

/// Tree connector for `depth`: `""`, `"|-"`, `"| |-"`, `"| | |-"`, ...
pub fn indent(depth: usize) -> String {
    if depth == 0 {
        return String::new();
    }
    let mut prefix = "| ".repeat(depth);
    prefix.pop();
    prefix.push('-');
    prefix
}

/// One rendered node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub depth: usize,
    /// Unstyled text, indent included.
    pub text: String,
    pub highlight: Highlight,
    /// Set when this node or an ancestor is disabled.
    pub disabled: bool,
}

impl RenderedLine {
    /// Text with the category style, dimmed on top when disabled.
    pub fn styled(&self) -> ColoredString {
        let painted = self.highlight.paint(&self.text);
        if self.disabled {
            painted.dimmed()
        } else {
            painted
        }
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.styled())
    }
}

/// Stateless renderer; the same tree always yields the same lines.
#[derive(Debug, Clone)]
pub struct SceneRenderer {
    rules: Vec<HighlightRule>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule below all existing ones.
    #[must_use]
    pub fn with_rule(mut self, rule: HighlightRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First matching rule wins.
    pub fn classify(&self, name: &str) -> Highlight {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(name))
            .map_or(Highlight::None, |rule| rule.highlight)
    }

    /// Write the tree to `out`, one styled line per node.
    pub fn render<W: Write>(&self, root: &SceneNode, out: &mut W) -> io::Result<()> {
        self.walk(root, 0, false, &mut |line: RenderedLine| writeln!(out, "{line}"))
    }

    /// Collect the rendered lines without writing them anywhere.
    pub fn lines(&self, root: &SceneNode) -> Vec<RenderedLine> {
        let mut lines = Vec::with_capacity(root.node_count());
        let _ = self.walk(root, 0, false, &mut |line| {
            lines.push(line);
            Ok::<(), Infallible>(())
        });
        lines
    }

    /// Build the line for a single node.
    pub fn line_for(&self, node: &SceneNode, depth: usize, disabled: bool) -> RenderedLine {
        let b = &node.local_bbox;
        RenderedLine {
            depth,
            text: format!(
                "{}{} id={} geometry=({},{} {}x{})",
                indent(depth),
                node.name,
                node.id,
                b.x,
                b.y,
                b.width,
                b.height
            ),
            highlight: self.classify(&node.name),
            disabled,
        }
    }

    fn walk<E>(
        &self,
        node: &SceneNode,
        depth: usize,
        inherited_disabled: bool,
        emit: &mut impl FnMut(RenderedLine) -> Result<(), E>,
    ) -> Result<(), E> {
        let disabled = inherited_disabled || is_disabled_name(&node.name);
        emit(self.line_for(node, depth, disabled))?;
        for child in &node.children {
            self.walk(child, depth + 1, disabled, emit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{NodeId, Rect};
    use colored::{Color, Styles};

    fn node(name: &str, id: u64, children: Vec<SceneNode>) -> SceneNode {
        SceneNode {
            name: name.to_string(),
            id: NodeId::Number(id.into()),
            local_bbox: Rect {
                x: 1,
                y: 2,
                width: 30,
                height: 40,
            },
            children,
        }
    }

    #[test]
    fn indentation_by_depth() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(1), "|-");
        assert_eq!(indent(2), "| |-");
        assert_eq!(indent(3), "| | |-");
    }

    #[test]
    fn single_root_line() {
        let root = SceneNode {
            name: "root ()".into(),
            id: NodeId::Number(1.into()),
            local_bbox: Rect {
                x: 0,
                y: 0,
                width: 0,
                height: 0,
            },
            children: vec![],
        };
        let lines = SceneRenderer::new().lines(&root);
        assert_eq!(
            lines,
            vec![RenderedLine {
                depth: 0,
                text: "root () id=1 geometry=(0,0 0x0)".into(),
                highlight: Highlight::Root,
                disabled: false,
            }]
        );
    }

    #[test]
    fn preorder_keeps_child_order() {
        let tree = node(
            "root ()",
            1,
            vec![
                node("z", 2, vec![node("z1", 3, vec![])]),
                node("a", 4, vec![]),
            ],
        );
        let texts: Vec<_> = SceneRenderer::new()
            .lines(&tree)
            .into_iter()
            .map(|l| l.text)
            .collect();
        assert_eq!(
            texts,
            [
                "root () id=1 geometry=(1,2 30x40)",
                "|-z id=2 geometry=(1,2 30x40)",
                "| |-z1 id=3 geometry=(1,2 30x40)",
                "|-a id=4 geometry=(1,2 30x40)",
            ]
        );
    }

    #[test]
    fn disabled_flag_patterns() {
        assert!(is_disabled_name("foo (d)"));
        assert!(is_disabled_name("foo (xdz)"));
        assert!(!is_disabled_name("root ()"));
        assert!(!is_disabled_name("dd (x)"));
        assert!(!is_disabled_name("output DP-1"));
    }

    #[test]
    fn disabled_state_is_inherited_by_whole_subtree() {
        let tree = node(
            "root ()",
            1,
            vec![
                node(
                    "workspace-set (d)",
                    2,
                    vec![node("plain", 3, vec![node("deeper", 4, vec![])])],
                ),
                node("sibling", 5, vec![]),
            ],
        );
        let disabled: Vec<_> = SceneRenderer::new()
            .lines(&tree)
            .iter()
            .map(|l| l.disabled)
            .collect();
        assert_eq!(disabled, [false, true, true, true, false]);
    }

    #[test]
    fn classification_priority() {
        let r = SceneRenderer::new();
        assert_eq!(r.classify("root ()"), Highlight::Root);
        assert_eq!(r.classify("root (d)"), Highlight::None);
        assert_eq!(r.classify("layer_workspace-set"), Highlight::Layer);
        assert_eq!(r.classify("workspace-set view-root-node"), Highlight::Workspace);
        assert_eq!(r.classify("view-root-node 0x1"), Highlight::View);
        assert_eq!(r.classify("output DP-1"), Highlight::Output);
        assert_eq!(r.classify("my output"), Highlight::None);
    }

    #[test]
    fn extra_rules_rank_after_builtins() {
        let r = SceneRenderer::new().with_rule(HighlightRule {
            pattern: NamePattern::Contains("translation"),
            highlight: Highlight::View,
        });
        assert_eq!(r.classify("translation-node"), Highlight::View);
        assert_eq!(r.classify("layer_top translation"), Highlight::Layer);
    }

    #[test]
    fn disabled_style_layers_dim_over_category() {
        let line = RenderedLine {
            depth: 1,
            text: "|-output DP-1 (d)".into(),
            highlight: Highlight::Output,
            disabled: true,
        };
        let styled = line.styled();
        assert_eq!(styled.fgcolor, Some(Color::Cyan));
        assert!(styled.style.contains(Styles::Dimmed));

        let enabled = RenderedLine {
            disabled: false,
            ..line
        };
        assert!(!enabled.styled().style.contains(Styles::Dimmed));
    }

    #[test]
    fn render_writes_one_line_per_node() {
        let tree = node("root ()", 1, vec![node("a", 2, vec![]), node("b", 3, vec![])]);
        let mut out = Vec::new();
        SceneRenderer::new().render(&tree, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with('\n'));
    }
}
