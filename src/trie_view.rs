//! Read-only mirror of the server's prefix tree and the layout drawn from it.
//!
//! A snapshot is fetched whole on every refresh. The walk follows the
//! current token as far as the snapshot allows, then the deepest node's
//! children are ranked by frequency and fanned out underneath it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::Result;
use crate::grammar::escape_html;
use crate::sequence::RequestSequencer;

const ROOT_X: f64 = 200.0;
const ROOT_Y: f64 = 40.0;
const LEVEL_HEIGHT: f64 = 80.0;
const FAN_SPACING: f64 = 70.0;
const NODE_RADIUS: f64 = 18.0;
const ROOT_LABEL: &str = "•";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNodeView {
    #[serde(default)]
    pub children: BTreeMap<char, TrieNodeView>,
    #[serde(default, rename = "end")]
    pub is_terminal: bool,
    #[serde(default, rename = "freq")]
    pub frequency: u32,
}

#[derive(Deserialize)]
struct SnapshotEnvelope {
    root: TrieNodeView,
}

/// Parses the `/trie` response body, `{"root": {...}}`.
pub fn parse_snapshot(body: &str) -> Result<TrieNodeView> {
    let envelope: SnapshotEnvelope = serde_json::from_str(body)?;
    Ok(envelope.root)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSegment<'a> {
    pub character: char,
    pub node: &'a TrieNodeView,
}

impl TrieNodeView {
    /// Follows `prefix` from this node, stopping at the first character with
    /// no matching child. Returns the segments walked and the deepest node.
    pub fn walk(&self, prefix: &str) -> (Vec<PathSegment<'_>>, &TrieNodeView) {
        let mut node = self;
        let mut path = Vec::new();
        for character in prefix.chars() {
            match node.children.get(&character) {
                Some(child) => {
                    node = child;
                    path.push(PathSegment { character, node });
                }
                None => break,
            }
        }
        (path, node)
    }

    /// Up to `k` children by descending frequency, ties in key order.
    pub fn top_children(&self, k: usize) -> Vec<(char, &TrieNodeView)> {
        let mut children: Vec<(char, &TrieNodeView)> =
            self.children.iter().map(|(c, node)| (*c, node)).collect();
        // stable sort keeps the map's key order among equal frequencies
        children.sort_by(|a, b| b.1.frequency.cmp(&a.1.frequency));
        children.truncate(k);
        children
    }

    /// Every terminal word below this node with its frequency, depth first.
    pub fn words(&self) -> Vec<(String, u32)> {
        fn collect(node: &TrieNodeView, word: &mut String, out: &mut Vec<(String, u32)>) {
            if node.is_terminal {
                out.push((word.clone(), node.frequency));
            }
            for (c, child) in &node.children {
                word.push(*c);
                collect(child, word, out);
                word.pop();
            }
        }

        let mut out = Vec::new();
        collect(self, &mut String::new(), &mut out);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    Root,
    Path,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub terminal: bool,
    pub frequency: u32,
    pub role: NodeRole,
}

/// Edge between two indices of `TrieLayout::nodes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEdge {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrieLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
}

impl Default for TrieLayout {
    fn default() -> Self {
        Self::root_only()
    }
}

impl TrieLayout {
    pub fn root_only() -> Self {
        TrieLayout {
            nodes: vec![LayoutNode {
                label: ROOT_LABEL.to_string(),
                x: ROOT_X,
                y: ROOT_Y,
                terminal: false,
                frequency: 0,
                role: NodeRole::Root,
            }],
            edges: Vec::new(),
        }
    }

    /// Vertical chain for the walked prefix, horizontal fan of the top `k`
    /// children under the deepest node.
    pub fn build(root: &TrieNodeView, prefix: &str, k: usize) -> Self {
        let mut layout = Self::root_only();
        let (path, deepest) = root.walk(prefix);

        let mut y = ROOT_Y;
        let mut parent = 0;
        for segment in &path {
            y += LEVEL_HEIGHT;
            parent = layout.push(
                parent,
                LayoutNode {
                    label: segment.character.to_string(),
                    x: ROOT_X,
                    y,
                    terminal: segment.node.is_terminal,
                    frequency: segment.node.frequency,
                    role: NodeRole::Path,
                },
            );
        }

        let children = deepest.top_children(k);
        let base_x = ROOT_X - (children.len().saturating_sub(1) as f64 * FAN_SPACING) / 2.0;
        let child_y = y + LEVEL_HEIGHT;
        for (i, (c, child)) in children.into_iter().enumerate() {
            layout.push(
                parent,
                LayoutNode {
                    label: c.to_string(),
                    x: base_x + i as f64 * FAN_SPACING,
                    y: child_y,
                    terminal: child.is_terminal,
                    frequency: child.frequency,
                    role: NodeRole::Child,
                },
            );
        }
        layout
    }

    fn push(&mut self, parent: usize, node: LayoutNode) -> usize {
        self.nodes.push(node);
        let idx = self.nodes.len() - 1;
        self.edges.push(LayoutEdge { from: parent, to: idx });
        idx
    }

    pub fn path(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(|n| n.role == NodeRole::Path)
    }

    pub fn children(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.iter().filter(|n| n.role == NodeRole::Child)
    }

    pub fn to_svg(&self) -> String {
        let width = self
            .nodes
            .iter()
            .map(|n| n.x + NODE_RADIUS * 2.0)
            .fold(ROOT_X * 2.0, f64::max);
        let height = self
            .nodes
            .iter()
            .map(|n| n.y + NODE_RADIUS * 2.0)
            .fold(0.0, f64::max);

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}">"#
        );
        for edge in &self.edges {
            let (a, b) = (&self.nodes[edge.from], &self.nodes[edge.to]);
            let _ = writeln!(
                svg,
                r##"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="#555" stroke-width="2"/>"##,
                a.x, a.y, b.x, b.y
            );
        }
        for node in &self.nodes {
            let fill = if node.terminal { "#c8e6c9" } else { "#e3f2fd" };
            let _ = writeln!(
                svg,
                r##"  <circle cx="{}" cy="{}" r="{NODE_RADIUS}" fill="{fill}" stroke="#1565c0" stroke-width="2"/>"##,
                node.x, node.y
            );
            let _ = writeln!(
                svg,
                r#"  <text x="{}" y="{}" text-anchor="middle" font-size="12">{}</text>"#,
                node.x,
                node.y + 5.0,
                escape_html(&node.label)
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotTicket {
    pub seq: u64,
    pub prefix: String,
    pub k: usize,
}

/// Keeps the most recent layout. Stale snapshot responses are ignored and
/// failures fall back to a root-only drawing.
#[derive(Debug, Default)]
pub struct TrieRenderer {
    sequencer: RequestSequencer,
    layout: TrieLayout,
}

impl TrieRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> &TrieLayout {
        &self.layout
    }

    pub fn begin(&mut self, prefix: &str, k: usize) -> SnapshotTicket {
        SnapshotTicket {
            seq: self.sequencer.issue(),
            prefix: prefix.to_string(),
            k,
        }
    }

    /// Returns false when the ticket was superseded and nothing changed.
    pub fn apply(&mut self, ticket: &SnapshotTicket, snapshot: Result<TrieNodeView>) -> bool {
        if !self.sequencer.is_current(ticket.seq) {
            log::debug!("Discarding stale trie snapshot #{}", ticket.seq);
            return false;
        }
        self.layout = match snapshot {
            Ok(root) => TrieLayout::build(&root, &ticket.prefix, ticket.k),
            Err(e) => {
                log::warn!("Trie snapshot unavailable, drawing root only: {e}");
                TrieLayout::root_only()
            }
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_snapshot() -> TrieNodeView {
        parse_snapshot(
            r#"{"root": {"end": false, "freq": 0, "children": {
                "a": {"end": false, "freq": 0, "children": {
                    "p": {"end": false, "freq": 0, "children": {
                        "p": {"end": true, "freq": 2, "children": {
                            "l": {"end": false, "freq": 3, "children": {}},
                            "e": {"end": true, "freq": 5, "children": {}}
                        }}
                    }}
                }},
                "b": {"end": true, "freq": 1, "children": {}}
            }}}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_walk_full_prefix() {
        let root = app_snapshot();
        let (path, deepest) = root.walk("app");
        let chars: Vec<char> = path.iter().map(|s| s.character).collect();
        assert_eq!(chars, vec!['a', 'p', 'p']);
        assert!(deepest.is_terminal);
    }

    #[test]
    fn test_walk_stops_at_missing_character() {
        let root = app_snapshot();
        let (path, deepest) = root.walk("apx");
        assert_eq!(path.len(), 2);
        assert_eq!(deepest.children.len(), 1);
    }

    #[test]
    fn test_top_k_picks_highest_frequency() {
        let root = app_snapshot();
        let layout = TrieLayout::build(&root, "app", 1);
        let children: Vec<&LayoutNode> = layout.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].label, "e");
        assert_eq!(children[0].frequency, 5);
        assert!(children[0].terminal);
    }

    #[test]
    fn test_top_children_ties_use_key_order() {
        let root = parse_snapshot(
            r#"{"root": {"children": {
                "c": {"freq": 1}, "a": {"freq": 1}, "b": {"freq": 4}
            }}}"#,
        )
        .unwrap();
        let order: Vec<char> = root.top_children(3).into_iter().map(|(c, _)| c).collect();
        assert_eq!(order, vec!['b', 'a', 'c']);
    }

    #[test]
    fn test_layout_geometry() {
        let root = app_snapshot();
        let layout = TrieLayout::build(&root, "app", 2);
        assert_eq!(layout.path().count(), 3);
        let deepest = layout.path().last().unwrap();
        assert_eq!((deepest.x, deepest.y), (200.0, 280.0));

        let xs: Vec<f64> = layout.children().map(|n| n.x).collect();
        assert_eq!(xs, vec![165.0, 235.0]);
        assert!(layout.children().all(|n| n.y == 360.0));
        // every non-root node hangs off exactly one edge
        assert_eq!(layout.edges.len(), layout.nodes.len() - 1);
    }

    #[test]
    fn test_empty_prefix_fans_root_children() {
        let root = app_snapshot();
        let layout = TrieLayout::build(&root, "", 5);
        assert_eq!(layout.path().count(), 0);
        let labels: Vec<&str> = layout.children().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["b", "a"]);
    }

    #[test]
    fn test_words_listing() {
        let root = app_snapshot();
        assert_eq!(
            root.words(),
            vec![
                ("app".to_string(), 2),
                ("appe".to_string(), 5),
                ("b".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_malformed_snapshot_is_error() {
        assert!(parse_snapshot("TRIE_OK").is_err());
        assert!(parse_snapshot(r#"{"nodes": []}"#).is_err());
    }

    #[test]
    fn test_renderer_falls_back_to_root() {
        let mut renderer = TrieRenderer::new();
        let ticket = renderer.begin("app", 3);
        assert!(renderer.apply(&ticket, parse_snapshot("not json")));
        assert_eq!(renderer.layout(), &TrieLayout::root_only());
    }

    #[test]
    fn test_renderer_discards_stale_snapshot() {
        let mut renderer = TrieRenderer::new();
        let old = renderer.begin("a", 3);
        let new = renderer.begin("app", 1);
        assert!(renderer.apply(&new, Ok(app_snapshot())));
        assert!(!renderer.apply(&old, Ok(TrieNodeView::default())));
        assert_eq!(renderer.layout().children().count(), 1);
    }

    #[test]
    fn test_svg_marks_terminal_nodes() {
        let root = app_snapshot();
        let svg = TrieLayout::build(&root, "app", 2).to_svg();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 6);
        assert_eq!(svg.matches("#c8e6c9").count(), 2);
        assert_eq!(svg.matches("<line").count(), 5);
    }
}
