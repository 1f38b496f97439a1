//! Groups the snapshot's node stream into visual blocks.
//!
//! The segmenter walks the preorder node array the way a user reads the
//! rendered page: block-level boxes, table cells and explicit line breaks
//! close the current block, left-margin shifts force a run boundary, and
//! interactive widgets join a block as atomic members with their subtree
//! skipped.

use crate::linearize::{WidgetAdapter, apply_transform, reduce_whitespace};
use crate::visibility::is_displayed;
use sightline_common::content::{NodeRef, Substring};
use sightline_common::snapshot::RawNode;
use std::sync::Arc;

/// Forward-only cursor over the preorder node array with explicit one-step
/// backtracking. Block boundaries are discovered one node too late, so the
/// boundary node is pushed back and reprocessed as the start of the next
/// block.
pub(crate) struct Cursor<'a> {
    nodes: &'a [RawNode],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(nodes: &'a [RawNode]) -> Self {
        Self { nodes, pos: 0 }
    }

    /// Index of the next node, advancing past it.
    fn advance(&mut self) -> Option<usize> {
        if self.pos < self.nodes.len() {
            let index = self.pos;
            self.pos += 1;
            Some(index)
        } else {
            None
        }
    }

    /// Re-delivers the node just returned by `advance`.
    fn push_back(&mut self) {
        debug_assert!(self.pos > 0);
        self.pos -= 1;
    }

    /// Skips everything inside the subtree rooted at `index`.
    fn skip_subtree(&mut self, index: usize) {
        self.pos = subtree_end(self.nodes, index);
    }
}

/// First index past the subtree rooted at `index`.
fn subtree_end(nodes: &[RawNode], index: usize) -> usize {
    let depth = nodes[index].depth();
    let mut end = index + 1;
    while end < nodes.len() && nodes[end].depth() > depth {
        end += 1;
    }
    end
}

/// One member of a raw block: a text run under assembly, or the index of a
/// widget element node.
pub(crate) enum BlockItem {
    Run(PendingRun),
    Widget(usize),
}

/// A text run being assembled. `substrings` records each contributing text
/// node separately; `text` is the reduced concatenation.
pub(crate) struct PendingRun {
    pub node: NodeRef,
    pub text: String,
    pub substrings: Vec<Substring>,
}

impl PendingRun {
    /// Empty run inserted at an indentation shift so the following text
    /// starts a fresh run.
    fn placeholder(node: NodeRef) -> Self {
        Self {
            node,
            text: String::new(),
            substrings: Vec::new(),
        }
    }

    fn open(node: NodeRef, data: String) -> Self {
        let mut run = Self::placeholder(node);
        run.text = data.clone();
        if !data.is_empty() {
            run.substrings.push(Substring { text: data, node });
        }
        run
    }

    fn append(&mut self, node: NodeRef, data: String) {
        self.substrings.push(Substring { text: data, node });
        let joined: String = self.substrings.iter().map(|s| s.text.as_str()).collect();
        self.text = reduce_whitespace(&joined);
    }
}

/// Lazily yields blocks in document order. Bounded by the snapshot size;
/// restartable per call, forward-only.
pub(crate) struct Segmenter<'a> {
    nodes: &'a [RawNode],
    cursor: Cursor<'a>,
    /// Subtree span of the nearest established block container.
    container: Option<(usize, usize)>,
    matchers: &'a [Arc<dyn WidgetAdapter>],
}

impl<'a> Segmenter<'a> {
    pub fn new(nodes: &'a [RawNode], matchers: &'a [Arc<dyn WidgetAdapter>]) -> Self {
        Self {
            nodes,
            cursor: Cursor::new(nodes),
            container: None,
            matchers,
        }
    }

    fn is_widget(&self, index: usize) -> bool {
        let RawNode::Element(el) = &self.nodes[index] else {
            return false;
        };
        matches!(el.tag.as_str(), "input" | "select" | "textarea" | "img")
            || self.matchers.iter().any(|m| m.matches(el))
    }

    fn next_raw_block(&mut self) -> Option<Vec<BlockItem>> {
        let mut block: Vec<BlockItem> = Vec::new();
        while let Some(index) = self.cursor.advance() {
            match &self.nodes[index] {
                RawNode::Element(el) => {
                    if !is_displayed(el) {
                        self.cursor.skip_subtree(index);
                        continue;
                    }
                    if el.indented && matches!(block.last(), Some(BlockItem::Run(_))) {
                        block.push(BlockItem::Run(PendingRun::placeholder(
                            el.parent.unwrap_or(el.node),
                        )));
                    }
                    match el.display.as_str() {
                        "block" | "table-cell" => {
                            self.container = Some((index, subtree_end(self.nodes, index)));
                            if !block.is_empty() {
                                self.cursor.push_back();
                                return Some(block);
                            }
                        }
                        _ => {
                            if el.tag == "br" {
                                if !block.is_empty() {
                                    return Some(block);
                                }
                            } else if let Some((_, end)) = self.container {
                                if index >= end {
                                    self.container = None;
                                    if !block.is_empty() {
                                        self.cursor.push_back();
                                        return Some(block);
                                    }
                                }
                            }
                        }
                    }
                    if self.is_widget(index) {
                        block.push(BlockItem::Widget(index));
                        self.cursor.skip_subtree(index);
                    }
                }
                RawNode::Text(node) => {
                    let data = apply_transform(&reduce_whitespace(&node.text), node.transform);
                    if let Some(BlockItem::Run(run)) = block.last_mut() {
                        if !data.is_empty() {
                            run.append(node.parent, data);
                        }
                    } else {
                        block.push(BlockItem::Run(PendingRun::open(node.parent, data)));
                    }
                }
            }
        }
        if block.is_empty() { None } else { Some(block) }
    }
}

impl Iterator for Segmenter<'_> {
    type Item = Vec<BlockItem>;

    /// Trims run text, drops empty runs, and skips blocks that become empty.
    fn next(&mut self) -> Option<Vec<BlockItem>> {
        while let Some(mut block) = self.next_raw_block() {
            for item in &mut block {
                if let BlockItem::Run(run) = item {
                    run.text = run.text.trim().to_string();
                }
            }
            block.retain(|item| !matches!(item, BlockItem::Run(run) if run.text.is_empty()));
            if !block.is_empty() {
                return Some(block);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_common::snapshot::{ElementNode, TextNode, TextTransform};

    fn el(tag: &str, display: &str, depth: u32, node: u32) -> RawNode {
        RawNode::Element(ElementNode {
            tag: tag.into(),
            display: display.into(),
            depth,
            node: NodeRef(node),
            parent: if node == 0 { None } else { Some(NodeRef(0)) },
            ..Default::default()
        })
    }

    fn text(depth: u32, parent: u32, data: &str) -> RawNode {
        RawNode::Text(TextNode {
            depth,
            parent: NodeRef(parent),
            text: data.into(),
            transform: TextTransform::None,
        })
    }

    fn blocks(nodes: &[RawNode]) -> Vec<Vec<String>> {
        Segmenter::new(nodes, &[])
            .map(|block| {
                block
                    .iter()
                    .map(|item| match item {
                        BlockItem::Run(run) => run.text.clone(),
                        BlockItem::Widget(index) => format!("widget@{index}"),
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn inline_text_merges_into_one_run_with_substrings() {
        let nodes = vec![
            el("div", "block", 0, 0),
            el("span", "inline", 1, 1),
            text(2, 1, "Hello "),
            el("b", "inline", 1, 2),
            text(2, 2, "World"),
        ];
        let mut segmenter = Segmenter::new(&nodes, &[]);
        let block = segmenter.next().unwrap();
        assert_eq!(block.len(), 1);
        let BlockItem::Run(run) = &block[0] else {
            panic!("expected run");
        };
        assert_eq!(run.text, "Hello World");
        assert_eq!(run.substrings.len(), 2);
        assert_eq!(run.substrings[0].node, NodeRef(1));
        assert_eq!(run.substrings[1].node, NodeRef(2));
        assert!(segmenter.next().is_none());
    }

    #[test]
    fn block_elements_close_the_open_block() {
        let nodes = vec![
            el("body", "block", 0, 0),
            el("div", "block", 1, 1),
            text(2, 1, "First"),
            el("div", "block", 1, 2),
            text(2, 2, "Second"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["First"], vec!["Second"]]);
    }

    #[test]
    fn table_cells_are_separate_blocks() {
        let nodes = vec![
            el("tr", "table-row", 0, 0),
            el("td", "table-cell", 1, 1),
            text(2, 1, "Name"),
            el("td", "table-cell", 1, 2),
            text(2, 2, "Joyce"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["Name"], vec!["Joyce"]]);
    }

    #[test]
    fn br_closes_a_nonempty_block() {
        let nodes = vec![
            el("div", "block", 0, 0),
            text(1, 0, "line one"),
            el("br", "inline", 1, 1),
            text(1, 0, "line two"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["line one"], vec!["line two"]]);
    }

    #[test]
    fn leaving_the_container_closes_the_block() {
        // text inside a block-level div, then an inline sibling outside it
        let nodes = vec![
            el("body", "block", 0, 0),
            el("div", "block", 1, 1),
            text(2, 1, "inside"),
            el("span", "inline", 1, 2),
            text(2, 2, "outside"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["inside"], vec!["outside"]]);
    }

    #[test]
    fn invisible_subtrees_are_skipped_entirely() {
        let nodes = vec![
            el("div", "block", 0, 0),
            text(1, 0, "shown "),
            RawNode::Element(ElementNode {
                tag: "div".into(),
                display: "none".into(),
                depth: 1,
                node: NodeRef(1),
                parent: Some(NodeRef(0)),
                ..Default::default()
            }),
            text(2, 1, "hidden"),
            text(1, 0, "also shown"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["shown also shown"]]);
    }

    #[test]
    fn margin_shift_forces_a_run_boundary() {
        let nodes = vec![
            el("div", "block", 0, 0),
            text(1, 0, "lead"),
            RawNode::Element(ElementNode {
                tag: "span".into(),
                display: "inline".into(),
                depth: 1,
                node: NodeRef(1),
                parent: Some(NodeRef(0)),
                indented: true,
                ..Default::default()
            }),
            text(2, 1, "indented"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["lead", "indented"]]);
    }

    #[test]
    fn widgets_are_atomic_and_their_subtree_is_opaque() {
        let nodes = vec![
            el("div", "block", 0, 0),
            text(1, 0, "Gender"),
            RawNode::Element(ElementNode {
                tag: "select".into(),
                display: "inline-block".into(),
                depth: 1,
                node: NodeRef(1),
                parent: Some(NodeRef(0)),
                ..Default::default()
            }),
            // capture never descends into selects, but any stray child
            // must not contribute content
            text(2, 1, "Female"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["Gender", "widget@2"]]);
    }

    #[test]
    fn whitespace_only_blocks_are_skipped() {
        let nodes = vec![
            el("div", "block", 0, 0),
            text(1, 0, "  \n\t "),
            el("div", "block", 1, 1),
            text(2, 1, "real"),
        ];
        assert_eq!(blocks(&nodes), vec![vec!["real"]]);
    }
}
