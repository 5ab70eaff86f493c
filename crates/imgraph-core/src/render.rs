//! # Rendering
//!
//! Read-only projections of a [`Graph`] into text:
//! - `show`: an ASCII tree drawn from each root
//! - `get_graphviz_graph`: a GraphViz `digraph` description
//! - `show_as_sets`: the keys and arcs as plain lists
//!
//! ```text
//! |--> A
//! |    |- art -> x
//! |    |- mod -> C
//! |    |         |- art -> z
//! |    |         |- mod -> D
//! |    |         |         |- art -> y
//! |--> B
//! |    |- art -> (z)
//! |    |- mod -> (C)
//! ```
//!
//! A key that has already been drawn is shown in brackets and not expanded
//! again, which keeps the output finite on cyclic and diamond-shaped graphs.

use crate::{Dir, Graph, TextBox};
use std::collections::{BTreeSet, VecDeque};
use std::fmt::Display;

impl<K, D, L> Graph<K, D, L>
where
    K: Ord + Clone + Display,
    D: Clone,
    L: Ord + Clone + Display,
{
    /// The graph as an ASCII tree.
    ///
    /// Each root is drawn in key order. Nodes still undrawn afterwards (those
    /// that only sit on rootless cycles or hang off them) are then drawn in key
    /// order, so every node appears at least once.
    #[must_use]
    pub fn show(&self) -> TextBox {
        let mut seen: BTreeSet<K> = BTreeSet::new();
        let mut boxes = Vec::new();

        for root in self.roots() {
            boxes.push(self.get_box_for(&mut seen, "", &root));
        }
        for key in self.keys() {
            if !seen.contains(key) {
                boxes.push(self.get_box_for(&mut seen, "", key));
            }
        }

        TextBox::stack(boxes)
    }

    /// The box for `key` reached by an arc labelled `label` (empty for a top
    /// level node), recording every key drawn in `seen`.
    ///
    /// A key already in `seen` renders as `|- label -> (key)`. Otherwise the
    /// node line `|- label -> key` sits above its children, each drawn the same
    /// way and preceded by a vertical bar column. Depth-first with an explicit
    /// stack of open boxes, so long chains do not exhaust the call stack.
    pub fn get_box_for(&self, seen: &mut BTreeSet<K>, label: &str, key: &K) -> TextBox {
        if seen.contains(key) {
            return drawn_before(label, key);
        }

        let mut drawn = TextBox::empty();
        let mut stack = vec![self.open_box(seen, label, key)];

        while let Some(open) = stack.last_mut() {
            if let Some((arc_label, next)) = open.pending.pop_front() {
                if seen.contains(&next) {
                    open.children.push(drawn_before(&arc_label, &next));
                } else {
                    let child = self.open_box(seen, &arc_label, &next);
                    stack.push(child);
                }
                continue;
            }

            if let Some(done) = stack.pop().map(OpenBox::close) {
                match stack.last_mut() {
                    Some(parent) => parent.children.push(done),
                    None => drawn = done,
                }
            }
        }

        drawn
    }

    /// Mark `key` as drawn and start its box.
    fn open_box(&self, seen: &mut BTreeSet<K>, label: &str, key: &K) -> OpenBox<K> {
        seen.insert(key.clone());

        let label = if label.is_empty() {
            String::new()
        } else {
            format!(" {label} ")
        };

        OpenBox {
            first: TextBox::leaf(format!("|-{label}-> {key}")),
            bar: format!("|{}", " ".repeat(label.chars().count() + 4)),
            pending: self
                .get_pairs(Dir::Out, key)
                .into_iter()
                .map(|(l, k)| (l.to_string(), k))
                .collect(),
            children: Vec::new(),
        }
    }

    /// The graph in GraphViz `dot` format.
    ///
    /// One statement per arc, in key order then out-list order; a node with no
    /// outgoing arcs gets a bare node statement.
    #[must_use]
    pub fn get_graphviz_graph(&self) -> String {
        let mut lines: Vec<String> = vec![
            "digraph d {".into(),
            "rankdir=TD;".into(),
            "size=\"10,10\";".into(),
            "node [shape = box];".into(),
        ];

        for key in self.keys() {
            let pairs = self.get_pairs(Dir::Out, key);
            if pairs.is_empty() {
                lines.push(format!("{};", quote(key)));
            }
            for (label, end) in pairs {
                lines.push(format!(
                    "{} -> {}[ label = {}];",
                    quote(key),
                    quote(&end),
                    quote(&label)
                ));
            }
        }

        lines.push("}".into());
        lines.join("\n")
    }

    /// The keys on one line followed by one arc per line, or `empty()`.
    #[must_use]
    pub fn show_as_sets(&self) -> TextBox {
        if self.is_empty() {
            return TextBox::leaf("empty()");
        }

        let keys: Vec<String> = self.keys().map(ToString::to_string).collect();
        let arcs = self.arcs().map(|a| TextBox::leaf(a.to_string()));

        TextBox::stack(std::iter::once(TextBox::leaf(keys.join(" "))).chain(arcs))
    }
}

/// A node box whose children are still being drawn.
struct OpenBox<K> {
    first: TextBox,
    bar: String,
    pending: VecDeque<(String, K)>,
    children: Vec<TextBox>,
}

impl<K> OpenBox<K> {
    fn close(self) -> TextBox {
        if self.children.is_empty() {
            return self.first;
        }
        let children = TextBox::stack(self.children);
        let left = TextBox::repeat(&self.bar, children.height());
        self.first.above(left.beside(children))
    }
}

fn drawn_before(label: &str, key: &impl Display) -> TextBox {
    TextBox::leaf(format!("|- {label} -> ({key})"))
}

fn quote(thing: &impl Display) -> String {
    format!("\"{}\"", thing.to_string().replace('"', "\\\""))
}
