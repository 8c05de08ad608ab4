use crate::ast::node::{AstNode, FieldValue};
use std::rc::Rc;
use tracing::trace;

/// Priority-bounded descendant search.
///
/// Nodes are visited in pre-order, document order. Every node whose kind
/// equals `kind` is collected, and the search only descends into a node's
/// children when `priority` is strictly greater than that node's own
/// priority (as reported by `priority_of`). The focused value itself is
/// always expanded; a sequence is searched element by element.
pub struct Finder<'a, P>
where
    P: Fn(&str) -> u32,
{
    kind: &'a str,
    priority: u32,
    priority_of: P,
}

impl<'a, P> Finder<'a, P>
where
    P: Fn(&str) -> u32,
{
    pub fn new(kind: &'a str, priority: u32, priority_of: P) -> Self {
        Self {
            kind,
            priority,
            priority_of,
        }
    }

    pub fn find_all(&self, root: &FieldValue) -> Vec<Rc<AstNode>> {
        let mut out = Vec::new();
        match root {
            FieldValue::Node(node) => self.visit_root(node, &mut out),
            FieldValue::Seq(nodes) => {
                for node in nodes {
                    self.visit_root(node, &mut out);
                }
            }
            FieldValue::Scalar(_) | FieldValue::Null => {}
        }
        trace!(kind = self.kind, priority = self.priority, found = out.len(), "node search");
        out
    }

    fn visit_root(&self, node: &Rc<AstNode>, out: &mut Vec<Rc<AstNode>>) {
        if node.kind == self.kind {
            out.push(Rc::clone(node));
        }
        for child in node.child_nodes() {
            self.visit(child, out);
        }
    }

    fn visit(&self, node: &Rc<AstNode>, out: &mut Vec<Rc<AstNode>>) {
        if node.kind == self.kind {
            out.push(Rc::clone(node));
        }
        if self.priority > (self.priority_of)(&node.kind) {
            for child in node.child_nodes() {
                self.visit(child, out);
            }
        }
    }
}
