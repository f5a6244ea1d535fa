//! Removes the whitespace surrounding block tags that sit on a line of their
//! own, so that purely structural lines don't show up in the output.
//!
//! A tag is standalone when only whitespace separates it from a newline, or
//! from the edge of the template, on both sides. For example in the following
//! each of the `if` tags is standalone.
//!
//! ```text
//!   {{#if user}}
//!     {{user.name}}
//!   {{/if}}
//! ```
//!
//! Flags are computed for every tag before anything is removed, so removing
//! one tag's whitespace never changes whether a neighbouring tag is
//! standalone.

use crate::types::ast::{Block, Node, Template};

/// Whether each tag of a block is standalone.
#[derive(Debug, Clone, Copy, Default)]
struct Standalone {
    open: bool,
    otherwise: bool,
    close: bool,
}

pub fn normalize(template: &mut Template) {
    strip(&mut template.body, true, true);
}

/// Strips the standalone tags in this body and, recursively, in every nested
/// body.
///
/// `line_start` and `line_end` declare whether the start and end of this body
/// count as line boundaries, which is only the case for the template root.
fn strip(body: &mut Vec<Node>, line_start: bool, line_end: bool) {
    let flags: Vec<Option<Standalone>> = body
        .iter()
        .enumerate()
        .map(|(i, node)| match node {
            Node::Block(block) | Node::InvertedBlock(block) => {
                Some(standalone(body, i, block, line_start, line_end))
            }
            _ => None,
        })
        .collect();

    for (node, flags) in body.iter_mut().zip(&flags) {
        let (Node::Block(block) | Node::InvertedBlock(block), Some(flags)) = (node, flags) else {
            continue;
        };

        strip(&mut block.body, false, false);
        if let Some(else_body) = &mut block.else_body {
            strip(else_body, false, false);
        }

        if flags.open {
            trim_start(&mut block.body);
        }
        if let (true, Some(else_body)) = (flags.otherwise, &mut block.else_body) {
            trim_end(&mut block.body);
            trim_start(else_body);
        }
        if flags.close {
            trim_end(block.else_body.as_mut().unwrap_or(&mut block.body));
        }
    }

    // Going backwards means removals never shift the nodes still to visit.
    for i in (0..body.len()).rev() {
        let Some(tag) = flags[i] else {
            continue;
        };
        if tag.close {
            while matches!(body.get(i + 1), Some(Node::Whitespace(_))) {
                body.remove(i + 1);
            }
        }
        if tag.open {
            let mut j = i;
            while j > 0 && matches!(body[j - 1], Node::Whitespace(_)) {
                body.remove(j - 1);
                j -= 1;
            }
        }
    }
}

fn standalone(
    body: &[Node],
    i: usize,
    block: &Block,
    line_start: bool,
    line_end: bool,
) -> Standalone {
    let open = blank_before(body, i, line_start) && blank_after(&block.body, 0, false);
    let otherwise = match &block.else_body {
        Some(else_body) => {
            blank_before(&block.body, block.body.len(), false) && blank_after(else_body, 0, false)
        }
        None => false,
    };
    let last = block.else_body.as_deref().unwrap_or(&block.body);
    let close = blank_before(last, last.len(), false) && blank_after(body, i + 1, line_end);
    Standalone {
        open,
        otherwise,
        close,
    }
}

/// Whether only whitespace lies between a newline (or the start) and `i`.
fn blank_before(nodes: &[Node], i: usize, line_start: bool) -> bool {
    for node in nodes[..i].iter().rev() {
        match node {
            Node::Whitespace(_) => continue,
            Node::Newline(_) => return true,
            _ => return false,
        }
    }
    line_start
}

/// Whether only whitespace lies between `i` and a newline (or the end).
fn blank_after(nodes: &[Node], i: usize, line_end: bool) -> bool {
    for node in nodes.get(i..).unwrap_or_default() {
        match node {
            Node::Whitespace(_) => continue,
            Node::Newline(_) => return true,
            _ => return false,
        }
    }
    line_end
}

/// Removes leading whitespace and the first newline.
fn trim_start(nodes: &mut Vec<Node>) {
    let n = nodes
        .iter()
        .take_while(|n| matches!(n, Node::Whitespace(_)))
        .count();
    nodes.drain(..n);
    if matches!(nodes.first(), Some(Node::Newline(_))) {
        nodes.remove(0);
    }
}

/// Removes trailing whitespace and the last newline.
fn trim_end(nodes: &mut Vec<Node>) {
    while matches!(nodes.last(), Some(Node::Whitespace(_))) {
        nodes.pop();
    }
    if matches!(nodes.last(), Some(Node::Newline(_))) {
        nodes.pop();
    }
}
