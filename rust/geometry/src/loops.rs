// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Loop walking by successor matching
//!
//! The first link seeds the chain. Each round scans the remaining links for
//! one whose start matches the chain's end, flipping a link whose end
//! matches instead. The finished chain must close on its first start.

use crate::error::{Error, Result};

/// Something with two ends that can be chained into a loop
pub trait Link {
    type Node;

    fn start(&self) -> Self::Node;
    fn end(&self) -> Self::Node;
    fn reverse(&mut self);
    fn joins(a: &Self::Node, b: &Self::Node) -> bool;
}

impl Link for (u32, u32) {
    type Node = u32;

    #[inline]
    fn start(&self) -> u32 {
        self.0
    }

    #[inline]
    fn end(&self) -> u32 {
        self.1
    }

    fn reverse(&mut self) {
        std::mem::swap(&mut self.0, &mut self.1);
    }

    #[inline]
    fn joins(a: &u32, b: &u32) -> bool {
        a == b
    }
}

/// Order links into a closed chain
pub fn chain<L: Link>(links: Vec<L>) -> Result<Vec<L>> {
    let mut remaining = links.into_iter();
    let Some(seed) = remaining.next() else {
        return Err(Error::loop_integrity("empty loop"));
    };
    let mut remaining: Vec<L> = remaining.collect();
    let mut ordered = Vec::with_capacity(remaining.len() + 1);
    ordered.push(seed);

    while !remaining.is_empty() {
        let Some(tail) = ordered.last().map(|l| l.end()) else {
            break;
        };

        let position = remaining
            .iter()
            .position(|l| L::joins(&l.start(), &tail))
            .map(|i| (i, false))
            .or_else(|| {
                remaining
                    .iter()
                    .position(|l| L::joins(&l.end(), &tail))
                    .map(|i| (i, true))
            });

        let Some((index, flip)) = position else {
            return Err(Error::loop_integrity(format!(
                "incorrect loop: no continuation after {} of {} links",
                ordered.len(),
                ordered.len() + remaining.len()
            )));
        };

        let mut next = remaining.remove(index);
        if flip {
            next.reverse();
        }
        ordered.push(next);
    }

    let closed = match (ordered.first(), ordered.last()) {
        (Some(first), Some(last)) => L::joins(&first.start(), &last.end()),
        _ => false,
    };
    if !closed {
        return Err(Error::loop_integrity("incorrect loop, not closed"));
    }

    Ok(ordered)
}

/// Walk vertex-index edges into an ordered vertex cycle
///
/// Each vertex appears once, in walking order.
pub fn walk_edge_loop(edges: &[(u32, u32)]) -> Result<Vec<u32>> {
    let ordered = chain(edges.to_vec())?;

    let mut vertices = Vec::with_capacity(ordered.len());
    for (a, b) in ordered {
        for v in [a, b] {
            if !vertices.contains(&v) {
                vertices.push(v);
            }
        }
    }
    Ok(vertices)
}
