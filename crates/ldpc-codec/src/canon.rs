//! Canonical blank-node labeling.
//!
//! Produces one N-Triples document per isomorphism class of graphs:
//!
//! 1. Every blank node gets a first-degree color: the hash of the sorted
//!    statements it occurs in, with itself written `_:a` and every other
//!    blank node written `_:z`.
//! 2. Colors are refined by hashing each node's color together with the
//!    sorted signatures of its statements, where neighbouring blank nodes
//!    are written as their current color. Refinement stops once the number
//!    of distinct colors no longer grows.
//! 3. If colors are still tied, members of the first tied cell (in color
//!    order) are individualized in turn and the search recurses. Each fully
//!    distinguished coloring (a leaf) labels the nodes `c14n0..` in color
//!    order; the lexicographically least serialization wins.
//!
//! Two leaves with the same serialization differ by an automorphism of the
//! graph. Those automorphisms prune the search: a cell member that some
//! recorded automorphism (fixing the current path) maps onto an explored
//! member is skipped, and a leaf that repeats an earlier one ends its
//! subtree early. Interchangeable nodes therefore cost a number of leaves
//! linear in their count, not factorial.
//!
//! Colors are computed from graph structure only, never from input labels,
//! so the result is invariant under relabeling and statement order.

use std::collections::BTreeMap;

use ldpc_crypto::ContentHasher;
use ldpc_types::{BlankId, ContentHash, Graph, Term};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CanonicalizationError;
use crate::ntriples::write_term;

/// Prefix of canonical blank-node labels.
pub const CANONICAL_PREFIX: &str = "c14n";

/// Limits for canonical labeling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonConfig {
    /// Maximum number of fully distinguished colorings explored.
    pub max_leaves: usize,
}

impl Default for CanonConfig {
    fn default() -> Self {
        Self { max_leaves: 65_536 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot<'a> {
    Fixed(&'a str),
    Blank(usize),
}

/// A statement with non-blank terms pre-rendered and blank nodes indexed.
struct Row<'a>([Slot<'a>; 3]);

#[derive(Clone)]
struct Leaf {
    ntriples: String,
    /// Blank nodes in label order.
    order: Vec<usize>,
    /// Individualized nodes, outermost first.
    path: Vec<usize>,
}

struct Labeler<'a> {
    rows: Vec<Row<'a>>,
    /// For each blank node, the rows it occurs in.
    occurrences: Vec<Vec<usize>>,
    max_leaves: usize,
    leaves: usize,
    first: Option<Leaf>,
    best: Option<Leaf>,
    /// Node -> image maps, each an automorphism of the graph.
    automorphisms: Vec<Vec<usize>>,
}

/// Canonical N-Triples for `graph`: relabeled, sorted, newline-terminated.
///
/// Fails with [`CanonicalizationError::InvalidTerm`] when a term has no
/// N-Triples form that would parse back to it.
pub fn canonical_ntriples(
    graph: &Graph,
    config: &CanonConfig,
) -> Result<String, CanonicalizationError> {
    label(graph, config).map(|(ntriples, _)| ntriples)
}

/// Canonical N-Triples and the number of leaves visited.
fn label(graph: &Graph, config: &CanonConfig) -> Result<(String, usize), CanonicalizationError> {
    for triple in graph {
        for term in [triple.subject(), triple.predicate(), triple.object()] {
            term.check()?;
        }
    }

    let blanks: Vec<BlankId> = graph.blank_nodes().into_iter().collect();
    let index: BTreeMap<&BlankId, usize> = blanks.iter().enumerate().map(|(i, b)| (b, i)).collect();

    // Rendered non-blank terms must outlive the rows that borrow them.
    let rendered: Vec<[Option<String>; 3]> = graph
        .iter()
        .map(|t| {
            [t.subject(), t.predicate(), t.object()].map(|term| match term {
                Term::Blank(_) => None,
                other => Some(write_term(other)),
            })
        })
        .collect();

    let mut occurrences = vec![Vec::new(); blanks.len()];
    let rows: Vec<Row<'_>> = graph
        .iter()
        .zip(&rendered)
        .enumerate()
        .map(|(row_idx, (triple, text))| {
            let terms = [triple.subject(), triple.predicate(), triple.object()];
            let mut slots = [Slot::Fixed(""); 3];
            for pos in 0..3 {
                slots[pos] = match (terms[pos], &text[pos]) {
                    (Term::Blank(id), _) => {
                        let b = index[id];
                        if occurrences[b].last() != Some(&row_idx) {
                            occurrences[b].push(row_idx);
                        }
                        Slot::Blank(b)
                    }
                    (_, Some(s)) => Slot::Fixed(s.as_str()),
                    (_, None) => Slot::Fixed(""),
                };
            }
            Row(slots)
        })
        .collect();

    let mut labeler = Labeler {
        rows,
        occurrences,
        max_leaves: config.max_leaves,
        leaves: 0,
        first: None,
        best: None,
        automorphisms: Vec::new(),
    };

    if blanks.is_empty() {
        return Ok((labeler.serialize(&[]), 0));
    }

    let colors = labeler.first_degree();
    labeler.search(colors, &mut Vec::new())?;
    debug!(
        blank_nodes = blanks.len(),
        leaves = labeler.leaves,
        automorphisms = labeler.automorphisms.len(),
        "canonical labeling complete"
    );
    let best = labeler.best.map(|leaf| leaf.ntriples).unwrap_or_default();
    Ok((best, labeler.leaves))
}

impl<'a> Labeler<'a> {
    fn first_degree(&self) -> Vec<ContentHash> {
        (0..self.occurrences.len())
            .map(|b| {
                let mut sigs: Vec<String> = self.occurrences[b]
                    .iter()
                    .map(|&r| {
                        self.render_row(r, |slot| match slot {
                            n if n == b => "_:a".to_string(),
                            _ => "_:z".to_string(),
                        })
                    })
                    .collect();
                sigs.sort();
                let parts: Vec<&[u8]> = sigs.iter().map(|s| s.as_bytes()).collect();
                ContentHasher::BNODE.hash_parts(&parts)
            })
            .collect()
    }

    /// Refine until the partition is stable.
    fn refine(&self, mut colors: Vec<ContentHash>) -> Vec<ContentHash> {
        let mut cells = distinct(&colors);
        loop {
            let next: Vec<ContentHash> = (0..colors.len())
                .map(|b| {
                    let mut sigs: Vec<String> = self.occurrences[b]
                        .iter()
                        .map(|&r| {
                            self.render_row(r, |n| {
                                if n == b {
                                    "@".to_string()
                                } else {
                                    colors[n].to_hex()
                                }
                            })
                        })
                        .collect();
                    sigs.sort();
                    let mut parts: Vec<&[u8]> = vec![colors[b].as_bytes()];
                    parts.extend(sigs.iter().map(|s| s.as_bytes()));
                    ContentHasher::BNODE.hash_parts(&parts)
                })
                .collect();
            let next_cells = distinct(&next);
            colors = next;
            if next_cells <= cells {
                return colors;
            }
            cells = next_cells;
        }
    }

    /// Depth-first search below the node reached by individualizing `path`.
    ///
    /// Returns `Some(depth)` when every leaf left under the node at `depth`
    /// is an automorphic image of one already seen.
    fn search(
        &mut self,
        colors: Vec<ContentHash>,
        path: &mut Vec<usize>,
    ) -> Result<Option<usize>, CanonicalizationError> {
        let colors = self.refine(colors);

        let mut cells: BTreeMap<ContentHash, Vec<usize>> = BTreeMap::new();
        for (b, color) in colors.iter().enumerate() {
            cells.entry(*color).or_default().push(b);
        }

        let Some(tied) = cells.into_values().find(|members| members.len() > 1) else {
            return self.leaf(&colors, path);
        };

        let depth = path.len();
        let mut explored: Vec<usize> = Vec::new();
        for b in tied {
            if self.in_explored_orbit(b, &explored, path) {
                continue;
            }
            explored.push(b);
            let mut branch = colors.clone();
            branch[b] = ContentHasher::BNODE.hash_parts(&[colors[b].as_bytes(), b"individual"]);
            path.push(b);
            let jump = self.search(branch, path);
            path.pop();
            if let Some(level) = jump? {
                if level < depth {
                    return Ok(Some(level));
                }
            }
        }
        Ok(None)
    }

    fn leaf(
        &mut self,
        colors: &[ContentHash],
        path: &[usize],
    ) -> Result<Option<usize>, CanonicalizationError> {
        self.leaves += 1;
        if self.leaves > self.max_leaves {
            return Err(CanonicalizationError::SearchLimitExceeded {
                limit: self.max_leaves,
                blank_nodes: colors.len(),
            });
        }
        let mut order: Vec<usize> = (0..colors.len()).collect();
        order.sort_by_key(|&b| colors[b]);
        let mut labels = vec![String::new(); colors.len()];
        for (rank, &b) in order.iter().enumerate() {
            labels[b] = format!("_:{CANONICAL_PREFIX}{rank}");
        }
        let leaf = Leaf {
            ntriples: self.serialize(&labels),
            order,
            path: path.to_vec(),
        };

        let mut jump = None;
        let known = [self.first.as_ref(), self.best.as_ref()];
        if let Some(seen) = known.into_iter().flatten().find(|k| k.ntriples == leaf.ntriples) {
            let gamma = image_map(&seen.order, &leaf.order);
            jump = divergence(&gamma, &seen.path, &leaf.path);
            self.automorphisms.push(gamma);
        }

        if self.first.is_none() {
            self.first = Some(leaf.clone());
        }
        if self.best.as_ref().map_or(true, |best| leaf.ntriples < best.ntriples) {
            self.best = Some(leaf);
        }
        Ok(jump)
    }

    /// Whether an automorphism fixing `path` pointwise maps some explored
    /// cell member onto `b`.
    fn in_explored_orbit(&self, b: usize, explored: &[usize], path: &[usize]) -> bool {
        if explored.is_empty() {
            return false;
        }
        let mut parent: Vec<usize> = (0..self.occurrences.len()).collect();
        for gamma in &self.automorphisms {
            if path.iter().all(|&v| gamma[v] == v) {
                for (v, &w) in gamma.iter().enumerate() {
                    let (rv, rw) = (find(&mut parent, v), find(&mut parent, w));
                    parent[rv] = rw;
                }
            }
        }
        let root = find(&mut parent, b);
        explored.iter().any(|&a| find(&mut parent, a) == root)
    }

    fn serialize(&self, labels: &[String]) -> String {
        let mut lines: Vec<String> = (0..self.rows.len())
            .map(|r| self.render_row(r, |b| labels[b].clone()))
            .collect();
        lines.sort();
        lines.dedup();
        let mut out = String::new();
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    fn render_row(&self, row: usize, mut blank: impl FnMut(usize) -> String) -> String {
        let Row(slots) = &self.rows[row];
        let mut parts = slots.iter().map(|slot| match slot {
            Slot::Fixed(s) => (*s).to_string(),
            Slot::Blank(b) => blank(*b),
        });
        let (s, p, o) = (
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
            parts.next().unwrap_or_default(),
        );
        format!("{s} {p} {o} .")
    }
}

/// The node map sending each node of `from` to the node with the same label
/// in `to`.
fn image_map(from: &[usize], to: &[usize]) -> Vec<usize> {
    let mut gamma = vec![0; from.len()];
    for (&v, &w) in from.iter().zip(to) {
        gamma[v] = w;
    }
    gamma
}

/// Depth of the search node where `seen` and `path` branch apart, if
/// `gamma` carries the explored branch there onto the current one while
/// fixing everything above it.
fn divergence(gamma: &[usize], seen: &[usize], path: &[usize]) -> Option<usize> {
    let depth = seen.iter().zip(path).take_while(|(a, b)| a == b).count();
    let (&from, &to) = (seen.get(depth)?, path.get(depth)?);
    let fixes_prefix = path[..depth].iter().all(|&v| gamma[v] == v);
    (fixes_prefix && gamma[from] == to).then_some(depth)
}

fn find(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

fn distinct(colors: &[ContentHash]) -> usize {
    let mut sorted = colors.to_vec();
    sorted.sort();
    sorted.dedup();
    sorted.len()
}
