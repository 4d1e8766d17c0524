use bilge::prelude::*;
use std::{
    collections::HashSet,
    error::Error,
    fmt::{Display, Formatter, Result as FmtResult},
};

/// A node of a switch container's decision tree.
///
/// Every node is reached by a switch or state element (`decided_by`, 0 meaning "default").
/// Branches narrow the decision further; leaves name the child object that plays.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathNode {
    /// An internal node with ordered children.
    Branch {
        /// Element id that selects this node.
        decided_by: u32,
        /// Child nodes, in table order.
        children: Vec<PathNode>,
    },
    /// A terminal node referencing one of the owning container's children.
    Leaf {
        /// Element id that selects this node.
        decided_by: u32,
        /// Id of the selected child object.
        object_id: u32,
    },
}

impl PathNode {
    /// Returns the id of the switch or state element that selects this node.
    #[must_use]
    pub fn decided_by(&self) -> u32 {
        match self {
            Self::Branch { decided_by, .. } | Self::Leaf { decided_by, .. } => *decided_by,
        }
    }

    /// Returns the children of a branch. Leaves have none.
    #[must_use]
    pub fn children(&self) -> &[PathNode] {
        match self {
            Self::Branch { children, .. } => children,
            Self::Leaf { .. } => &[],
        }
    }

    /// Returns every leaf below (and including) this node, depth-first in table order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&PathNode> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];

        while let Some(node) = pending.pop() {
            match node {
                Self::Leaf { .. } => leaves.push(node),
                Self::Branch { children, .. } => pending.extend(children.iter().rev()),
            }
        }

        leaves
    }

    fn empty() -> Self {
        Self::Branch {
            decided_by: 0,
            children: Vec::new(),
        }
    }
}

const RECORD_SIZE: usize = 12;

// When the target field is not one of the container's children, it holds the position
// of the node's children in the table instead.
#[bitsize(32)]
#[derive(FromBits)]
struct ChildRange {
    start: u16,
    count: u16,
}

#[derive(Clone, Copy)]
struct PathRecord {
    decided_by: u32,
    target: u32,
}

impl PathRecord {
    fn parse(bytes: &[u8]) -> Self {
        let word = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        // the last 4 bytes of a record are unused
        Self {
            decided_by: word(0),
            target: word(4),
        }
    }
}

// Decision trees nest once per governing group, so real tables stay far below this.
const MAX_DEPTH: usize = 256;

/// Rebuilds the decision tree of a switch container from its flat path table.
///
/// Record 0 is the root. There is no type tag in the table: a record is a leaf exactly when its
/// target field matches one of `child_ids`. Every other record is reached through exactly one
/// parent's child range.
pub(crate) fn decode_path_table(table: &[u8], child_ids: &[u32]) -> Result<PathNode, PathError> {
    let records: Vec<_> = table.chunks_exact(RECORD_SIZE).map(PathRecord::parse).collect();

    if records.is_empty() {
        return Ok(PathNode::empty());
    }

    let child_ids: HashSet<u32> = child_ids.iter().copied().collect();
    let ranges: Vec<_> = records
        .iter()
        .map(|record| {
            (!child_ids.contains(&record.target)).then(|| {
                let range = ChildRange::from(record.target);
                let start = usize::from(range.start());
                start..start + usize::from(range.count())
            })
        })
        .collect();

    // records in the order they are reached; a parent always comes before its children
    let mut reached = vec![0];
    let mut visited = vec![false; records.len()];
    visited[0] = true;

    let mut pending = vec![(0, 0)];

    while let Some((index, depth)) = pending.pop() {
        let Some(range) = ranges[index].clone() else {
            continue;
        };

        if range.end > records.len() {
            return Err(PathError::new(
                index,
                PathErrorKind::OutOfRange {
                    len: records.len(),
                },
            ));
        }

        if !range.is_empty() && depth == MAX_DEPTH {
            return Err(PathError::new(index, PathErrorKind::TooDeep));
        }

        for child in range {
            if visited[child] {
                return Err(PathError::new(index, PathErrorKind::Revisited { child }));
            }
            visited[child] = true;
            reached.push(child);
            pending.push((child, depth + 1));
        }
    }

    // build bottom-up, so every child is finished before its parent takes it
    let mut nodes: Vec<Option<PathNode>> = vec![None; records.len()];

    for &index in reached.iter().rev() {
        let record = records[index];

        let node = match ranges[index].clone() {
            None => PathNode::Leaf {
                decided_by: record.decided_by,
                object_id: record.target,
            },
            Some(range) => PathNode::Branch {
                decided_by: record.decided_by,
                children: range.filter_map(|child| nodes[child].take()).collect(),
            },
        };
        nodes[index] = Some(node);
    }

    Ok(nodes[0].take().unwrap_or_else(PathNode::empty))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct PathError {
    index: usize,
    kind: PathErrorKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PathErrorKind {
    OutOfRange { len: usize },
    Revisited { child: usize },
    TooDeep,
}

impl PathError {
    fn new(index: usize, kind: PathErrorKind) -> Self {
        Self { index, kind }
    }

    /// Offset of the offending record from the start of the table.
    pub(crate) fn offset(&self) -> usize {
        self.index * RECORD_SIZE
    }

    #[cfg(test)]
    pub(crate) fn kind(&self) -> PathErrorKind {
        self.kind
    }
}

impl Display for PathError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self.kind {
            PathErrorKind::OutOfRange { len } => f.write_str(&format!(
                "path record index was out of range (table holds {len} records)"
            )),
            PathErrorKind::Revisited { child } => f.write_str(&format!(
                "child range included record {child}, which already has a parent"
            )),
            PathErrorKind::TooDeep => {
                f.write_str(&format!("path records were nested more than {MAX_DEPTH} deep"))
            }
        }?;

        f.write_str(&format!(" - record at index {}", self.index))
    }
}

impl Error for PathError {}

#[cfg(test)]
mod test {
    use super::{decode_path_table, ChildRange, PathErrorKind, PathNode};

    fn record(decided_by: u32, target: u32) -> [u8; 12] {
        let mut buf = [0; 12];
        buf[..4].copy_from_slice(&decided_by.to_le_bytes());
        buf[4..8].copy_from_slice(&target.to_le_bytes());
        buf[8..].copy_from_slice(&[0xAA; 4]);
        buf
    }

    fn branch(start: u16, count: u16) -> u32 {
        u32::from(start) | (u32::from(count) << 16)
    }

    fn table(records: &[[u8; 12]]) -> Vec<u8> {
        records.concat()
    }

    fn count_nodes(node: &PathNode) -> (usize, usize) {
        match node {
            PathNode::Leaf { .. } => (0, 1),
            PathNode::Branch { children, .. } => children
                .iter()
                .map(count_nodes)
                .fold((1, 0), |(b, l), (cb, cl)| (b + cb, l + cl)),
        }
    }

    #[test]
    fn derived_child_range_parsing_works() {
        let data = 0x0003_0011;
        let range = ChildRange::from(data);

        assert_eq!(range.start(), 0x11);
        assert_eq!(range.count(), 3);
        assert_eq!(u32::from(range.start()), data & 0xFFFF);
        assert_eq!(u32::from(range.count()), data >> 16);
    }

    #[test]
    fn decode_two_level_tree() {
        let children = [100, 200, 300];
        let data = table(&[
            record(0, branch(1, 2)),
            record(11, branch(3, 2)),
            record(12, 300),
            record(21, 100),
            record(22, 200),
        ]);

        let root = decode_path_table(&data, &children).unwrap();

        assert_eq!(count_nodes(&root), (2, 3));
        assert_eq!(
            root,
            PathNode::Branch {
                decided_by: 0,
                children: vec![
                    PathNode::Branch {
                        decided_by: 11,
                        children: vec![
                            PathNode::Leaf {
                                decided_by: 21,
                                object_id: 100
                            },
                            PathNode::Leaf {
                                decided_by: 22,
                                object_id: 200
                            },
                        ],
                    },
                    PathNode::Leaf {
                        decided_by: 12,
                        object_id: 300
                    },
                ],
            }
        );
    }

    #[test]
    fn leaf_targets_are_container_children() {
        let children = [7, 8, 9, 10];
        let data = table(&[
            record(0, branch(1, 3)),
            record(1, 7),
            record(2, branch(4, 2)),
            record(3, 10),
            record(4, 8),
            record(5, 9),
        ]);

        let root = decode_path_table(&data, &children).unwrap();
        let leaves = root.leaves();

        assert_eq!(count_nodes(&root), (2, 4));
        assert_eq!(
            leaves.iter().map(|leaf| leaf.decided_by()).collect::<Vec<_>>(),
            [1, 4, 5, 3]
        );
        assert!(leaves.iter().all(|leaf| match leaf {
            PathNode::Leaf { object_id, .. } => children.contains(object_id),
            PathNode::Branch { .. } => false,
        }));
    }

    #[test]
    fn empty_table_gives_empty_root() {
        let root = decode_path_table(&[], &[1, 2]).unwrap();

        assert_eq!(root.decided_by(), 0);
        assert!(root.children().is_empty());
    }

    #[test]
    fn root_leaf_has_no_children() {
        let data = table(&[record(5, 42)]);
        let root = decode_path_table(&data, &[42]).unwrap();

        assert_eq!(
            root,
            PathNode::Leaf {
                decided_by: 5,
                object_id: 42
            }
        );
        assert!(root.children().is_empty());
    }

    #[test]
    fn trailing_partial_record_is_ignored() {
        let mut data = table(&[record(0, branch(1, 1)), record(3, 55)]);
        data.extend_from_slice(&[1, 2, 3, 4, 5]);

        let root = decode_path_table(&data, &[55]).unwrap();

        assert_eq!(count_nodes(&root), (1, 1));
    }

    #[test]
    fn index_out_of_range_is_rejected() {
        let data = table(&[record(0, branch(1, 2)), record(1, 9)]);

        assert!(decode_path_table(&data, &[9]).is_err_and(
            |e| e.kind() == PathErrorKind::OutOfRange { len: 2 } && e.offset() == 0
        ));
    }

    #[test]
    fn self_nesting_is_rejected() {
        let data = table(&[record(0, branch(1, 1)), record(1, branch(0, 1))]);

        assert!(decode_path_table(&data, &[9]).is_err_and(
            |e| e.kind() == PathErrorKind::Revisited { child: 0 } && e.offset() == 12
        ));
    }

    #[test]
    fn shared_record_is_rejected() {
        let data = table(&[
            record(0, branch(1, 2)),
            record(1, branch(3, 1)),
            record(2, branch(3, 1)),
            record(3, 9),
        ]);

        assert!(decode_path_table(&data, &[9])
            .is_err_and(|e| e.kind() == PathErrorKind::Revisited { child: 3 }));
    }

    #[test]
    fn overlapping_ranges_fail_fast() {
        // every branch shares a child with the next one
        let mut records: Vec<_> = (0..40)
            .map(|i| record(i, branch(u16::try_from(i + 1).unwrap(), 2)))
            .collect();
        records.extend([record(40, 9), record(41, 9)]);

        assert!(decode_path_table(&table(&records), &[9])
            .is_err_and(|e| matches!(e.kind(), PathErrorKind::Revisited { .. })));
    }

    #[test]
    fn deep_chain_is_rejected() {
        let mut records: Vec<_> = (0..60_000)
            .map(|i| record(i, branch(u16::try_from(i + 1).unwrap(), 1)))
            .collect();
        records.push(record(60_000, 9));

        assert!(decode_path_table(&table(&records), &[9])
            .is_err_and(|e| e.kind() == PathErrorKind::TooDeep && e.offset() == 256 * 12));
    }

    #[test]
    fn chain_within_depth_limit() {
        let mut records: Vec<_> = (0..200)
            .map(|i| record(i, branch(u16::try_from(i + 1).unwrap(), 1)))
            .collect();
        records.push(record(200, 9));

        let root = decode_path_table(&table(&records), &[9]).unwrap();

        assert_eq!(count_nodes(&root), (200, 1));
        assert_eq!(root.leaves()[0].decided_by(), 200);
    }
}
