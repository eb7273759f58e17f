//! Read reference graphs from a plain-text edge list.
//!
//! One record per line, fields separated by whitespace, `#` starts a comment:
//!
//! ```text
//! # a heterodimer
//! node 0 A
//! node 1 B
//! edge 0 1 ab
//! ```
//!
//! Nodes may be declared in any order relative to the edges that use them.

use std::{fs, path::Path};

use crate::{
    error::{NetworkError, Result},
    graph::{NodeId, TypedGraph},
};

/// Parse a graph file.
pub fn parse(p: &Path) -> Result<TypedGraph> {
    parse_graph_str(&fs::read_to_string(p)?)
}

/// Parse a graph from the contents of a graph file.
pub fn parse_graph_str(input: &str) -> Result<TypedGraph> {
    let mut builder = TypedGraph::builder();

    for (ix, raw) in input.lines().enumerate() {
        let line = ix + 1;
        let content = raw.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }

        let fields: Vec<&str> = content.split_whitespace().collect();
        builder = match fields.as_slice() {
            ["node", id, kind] => builder.node(parse_id(id, line)?, *kind),
            ["edge", u, v, kind] => builder.edge(parse_id(u, line)?, parse_id(v, line)?, *kind),
            [keyword @ ("node" | "edge"), ..] => {
                return Err(NetworkError::Parse {
                    line,
                    reason: format!("wrong number of fields for `{keyword}`"),
                })
            }
            [other, ..] => {
                return Err(NetworkError::Parse {
                    line,
                    reason: format!("unknown record `{other}`"),
                })
            }
            [] => continue,
        };
    }

    builder.build()
}

fn parse_id(field: &str, line: usize) -> Result<NodeId> {
    field.parse().map_err(|e| NetworkError::Parse {
        line,
        reason: format!("bad node id `{field}`: {e}"),
    })
}
