//! Work-stream detection
//!
//! Issues that touch the same file, or where one blocks another within the
//! same batch, must be handled by one worker. Everything else can run in
//! parallel. Streams are the connected components of that graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::schemas::IssueFileOwnership;

use super::union_find::{KeyedUnionFind, NodeId};

/// Rationale returned when there is nothing to cluster
pub const EMPTY_INPUT_RATIONALE: &str = "No issues provided; nothing to cluster";

/// Why a stream's members were grouped
pub const INDEPENDENT_RATIONALE: &str = "independent";
pub const BLOCKED_BY_RATIONALE: &str = "co-clustered via blockedBy relationship";

/// Issues that one worker should handle together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStream {
    /// `stream-<n1>-<n2>-...` over the sorted members
    pub id: String,
    /// Ascending
    pub issues: Vec<u64>,
    /// Files referenced by two or more members, sorted
    pub shared_files: Vec<String>,
    pub primary_issue: u64,
    pub rationale: String,
}

impl WorkStream {
    pub fn is_singleton(&self) -> bool {
        self.issues.len() == 1
    }

    pub fn contains(&self, number: u64) -> bool {
        self.issues.binary_search(&number).is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStreamDetection {
    /// Ordered by primary issue
    pub streams: Vec<WorkStream>,
    pub total_issues: usize,
    pub total_streams: usize,
    pub rationale: String,
}

/// Cluster issues into independent work streams.
///
/// Output does not depend on input order. Repeated issue numbers are merged.
/// A `blockedBy` entry pointing outside the batch is ignored.
pub fn detect_work_streams(issues: &[IssueFileOwnership]) -> WorkStreamDetection {
    if issues.is_empty() {
        return WorkStreamDetection {
            streams: Vec::new(),
            total_issues: 0,
            total_streams: 0,
            rationale: EMPTY_INPUT_RATIONALE.to_string(),
        };
    }

    // number -> distinct files, merged across duplicate entries
    let mut files_by_issue: BTreeMap<u64, BTreeSet<&str>> = BTreeMap::new();
    for issue in issues {
        files_by_issue
            .entry(issue.number)
            .or_default()
            .extend(issue.files.iter().map(String::as_str));
    }

    let nodes = files_by_issue.iter().flat_map(|(&number, files)| {
        std::iter::once(NodeId::Issue(number))
            .chain(files.iter().map(|file| NodeId::File(file.to_string())))
    });
    let mut uf = KeyedUnionFind::from_keys(nodes);

    for (&number, files) in &files_by_issue {
        for file in files {
            uf.union(&NodeId::Issue(number), &NodeId::File(file.to_string()));
        }
    }
    // blockers outside the batch have no node, so union ignores them
    for issue in issues {
        for &blocker in &issue.blocked_by {
            uf.union(&NodeId::Issue(blocker), &NodeId::Issue(issue.number));
        }
    }

    let mut components: BTreeMap<usize, Vec<u64>> = BTreeMap::new();
    for &number in files_by_issue.keys() {
        if let Some(root) = uf.find(&NodeId::Issue(number)) {
            components.entry(root).or_default().push(number);
        }
    }

    let mut streams: Vec<WorkStream> = components
        .into_values()
        .map(|members| build_stream(members, &files_by_issue))
        .collect();
    streams.sort_by_key(|s| s.primary_issue);

    let rationale = streams
        .iter()
        .map(|s| format!("{}: {}", s.id, s.rationale))
        .collect::<Vec<_>>()
        .join("; ");

    tracing::debug!(
        issues = files_by_issue.len(),
        streams = streams.len(),
        "work streams detected"
    );

    WorkStreamDetection {
        total_issues: files_by_issue.len(),
        total_streams: streams.len(),
        streams,
        rationale,
    }
}

fn build_stream(
    mut members: Vec<u64>,
    files_by_issue: &BTreeMap<u64, BTreeSet<&str>>,
) -> WorkStream {
    members.sort_unstable();

    let mut file_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for number in &members {
        if let Some(files) = files_by_issue.get(number) {
            for file in files {
                *file_counts.entry(*file).or_default() += 1;
            }
        }
    }
    let shared_files: Vec<String> = file_counts
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(file, _)| file.to_string())
        .collect();

    let id = format!(
        "stream-{}",
        members
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("-")
    );

    let rationale = if members.len() == 1 {
        INDEPENDENT_RATIONALE.to_string()
    } else if !shared_files.is_empty() {
        format!("issues share [{}]", shared_files.join(", "))
    } else {
        BLOCKED_BY_RATIONALE.to_string()
    };

    WorkStream {
        id,
        primary_issue: members[0],
        issues: members,
        shared_files,
        rationale,
    }
}
