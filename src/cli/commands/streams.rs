//! Streams command - Cluster issues into independent work streams

use std::path::Path;

use serde::Serialize;

use crate::domain::{
    detect_stream_position, detect_work_streams, PipelinePosition, WorkStreamDetection,
};
use crate::errors::Result;
use crate::fs::read_json;
use crate::schemas::{IssueFileOwnership, IssueState};

use super::{print_json, resolve_input};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamPosition {
    stream_id: String,
    position: PipelinePosition,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StreamsReport {
    #[serde(flatten)]
    detection: WorkStreamDetection,
    #[serde(skip_serializing_if = "Option::is_none")]
    positions: Option<Vec<StreamPosition>>,
}

fn build_report(ownership: &[IssueFileOwnership], issues: Option<&[IssueState]>) -> StreamsReport {
    let detection = detect_work_streams(ownership);
    let positions = issues.map(|issues| {
        detection
            .streams
            .iter()
            .map(|stream| StreamPosition {
                stream_id: stream.id.clone(),
                position: detect_stream_position(stream, issues),
            })
            .collect()
    });
    StreamsReport {
        detection,
        positions,
    }
}

pub fn run(cwd: Option<&Path>, file: &Path, positions: Option<&Path>, json: bool) -> Result<()> {
    let ownership: Vec<IssueFileOwnership> = read_json(&resolve_input(cwd, file))?;
    let issues: Option<Vec<IssueState>> = match positions {
        Some(path) => Some(read_json(&resolve_input(cwd, path))?),
        None => None,
    };
    let report = build_report(&ownership, issues.as_deref());

    if json {
        return print_json(&report);
    }

    println!(
        "{} issues in {} streams",
        report.detection.total_issues, report.detection.total_streams
    );
    for (i, stream) in report.detection.streams.iter().enumerate() {
        println!("{}: {}", stream.id, stream.rationale);
        if let Some(position) = report.positions.as_ref().and_then(|p| p.get(i)) {
            println!("  phase {}: {}", position.position.phase, position.position.reason);
        }
    }
    Ok(())
}
