// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::{Path, PathBuf};

use sr_cli::stats::RecordingStats;
use sr_cli::{Cli, Commands, Parser};
use sr_domain_types::{
    ConsoleEvent, ConsoleLevel, DomPatch, ElementData, NodeData, SnapshotNode, SourceEvent,
    SyntheticId,
};
use sr_format::{RecordingWriter, WriterConfig, is_compressed};
use tempfile::TempDir;

fn session() -> Vec<SourceEvent> {
    vec![
        SourceEvent::new(
            0,
            DomPatch::snapshot(
                1u64,
                vec![
                    SnapshotNode::document(1u64, vec![SyntheticId::new(2)]),
                    SnapshotNode::element(2u64, ElementData::new("main"), vec![]),
                ],
            ),
        ),
        SourceEvent::new(40, DomPatch::insert(2u64, 3u64, 0, NodeData::text("ready"))),
        SourceEvent::new(60, ConsoleEvent::text(ConsoleLevel::Info, "loaded")),
        SourceEvent::new(90, DomPatch::set_text(3u64, "done")),
    ]
}

fn write_recording(dir: &Path, compress: bool) -> anyhow::Result<PathBuf> {
    let path = dir.join("session.sr");
    let mut writer = RecordingWriter::create(&path, WriterConfig::default().with_compression(compress))?;
    for event in session() {
        writer.append(&event)?;
    }
    writer.finish()?;
    Ok(path)
}

async fn run(args: &[&str]) -> anyhow::Result<String> {
    let cli = Cli::try_parse_from(std::iter::once("sr").chain(args.iter().copied()))?;
    let mut out = Vec::new();
    cli.command.run(&mut out).await?;
    Ok(String::from_utf8(out)?)
}

#[sr_test_utils::logged_tokio_test]
async fn inspect_prints_filtered_jsonl() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_recording(dir.path(), true)?;
    let path = path.to_string_lossy();

    let all = run(&["inspect", &path]).await?;
    assert_eq!(all.lines().count(), 4);

    let dom = run(&["inspect", &path, "--kind", "dom", "--from", "10"]).await?;
    let lines: Vec<serde_json::Value> = dom
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"], 1);
    assert_eq!(lines[1]["time"], 90);
    assert!(lines.iter().all(|line| line["kind"] == "dom"));
    Ok(())
}

#[sr_test_utils::logged_tokio_test]
async fn replay_materializes_the_document() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = write_recording(dir.path(), false)?;
    let path = path.to_string_lossy();

    let json: serde_json::Value = serde_json::from_str(&run(&["replay", &path, "--at", "70"]).await?)?;
    assert_eq!(json["time"], 70);
    assert_eq!(json["nodes"], 3);
    assert_eq!(json["document"]["type"], "document");
    assert_eq!(json["window"].as_array().map(Vec::len), Some(1));

    let html = run(&["replay", &path, "--at", "500", "--html"]).await?;
    assert_eq!(html.trim(), "<main>done</main>");
    Ok(())
}

#[sr_test_utils::logged_tokio_test]
async fn replay_reports_broken_files() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("broken.sr");
    std::fs::write(&path, [3, 0, 0, 0, 1])?;

    let err = run(&["replay", &path.to_string_lossy()]).await.unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to load"));
    Ok(())
}

#[sr_test_utils::logged_tokio_test]
async fn compress_round_trips() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let raw = write_recording(dir.path(), false)?;
    let packed = dir.path().join("packed.srz");
    let unpacked = dir.path().join("unpacked.sr");

    run(&["compress", &raw.to_string_lossy(), &packed.to_string_lossy(), "--quality", "5"]).await?;
    assert!(is_compressed(&std::fs::read(&packed)?));

    run(&["compress", &packed.to_string_lossy(), &unpacked.to_string_lossy(), "--decompress"]).await?;
    assert_eq!(std::fs::read(&unpacked)?, std::fs::read(&raw)?);
    Ok(())
}

#[sr_test_utils::logged_test]
fn stats_count_kinds_and_replay_the_tree() {
    let stats = RecordingStats::collect(&session(), 128, false);
    assert_eq!(stats.events, 4);
    assert_eq!(stats.duration_ms, 90);
    assert_eq!(stats.kinds.get("dom"), Some(&3));
    assert_eq!(stats.kinds.get("console"), Some(&1));
    assert_eq!(stats.patches.get("insert"), Some(&1));
    assert_eq!(stats.final_nodes, 3);
    assert!(stats.broken_at.is_none());

    let mut broken = session();
    broken.push(SourceEvent::new(100, DomPatch::remove(42u64)));
    let stats = RecordingStats::collect(&broken, 128, false);
    assert!(stats.broken_at.unwrap().starts_with("event #4 at 100ms"));
}

#[test]
fn commands_parse() {
    let cli = Cli::try_parse_from(["sr", "--log-level", "debug", "stats", "x.sr", "--json"]).unwrap();
    assert!(matches!(cli.command, Commands::Stats(ref args) if args.json));
    assert!(Cli::try_parse_from(["sr", "compress", "a", "b", "--quality", "12"]).is_err());
}
