use std::io::Cursor;
use std::path::Path;

use anyhow::Context;
use colored::{ColoredString, Colorize};
use fos_protocol::{inspect_frame, read_batch, Batch, FrameSummary, ProtocolConfig, RequestKind};
use fos_types::Status;
use serde_json::json;
use tracing::{debug, warn};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, cli.config.as_deref(), &cli.format),
        Command::Config(args) => cmd_config(args, cli.config.as_deref()),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ProtocolConfig> {
    match path {
        Some(path) => ProtocolConfig::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(ProtocolConfig::default()),
    }
}

fn cmd_inspect(
    args: InspectArgs,
    config: Option<&Path>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    debug!(path = %args.path.display(), len = bytes.len(), "inspecting");

    let mut input = Cursor::new(bytes.as_slice());
    let output = if args.batch {
        let batch = read_batch(&mut input, &config).context("decoding request batch")?;
        match format {
            OutputFormat::Text => render_batch_text(&batch),
            OutputFormat::Json => serde_json::to_string_pretty(&batch_json(&batch))?,
        }
    } else {
        let summary = inspect_frame(&mut input, &config).context("decoding reply frame")?;
        match format {
            OutputFormat::Text => render_frame_text(&summary),
            OutputFormat::Json => serde_json::to_string_pretty(&summary)?,
        }
    };
    println!("{output}");

    let trailing = bytes.len() as u64 - input.position();
    if trailing > 0 {
        warn!(trailing, "bytes after the end of the frame");
    }
    if args.hex {
        println!("{}", hex::encode(&bytes).dimmed());
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs, global: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(args.path.as_deref().or(global))?;
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn paint(status: Status) -> ColoredString {
    match status {
        Status::Ok => status.name().green(),
        Status::Warn | Status::Rollback => status.name().yellow(),
        _ => status.name().red().bold(),
    }
}

pub fn render_frame_text(summary: &FrameSummary) -> String {
    let mut out = format!(
        "Frame v{} {} ({} bytes)",
        summary.version,
        paint(summary.status),
        summary.size
    );
    if let Some(message) = &summary.message {
        out.push_str(&format!("\n  message: {}", message.bold()));
    }
    if let Some(skipped) = summary.skipped {
        out.push_str(&format!("\n  rollback, {skipped} bytes skipped"));
    }
    if summary.skipped.is_none() && summary.message.is_none() {
        out.push_str(&format!(", {} replies", summary.replies.len()));
    }
    for reply in &summary.replies {
        out.push_str(&format!(
            "\n  {}  {}  len {}",
            reply.request.to_string().cyan(),
            paint(reply.status),
            reply.length
        ));
        if let Some(oid) = reply.oid {
            out.push_str(&format!("  {}", oid.to_string().blue()));
        }
        if let Some(message) = &reply.message {
            out.push_str(&format!("  \"{message}\""));
        }
    }
    let failures = summary.failures().count();
    if failures > 0 {
        out.push_str(&format!("\n{} failing replies", failures.to_string().red()));
    }
    out
}

pub fn render_batch_text(batch: &Batch) -> String {
    let mut out = format!("Batch v{}, {} requests", batch.version, batch.requests.len());
    for (id, kind) in &batch.requests {
        out.push_str(&format!(
            "\n  {}  {}  {}",
            id.to_string().cyan(),
            kind.name().bold(),
            describe(kind)
        ));
    }
    out
}

fn describe(kind: &RequestKind) -> String {
    match kind {
        RequestKind::Begin(r) => format!("optimistic={}", r.optimistic),
        RequestKind::Commit(_) | RequestKind::Rollback(_) => String::new(),
        RequestKind::Fetch(r) => {
            let fields: Vec<&str> = r.fields.iter().map(|t| t.name()).collect();
            format!("{} [{}]", r.oid, fields.join(", "))
        }
        RequestKind::Insert(r) => format!("class {} with {} values", r.class_id, r.values.len()),
        RequestKind::Update(r) => format!("{} with {} values", r.oid, r.values.len()),
        RequestKind::Delete(r) => r.oid.to_string(),
    }
}

fn batch_json(batch: &Batch) -> serde_json::Value {
    let requests: Vec<serde_json::Value> = batch
        .requests
        .iter()
        .map(|(id, kind)| {
            json!({
                "request": id.as_u32(),
                "kind": kind.name(),
                "detail": describe(kind),
            })
        })
        .collect();
    json!({
        "version": batch.version,
        "requests": requests,
    })
}

#[cfg(test)]
mod tests {
    use fos_protocol::{CommitRequest, DeleteRequest, Message, ReplyBuilder};
    use fos_types::{Oid, RequestId};

    use super::*;

    #[test]
    fn frame_text_lists_replies() {
        let frame = ReplyBuilder::new(1)
            .reply(RequestId::new(1), Status::Ok, vec![0u8; 4])
            .reply_with_message(RequestId::new(2), Status::Error, Vec::<u8>::new(), "disk full")
            .finish()
            .unwrap();
        let summary = inspect_frame(&mut Cursor::new(frame), &ProtocolConfig::default()).unwrap();
        let text = render_frame_text(&summary);
        assert!(text.contains("req#1"));
        assert!(text.contains("\"disk full\""));
        assert!(text.contains("2 replies"));
    }

    #[test]
    fn batch_json_names_kinds() {
        let mut message = Message::default();
        message.add_request(DeleteRequest { oid: Oid::new(2, 3) }).unwrap();
        message.add_request(CommitRequest::default()).unwrap();
        let bytes = message.encode().unwrap();
        let batch =
            read_batch(&mut Cursor::new(bytes.to_vec()), &ProtocolConfig::default()).unwrap();

        let json = batch_json(&batch);
        assert_eq!(json["requests"][0]["kind"], "Delete");
        assert_eq!(json["requests"][0]["detail"], "OID:2-3");
        assert_eq!(json["requests"][1]["request"], 2);
    }
}
