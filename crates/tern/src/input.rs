//! Reading DNS messages from files and stdin.

use anyhow::{Context, Result, bail};
use data_encoding::HEXLOWER_PERMISSIVE;
use std::path::Path;
use tokio::io::AsyncReadExt;

use tern_proto::wire::next_tcp_frame;

/// Reads all input from `path`, or stdin when `path` is `None` or `-`.
pub async fn read_input(path: Option<&Path>) -> Result<Vec<u8>> {
    match path {
        Some(p) if p != Path::new("-") => tokio::fs::read(p)
            .await
            .with_context(|| format!("failed to read {}", p.display())),
        _ => {
            let mut data = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut data)
                .await
                .context("failed to read stdin")?;
            Ok(data)
        }
    }
}

/// Decodes hex text, ignoring whitespace and case.
pub fn decode_hex(text: &[u8]) -> Result<Vec<u8>> {
    let digits: Vec<u8> = text
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    HEXLOWER_PERMISSIVE
        .decode(&digits)
        .map_err(|e| anyhow::anyhow!("invalid hex input: {e}"))
}

/// Splits input into messages.
///
/// Without `tcp` the whole input is one message. With it, the input is a
/// stream of 2-byte length-prefixed messages that must end on a boundary.
pub fn split_messages(data: &[u8], tcp: bool) -> Result<Vec<&[u8]>> {
    if !tcp {
        return Ok(vec![data]);
    }

    let mut messages = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let Some((message, used)) = next_tcp_frame(rest) else {
            bail!(
                "incomplete TCP frame at offset {}",
                data.len() - rest.len()
            );
        };
        messages.push(message);
        rest = &rest[used..];
    }
    Ok(messages)
}
