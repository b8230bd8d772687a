//! Framed stdin/stdout wire protocol between the indexing host and the
//! extraction session.
//!
//! A request frame is a sequence of field lines `name: <byte-len>\n`, each
//! followed by exactly `byte-len` raw bytes and a newline; a bare empty line
//! closes the frame. The `command` field selects open/getnext/getipath and
//! `filename` names the target file. Replies mirror the shape: plain fields
//! for status, mimetype and the continuation signal, length-prefixed fields
//! for the binary payload.

use std::collections::HashMap;
use std::path::Path;

use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};
use tracing::{debug, warn};

use crate::error::{LupeError, Result};
use crate::session::{ExtractReply, ExtractionSession, Params};

pub type RawParams = HashMap<String, Vec<u8>>;

/// Read one request frame. Returns `None` on clean end-of-stream between
/// frames; EOF inside a frame is a protocol error.
pub async fn read_request<R>(reader: &mut R) -> Result<Option<RawParams>>
where
    R: AsyncBufRead + Unpin,
{
    let mut params = RawParams::new();
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            if params.is_empty() {
                return Ok(None);
            }
            return Err(LupeError::Protocol(
                "unexpected EOF inside request frame".to_string(),
            ));
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            if params.is_empty() {
                // Stray blank line between frames.
                continue;
            }
            return Ok(Some(params));
        }
        let Some((name, len)) = trimmed.split_once(':') else {
            return Err(LupeError::Protocol(format!(
                "malformed field line: {trimmed:?}"
            )));
        };
        let len: usize = len.trim().parse().map_err(|_| {
            LupeError::Protocol(format!("invalid field length in line: {trimmed:?}"))
        })?;
        let mut data = vec![0u8; len];
        reader.read_exact(&mut data).await?;
        // Field data is followed by a single newline.
        let mut newline = [0u8; 1];
        reader.read_exact(&mut newline).await?;
        params.insert(name.trim().to_ascii_lowercase(), data);
    }
}

/// Write a full reply frame for one getnext/getipath call.
pub async fn write_reply<W>(writer: &mut W, reply: &ExtractReply) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("Ok: {}\n", u8::from(reply.ok)).as_bytes())
        .await?;
    if let Some(mime) = &reply.mime_type {
        writer
            .write_all(format!("Mimetype: {mime}\n").as_bytes())
            .await?;
    }
    writer
        .write_all(format!("Ipath: {}\n", reply.ipath.len()).as_bytes())
        .await?;
    writer.write_all(reply.ipath.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer
        .write_all(format!("Document: {}\n", reply.document.len()).as_bytes())
        .await?;
    writer.write_all(&reply.document).await?;
    writer.write_all(b"\n").await?;
    writer
        .write_all(format!("Eof: {}\n", reply.continuation.as_wire()).as_bytes())
        .await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Minimal acknowledgement frame for `open`.
async fn write_ack<W>(writer: &mut W, ok: bool) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(format!("Ok: {}\n\n", u8::from(ok)).as_bytes())
        .await?;
    writer.flush().await?;
    Ok(())
}

fn decode_params(raw: &RawParams) -> Params {
    raw.iter()
        .map(|(k, v)| (k.clone(), String::from_utf8_lossy(v).into_owned()))
        .collect()
}

/// One-shot extraction outside the host loop: render the document for a
/// single file to `writer`. Returns whether a document was produced.
pub async fn run_single<W>(
    writer: &mut W,
    session: &mut ExtractionSession,
    path: &Path,
) -> Result<bool>
where
    W: AsyncWrite + Unpin,
{
    let mut params = Params::new();
    params.insert("filename".to_string(), path.display().to_string());
    let reply = session.get_ipath(&params).await;
    if !reply.ok {
        return Ok(false);
    }
    writer.write_all(&reply.document).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(true)
}

/// Drive the session until the host closes its end of the stream.
pub async fn run<R, W>(
    reader: R,
    mut writer: W,
    mut session: ExtractionSession,
    trace_requests: bool,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    loop {
        let raw = match read_request(&mut reader).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("host closed the request stream");
                return Ok(());
            }
            Err(e) => {
                // Frame boundaries are lost after a malformed frame; answer
                // the host once and stop rather than replying to garbage.
                warn!(error = %e, "malformed request frame, shutting down");
                write_reply(&mut writer, &ExtractReply::failure()).await?;
                return Err(e);
            }
        };

        let params = decode_params(&raw);
        if trace_requests {
            debug!(?params, "host request");
        }

        let command = params.get("command").map(String::as_str).unwrap_or("");
        match command {
            "open" => {
                let ok = session.open(&params);
                write_ack(&mut writer, ok).await?;
            }
            "getnext" => {
                let reply = session.get_next(&params).await;
                write_reply(&mut writer, &reply).await?;
            }
            "getipath" => {
                let reply = session.get_ipath(&params).await;
                write_reply(&mut writer, &reply).await?;
            }
            other => {
                warn!(command = %other, "unknown command");
                write_reply(&mut writer, &ExtractReply::failure()).await?;
            }
        }
    }
}
