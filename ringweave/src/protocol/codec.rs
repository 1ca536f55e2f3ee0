use crate::error::{Result, RingweaveError};
use crate::protocol::message::Frame;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Size of the little-endian `u32` length prefix in front of every frame.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Encode a frame as `[len: u32 LE][rkyv bytes]`.
pub fn encode_frame(frame: &Frame) -> Result<Vec<u8>> {
    let body = rkyv::to_bytes::<rkyv::rancor::Error>(frame)
        .map_err(|e| RingweaveError::EncodeFailed(e.to_string()))?;

    if body.len() > u32::MAX as usize {
        return Err(RingweaveError::EncodeFailed(format!(
            "frame too large for length prefix: {} bytes exceeds u32::MAX",
            body.len()
        )));
    }

    let mut buf = Vec::with_capacity(LEN_PREFIX_SIZE + body.len());
    buf.extend_from_slice(&(body.len() as u32).to_le_bytes());
    buf.extend_from_slice(&body);
    Ok(buf)
}

/// Decode a frame body (without the length prefix).
pub fn decode_body(body: &[u8]) -> Result<Frame> {
    // rkyv validates alignment; socket buffers carry none.
    let mut aligned = rkyv::util::AlignedVec::<16>::with_capacity(body.len());
    aligned.extend_from_slice(body);
    rkyv::from_bytes::<Frame, rkyv::rancor::Error>(&aligned)
        .map_err(|e| RingweaveError::DecodeFailed(e.to_string()))
}

/// Write one frame and flush.
pub async fn write_frame<W>(writer: &mut W, frame: &Frame) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let buf = encode_frame(frame)?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one frame. Returns `Ok(None)` on a clean end of stream at a frame boundary.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LEN_PREFIX_SIZE];
    match reader.read_exact(&mut prefix).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u32::from_le_bytes(prefix) as usize;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await?;
    decode_body(&body).map(Some)
}
