use crate::error::NodeError;
use listener_node_wire::constants::HEADER_LEN;
use listener_node_wire::header::Header;
use listener_node_wire::message::Frame;
use log::{debug, trace};
use std::io::{self, ErrorKind};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// reads one `Frame` from the stream.
///
/// returns `Ok(None)` when the peer closed the stream on a frame boundary,
/// a close anywhere inside a frame is an `UnexpectedEof` error.
pub async fn read_frame<S>(s: &mut S) -> Result<Option<Frame>, NodeError>
where
    S: AsyncRead + Unpin + Send,
{
    let mut header_buf = [0u8; HEADER_LEN];
    let mut filled = 0;
    while filled < HEADER_LEN {
        match s.read(&mut header_buf[filled..]).await? {
            0 if filled == 0 => {
                debug!("stream closed by the peer");
                return Ok(None);
            }
            0 => {
                return Err(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    format!("stream closed after {filled} header bytes"),
                )
                .into())
            }
            n => filled += n,
        }
    }
    debug!("incoming header: {:?}", header_buf);

    let header = Header::try_from(&header_buf[..])?;
    trace!("{:?}", header);

    let mut body = vec![0u8; header.body_len()];
    s.read_exact(&mut body).await?;
    Ok(Some(Frame::from_parts(header, &body)?))
}

/// writes the `Frame` and flushes the stream.
pub async fn write_frame<S>(s: &mut S, frame: &Frame) -> Result<(), NodeError>
where
    S: AsyncWrite + Unpin + Send,
{
    trace!("writing {} frame for {}", frame.header.pkt_type, frame.topic);
    s.write_all(&frame.bytes()).await?;
    s.flush().await?;
    Ok(())
}
