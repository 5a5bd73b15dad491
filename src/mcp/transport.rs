use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::handler::McpHandler;

/// stdio 传输，每行一个 JSON-RPC 消息
pub async fn serve_stdio(handler: McpHandler) -> std::io::Result<()> {
    serve_lines(handler, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await
}

/// 逐行读取请求并写回响应，输入结束时返回
///
/// 按字节读取，非 UTF-8 的行返回解析错误而不是中断循环。
pub async fn serve_lines<R, W>(handler: McpHandler, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        if let Some(response) = handler.handle_bytes(line).await {
            let mut payload = serde_json::to_vec(&response)?;
            payload.push(b'\n');
            writer.write_all(&payload).await?;
            writer.flush().await?;
        }
    }

    tracing::info!("stdin closed, stopping stdio transport");
    Ok(())
}
