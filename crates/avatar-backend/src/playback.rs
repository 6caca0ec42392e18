//! Audio playback — synthesized speech via `rodio`.

use std::io::Cursor;

use avatar_core::ports::GatewayError;

/// Decode a WAV byte buffer and play it to completion on the default
/// output device.
///
/// Runs on a blocking thread; the rodio output stream must stay alive for
/// the duration of playback and is dropped when the sink drains.
pub async fn play_wav_bytes(bytes: Vec<u8>) -> Result<(), GatewayError> {
    tokio::task::spawn_blocking(move || -> Result<(), GatewayError> {
        let (_stream, stream_handle) = rodio::OutputStream::try_default()
            .map_err(|e| GatewayError::OutputStream(e.to_string()))?;

        let sink = rodio::Sink::try_new(&stream_handle)
            .map_err(|e| GatewayError::OutputStream(e.to_string()))?;

        let source = rodio::Decoder::new(Cursor::new(bytes))
            .map_err(|e| GatewayError::OutputStream(e.to_string()))?;

        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    })
    .await
    .map_err(|e| GatewayError::OutputStream(e.to_string()))?
}
