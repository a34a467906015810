//! Container reader
//!
//! Wraps an open packet source, selects the video stream and filters the
//! packet flow down to that stream.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{PlayerError, Result};

use super::backend::{MediaBackend, MediaKind, PacketSource, StreamDescriptor};

/// Reader over one open container
pub struct ContainerReader<S: PacketSource> {
    source: S,
    streams: Vec<StreamDescriptor>,
    video_stream: Option<StreamDescriptor>,
    discarded_packets: u64,
}

impl<S: PacketSource> ContainerReader<S> {
    /// Open `path` through `backend` and read its stream table
    pub fn open<B>(backend: &B, path: &Path) -> Result<Self>
    where
        B: MediaBackend<Source = S>,
    {
        if !path.exists() {
            return Err(PlayerError::Open {
                path: path.to_path_buf(),
                reason: "file not found".to_string(),
            });
        }

        let source = backend.open_source(path)?;
        let streams = source.streams();

        if streams.is_empty() {
            return Err(PlayerError::NoStreamInfo {
                path: path.to_path_buf(),
            });
        }

        info!("Opened {} with {} streams", path.display(), streams.len());
        for stream in &streams {
            info!(
                "  Stream #{}: {:?} {} @ {}/{}",
                stream.index,
                stream.kind,
                stream.codec,
                stream.avg_frame_rate.0,
                stream.avg_frame_rate.1
            );
        }

        Ok(Self {
            source,
            streams,
            video_stream: None,
            discarded_packets: 0,
        })
    }

    /// Select the first video stream in declaration order
    pub fn select_video_stream(&mut self) -> Result<StreamDescriptor> {
        let mut selected: Option<&StreamDescriptor> = None;

        // Every stream is visited; later video streams are ignored
        for stream in &self.streams {
            if stream.kind == MediaKind::Video && selected.is_none() {
                selected = Some(stream);
            }
        }

        let stream = selected.cloned().ok_or(PlayerError::NoVideoStream {
            stream_count: self.streams.len(),
        })?;

        info!("Selected video stream #{} ({})", stream.index, stream.codec);
        self.video_stream = Some(stream.clone());
        Ok(stream)
    }

    /// Next packet of the selected stream, or `None` at end of stream
    ///
    /// Packets of other streams are dropped. Before a stream is selected
    /// every packet is dropped.
    pub fn read_packet(&mut self) -> Option<S::Packet> {
        let video_index = self.video_stream.as_ref().map(|s| s.index);

        loop {
            let (index, packet) = self.source.next_packet()?;
            if Some(index) == video_index {
                return Some(packet);
            }
            self.discarded_packets += 1;
            debug!("Discarded packet from stream #{}", index);
        }
    }

    /// The underlying packet source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Packets dropped because they belonged to another stream
    pub fn discarded_packets(&self) -> u64 {
        self.discarded_packets
    }
}
