//! # Message Ports
//!
//! Asynchronous, fire-and-forget delivery of frames between two parties.
//! Frames from one sender arrive in send order; nothing is shared besides
//! the channel itself.

use tokio::sync::mpsc;

use crate::error::ProtocolError;
use crate::frame::Frame;

/// Create a connected port pair
pub fn channel() -> (PortSender, PortReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (PortSender { tx }, PortReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct PortSender {
    tx: mpsc::UnboundedSender<Frame>,
}

impl PortSender {
    /// Post a frame. Never blocks.
    pub fn post(&self, frame: Frame) -> Result<(), ProtocolError> {
        self.tx.send(frame).map_err(|_| ProtocolError::Closed)
    }

    /// Post every frame in order, stopping at the first failure
    pub fn post_all(&self, frames: impl IntoIterator<Item = Frame>) -> Result<(), ProtocolError> {
        for frame in frames {
            self.post(frame)?;
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug)]
pub struct PortReceiver {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl PortReceiver {
    /// Wait for the next frame; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Take every frame that has already arrived
    pub fn drain(&mut self) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.rx.try_recv() {
            frames.push(frame);
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frames_arrive_in_send_order() {
        let (tx, mut rx) = channel();
        for i in 0..5 {
            tx.post(Frame::new("o", i.to_string())).unwrap();
        }

        for i in 0..5 {
            let frame = rx.recv().await.unwrap();
            assert_eq!(frame.payload, i.to_string());
        }
    }

    #[tokio::test]
    async fn test_drain_and_close() {
        let (tx, mut rx) = channel();
        tx.post_all(vec![Frame::new("o", "a"), Frame::new("o", "b")])
            .unwrap();
        assert_eq!(rx.drain().len(), 2);
        assert!(rx.drain().is_empty());

        drop(tx);
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_post_after_receiver_dropped() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(matches!(
            tx.post(Frame::new("o", "x")),
            Err(ProtocolError::Closed)
        ));
    }
}
