//! Length-prefixed frames.
//!
//! ```text
//! u32 BE  total length, header included
//! u8      message type (0 = response)
//! i32 BE  sequence number
//! ...     payload
//! ```

use crate::error::{ArchitectError, Result};

pub const HEADER_LEN: usize = 9;

/// Largest frame either side will send or buffer, header included.
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Message type reserved for responses.
pub const RESPONSE: u8 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: u8,
    pub sequence: i32,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(message_type: u8, sequence: i32, payload: Vec<u8>) -> Self {
        Self {
            message_type,
            sequence,
            payload,
        }
    }

    pub fn response(sequence: i32, payload: Vec<u8>) -> Self {
        Self::new(RESPONSE, sequence, payload)
    }

    pub fn is_response(&self) -> bool {
        self.message_type == RESPONSE
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let total = HEADER_LEN + self.payload.len();
        if total > MAX_FRAME_LEN {
            return Err(ArchitectError::Transport(format!(
                "payload of {} bytes exceeds the {} byte frame limit",
                self.payload.len(),
                MAX_FRAME_LEN
            )));
        }
        let total = total as u32;
        let mut out = Vec::with_capacity(total as usize);
        out.extend_from_slice(&total.to_be_bytes());
        out.push(self.message_type);
        out.extend_from_slice(&self.sequence.to_be_bytes());
        out.extend_from_slice(&self.payload);
        Ok(out)
    }
}

/// Reassembles frames from a byte stream that may split or batch them.
#[derive(Debug)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    max_len: usize,
    /// Bytes of an oversized frame still to arrive and be dropped.
    discard: usize,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::with_max_len(MAX_FRAME_LEN)
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            buffer: Vec::new(),
            max_len: max_len.max(HEADER_LEN),
            discard: 0,
        }
    }

    pub fn push(&mut self, data: &[u8]) {
        let skip = self.discard.min(data.len());
        self.discard -= skip;
        self.buffer.extend_from_slice(&data[skip..]);
    }

    /// Bytes received but not yet returned as a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// The next complete frame, if one has fully arrived.
    ///
    /// A frame declaring a length shorter than the header or longer than the
    /// limit is logged and skipped without being buffered.
    pub fn next_frame(&mut self) -> Option<Frame> {
        loop {
            let prefix: [u8; 4] = self.buffer.get(..4)?.try_into().ok()?;
            let declared = u32::from_be_bytes(prefix) as usize;

            if declared < HEADER_LEN {
                let skip = declared.max(prefix.len());
                if self.buffer.len() < skip {
                    return None;
                }
                log::warn!("dropping frame with declared length {}", declared);
                self.buffer.drain(..skip);
                continue;
            }
            if declared > self.max_len {
                log::warn!(
                    "dropping frame with declared length {} over the {} byte limit",
                    declared,
                    self.max_len
                );
                let now = declared.min(self.buffer.len());
                self.buffer.drain(..now);
                self.discard = declared - now;
                continue;
            }
            if self.buffer.len() < declared {
                return None;
            }

            let frame: Vec<u8> = self.buffer.drain(..declared).collect();
            return Some(Frame {
                message_type: frame[4],
                sequence: i32::from_be_bytes([frame[5], frame[6], frame[7], frame[8]]),
                payload: frame[HEADER_LEN..].to_vec(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let bytes = Frame::new(1, 258, vec![0xab, 0xcd]).encode().unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 11, 1, 0, 0, 1, 2, 0xab, 0xcd]);
        assert_eq!(Frame::response(-1, vec![]).encode().unwrap(), vec![0, 0, 0, 9, 0, 0xff, 0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_split_and_batched_frames() {
        let first = Frame::new(1, 0, b"hello".to_vec());
        let second = Frame::response(0, vec![1]);
        let mut stream = first.encode().unwrap();
        stream.extend(second.encode().unwrap());

        let mut decoder = FrameDecoder::new();
        decoder.push(&stream[..3]);
        assert_eq!(decoder.next_frame(), None);
        decoder.push(&stream[3..12]);
        assert_eq!(decoder.next_frame(), None);
        decoder.push(&stream[12..]);
        assert_eq!(decoder.next_frame(), Some(first));
        assert_eq!(decoder.next_frame(), Some(second));
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_short_declared_length_is_skipped() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&[0, 0, 0, 6, 9, 9]);
        decoder.push(&Frame::new(3, 7, vec![]).encode().unwrap());
        assert_eq!(decoder.next_frame(), Some(Frame::new(3, 7, vec![])));
    }

    #[test]
    fn test_oversized_frame_is_skipped() {
        let mut decoder = FrameDecoder::with_max_len(16);
        let mut oversized = vec![0, 0, 0, 40, 1, 0, 0, 0, 1];
        oversized.extend([7u8; 31]);
        decoder.push(&oversized[..12]);
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.buffered(), 0);

        let next = Frame::new(2, 3, vec![1, 2]);
        let mut rest = oversized[12..].to_vec();
        rest.extend(next.encode().unwrap());
        decoder.push(&rest[..20]);
        decoder.push(&rest[20..]);
        assert_eq!(decoder.next_frame(), Some(next));
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_huge_prefix_is_not_buffered() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&[0xff, 0xff, 0xff, 0xff]);
        decoder.push(&[0; 1024]);
        assert_eq!(decoder.next_frame(), None);
        assert_eq!(decoder.buffered(), 0);
        assert!(Frame::new(1, 0, vec![0; MAX_FRAME_LEN]).encode().is_err());
    }

    #[test]
    fn test_zero_length_prefix() {
        let mut decoder = FrameDecoder::new();
        decoder.push(&[0, 0, 0, 0]);
        decoder.push(&Frame::response(2, vec![5]).encode().unwrap());
        assert_eq!(decoder.next_frame(), Some(Frame::response(2, vec![5])));
    }
}
