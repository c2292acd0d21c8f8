//! Scripted transport shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;

use ftloop::{Transport, TransportError};

/// Serves queued read results in order, then empty reads forever.
#[derive(Default)]
pub struct ScriptedTransport {
    reads: VecDeque<Result<Vec<u8>, TransportError>>,
    pub written: Vec<u8>,
}

impl ScriptedTransport {
    /// Deliver `data` in reads of at most `chunk` bytes.
    pub fn chunked(data: &[u8], chunk: usize) -> Self {
        let mut t = Self::default();
        for c in data.chunks(chunk.max(1)) {
            t.push(c.to_vec());
        }
        t
    }

    pub fn push(&mut self, chunk: Vec<u8>) {
        self.reads.push_back(Ok(chunk));
    }

    pub fn push_error(&mut self, err: TransportError) {
        self.reads.push_back(Err(err));
    }

    pub fn remaining(&self) -> usize {
        self.reads.len()
    }
}

impl Transport for ScriptedTransport {
    fn write(&mut self, buf: &[u8]) -> Result<usize, TransportError> {
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        match self.reads.pop_front() {
            Some(Ok(chunk)) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.reads.push_front(Ok(chunk[n..].to_vec()));
                }
                Ok(n)
            }
            Some(Err(e)) => Err(e),
            None => Ok(0),
        }
    }
}

/// One intact cycle as it arrives first: `0x00..=0xFF`.
pub fn first_cycle() -> Vec<u8> {
    (0..=255).collect()
}

/// One intact cycle after the first: `0x01..=0xFF`.
pub fn later_cycle() -> Vec<u8> {
    (1..=255).collect()
}

/// `n` intact cycles back to back.
pub fn clean_stream(n: usize) -> Vec<u8> {
    let mut data = Vec::new();
    for i in 0..n {
        data.extend(if i == 0 { first_cycle() } else { later_cycle() });
    }
    data
}
