//! TCP status-feed adapter.
//!
//! The appliance publishes its status as newline-delimited JSON. This
//! adapter implements [`StatusFeed`] over a plain TCP connection; the
//! framing lives entirely here, so a different transport slots in at the
//! same trait seam without touching the supervisor.
//!
//! Decode failures on a single line are not link failures: the line decodes
//! to the zero-equivalent report (see [`StatusReport::decode`]). Only
//! connect errors, EOF, and socket errors end the connection.

use std::io::BufRead;
use std::net::TcpStream;

use log::{info, warn};

use crate::app::ports::StatusFeed;
use crate::error::FeedError;
use crate::report::StatusReport;

/// Line-oriented TCP implementation of [`StatusFeed`].
pub struct TcpFeed {
    addr: String,
    reader: Option<std::io::BufReader<TcpStream>>,
}

impl TcpFeed {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            reader: None,
        }
    }
}

impl StatusFeed for TcpFeed {
    fn connect(&mut self) -> Result<(), FeedError> {
        self.reader = None;
        info!("connecting to {}", self.addr);
        let stream = TcpStream::connect(&self.addr).map_err(|e| {
            warn!("connect to {} failed: {e}", self.addr);
            FeedError::ConnectFailed
        })?;
        self.reader = Some(std::io::BufReader::new(stream));
        Ok(())
    }

    fn next_report(&mut self) -> Result<StatusReport, FeedError> {
        let reader = self.reader.as_mut().ok_or(FeedError::Closed)?;
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) => {
                self.reader = None;
                Err(FeedError::Closed)
            }
            Ok(_) => Ok(StatusReport::decode(line.trim_end())),
            Err(e) => {
                warn!("feed read failed: {e}");
                self.reader = None;
                Err(FeedError::ReadFailed)
            }
        }
    }
}
