//! Transfer progress and fetch results.

/// Progress of a single fetch, recomputed after every chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadProgress {
    transferred: u64,
    total: u64,
}

impl DownloadProgress {
    /// Start tracking a transfer of `total` bytes (0 when unknown).
    pub fn new(total: u64) -> Self {
        Self {
            transferred: 0,
            total,
        }
    }

    /// Account for `bytes` more bytes written.
    pub fn advance(&mut self, bytes: u64) {
        self.transferred = self.transferred.saturating_add(bytes);
    }

    /// Bytes written so far.
    pub fn transferred(&self) -> u64 {
        self.transferred
    }

    /// Resolved total length, 0 when unknown.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// `floor(transferred * 100 / (total + 1))`, capped at 100.
    ///
    /// The `+ 1` keeps the value below 100 until the last byte is in. An
    /// unknown total always reports 0.
    ///
    /// ```rust
    /// use vpnconf::download::DownloadProgress;
    ///
    /// let mut progress = DownloadProgress::new(5000);
    /// progress.advance(5000);
    /// assert_eq!(progress.percent(), 99);
    /// ```
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let percent = u128::from(self.transferred) * 100 / (u128::from(self.total) + 1);
        percent.min(100) as u8
    }
}

/// How a fetch ended when no error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The end of the stream was reached.
    Completed { bytes: u64 },
    /// The progress callback asked to stop.
    Cancelled { bytes: u64 },
}

impl FetchOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, FetchOutcome::Completed { .. })
    }

    /// Bytes written to the destination.
    pub fn bytes(&self) -> u64 {
        match self {
            FetchOutcome::Completed { bytes } | FetchOutcome::Cancelled { bytes } => *bytes,
        }
    }
}
