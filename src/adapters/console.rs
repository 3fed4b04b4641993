//! Serial console adapter.
//!
//! Turns a non-blocking byte stream (the UART) into the line-oriented
//! [`ConsolePort`].  Bytes are accumulated in a fixed-capacity buffer and
//! split on `\r` / `\n`; an ETX byte (Ctrl-C, `0x03`) latches the operator
//! interrupt.
//!
//! ```text
//!  UART ──bytes──▶ LineAssembler ──lines──▶ Deque ──▶ read_line()
//!                        │
//!                        └── 0x03 ──▶ interrupt latch
//! ```

use heapless::Deque;
use log::warn;

use crate::app::ports::{ConsolePort, LINE_CAPACITY, Line};

/// Operator interrupt (Ctrl-C).
const ETX: u8 = 0x03;

/// Complete lines buffered before the oldest is dropped.
const PENDING_LINES: usize = 4;

/// Non-blocking byte input.
pub trait ByteSource {
    type Error: core::fmt::Debug;

    /// Copy whatever bytes are ready into `buf` and return how many.
    /// Never blocks; returns `Ok(0)` when nothing is pending.
    fn read_ready(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Incremental line splitter with a bounded buffer.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: heapless::Vec<u8, LINE_CAPACITY>,
    overflowed: bool,
}

/// What one byte completed, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assembled {
    Line(Line),
    Interrupt,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.
    ///
    /// Lines longer than the buffer are discarded whole.  Non-UTF-8 lines
    /// are discarded too.  Blank lines (bare terminators) are returned as
    /// empty lines so `\r\n` yields one real line and one empty one.
    pub fn push(&mut self, byte: u8) -> Option<Assembled> {
        match byte {
            ETX => Some(Assembled::Interrupt),
            b'\r' | b'\n' => {
                let overflowed = core::mem::take(&mut self.overflowed);
                let bytes = core::mem::take(&mut self.partial);
                if overflowed {
                    warn!("console: line longer than {} bytes dropped", LINE_CAPACITY);
                    return None;
                }
                let Ok(text) = core::str::from_utf8(&bytes) else {
                    warn!("console: non-UTF-8 line dropped");
                    return None;
                };
                let mut line = Line::new();
                // Capacity matches `partial`, so this cannot fail.
                let _ = line.push_str(text);
                Some(Assembled::Line(line))
            }
            _ => {
                if self.partial.push(byte).is_err() {
                    self.overflowed = true;
                }
                None
            }
        }
    }
}

/// [`ConsolePort`] over any [`ByteSource`].
pub struct SerialConsole<B: ByteSource> {
    source: B,
    assembler: LineAssembler,
    lines: Deque<Line, PENDING_LINES>,
    interrupted: bool,
}

impl<B: ByteSource> SerialConsole<B> {
    pub fn new(source: B) -> Self {
        Self {
            source,
            assembler: LineAssembler::new(),
            lines: Deque::new(),
            interrupted: false,
        }
    }

    /// Drain everything the source has ready.
    ///
    /// A read error ends this drain; the next call tries again.
    fn pump(&mut self) {
        let mut buf = [0u8; 32];
        loop {
            let n = match self.source.read_ready(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    warn!("console: read failed: {:?}", e);
                    break;
                }
            };
            for &byte in &buf[..n] {
                match self.assembler.push(byte) {
                    Some(Assembled::Line(line)) => {
                        if self.lines.is_full() {
                            warn!("console: line queue full, dropping oldest");
                            let _ = self.lines.pop_front();
                        }
                        let _ = self.lines.push_back(line);
                    }
                    Some(Assembled::Interrupt) => self.interrupted = true,
                    None => {}
                }
            }
        }
    }
}

impl<B: ByteSource> ConsolePort for SerialConsole<B> {
    fn line_available(&mut self) -> bool {
        self.pump();
        !self.lines.is_empty()
    }

    fn read_line(&mut self) -> Option<Line> {
        self.pump();
        self.lines.pop_front()
    }

    fn interrupt_requested(&mut self) -> bool {
        self.pump();
        self.interrupted
    }
}

// ── ESP-IDF UART source ───────────────────────────────────────

#[cfg(target_os = "espidf")]
impl ByteSource for esp_idf_hal::uart::UartDriver<'_> {
    type Error = esp_idf_hal::sys::EspError;

    fn read_ready(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        // Zero-tick timeout: return immediately with what is buffered.
        self.read(buf, esp_idf_hal::delay::NON_BLOCK)
    }
}
