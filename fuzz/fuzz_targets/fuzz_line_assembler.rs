//! Fuzz target: `SerialConsole` over arbitrary UART bytes
//!
//! Splits the input into randomly sized reads and drains the console after
//! each one, checking:
//! - No panics under any byte sequence
//! - Every returned line fits `LINE_CAPACITY` and holds no terminator
//! - The interrupt latch, once set, stays set
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use breathbeat::adapters::console::{ByteSource, SerialConsole};
use breathbeat::app::ports::{ConsolePort, LINE_CAPACITY};
use libfuzzer_sys::fuzz_target;

/// Replays the input in chunks whose sizes come from the input itself.
struct Replay<'a> {
    data: &'a [u8],
}

impl ByteSource for Replay<'_> {
    type Error = core::convert::Infallible;

    fn read_ready(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some((&len, rest)) = self.data.split_first() else {
            return Ok(0);
        };
        let n = (len as usize).min(buf.len()).min(rest.len());
        buf[..n].copy_from_slice(&rest[..n]);
        self.data = &rest[n..];
        Ok(n)
    }
}

fuzz_target!(|data: &[u8]| {
    let mut console = SerialConsole::new(Replay { data });
    let mut interrupted = false;

    for _ in 0..data.len() + 1 {
        while let Some(line) = console.read_line() {
            assert!(line.len() <= LINE_CAPACITY);
            assert!(!line.contains('\n') && !line.contains('\r'));
        }
        let now = console.interrupt_requested();
        assert!(now || !interrupted, "interrupt latch must not reset");
        interrupted = now;
    }
});
