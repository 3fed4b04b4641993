//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                  | Connects to              |
//! |-------------|-----------------------------|--------------------------|
//! | `console`   | ConsolePort                 | UART (non-blocking read) |
//! | `hardware`  | (bundle)                    | all of the prop's ports  |
//! | `log_sink`  | EventSink                   | Serial log output        |
//! | `time`      | ClockPort, DelayNs          | ESP32 system timer       |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod time;
