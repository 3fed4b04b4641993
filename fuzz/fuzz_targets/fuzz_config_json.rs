//! Fuzz target: `PropConfig::from_json`
//!
//! Feeds arbitrary text to the config loader.  Any config it accepts must
//! be one the control loops can run with.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use breathbeat::config::PropConfig;
use breathbeat::control::breath::BreathProfile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = PropConfig::from_json(text) {
        assert!(config.validate().is_ok());
        assert!(BreathProfile::from_config(&config).is_ok());
        assert!(config.heartbeat_interval_ms() > 0);
    }
});
