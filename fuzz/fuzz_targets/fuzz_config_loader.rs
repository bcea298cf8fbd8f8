#![no_main]

use keepsake::config::loader::ConfigLoader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(yaml) = std::str::from_utf8(data) {
        let loader = ConfigLoader::with_defaults();
        if let Ok(loaded) = loader.load_from_str(yaml) {
            // a config that passed validation must build its schedule
            let _ = loaded.config.tick_period();
            assert!(loaded.config.to_targets().is_ok());
        }
    }
});
