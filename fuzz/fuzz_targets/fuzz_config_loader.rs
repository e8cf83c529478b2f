#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing, validation and conversion must never panic. A config that
    // validates must also convert into a usable ramp configuration.
    let Ok(cfg) = toml::from_str::<softstart_config::Config>(data) else {
        return;
    };
    if cfg.validate().is_ok() {
        let ramp = softstart_core::RampCfg::try_from(&cfg.ramp)
            .expect("validated config converts");
        assert_eq!(ramp.total_steps().ok(), Some(cfg.ramp.total_steps()));
    }
});
