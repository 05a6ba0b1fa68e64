use std::thread;
use std::time::Duration;

use stackfall_audio::{AudioEngine, EngineConfig, SoundEffect};

/// Plays the score and fires each named effect (all of them by default).
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let effects = match std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<SoundEffect>())
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(list) if list.is_empty() => SoundEffect::ALL.to_vec(),
        Ok(list) => list,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };

    let mut engine = AudioEngine::new(EngineConfig::default());
    if !engine.init() {
        log::warn!("continuing without sound");
    }
    engine.play();
    thread::sleep(Duration::from_secs(2));

    for effect in effects {
        log::info!("trigger {}", effect);
        engine.trigger(effect);
        thread::sleep(Duration::from_millis(900));
    }

    engine.stop();
    engine.shutdown();
}
