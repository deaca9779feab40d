use anyhow::Result;

/// Playback driver seam. The engine never touches audio directly: the UI
/// forwards engine events to a driver and polls it for the end-of-track
/// signal, which it feeds back as one recitation.
pub trait Driver {
    /// Start (or restart) the current track. Blocked output devices and
    /// undecodable sources surface here.
    fn play(&mut self) -> Result<()>;
    fn pause(&mut self);
    /// Rate multiplier, same value the auto-counter divides by.
    fn set_rate(&mut self, speed: f64);
    /// Volume in [0, 1]; out-of-range input is clamped.
    fn set_volume(&mut self, volume: f64);
    /// Path or URL of the track to loop.
    fn set_source(&mut self, url: &str);
    /// True once per finished track, then cleared until the next one ends.
    fn take_ended(&mut self) -> bool;
}

/// Driver that renders nothing. Keeps the playback state machine honest in
/// terminals with no audio stack; every transition lands in the log.
pub struct NullDriver {
    playing: bool,
    rate: f64,
    volume: f64,
    source: Option<String>,
}

impl NullDriver {
    pub fn new(volume: f64, rate: f64) -> Self {
        Self {
            playing: false,
            rate,
            volume: volume.clamp(0.0, 1.0),
            source: None,
        }
    }
}

impl Driver for NullDriver {
    fn play(&mut self) -> Result<()> {
        self.playing = true;
        log::debug!(
            "playback: play {:?} at ×{} vol {}",
            self.source.as_deref().unwrap_or("<none>"),
            self.rate,
            self.volume
        );
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
        log::debug!("playback: pause");
    }

    fn set_rate(&mut self, speed: f64) {
        self.rate = speed;
        log::debug!("playback: rate ×{}", speed);
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_source(&mut self, url: &str) {
        self.source = Some(url.to_string());
    }

    fn take_ended(&mut self) -> bool {
        // A silent driver never finishes a track.
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_is_clamped() {
        let mut driver = NullDriver::new(2.0, 1.0);
        assert_eq!(driver.volume, 1.0);
        driver.set_volume(-0.5);
        assert_eq!(driver.volume, 0.0);
    }

    #[test]
    fn play_pause_tracks_state() {
        let mut driver = NullDriver::new(0.5, 1.0);
        driver.play().unwrap();
        assert!(driver.playing);
        driver.pause();
        assert!(!driver.playing);
        assert!(!driver.take_ended());
    }
}
