//! Alert cue playback.
//!
//! Playback runs on a detached thread so the alert path never waits on the
//! audio device. A missing sound file or absent output device is logged and
//! otherwise ignored; the visual alert still fires.

use std::path::PathBuf;

use log::warn;

/// Play the alert cue once. Called exactly once per Idle -> Active
/// transition of the alert state machine.
pub fn play_alert_cue(path: PathBuf) {
    std::thread::spawn(move || {
        use std::fs::File;
        use std::io::BufReader;

        use rodio::{Decoder, OutputStreamBuilder, Sink};

        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(e) => {
                warn!("no audio output available: {}", e);
                return;
            }
        };
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(e) => {
                warn!("alert sound {:?} not readable: {}", path, e);
                return;
            }
        };
        let source = match Decoder::new(BufReader::new(file)) {
            Ok(source) => source,
            Err(e) => {
                warn!("alert sound {:?} not decodable: {}", path, e);
                return;
            }
        };

        let sink = Sink::connect_new(stream.mixer());
        sink.append(source);
        sink.sleep_until_end();
    });
}
