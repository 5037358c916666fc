//! Headless runner: plays rounds with a scripted player and logs the results.
//!
//! Usage: `fortune-rounds [collection|impulse|dream] [seed|dream text] [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;

    use fortune_rounds::feedback::LogSink;
    use fortune_rounds::interpret::{LocalInterpreter, interpret_or_fallback};
    use fortune_rounds::sim::opponent::nearest_uncollected;
    use fortune_rounds::sim::{
        Contestant, ImpulseSource, InputEvent, MotionSample, Participant, Phase, PlayArea,
        Practitioner, Session, Variant,
    };
    use fortune_rounds::tally::ScoreSource;
    use fortune_rounds::{ScoreTally, Settings, SettingsError};

    /// Host frame length fed to `Session::advance`
    const FRAME_MS: u64 = 50;
    /// Scripted player drag speed (field units per frame)
    const PLAYER_STEP: f32 = 0.6;
    /// Safety stop for the headless loop
    const MAX_FRAMES: u32 = 10_000;

    pub fn run() -> Result<(), SettingsError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mode = args.first().map(String::as_str).unwrap_or("collection");

        let settings = match args.get(2) {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        let tally = ScoreTally::shared();

        match mode {
            "dream" => {
                let text = args.get(1).map(String::as_str).unwrap_or("");
                let mut local = LocalInterpreter::new(0);
                match interpret_or_fallback(None, &mut local, text) {
                    Ok(reading) => {
                        if let Some(notice) = &reading.notice {
                            log::info!("{}", notice);
                        }
                        reading.credit(&mut *tally.borrow_mut());
                        println!("{:+} {:?}", reading.analysis.score, reading.analysis.keywords);
                        println!("{}", reading.analysis.advice);
                    }
                    Err(err) => log::error!("{}", err),
                }
            }
            "impulse" => play_impulse(settings, seed(&args), Rc::clone(&tally)),
            _ => play_collection(settings, seed(&args), Rc::clone(&tally)),
        }

        let tally = tally.borrow();
        println!(
            "Tally: {} (recent pickups {}, rituals {}, readings {})",
            tally.total,
            tally.recent_from(ScoreSource::Pickup),
            tally.recent_from(ScoreSource::ImpulseBonus),
            tally.recent_from(ScoreSource::Interpretation)
        );
        Ok(())
    }

    fn seed(args: &[String]) -> u64 {
        args.get(1).and_then(|s| s.parse().ok()).unwrap_or(0x5eed)
    }

    fn play_collection(settings: Settings, seed: u64, tally: Rc<RefCell<ScoreTally>>) {
        let mut session = Session::new(Variant::Collection, settings, seed)
            .with_notifications(Box::new(LogSink))
            .with_scores(Box::new(tally));
        if let Err(err) = session
            .select(Participant::Contestant(Contestant::Female))
            .and_then(|_| session.confirm())
        {
            log::error!("Could not start round: {}", err);
            return;
        }

        // Pretend the field is drawn in a 360x640 box below a header
        let area = PlayArea::new(0.0, 120.0, 360.0, 640.0);
        let sender = session.input_sender();
        let mut finger = session.human().pos;

        for _ in 0..MAX_FRAMES {
            if session.phase() == Phase::Finished {
                break;
            }
            if session.phase() == Phase::Active {
                if let Some(target) = nearest_uncollected(session.field(), finger) {
                    let delta = target.pos - finger;
                    finger += delta.clamp_length_max(PLAYER_STEP);
                    let (cx, cy) = to_device(&area, finger);
                    if let Some(event) = area.pointer_event(cx, cy) {
                        sender.send(event);
                    }
                }
            }
            session.advance(FRAME_MS);
        }

        println!(
            "Collection: {:?} ({:?}) player {} vs opponent {}",
            session.result(),
            session.termination_reason(),
            session.human().score,
            session.opponent().score
        );
    }

    fn to_device(area: &PlayArea, pos: Vec2) -> (f32, f32) {
        (
            area.left + pos.x / 100.0 * area.width,
            area.top + pos.y / 100.0 * area.height,
        )
    }

    fn play_impulse(settings: Settings, seed: u64, tally: Rc<RefCell<ScoreTally>>) {
        let mut session = Session::new(Variant::Impulse, settings, seed)
            .with_notifications(Box::new(LogSink))
            .with_scores(Box::new(tally));
        let granny = Practitioner::ALL[(seed % Practitioner::ALL.len() as u64) as usize];
        log::info!("{} ({})", granny.display_name(), granny.specialty());
        if let Err(err) = session
            .select(Participant::Practitioner(granny))
            .and_then(|_| session.confirm())
        {
            log::error!("Could not start round: {}", err);
            return;
        }

        // Alternate resting and shaken readings, one every other frame
        let mut device_ms = 0u64;
        for frame in 0..MAX_FRAMES {
            if session.phase() == Phase::Finished {
                break;
            }
            device_ms += FRAME_MS;
            if session.phase() == Phase::Active && frame % 2 == 0 {
                let sample = if frame % 4 == 0 {
                    MotionSample::new(12.0, -8.0, 3.0)
                } else {
                    MotionSample::new(0.0, 0.0, 9.8)
                };
                session.push_input(InputEvent::Impulse {
                    at_ms: device_ms,
                    source: ImpulseSource::Motion(sample),
                });
            }
            session.advance(FRAME_MS);
        }

        println!(
            "Impulse: {:?} ({:?}) {} strikes, {}s left, tier {:?}",
            session.result(),
            session.termination_reason(),
            session.counter().count,
            session.time_remaining(),
            session.counter().progress_tier()
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fortune Rounds (headless) starting...");

    if let Err(err) = native::run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
