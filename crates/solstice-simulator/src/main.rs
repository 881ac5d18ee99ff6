//! Desktop simulator for the solstice watch face.
//!
//! Renders the face in an SDL2 window via `embedded-graphics-simulator`
//! and feeds it synthetic lifecycle and sync events so the whole pipeline
//! can be exercised without a watch.
//!
//! # Key bindings
//!
//! | Key | Action                                 |
//! |-----|----------------------------------------|
//! | A   | Toggle ambient mode                    |
//! | B   | Toggle low-bit ambient                 |
//! | V   | Toggle visibility                      |
//! | W   | Push the next synthetic weather update |
//! | N   | Push an update on a foreign sync path  |
//! | T   | Rotate the UTC offset                  |
//! | R   | Force a redraw                         |
//! | Q   | Quit                                   |
//!
//! Mouse clicks are forwarded as taps.

use std::cell::Cell;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::{
    OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window, sdl2::Keycode,
};
use log::{error, info};

use solstice_core::clock::Clock;
use solstice_core::config::FaceConfig;
use solstice_core::controller::{FaceController, FaceRequest, face_receiver, face_sender};
use solstice_core::framebuffer::FrameBuffer;
use solstice_core::prefs::{PrefsBackend, PrefsStore};
use solstice_core::sync::{
    CONDITION_ID_KEY, DataEvent, DataMap, FieldValue, HIGH_TEMP_KEY, LOW_TEMP_KEY, SyncReceiver,
    TransportEvent, WEATHER_PATH,
};
use solstice_core::weather::WeatherCondition;
use solstice_core::ui::{DISPLAY_HEIGHT_PX, DISPLAY_WIDTH_PX, TouchEvent, TouchPoint};

extern crate alloc;
use alloc::vec::Vec;

/// Pixel scale factor for the simulator window.
const WINDOW_SCALE: u32 = 2;

/// Target frame duration (~30 FPS).
const FRAME_DURATION: Duration = Duration::from_millis(33);

/// UTC offsets cycled by the T key, seconds east of UTC.
const UTC_OFFSETS: [i32; 4] = [0, -5 * 3600, 3600, 5 * 3600 + 1800];

/// Synthetic forecasts cycled by the W key: (high °C, low °C, condition id).
const FORECASTS: [(f64, f64, i32); 6] = [
    (25.0, 16.0, 800),
    (18.5, 9.0, 501),
    (2.0, -4.0, 601),
    (21.0, 12.0, 212),
    (15.0, 8.0, 741),
    (23.0, 14.0, 803),
];

/// Wall-clock time source with a shared, adjustable UTC offset.
struct SystemClock {
    offset_secs: Rc<Cell<i32>>,
}

impl Clock for SystemClock {
    fn epoch_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn utc_offset_secs(&self) -> i32 {
        self.offset_secs.get()
    }
}

/// Preference backend over a plain file, shared by path.
struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl PrefsBackend for FileBackend {
    type Error = io::Error;

    fn load(&mut self) -> Result<Option<Vec<u8>>, Self::Error> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn save(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        std::fs::write(&self.path, bytes)
    }
}

/// Build one synced weather update in the wire shape the paired device
/// sends.
fn weather_event(high: f64, low: f64, condition_id: i32) -> DataEvent {
    let mut map = DataMap::new();
    map.insert(HIGH_TEMP_KEY, FieldValue::F64(high));
    map.insert(LOW_TEMP_KEY, FieldValue::F64(low));
    map.insert(CONDITION_ID_KEY, FieldValue::I32(condition_id));
    DataEvent::changed(WEATHER_PATH, map)
}

fn main() {
    env_logger::init();
    info!("Starting solstice simulator");
    info!(
        "Display: {}x{} (scale {}x)",
        DISPLAY_WIDTH_PX, DISPLAY_HEIGHT_PX, WINDOW_SCALE
    );
    info!("Keys: A=Ambient  B=LowBit  V=Visible  W=Weather  N=ForeignPath  T=Timezone  R=Redraw  Q=Quit");

    let prefs_path = std::env::temp_dir().join("solstice-prefs.bin");
    let offset_secs = Rc::new(Cell::new(UTC_OFFSETS[0]));

    // Receiver and renderer get their own backend handle on the same file,
    // like two SharedPreferences opens of one name.
    let receiver_store = match PrefsStore::open(FileBackend::new(prefs_path.clone())) {
        Ok(store) => store,
        Err(err) => {
            error!("Cannot open preference file: {}", err);
            return;
        }
    };
    let mut receiver = SyncReceiver::new(receiver_store);
    receiver.on_transport_event(TransportEvent::Connected);

    let face_store = match PrefsStore::open(FileBackend::new(prefs_path)) {
        Ok(store) => store,
        Err(err) => {
            error!("Cannot open preference file: {}", err);
            return;
        }
    };
    let clock = SystemClock {
        offset_secs: offset_secs.clone(),
    };
    let mut controller = FaceController::new(FaceConfig::default(), face_store, clock);

    let sender = face_sender();
    let requests = face_receiver();

    let mut display = SimulatorDisplay::<Rgb565>::new(Size::new(
        DISPLAY_WIDTH_PX as u32,
        DISPLAY_HEIGHT_PX as u32,
    ));
    let output_settings = OutputSettingsBuilder::new().scale(WINDOW_SCALE).build();
    let mut window = Window::new("Solstice Simulator", &output_settings);

    let mut frame = FrameBuffer::new();

    let mut forecast_idx = 0usize;
    let mut offset_idx = 0usize;
    let mut ambient = false;
    let mut low_bit = false;
    let mut visible = true;

    // The SDL window is lazily initialized on the first `update()` call.
    // We must call `update()` once before `events()` or it will panic.
    let _ = sender.try_send(FaceRequest::SetVisible(true));
    window.update(&display);

    // Re-armed by hand after each tick, stopped while hidden or ambient.
    let mut tick_deadline: Option<Instant> = None;

    'running: loop {
        let frame_start = Instant::now();

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,

                SimulatorEvent::KeyDown { keycode, .. } => match keycode {
                    Keycode::Q | Keycode::Escape => break 'running,
                    Keycode::A => {
                        ambient = !ambient;
                        info!("Ambient: {}", ambient);
                        let _ = sender.try_send(FaceRequest::SetAmbient(ambient));
                    }
                    Keycode::B => {
                        low_bit = !low_bit;
                        info!("Low-bit ambient: {}", low_bit);
                        let _ = sender.try_send(FaceRequest::SetLowBitAmbient(low_bit));
                    }
                    Keycode::V => {
                        visible = !visible;
                        info!("Visible: {}", visible);
                        let _ = sender.try_send(FaceRequest::SetVisible(visible));
                    }
                    Keycode::W => {
                        let (high, low, id) = FORECASTS[forecast_idx % FORECASTS.len()];
                        forecast_idx += 1;
                        info!(
                            "Pushing weather: high={} low={} {}",
                            high,
                            low,
                            WeatherCondition::from_id(id as u32).label()
                        );
                        if let Err(err) =
                            receiver.on_data_changed(&[weather_event(high, low, id)])
                        {
                            error!("Sync write failed: {}", err);
                        }
                    }
                    Keycode::N => {
                        info!("Pushing update on a foreign path (should be ignored)");
                        let payload = weather_event(99.0, 99.0, 800);
                        let event = DataEvent::changed("/settings", payload.map);
                        if let Err(err) = receiver.on_data_changed(&[event]) {
                            error!("Sync write failed: {}", err);
                        }
                    }
                    Keycode::T => {
                        offset_idx = (offset_idx + 1) % UTC_OFFSETS.len();
                        let offset = UTC_OFFSETS[offset_idx];
                        offset_secs.set(offset);
                        info!("UTC offset: {}s", offset);
                        let _ = sender.try_send(FaceRequest::TimezoneChanged(offset));
                    }
                    Keycode::R => {
                        let _ = sender.try_send(FaceRequest::Redraw);
                    }
                    _ => {}
                },

                SimulatorEvent::MouseButtonDown { point, .. } => {
                    let _ = sender.try_send(FaceRequest::Tap(TouchEvent::Press(TouchPoint::new(
                        point.x.max(0) as u16,
                        point.y.max(0) as u16,
                    ))));
                }

                _ => {}
            }
        }

        // Drain lifecycle requests and repaint when one asks for it.
        let mut needs_redraw = false;
        while let Ok(request) = requests.try_receive() {
            if controller.process_request(request) {
                needs_redraw = true;
            }
        }

        // One-shot tick timer, aligned to whole update intervals.
        if controller.timer_should_run() {
            if tick_deadline.is_none() {
                let now_ms = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_millis() as u64;
                let delay =
                    solstice_core::controller::next_tick_delay(now_ms, controller.interval_ms());
                tick_deadline = Some(Instant::now() + Duration::from_millis(delay));
            }
        } else {
            tick_deadline = None;
        }

        if let Some(deadline) = tick_deadline
            && Instant::now() >= deadline
        {
            tick_deadline = None;
            match controller.on_timer_tick(&mut frame) {
                Ok(_rearm) => {}
                Err(err) => error!("Draw error: {:?}", err),
            }
            // Re-armed above on the next pass if still running.
            frame.flush(&mut display).ok();
        }

        if needs_redraw {
            match controller.redraw(&mut frame) {
                Ok(true) => {
                    frame.flush(&mut display).ok();
                }
                Ok(false) => {}
                Err(err) => error!("Draw error: {:?}", err),
            }
        }

        window.update(&display);

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME_DURATION {
            std::thread::sleep(FRAME_DURATION - elapsed);
        }
    }

    info!("Simulator exiting");
}
