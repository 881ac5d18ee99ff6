//! Face lifecycle and redraw scheduling.
//!
//! The controller owns the [`WatchFace`], its preference store handle, and
//! the interactive update timer. Lifecycle changes arrive as
//! [`FaceRequest`]s over a static channel, mirroring how the platform shell
//! delivers visibility and ambient callbacks. The timer is one-shot: every
//! tick redraws and then re-arms against the wall clock, so ticks land on
//! whole interval boundaries no matter how late the previous one fired.

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::{Duration, Timer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use log::{debug, error};

use crate::clock::{CivilDateTime, Clock};
use crate::config::FaceConfig;
use crate::face::{DisplayState, WatchFace};
use crate::prefs::{PrefsBackend, PrefsError, PrefsStore};
use crate::ui::core::{Drawable, TouchEvent};

/// Lifecycle and input requests for the face controller.
#[derive(Debug, Clone, Copy)]
pub enum FaceRequest {
    /// Repaint now, regardless of the timer.
    Redraw,
    /// The face became visible or was hidden.
    SetVisible(bool),
    /// The device entered or left ambient mode.
    SetAmbient(bool),
    /// Whether the ambient display is limited to few colors.
    SetLowBitAmbient(bool),
    /// The local UTC offset changed, in seconds east of UTC.
    TimezoneChanged(i32),
    /// A touch on the face.
    Tap(TouchEvent),
}

const FACE_CHANNEL_DEPTH: usize = 4;

static FACE_CHANNEL: Channel<CriticalSectionRawMutex, FaceRequest, FACE_CHANNEL_DEPTH> =
    Channel::new();

pub fn face_sender() -> Sender<'static, CriticalSectionRawMutex, FaceRequest, FACE_CHANNEL_DEPTH> {
    FACE_CHANNEL.sender()
}

pub fn face_receiver()
-> Receiver<'static, CriticalSectionRawMutex, FaceRequest, FACE_CHANNEL_DEPTH> {
    FACE_CHANNEL.receiver()
}

/// Milliseconds until the next whole-interval boundary.
///
/// Re-arming with this delay instead of a fixed interval keeps ticks
/// aligned to the wall clock even when a redraw ran long.
pub fn next_tick_delay(now_ms: u64, interval_ms: u64) -> u64 {
    interval_ms - now_ms % interval_ms
}

/// Owns the face and drives its redraw cadence.
pub struct FaceController<B: PrefsBackend, C: Clock> {
    face: WatchFace,
    store: PrefsStore<B>,
    clock: C,
    config: FaceConfig,
    visible: bool,
    ambient: bool,
    low_bit_ambient: bool,
    utc_offset_secs: i32,
}

impl<B: PrefsBackend, C: Clock> FaceController<B, C> {
    pub fn new(config: FaceConfig, store: PrefsStore<B>, clock: C) -> Self {
        let utc_offset_secs = clock.utc_offset_secs();
        Self {
            face: WatchFace::new(&config),
            store,
            clock,
            config,
            visible: false,
            ambient: false,
            low_bit_ambient: false,
            utc_offset_secs,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_ambient(&self) -> bool {
        self.ambient
    }

    pub fn interval_ms(&self) -> u64 {
        self.config.interactive_update_ms()
    }

    /// The interactive timer runs only while the face is both visible and
    /// out of ambient mode.
    pub fn timer_should_run(&self) -> bool {
        self.visible && !self.ambient
    }

    /// Applies one request. Returns whether a repaint should follow.
    pub fn process_request(&mut self, request: FaceRequest) -> bool {
        match request {
            FaceRequest::Redraw => true,
            FaceRequest::SetVisible(visible) => {
                self.visible = visible;
                if visible {
                    // The zone may have changed while hidden.
                    self.utc_offset_secs = self.clock.utc_offset_secs();
                }
                visible
            }
            FaceRequest::SetAmbient(ambient) => {
                self.ambient = ambient;
                true
            }
            FaceRequest::SetLowBitAmbient(low_bit) => {
                self.low_bit_ambient = low_bit;
                false
            }
            FaceRequest::TimezoneChanged(offset_secs) => {
                self.utc_offset_secs = offset_secs;
                true
            }
            FaceRequest::Tap(event) => {
                self.face.handle_tap(event);
                true
            }
        }
    }

    /// Rebuilds the display state and repaints if anything changed.
    ///
    /// Preferences are re-read from the backend on every pass, so weather
    /// written by the sync receiver shows up on the next frame without any
    /// signaling between the two.
    pub fn redraw<D>(&mut self, display: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        if let Err(err) = self.store.reload() {
            match err {
                PrefsError::Backend(e) => error!("preference reload failed: {:?}", e),
                PrefsError::Encode(e) => error!("preference reload failed: {}", e),
            }
        }

        self.face.set_state(DisplayState {
            time: CivilDateTime::from_epoch(self.clock.epoch_secs(), self.utc_offset_secs),
            ambient: self.ambient,
            low_bit_ambient: self.low_bit_ambient,
            weather: self.store.snapshot(),
        });

        if !self.face.is_dirty() {
            return Ok(false);
        }
        self.face.draw(display)?;
        self.face.mark_clean();
        Ok(true)
    }

    /// One interactive timer tick: repaint, then report whether the timer
    /// should re-arm.
    pub fn on_timer_tick<D>(&mut self, display: &mut D) -> Result<bool, D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let drew = self.redraw(display)?;
        debug!("timer tick, drew={}", drew);
        Ok(self.timer_should_run())
    }

    /// Request loop. Blocks on the channel while the timer is stopped and
    /// races the channel against the next tick while it runs.
    pub async fn run<D>(
        &mut self,
        display: &mut D,
        receiver: Receiver<'static, CriticalSectionRawMutex, FaceRequest, FACE_CHANNEL_DEPTH>,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        loop {
            let request = if self.timer_should_run() {
                let now_ms = self.clock.epoch_secs() as u64 * 1000;
                let delay = next_tick_delay(now_ms, self.interval_ms());
                match select(
                    receiver.receive(),
                    Timer::after(Duration::from_millis(delay)),
                )
                .await
                {
                    Either::First(request) => request,
                    Either::Second(()) => {
                        self.on_timer_tick(display)?;
                        continue;
                    }
                }
            } else {
                receiver.receive().await
            };

            if self.process_request(request) {
                self.redraw(display)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use crate::prefs::MemoryBackend;
    use crate::sync::{
        CONDITION_ID_KEY, DataEvent, DataMap, FieldValue, HIGH_TEMP_KEY, LOW_TEMP_KEY,
        SyncReceiver, WEATHER_PATH,
    };
    use crate::ui::core::TouchPoint;
    use crate::weather::WeatherPrefs;

    struct FixedClock {
        epoch_secs: i64,
        offset_secs: i32,
    }

    impl Clock for FixedClock {
        fn epoch_secs(&self) -> i64 {
            self.epoch_secs
        }

        fn utc_offset_secs(&self) -> i32 {
            self.offset_secs
        }
    }

    fn controller(backend: MemoryBackend) -> FaceController<MemoryBackend, FixedClock> {
        let store = PrefsStore::open(backend).unwrap();
        let clock = FixedClock {
            epoch_secs: 1_500_000_000,
            offset_secs: 0,
        };
        FaceController::new(FaceConfig::default(), store, clock)
    }

    #[test]
    fn tick_delay_lands_on_interval_boundaries() {
        assert_eq!(next_tick_delay(0, 10_000), 10_000);
        assert_eq!(next_tick_delay(10_000, 10_000), 10_000);
        assert_eq!(next_tick_delay(9_999, 10_000), 1);
        assert_eq!(next_tick_delay(12_345, 10_000), 7_655);
    }

    #[test]
    fn timer_runs_only_visible_and_interactive() {
        let mut ctl = controller(MemoryBackend::new());
        assert!(!ctl.timer_should_run());

        ctl.process_request(FaceRequest::SetVisible(true));
        assert!(ctl.timer_should_run());

        ctl.process_request(FaceRequest::SetAmbient(true));
        assert!(!ctl.timer_should_run());

        ctl.process_request(FaceRequest::SetAmbient(false));
        assert!(ctl.timer_should_run());

        ctl.process_request(FaceRequest::SetVisible(false));
        assert!(!ctl.timer_should_run());
    }

    #[test]
    fn tick_reports_whether_to_rearm() {
        let mut ctl = controller(MemoryBackend::new());
        let mut fb = FrameBuffer::new();

        ctl.process_request(FaceRequest::SetVisible(true));
        assert!(ctl.on_timer_tick(&mut fb).unwrap());

        ctl.process_request(FaceRequest::SetAmbient(true));
        assert!(!ctl.on_timer_tick(&mut fb).unwrap());
    }

    #[test]
    fn redraw_skips_when_nothing_changed() {
        let mut ctl = controller(MemoryBackend::new());
        let mut fb = FrameBuffer::new();

        ctl.process_request(FaceRequest::SetVisible(true));
        assert!(ctl.redraw(&mut fb).unwrap());
        assert!(!ctl.redraw(&mut fb).unwrap());

        // A tap forces the next pass to paint even with identical state.
        ctl.process_request(FaceRequest::Tap(TouchEvent::Press(TouchPoint::new(10, 10))));
        assert!(ctl.redraw(&mut fb).unwrap());
    }

    #[test]
    fn timezone_change_moves_the_rendered_hour() {
        let backend = MemoryBackend::new();
        let mut ctl = controller(backend);
        let mut fb = FrameBuffer::new();

        ctl.process_request(FaceRequest::SetVisible(true));
        ctl.redraw(&mut fb).unwrap();
        let before = ctl.face.state().unwrap().time;

        ctl.process_request(FaceRequest::TimezoneChanged(3 * 3600));
        ctl.redraw(&mut fb).unwrap();
        let after = ctl.face.state().unwrap().time;

        assert_eq!(
            (after.hour + 24 - before.hour) % 24,
            3,
            "offset shifts the hour"
        );
    }

    #[test]
    fn synced_weather_shows_up_on_the_next_tick() {
        let backend = MemoryBackend::new();
        let mut receiver = SyncReceiver::new(PrefsStore::open(backend.clone()).unwrap());
        let mut ctl = controller(backend);
        let mut fb = FrameBuffer::new();

        ctl.process_request(FaceRequest::SetVisible(true));
        ctl.redraw(&mut fb).unwrap();
        assert_eq!(ctl.face.state().unwrap().weather, WeatherPrefs::default());

        let mut map = DataMap::new();
        map.insert(HIGH_TEMP_KEY, FieldValue::F64(25.0));
        map.insert(LOW_TEMP_KEY, FieldValue::F64(16.0));
        map.insert(CONDITION_ID_KEY, FieldValue::I32(800));
        receiver
            .on_data_changed(&[DataEvent::changed(WEATHER_PATH, map)])
            .unwrap();

        assert!(ctl.on_timer_tick(&mut fb).unwrap());
        let weather = ctl.face.state().unwrap().weather;
        assert_eq!(weather.high_temp, Some(25.0));
        assert_eq!(weather.low_temp, Some(16.0));
        assert_eq!(weather.condition_id, Some(800));
    }
}
