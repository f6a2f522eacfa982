//! Screen routing.
//!
//! Four screens plus a processing overlay shown while an upload chain is in
//! flight. The data-bearing screens are gated on a loaded patient record;
//! navigating to them beforehand renders the upload screen instead. The
//! settings modal is an independent flag with no effect on routing.

use crate::events::{EventBus, SessionEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Upload,
    Analysis,
    Treatment,
    DigitalTwin,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Upload => "upload",
            Screen::Analysis => "analysis",
            Screen::Treatment => "treatment",
            Screen::DigitalTwin => "digital-twin",
        }
    }

    /// Screens that render nothing useful without a patient record
    pub fn requires_patient(&self) -> bool {
        !matches!(self, Screen::Upload)
    }
}

/// What should actually be rendered this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Processing,
    Screen(Screen),
}

pub struct ScreenController {
    current: Screen,
    processing: bool,
    settings_open: bool,
    events: EventBus,
}

impl ScreenController {
    pub fn new(events: EventBus) -> Self {
        Self {
            current: Screen::Upload,
            processing: false,
            settings_open: false,
            events,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn navigate(&mut self, screen: Screen) {
        if self.current != screen {
            self.current = screen;
            self.events.publish(SessionEvent::ScreenChanged {
                screen: screen.name().to_string(),
            });
        }
    }

    /// Upload handed off to the gateway; overlay goes up.
    pub fn begin_processing(&mut self) {
        self.processing = true;
    }

    /// Upload chain finished. Success (including lenient-mode fallback)
    /// lands on the analysis screen; failure stays where we were.
    pub fn finish_processing(&mut self, success: bool) {
        self.processing = false;
        if success {
            self.navigate(Screen::Analysis);
        }
    }

    /// Resolve the screen to render, given whether a patient record exists.
    pub fn resolve(&self, has_data: bool) -> View {
        if self.processing {
            return View::Processing;
        }
        if self.current.requires_patient() && !has_data {
            View::Screen(Screen::Upload)
        } else {
            View::Screen(self.current)
        }
    }

    pub fn open_settings(&mut self) {
        self.settings_open = true;
    }

    pub fn close_settings(&mut self) {
        self.settings_open = false;
    }

    pub fn settings_open(&self) -> bool {
        self.settings_open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ScreenController {
        ScreenController::new(EventBus::default())
    }

    #[test]
    fn test_initial_state_is_upload() {
        let c = controller();
        assert_eq!(c.current(), Screen::Upload);
        assert_eq!(c.resolve(false), View::Screen(Screen::Upload));
    }

    #[test]
    fn test_data_screens_gated_until_record_exists() {
        let mut c = controller();
        for screen in [Screen::Analysis, Screen::Treatment, Screen::DigitalTwin] {
            c.navigate(screen);
            assert_eq!(c.resolve(false), View::Screen(Screen::Upload));
            assert_eq!(c.resolve(true), View::Screen(screen));
        }
    }

    #[test]
    fn test_processing_overlay_wins() {
        let mut c = controller();
        c.begin_processing();
        assert_eq!(c.resolve(false), View::Processing);
        assert_eq!(c.resolve(true), View::Processing);
    }

    #[test]
    fn test_successful_processing_lands_on_analysis() {
        let mut c = controller();
        c.begin_processing();
        c.finish_processing(true);
        assert!(!c.is_processing());
        assert_eq!(c.current(), Screen::Analysis);
        assert_eq!(c.resolve(true), View::Screen(Screen::Analysis));
    }

    #[test]
    fn test_failed_processing_stays_on_upload() {
        let mut c = controller();
        c.begin_processing();
        c.finish_processing(false);
        assert_eq!(c.current(), Screen::Upload);
        assert_eq!(c.resolve(false), View::Screen(Screen::Upload));
    }

    #[test]
    fn test_settings_modal_independent_of_routing() {
        let mut c = controller();
        c.navigate(Screen::Analysis);
        c.open_settings();
        assert!(c.settings_open());
        assert_eq!(c.current(), Screen::Analysis);
        c.close_settings();
        assert!(!c.settings_open());
    }

    #[test]
    fn test_navigation_publishes_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let mut c = ScreenController::new(bus);
        c.navigate(Screen::Treatment);
        match rx.try_recv().unwrap() {
            SessionEvent::ScreenChanged { screen } => assert_eq!(screen, "treatment"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
