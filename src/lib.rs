// lib.rs - Itinerary app core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod agenda;
pub mod capabilities;
pub mod contacts;
pub mod csv;
pub mod itinerary;
pub mod maps;
pub mod nav;
pub mod schedule;
pub mod sponsors;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::agenda::{AgendaRow, AgendaSummary};
use crate::contacts::ContactRecord;
use crate::itinerary::{day_label, DayNumbering, ItineraryRecord};
use crate::maps::MapEmbed;
use crate::nav::{auto_advance_allowed, resolve_nav, timeline_window, NavRequest};
use crate::schedule::{current_index, has_passed};
use crate::sponsors::SponsorRecord;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use nav::{
    AutoAdvancePolicy, GatingPolicy, SessionConfig, TransitionPhase, WindowPolicy,
};
pub use schedule::ResolverPolicy;

pub const ITINERARY_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQYZZZbzCKQ5X4If91dMyhDKwJAil4qtK23fsDBctNciNemV-qMRSiN0rUHTazIxuWmpNrbQ6ghD6gu/pub?gid=685795691&single=true&output=csv";
pub const DIRECTORY_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQYZZZbzCKQ5X4If91dMyhDKwJAil4qtK23fsDBctNciNemV-qMRSiN0rUHTazIxuWmpNrbQ6ghD6gu/pub?gid=1500665154&single=true&output=csv";
pub const SPONSORS_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/e/2PACX-1vQYZZZbzCKQ5X4If91dMyhDKwJAil4qtK23fsDBctNciNemV-qMRSiN0rUHTazIxuWmpNrbQ6ghD6gu/pub?gid=1790075283&single=true&output=csv";

pub const DEFAULT_IMAGE_URL: &str = "https://i.postimg.cc/mZ9sfBH8/Cambodia-temple-9.jpg";
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// How long the shell's slide transition runs; the shell fires
/// [`Event::TransitionSettled`] after this.
pub const SLIDE_SETTLE_MS: u64 = 500;
/// How often the shell fires [`Event::ClockTick`].
pub const AUTO_ADVANCE_INTERVAL_MS: u64 = 60_000;

const ITINERARY_ERROR_MESSAGE: &str = "Unable to load itinerary. Please try again later.";
const ITINERARY_EMPTY_MESSAGE: &str = "No activities found.";
const DIRECTORY_ERROR_MESSAGE: &str = "Error loading contacts. Please try again later.";
const DIRECTORY_EMPTY_MESSAGE: &str = "No contacts found";
const SPONSORS_ERROR_MESSAGE: &str = "Unable to load sponsors right now.";
const SPONSORS_EMPTY_MESSAGE: &str = "No sponsors yet.";

#[must_use]
pub fn get_current_time_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// The evaluation-instant seam. Production models run on the system
/// clock; tests pin it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Self::System => chrono::Local::now().naive_local(),
            Self::Fixed(instant) => *instant,
        }
    }
}

/// Terminal load failures. Both end the current session; a fresh
/// [`Event::AppStarted`] (page reload) is the only recovery.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadError {
    #[error("fetch failed: {0}")]
    FetchFailed(String),
    #[error("no usable records")]
    EmptyResult,
}

impl LoadError {
    #[must_use]
    pub fn user_facing_message(&self) -> &'static str {
        match self {
            Self::FetchFailed(_) => ITINERARY_ERROR_MESSAGE,
            Self::EmptyResult => ITINERARY_EMPTY_MESSAGE,
        }
    }
}

type SheetResult = crux_http::Result<crux_http::Response<String>>;

// --- Events ---

#[derive(Serialize, Deserialize)]
pub enum Event {
    // Lifecycle
    AppStarted,
    ItinerarySheetLoaded(Box<SheetResult>),

    // Navigation
    NextRequested,
    PrevRequested,
    JumpRequested { index: usize },
    TransitionSettled,
    ClockTick,

    // Supplemental sections
    DirectoryRequested,
    DirectorySheetLoaded(Box<SheetResult>),
    SponsorsRequested,
    SponsorsSheetLoaded(Box<SheetResult>),
}

impl Event {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppStarted => "app_started",
            Self::ItinerarySheetLoaded(_) => "itinerary_sheet_loaded",
            Self::NextRequested => "next_requested",
            Self::PrevRequested => "prev_requested",
            Self::JumpRequested { .. } => "jump_requested",
            Self::TransitionSettled => "transition_settled",
            Self::ClockTick => "clock_tick",
            Self::DirectoryRequested => "directory_requested",
            Self::DirectorySheetLoaded(_) => "directory_sheet_loaded",
            Self::SponsorsRequested => "sponsors_requested",
            Self::SponsorsSheetLoaded(_) => "sponsors_sheet_loaded",
        }
    }
}

// --- Model ---

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadPhase {
    #[default]
    Loading,
    Ready,
    Failed(LoadError),
}

/// Independent lifecycle for the directory and sponsor sections; their
/// failures never touch the itinerary.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SectionPhase<T> {
    #[default]
    NotRequested,
    Loading,
    Ready(T),
    Empty,
    Failed,
}

#[derive(Default)]
pub struct Model {
    pub phase: LoadPhase,
    pub records: Vec<ItineraryRecord>,
    pub day_numbers: DayNumbering,
    /// `None` before the itinerary loads; thereafter always in bounds.
    pub current: Option<usize>,
    pub transition: TransitionPhase,
    /// Set on any accepted user navigation; consulted by the
    /// `UntilManualNav` auto-advance policy.
    pub manual_nav: bool,
    pub config: SessionConfig,
    pub clock: Clock,
    pub fetched_at_ms: Option<u64>,
    pub directory: SectionPhase<Vec<ContactRecord>>,
    pub sponsors: SectionPhase<Vec<SponsorRecord>>,
}

impl Model {
    #[must_use]
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }
}

// --- View model ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineSlot {
    Before,
    Active,
    After,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideView {
    pub location: String,
    pub start: String,
    pub end: String,
    pub time_range: Option<String>,
    pub duration: String,
    pub activity: String,
    pub about: String,
    pub image_url: String,
    pub map: Option<MapEmbed>,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItemView {
    pub index: usize,
    pub location: String,
    pub time_range: Option<String>,
    pub image_url: String,
    pub slot: TimelineSlot,
    pub is_passed: bool,
    /// Whether a jump to this item would currently be accepted.
    pub is_navigable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgendaView {
    pub rows: Vec<AgendaRow>,
    pub summary: AgendaSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewState {
    Loading,
    Error {
        message: String,
    },
    Empty {
        message: String,
    },
    Ready {
        header_day: Option<String>,
        slide: SlideView,
        timeline: Vec<TimelineItemView>,
        agenda: AgendaView,
        slide_count: usize,
        current_index: usize,
        is_transitioning: bool,
        can_go_next: bool,
        can_go_prev: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactView {
    pub name: String,
    pub phone: Option<String>,
    pub tel_link: Option<String>,
    pub telegram: Option<String>,
    pub telegram_link: Option<String>,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryView {
    pub name: String,
    pub contacts: Vec<ContactView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionViewState<T> {
    NotRequested,
    Loading,
    Empty { message: String },
    Error { message: String },
    Ready(T),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryView {
    pub categories: Vec<CategoryView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorView {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorsView {
    pub sponsors: Vec<SponsorView>,
    pub count: usize,
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub state: ViewState,
    pub directory: SectionViewState<DirectoryView>,
    pub sponsors: SectionViewState<SponsorsView>,
    /// Shell timing contract: transition settle delay and tick period.
    pub settle_ms: u64,
    pub tick_interval_ms: u64,
}

// --- App ---

pub mod app {
    use super::*;

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Each fetch carries a fresh cache-busting token; the published
        /// sheet endpoint is otherwise aggressively cached.
        fn cache_busted(url: &str) -> String {
            format!("{url}&_t={}", Uuid::new_v4().simple())
        }

        fn request_sheet(caps: &Capabilities, url: &str, make_event: fn(SheetResult) -> Event) {
            caps.http
                .get(Self::cache_busted(url))
                .expect_string()
                .send(make_event);
        }

        /// Flatten a sheet response to its CSV text, treating non-success
        /// statuses as transport failures.
        fn sheet_body(result: SheetResult) -> Result<String, LoadError> {
            match result {
                Ok(mut response) if response.status().is_success() => {
                    Ok(response.take_body().unwrap_or_default())
                }
                Ok(response) => Err(LoadError::FetchFailed(format!(
                    "status {}",
                    response.status()
                ))),
                Err(e) => Err(LoadError::FetchFailed(e.to_string())),
            }
        }

        fn ingest_itinerary(model: &mut Model, result: SheetResult) {
            let body = match Self::sheet_body(result) {
                Ok(body) => body,
                Err(e) => {
                    tracing::warn!(error = %e, "itinerary fetch failed");
                    model.phase = LoadPhase::Failed(e);
                    return;
                }
            };

            let (header, rows) = csv::header_and_rows(&body);
            let records = itinerary::map_records(&header, &rows);
            if records.is_empty() {
                tracing::warn!("itinerary sheet produced no usable records");
                model.phase = LoadPhase::Failed(LoadError::EmptyResult);
                return;
            }

            model.day_numbers = DayNumbering::build(&records);
            model.current = Some(current_index(&records, model.now(), model.config.resolver));
            model.records = records;
            model.fetched_at_ms = Some(get_current_time_ms());
            model.phase = LoadPhase::Ready;
        }

        fn apply_navigation(model: &mut Model, request: NavRequest) -> bool {
            let Some(current) = model.current else {
                return false;
            };

            match resolve_nav(
                &model.records,
                current,
                request,
                model.transition,
                &model.config,
                model.now(),
            ) {
                Ok(target) => {
                    model.current = Some(target);
                    model.transition = TransitionPhase::Transitioning;
                    model.manual_nav = true;
                    true
                }
                Err(rejection) => {
                    tracing::debug!(?rejection, "navigation request dropped");
                    false
                }
            }
        }

        fn auto_advance(model: &mut Model) -> bool {
            if model.phase != LoadPhase::Ready
                || model.transition != TransitionPhase::Idle
                || !auto_advance_allowed(model.config.auto_advance, model.manual_nav)
            {
                return false;
            }

            let resolved = current_index(&model.records, model.now(), model.config.resolver);
            if model.current == Some(resolved) {
                return false;
            }

            tracing::debug!(to = resolved, "auto-advancing to current activity");
            model.current = Some(resolved);
            model.transition = TransitionPhase::Transitioning;
            true
        }

        fn time_range(record: &ItineraryRecord) -> Option<String> {
            if record.start.is_empty() || record.end.is_empty() {
                return None;
            }
            Some(format!("{} — {}", record.start, record.end))
        }

        fn image_or_default(url: &str) -> String {
            if url.is_empty() {
                DEFAULT_IMAGE_URL.to_string()
            } else {
                url.to_string()
            }
        }

        fn location_or_fallback(record: &ItineraryRecord) -> String {
            if record.location.is_empty() {
                UNKNOWN_LOCATION.to_string()
            } else {
                record.location.clone()
            }
        }

        fn build_slide(record: &ItineraryRecord) -> SlideView {
            SlideView {
                location: Self::location_or_fallback(record),
                start: record.start.clone(),
                end: record.end.clone(),
                time_range: Self::time_range(record),
                duration: record.duration.clone(),
                activity: record.activity.clone(),
                about: record.about.clone(),
                image_url: Self::image_or_default(&record.image_url),
                map: maps::salvage_map_embed(&record.google_map),
                is_completed: record.is_completed(),
            }
        }

        fn build_timeline(
            model: &Model,
            current: usize,
            now: NaiveDateTime,
        ) -> Vec<TimelineItemView> {
            timeline_window(model.records.len(), current, model.config.window)
                .into_iter()
                .map(|i| {
                    let record = &model.records[i];
                    let slot = match i.cmp(&current) {
                        std::cmp::Ordering::Less => TimelineSlot::Before,
                        std::cmp::Ordering::Equal => TimelineSlot::Active,
                        std::cmp::Ordering::Greater => TimelineSlot::After,
                    };
                    TimelineItemView {
                        index: i,
                        location: Self::location_or_fallback(record),
                        time_range: Self::time_range(record),
                        image_url: Self::image_or_default(&record.image_url),
                        slot,
                        is_passed: has_passed(record, now),
                        is_navigable: resolve_nav(
                            &model.records,
                            current,
                            NavRequest::Jump(i),
                            model.transition,
                            &model.config,
                            now,
                        )
                        .is_ok(),
                    }
                })
                .collect()
        }

        fn build_directory(records: &[ContactRecord]) -> DirectoryView {
            let categories = contacts::group_by_category(records)
                .into_iter()
                .map(|(name, members)| CategoryView {
                    name,
                    contacts: members
                        .iter()
                        .map(|c| ContactView {
                            name: c.display_name().to_string(),
                            phone: contacts::format_phone(&c.phone),
                            tel_link: contacts::tel_link(&c.phone),
                            telegram: contacts::telegram_handle(&c.telegram),
                            telegram_link: contacts::telegram_link(&c.telegram),
                            description: c.description.clone(),
                            image_url: (!c.image_url.is_empty()).then(|| c.image_url.clone()),
                        })
                        .collect(),
                })
                .collect();
            DirectoryView { categories }
        }

        fn build_sponsors(records: &[SponsorRecord]) -> SponsorsView {
            let sponsors: Vec<SponsorView> = records
                .iter()
                .map(|s| SponsorView {
                    name: s.name.clone(),
                    image_url: Self::image_or_default(&s.image_url),
                })
                .collect();
            let count = sponsors.len();
            SponsorsView {
                sponsors,
                count,
                count_label: sponsors::supporter_label(count),
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            tracing::debug!(event = event.name(), "handling event");

            match event {
                Event::AppStarted => {
                    // A fresh page load: keep the session policies and
                    // clock, drop everything else.
                    *model = Model {
                        config: model.config,
                        clock: model.clock,
                        ..Model::default()
                    };
                    Self::request_sheet(caps, ITINERARY_CSV_URL, |r| {
                        Event::ItinerarySheetLoaded(Box::new(r))
                    });
                    caps.render.render();
                }

                Event::ItinerarySheetLoaded(result) => {
                    Self::ingest_itinerary(model, *result);
                    caps.render.render();
                }

                Event::NextRequested => {
                    if Self::apply_navigation(model, NavRequest::Next) {
                        caps.render.render();
                    }
                }

                Event::PrevRequested => {
                    if Self::apply_navigation(model, NavRequest::Prev) {
                        caps.render.render();
                    }
                }

                Event::JumpRequested { index } => {
                    if Self::apply_navigation(model, NavRequest::Jump(index)) {
                        caps.render.render();
                    }
                }

                Event::TransitionSettled => {
                    model.transition = TransitionPhase::Idle;
                    caps.render.render();
                }

                Event::ClockTick => {
                    if Self::auto_advance(model) {
                        caps.render.render();
                    }
                }

                Event::DirectoryRequested => {
                    model.directory = SectionPhase::Loading;
                    Self::request_sheet(caps, DIRECTORY_CSV_URL, |r| {
                        Event::DirectorySheetLoaded(Box::new(r))
                    });
                    caps.render.render();
                }

                Event::DirectorySheetLoaded(result) => {
                    model.directory = match Self::sheet_body(*result) {
                        Ok(body) => {
                            let (header, rows) = csv::header_and_rows(&body);
                            let parsed = contacts::map_contacts(&header, &rows);
                            if parsed.is_empty() {
                                SectionPhase::Empty
                            } else {
                                SectionPhase::Ready(parsed)
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "directory fetch failed");
                            SectionPhase::Failed
                        }
                    };
                    caps.render.render();
                }

                Event::SponsorsRequested => {
                    model.sponsors = SectionPhase::Loading;
                    Self::request_sheet(caps, SPONSORS_CSV_URL, |r| {
                        Event::SponsorsSheetLoaded(Box::new(r))
                    });
                    caps.render.render();
                }

                Event::SponsorsSheetLoaded(result) => {
                    model.sponsors = match Self::sheet_body(*result) {
                        Ok(body) => {
                            let (header, rows) = csv::header_and_rows(&body);
                            let parsed = sponsors::map_sponsors(&header, &rows);
                            if parsed.is_empty() {
                                SectionPhase::Empty
                            } else {
                                SectionPhase::Ready(parsed)
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "sponsors fetch failed");
                            SectionPhase::Failed
                        }
                    };
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let now = model.now();

            let state = match &model.phase {
                LoadPhase::Loading => ViewState::Loading,

                LoadPhase::Failed(LoadError::EmptyResult) => ViewState::Empty {
                    message: ITINERARY_EMPTY_MESSAGE.to_string(),
                },

                LoadPhase::Failed(e) => ViewState::Error {
                    message: e.user_facing_message().to_string(),
                },

                LoadPhase::Ready => {
                    let current = model
                        .current
                        .unwrap_or(0)
                        .min(model.records.len().saturating_sub(1));
                    let record = &model.records[current];

                    let can_go = |request| {
                        resolve_nav(
                            &model.records,
                            current,
                            request,
                            model.transition,
                            &model.config,
                            now,
                        )
                        .is_ok()
                    };

                    ViewState::Ready {
                        header_day: day_label(&record.day, &model.day_numbers),
                        slide: Self::build_slide(record),
                        timeline: Self::build_timeline(model, current, now),
                        agenda: AgendaView {
                            rows: agenda::build_rows(&model.records),
                            summary: agenda::build_summary(&model.records, model.fetched_at_ms),
                        },
                        slide_count: model.records.len(),
                        current_index: current,
                        is_transitioning: model.transition == TransitionPhase::Transitioning,
                        can_go_next: can_go(NavRequest::Next),
                        can_go_prev: can_go(NavRequest::Prev),
                    }
                }
            };

            let directory = match &model.directory {
                SectionPhase::NotRequested => SectionViewState::NotRequested,
                SectionPhase::Loading => SectionViewState::Loading,
                SectionPhase::Empty => SectionViewState::Empty {
                    message: DIRECTORY_EMPTY_MESSAGE.to_string(),
                },
                SectionPhase::Failed => SectionViewState::Error {
                    message: DIRECTORY_ERROR_MESSAGE.to_string(),
                },
                SectionPhase::Ready(records) => {
                    SectionViewState::Ready(Self::build_directory(records))
                }
            };

            let sponsors = match &model.sponsors {
                SectionPhase::NotRequested => SectionViewState::NotRequested,
                SectionPhase::Loading => SectionViewState::Loading,
                SectionPhase::Empty => SectionViewState::Empty {
                    message: SPONSORS_EMPTY_MESSAGE.to_string(),
                },
                SectionPhase::Failed => SectionViewState::Error {
                    message: SPONSORS_ERROR_MESSAGE.to_string(),
                },
                SectionPhase::Ready(records) => {
                    SectionViewState::Ready(Self::build_sponsors(records))
                }
            };

            ViewModel {
                state,
                directory,
                sponsors,
                settle_ms: SLIDE_SETTLE_MS,
                tick_interval_ms: AUTO_ADVANCE_INTERVAL_MS,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crux_core::App as _;

    fn fixed(date: (i32, u32, u32), h: u32, m: u32) -> Clock {
        Clock::Fixed(
            NaiveDate::from_ymd_opt(date.0, date.1, date.2)
                .unwrap()
                .and_hms_opt(h, m, 0)
                .unwrap(),
        )
    }

    fn record(day: &str, location: &str, start: &str, end: &str) -> ItineraryRecord {
        ItineraryRecord {
            day: day.to_string(),
            location: location.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            activity: "something".to_string(),
            ..ItineraryRecord::default()
        }
    }

    fn ready_model(records: Vec<ItineraryRecord>, current: usize) -> Model {
        let day_numbers = DayNumbering::build(&records);
        Model {
            phase: LoadPhase::Ready,
            current: Some(current),
            day_numbers,
            records,
            clock: fixed((2025, 6, 2), 11, 0),
            ..Model::default()
        }
    }

    mod clock_tests {
        use super::*;

        #[test]
        fn test_fixed_clock_is_deterministic() {
            let clock = fixed((2025, 6, 2), 11, 0);
            assert_eq!(clock.now(), clock.now());
        }

        #[test]
        fn test_system_clock_is_plausible() {
            // Sanity only: System yields a plausible current instant.
            let now = Clock::System.now();
            assert!(now.and_utc().timestamp() > 0);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_user_facing_messages_are_static_copy() {
            assert_eq!(
                LoadError::FetchFailed("boom".into()).user_facing_message(),
                ITINERARY_ERROR_MESSAGE
            );
            assert_eq!(
                LoadError::EmptyResult.user_facing_message(),
                ITINERARY_EMPTY_MESSAGE
            );
        }
    }

    mod view_tests {
        use super::*;

        #[test]
        fn test_loading_view() {
            let model = Model::default();
            let vm = App.view(&model);
            assert_eq!(vm.state, ViewState::Loading);
            assert_eq!(vm.directory, SectionViewState::NotRequested);
            assert_eq!(vm.settle_ms, SLIDE_SETTLE_MS);
        }

        #[test]
        fn test_ready_view_fills_fallbacks() {
            let model = ready_model(vec![record("01/06/2025", "", "9:00 AM", "10:00 AM")], 0);
            let ViewState::Ready {
                slide, header_day, ..
            } = App.view(&model).state
            else {
                panic!("expected ready state");
            };
            assert_eq!(slide.location, UNKNOWN_LOCATION);
            assert_eq!(slide.image_url, DEFAULT_IMAGE_URL);
            assert_eq!(slide.time_range.as_deref(), Some("9:00 AM — 10:00 AM"));
            assert_eq!(header_day.as_deref(), Some("Day 1"));
        }

        #[test]
        fn test_ready_view_marks_passed_timeline_items() {
            let model = ready_model(
                vec![
                    record("02/06/2025", "a", "9:00 AM", "10:00 AM"),
                    record("02/06/2025", "b", "10:00 AM", "12:00 PM"),
                    record("02/06/2025", "c", "1:00 PM", "2:00 PM"),
                ],
                1,
            );
            let ViewState::Ready {
                timeline,
                can_go_prev,
                can_go_next,
                ..
            } = App.view(&model).state
            else {
                panic!("expected ready state");
            };
            assert_eq!(timeline.len(), 3);
            assert!(timeline[0].is_passed);
            assert!(!timeline[1].is_passed);
            assert_eq!(timeline[1].slot, TimelineSlot::Active);
            // Default temporal gating: the passed record behind us is
            // unreachable, the future one is fine.
            assert!(!can_go_prev);
            assert!(can_go_next);
            assert!(!timeline[0].is_navigable);
            assert!(timeline[2].is_navigable);
        }

        #[test]
        fn test_failed_views() {
            let mut model = Model::default();
            model.phase = LoadPhase::Failed(LoadError::FetchFailed("x".into()));
            assert!(matches!(App.view(&model).state, ViewState::Error { .. }));

            model.phase = LoadPhase::Failed(LoadError::EmptyResult);
            assert!(matches!(App.view(&model).state, ViewState::Empty { .. }));
        }

        #[test]
        fn test_view_serializes_with_snake_case_tags() {
            let vm = App.view(&Model::default());
            let json = serde_json::to_value(&vm).unwrap();
            assert_eq!(json["state"]["type"], "loading");
            assert_eq!(json["directory"]["type"], "not_requested");
        }
    }

    mod section_view_tests {
        use super::*;

        #[test]
        fn test_directory_states_map_through() {
            let mut model = Model::default();

            model.directory = SectionPhase::Loading;
            assert_eq!(App.view(&model).directory, SectionViewState::Loading);

            model.directory = SectionPhase::Empty;
            assert!(matches!(
                App.view(&model).directory,
                SectionViewState::Empty { .. }
            ));

            model.directory = SectionPhase::Ready(vec![ContactRecord {
                name: "Tourist Police".into(),
                phone: "12 345 678".into(),
                ..ContactRecord::default()
            }]);
            let SectionViewState::Ready(view) = App.view(&model).directory else {
                panic!("expected ready directory");
            };
            assert_eq!(view.categories.len(), 1);
            assert_eq!(view.categories[0].name, "Other");
            assert_eq!(
                view.categories[0].contacts[0].tel_link.as_deref(),
                Some("tel:012345678")
            );
        }

        #[test]
        fn test_sponsor_count_label() {
            let mut model = Model::default();
            model.sponsors = SectionPhase::Ready(vec![SponsorRecord {
                name: "Angkor Tours".into(),
                image_url: String::new(),
            }]);
            let SectionViewState::Ready(view) = App.view(&model).sponsors else {
                panic!("expected ready sponsors");
            };
            assert_eq!(view.count_label, "1 supporter");
            assert_eq!(view.sponsors[0].image_url, DEFAULT_IMAGE_URL);
        }
    }
}
