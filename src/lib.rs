//! Utilities for converting dates between Gregorian calendar and Korean
//! lunar calendar.
//!
//! Conversion is table driven: one packed 32-bit record per lunar year,
//! covering years 1000 to 2050, gives the size of each month and the
//! intercalation (leap) month. Both calendars are mapped onto a shared count
//! of days since lunar year 1000, and the counterpart date is found by
//! searching backwards month by month.
//!
//! # Examples
//!
//! Basic usage with [`KoreanLunarCalendar`]:
//!
//! ```
//! use std::sync::Arc;
//! use eumnyeok::{Engine, KoreanLunarCalendar, TableStore};
//!
//! let engine = Engine::new(Arc::new(TableStore::bundled()));
//! let mut cal = KoreanLunarCalendar::new(engine);
//!
//! assert!(cal.set_solar_date(2017, 6, 24));
//! assert_eq!(Some("2017-05-01 Intercalation".to_owned()), cal.lunar_iso());
//!
//! assert!(cal.set_lunar_date(2024, 1, 1, false));
//! assert_eq!(Some("2024-02-10".to_owned()), cal.solar_iso());
//! ```
//!
//! Sexagenary (Gap-Ja) names:
//!
//! ```
//! use std::sync::Arc;
//! use eumnyeok::{Engine, KoreanLunarCalendar, TableStore};
//! use eumnyeok::lunar::gapja::{Basis, Script};
//!
//! let mut cal = KoreanLunarCalendar::new(Engine::new(Arc::new(TableStore::bundled())));
//! cal.set_solar_date(2024, 1, 1);
//!
//! assert_eq!(
//!     Some("癸卯年 甲子月 甲子日".to_owned()),
//!     cal.gapja_string(Basis::Lunar, Script::Chinese)
//! );
//! ```
//!
//! The table is loaded once per [`TableStore`], on first use. Share one store
//! (and, if memoization is enabled, one [`Engine`]) between calendars.

pub mod calendar;
pub mod date;
pub mod error;
pub mod lunar;

pub use calendar::KoreanLunarCalendar;
pub use date::{LunarDate, SolarDate, YearType};
pub use error::{Error, ResourceError};
pub use lunar::table::TableStore;
pub use lunar::{Engine, EngineOptions};
