//! A calendar session holding the last converted solar/lunar pair.

use log::{debug, error};

use crate::date::{LunarDate, SolarDate};
use crate::error::{Error, Result};
use crate::lunar::Engine;
use crate::lunar::gapja::{Basis, GapJa, Script};

/// Converts dates and remembers the last successful conversion.
///
/// Either date is `None` until a conversion succeeds. A failed conversion
/// leaves the previously stored pair untouched.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use eumnyeok::{Engine, KoreanLunarCalendar, TableStore};
/// use eumnyeok::lunar::gapja::{Basis, Script};
///
/// let engine = Engine::new(Arc::new(TableStore::bundled()));
/// let mut cal = KoreanLunarCalendar::new(engine);
///
/// assert!(cal.set_solar_date(2024, 1, 1));
/// assert_eq!(Some("2023-11-20".to_owned()), cal.lunar_iso());
/// assert_eq!(
///     Some("계묘년 갑자월 갑자일".to_owned()),
///     cal.gapja_string(Basis::Lunar, Script::Korean)
/// );
///
/// assert!(!cal.set_lunar_date(2019, 12, 6, true)); // 2019 has no leap 12th month
/// assert_eq!(Some("2024-01-01".to_owned()), cal.solar_iso());
/// ```
#[derive(Debug, Clone)]
pub struct KoreanLunarCalendar {
    engine: Engine,
    solar: Option<SolarDate>,
    lunar: Option<LunarDate>,
}

impl KoreanLunarCalendar {
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            solar: None,
            lunar: None,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// The stored solar date, if any.
    pub fn solar(&self) -> Option<SolarDate> {
        self.solar
    }
    /// The stored lunar date, if any.
    pub fn lunar(&self) -> Option<LunarDate> {
        self.lunar
    }

    /// Sets a solar date and converts it into lunar calendar.
    ///
    /// Returns `false` and keeps the previous state if the date is invalid or
    /// the table cannot be loaded.
    pub fn set_solar_date(&mut self, year: i32, month: u32, day: u32) -> bool {
        report(self.try_set_solar_date(year, month, day))
    }

    /// Like [`set_solar_date`](Self::set_solar_date), but returns the
    /// converted lunar date or the reason of failure.
    pub fn try_set_solar_date(&mut self, year: i32, month: u32, day: u32) -> Result<LunarDate> {
        let solar = SolarDate::new(year, month, day);
        debug!("converting solar date {solar}");
        let lunar = self.engine.solar_to_lunar(solar)?;
        debug!("solar {solar} is lunar {lunar}");
        self.solar = Some(solar);
        self.lunar = Some(lunar);
        Ok(lunar)
    }

    /// Sets a lunar date and converts it into solar calendar.
    ///
    /// `intercalation` must only be set for the actual intercalation month of
    /// `year`. Returns `false` and keeps the previous state on failure.
    pub fn set_lunar_date(&mut self, year: i32, month: u32, day: u32, intercalation: bool) -> bool {
        report(self.try_set_lunar_date(year, month, day, intercalation))
    }

    /// Like [`set_lunar_date`](Self::set_lunar_date), but returns the
    /// converted solar date or the reason of failure.
    pub fn try_set_lunar_date(
        &mut self,
        year: i32,
        month: u32,
        day: u32,
        intercalation: bool,
    ) -> Result<SolarDate> {
        let lunar = LunarDate::new(year, month, day, intercalation);
        debug!("converting lunar date {lunar}");
        let solar = self.engine.lunar_to_solar(lunar)?;
        debug!("lunar {lunar} is solar {solar}");
        self.lunar = Some(lunar);
        self.solar = Some(solar);
        Ok(solar)
    }

    /// Formats the stored solar date as `YYYY-MM-DD`.
    pub fn solar_iso(&self) -> Option<String> {
        self.solar.map(|d| d.iso())
    }

    /// Formats the stored lunar date as `YYYY-MM-DD`, with an ` Intercalation`
    /// suffix for a date in an intercalation month.
    pub fn lunar_iso(&self) -> Option<String> {
        self.lunar.map(|d| d.iso())
    }

    /// Sexagenary names of the stored date, computed on the given basis.
    ///
    /// Returns `None` if no date has been set yet.
    pub fn gapja(&self, basis: Basis) -> Option<GapJa> {
        let res = match basis {
            Basis::Solar => self.solar.map(|d| GapJa::from_solar(&self.engine, d)),
            Basis::Lunar => self.lunar.map(|d| GapJa::from_lunar(&self.engine, d)),
        }?;
        match res {
            Ok(gapja) => Some(gapja),
            Err(e) => {
                error!("cannot derive gap-ja: {e}");
                None
            }
        }
    }

    /// Renders [`gapja`](Self::gapja) in the given script, e.g.
    /// `"계묘년 갑자월 갑자일"` or `"癸卯年 甲子月 甲子日"`.
    pub fn gapja_string(&self, basis: Basis, script: Script) -> Option<String> {
        self.gapja(basis).map(|g| g.render(script))
    }
}

fn report<T>(res: Result<T>) -> bool {
    match res {
        Ok(_) => true,
        Err(e @ Error::Resource(_)) => {
            error!("{e}");
            false
        }
        Err(e) => {
            debug!("rejected: {e}");
            false
        }
    }
}
