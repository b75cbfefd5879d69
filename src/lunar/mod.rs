//! Korean lunar calendar
//!
//! Note: 용어를 다루기 편하도록 이 모듈의 문서는 한국어로 쓴다.
//!
//! 음력 자료표([`table`])에서 해마다 달의 대소와 윤달을 읽고, 기준 연도(1000년)부터 센 누적 일수인
//! "절대일"을 양력과 음력이 함께 쓰는 좌표로 삼아 서로 변환한다.

use std::sync::Arc;

use log::trace;
use serde::Deserialize;

use crate::date::{LunarDate, SolarDate};
use crate::error::{Error, Result};

pub mod cache;
pub mod gapja;
pub mod table;

use cache::{DayCache, Memo};
use table::{Constants, TableStore, YearRecord};

/// 절대일을 세기 시작하는 기준 연도
pub const BASE_YEAR: i32 = 1000;
/// 변환을 지원하는 마지막 연도
pub const MAX_YEAR: i32 = 2050;
/// 기준 연도의 양력 1월 1일과 음력 1월 1일 사이의 일수 차
pub const SOLAR_LUNAR_DAY_DIFF: i32 = 43;

const SOLAR_DAYS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// 엔진 설정
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// 누적 일수를 연도·월별로 기억해 두고 다시 쓴다. 결과는 켜든 끄든 같다.
    pub memoize: bool,
}

/// 변환 엔진
///
/// 복제하면 자료표와 메모를 그대로 공유한다.
///
/// # 용례
///
/// ```
/// use std::sync::Arc;
/// use eumnyeok::{LunarDate, SolarDate};
/// use eumnyeok::lunar::{Engine, table::TableStore};
///
/// let engine = Engine::new(Arc::new(TableStore::bundled()));
///
/// let lunar = engine.solar_to_lunar(SolarDate::new(2017, 6, 24)).unwrap();
/// assert_eq!(LunarDate::new(2017, 5, 1, true), lunar);
///
/// let solar = engine.lunar_to_solar(lunar).unwrap();
/// assert_eq!(SolarDate::new(2017, 6, 24), solar);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    store: Arc<TableStore>,
    cache: Option<Arc<DayCache>>,
}

impl Engine {
    pub fn new(store: Arc<TableStore>) -> Self {
        Self::with_options(store, EngineOptions::default())
    }

    pub fn with_options(store: Arc<TableStore>, options: EngineOptions) -> Self {
        Self {
            store,
            cache: options.memoize.then(|| Arc::new(DayCache::new())),
        }
    }

    /// 공유 중인 자료표
    pub fn store(&self) -> &Arc<TableStore> {
        &self.store
    }

    pub fn is_memoized(&self) -> bool {
        self.cache.is_some()
    }

    fn record(&self, year: i32) -> Result<YearRecord> {
        self.store.record_for(year)
    }

    fn constants(&self) -> Result<Constants> {
        self.store.constants()
    }

    /// 그해 윤달의 월 번호, 없으면 0
    pub fn intercalation_month(&self, year: i32) -> Result<u32> {
        Ok(self.record(year)?.intercalation_month())
    }

    /// 그해 음력 총 일수
    pub fn total_lunar_days(&self, year: i32) -> Result<u32> {
        Ok(self.record(year)?.total_days())
    }

    /// 그해 양력이 윤년인지
    pub fn is_solar_leap_year(&self, year: i32) -> Result<bool> {
        Ok(self.record(year)?.is_solar_leap())
    }

    /// 음력 달의 일수(29 또는 30)
    ///
    /// `intercalation` 이고 그해 윤달이 `month` 이면 윤달의 일수, 아니면 평달의 일수를 돌려준다.
    pub fn lunar_month_days(&self, year: i32, month: u32, intercalation: bool) -> Result<u32> {
        check_month(month)?;
        let rec = self.record(year)?;
        let big = if intercalation && rec.intercalation_month() == month {
            rec.is_intercalation_big()
        } else {
            rec.is_month_big(month)
        };
        Ok(self.constants()?.lunar_month_days(big))
    }

    /// 양력 달의 일수. 윤년의 2월은 29일이다.
    pub fn solar_month_days(&self, year: i32, month: u32) -> Result<u32> {
        check_month(month)?;
        if month == 2 && self.is_solar_leap_year(year)? {
            Ok(29)
        } else {
            Ok(SOLAR_DAYS[month as usize - 1])
        }
    }

    /// 양력 한 해의 일수
    pub fn solar_year_days(&self, year: i32) -> Result<u32> {
        let leap = self.is_solar_leap_year(year)?;
        Ok(self.constants()?.solar_year_days + leap as u32)
    }

    fn memoized<K: Copy + Eq + std::hash::Hash + std::fmt::Debug>(
        &self,
        memo: impl FnOnce(&DayCache) -> &Memo<K>,
        key: K,
        compute: impl FnOnce() -> Result<i32>,
    ) -> Result<i32> {
        match &self.cache {
            Some(cache) => memo(cache).get_or_try_insert(key, compute),
            None => compute(),
        }
    }

    /// 기준 연도부터 `year` 까지(그해 포함) 음력 일수의 합
    ///
    /// `year` 앞까지의 일수가 필요하면 `year - 1` 을 넘긴다. 기준 연도 이전이면 0.
    pub fn lunar_days_before_year(&self, year: i32) -> Result<i32> {
        if year < BASE_YEAR {
            return Ok(0);
        }
        self.memoized(
            |c| &c.lunar_years,
            year,
            || {
                (BASE_YEAR..=year)
                    .map(|y| self.total_lunar_days(y).map(|d| d as i32))
                    .sum()
            },
        )
    }

    /// `year` 의 1월부터 `month` 월까지(그달 포함) 평달 일수의 합
    ///
    /// `include_intercalation` 이고 그해 윤달이 `month` 이하이면 윤달 일수를 한 번 더한다.
    /// `month` 가 0이면 0.
    pub fn lunar_days_before_month(
        &self,
        year: i32,
        month: u32,
        include_intercalation: bool,
    ) -> Result<i32> {
        if month == 0 {
            return Ok(0);
        }
        self.memoized(
            |c| &c.lunar_months,
            (year, month, include_intercalation),
            || {
                let mut days = 0;
                for m in 1..=month {
                    days += self.lunar_month_days(year, m, false)? as i32;
                }
                if include_intercalation {
                    let leap = self.intercalation_month(year)?;
                    if leap > 0 && leap <= month {
                        days += self.lunar_month_days(year, leap, true)? as i32;
                    }
                }
                Ok(days)
            },
        )
    }

    /// 기준 연도부터 `year` 까지(그해 포함) 양력 일수의 합
    pub fn solar_days_before_year(&self, year: i32) -> Result<i32> {
        if year < BASE_YEAR {
            return Ok(0);
        }
        self.memoized(
            |c| &c.solar_years,
            year,
            || {
                (BASE_YEAR..=year)
                    .map(|y| self.solar_year_days(y).map(|d| d as i32))
                    .sum()
            },
        )
    }

    /// `year` 의 1월부터 `month` 월까지(그달 포함) 양력 일수의 합
    pub fn solar_days_before_month(&self, year: i32, month: u32) -> Result<i32> {
        let mut days = 0;
        for m in 1..=month {
            days += self.solar_month_days(year, m)? as i32;
        }
        Ok(days)
    }

    /// 양력 날짜의 절대일
    pub fn solar_abs_days(&self, year: i32, month: u32, day: u32) -> Result<i32> {
        Ok(self.solar_days_before_year(year - 1)?
            + self.solar_days_before_month(year, month.saturating_sub(1))?
            + day as i32
            - SOLAR_LUNAR_DAY_DIFF)
    }

    /// 음력 날짜의 절대일
    ///
    /// 윤달은 같은 번호의 평달 바로 뒤에 오므로, 윤달의 날짜에는 평달 일수를 더한다.
    pub fn lunar_abs_days(
        &self,
        year: i32,
        month: u32,
        day: u32,
        intercalation: bool,
    ) -> Result<i32> {
        let mut days = self.lunar_days_before_year(year - 1)?
            + self.lunar_days_before_month(year, month.saturating_sub(1), true)?
            + day as i32;
        if intercalation && self.intercalation_month(year)? == month {
            days += self.lunar_month_days(year, month, false)? as i32;
        }
        Ok(days)
    }

    /// 양력 입력을 검사한다. 날짜는 실제 그달 일수와도 비교한다.
    pub fn validate_solar(&self, date: SolarDate) -> Result<()> {
        check_year(date.year)?;
        check_month(date.month)?;
        check_day(date.day, 31)?;
        check_day(date.day, self.solar_month_days(date.year, date.month)?)
    }

    /// 음력 입력을 검사한다.
    ///
    /// 윤달을 요청했으면 그해 윤달이 바로 그 달이어야 하고, 날짜는 해당 달 일수를 넘지 않아야 한다.
    pub fn validate_lunar(&self, date: LunarDate) -> Result<()> {
        check_year(date.year)?;
        check_month(date.month)?;
        check_day(date.day, 31)?;
        let leap = self.intercalation_month(date.year)?;
        if date.intercalation && leap != date.month {
            return Err(Error::InvalidIntercalation {
                year: date.year,
                month: date.month,
                actual: leap,
            });
        }
        let max = self.lunar_month_days(date.year, date.month, date.intercalation)?;
        check_day(date.day, max)
    }

    /// 양력 → 음력
    ///
    /// 음력 설은 양력 이전 해에 걸칠 수 있으므로 먼저 해를 정하고, 12월부터 거꾸로 내려가며
    /// 시작일이 절대일 이하인 첫 달을 찾는다.
    pub fn solar_to_lunar(&self, date: SolarDate) -> Result<LunarDate> {
        self.validate_solar(date)?;
        let abs = self.solar_abs_days(date.year, date.month, date.day)?;

        let new_year = self.lunar_abs_days(date.year, 1, 1, false)?;
        let year = if abs >= new_year {
            date.year
        } else {
            date.year - 1
        };

        let mut month = 12;
        let mut start = self.lunar_abs_days(year, month, 1, false)?;
        while month > 1 && abs < start {
            month -= 1;
            start = self.lunar_abs_days(year, month, 1, false)?;
        }
        trace!("solar {date}: abs {abs}, lunar month {year}-{month} starts at {start}");

        let mut intercalation = false;
        if self.intercalation_month(year)? == month {
            let leap_start = self.lunar_abs_days(year, month, 1, true)?;
            if abs >= leap_start {
                intercalation = true;
                start = leap_start;
            }
        }

        Ok(LunarDate::new(
            year,
            month,
            (abs - start + 1) as u32,
            intercalation,
        ))
    }

    /// 음력 → 양력
    pub fn lunar_to_solar(&self, date: LunarDate) -> Result<SolarDate> {
        self.validate_lunar(date)?;
        let abs = self.lunar_abs_days(date.year, date.month, date.day, date.intercalation)?;

        let next_new_year = self.solar_abs_days(date.year + 1, 1, 1)?;
        let year = if abs < next_new_year {
            date.year
        } else {
            date.year + 1
        };

        let mut month = 12;
        let mut start = self.solar_abs_days(year, month, 1)?;
        while month > 1 && abs < start {
            month -= 1;
            start = self.solar_abs_days(year, month, 1)?;
        }
        trace!("lunar {date}: abs {abs}, solar month {year}-{month} starts at {start}");

        Ok(SolarDate::new(year, month, (abs - start + 1) as u32))
    }
}

fn check_year(year: i32) -> Result<()> {
    if (BASE_YEAR..=MAX_YEAR).contains(&year) {
        Ok(())
    } else {
        Err(Error::YearOutOfRange {
            year,
            start: BASE_YEAR,
            end: MAX_YEAR,
        })
    }
}

fn check_month(month: u32) -> Result<()> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(Error::InvalidMonth { month })
    }
}

fn check_day(day: u32, max: u32) -> Result<()> {
    if (1..=max).contains(&day) {
        Ok(())
    } else {
        Err(Error::InvalidDay { day, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::YearType;

    fn engine() -> Engine {
        Engine::new(Arc::new(TableStore::bundled()))
    }

    fn memoized_engine() -> Engine {
        Engine::with_options(
            Arc::new(TableStore::bundled()),
            EngineOptions { memoize: true },
        )
    }

    fn next_day(date: SolarDate) -> SolarDate {
        let SolarDate { year, month, day } = date;
        let len = match month {
            2 if YearType::from_gregorian(year).is_leap() => 29,
            2 => 28,
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        };
        if day < len {
            SolarDate::new(year, month, day + 1)
        } else if month < 12 {
            SolarDate::new(year, month + 1, 1)
        } else {
            SolarDate::new(year + 1, 1, 1)
        }
    }

    #[test]
    fn options() {
        let opts: EngineOptions = serde_json::from_str("{}").unwrap();
        assert!(!opts.memoize);
        let opts: EngineOptions = serde_json::from_str(r#"{ "memoize": true }"#).unwrap();
        assert!(Engine::with_options(Arc::new(TableStore::bundled()), opts).is_memoized());
        assert!(!engine().is_memoized());
    }

    #[test]
    fn decoders() {
        let engine = engine();
        assert_eq!(4, engine.intercalation_month(2020).unwrap());
        assert_eq!(0, engine.intercalation_month(2019).unwrap());
        assert_eq!(5, engine.intercalation_month(2017).unwrap());
        assert_eq!(384, engine.total_lunar_days(2020).unwrap());
        assert_eq!(354, engine.total_lunar_days(2019).unwrap());
        assert!(engine.is_solar_leap_year(2000).unwrap());
        assert!(!engine.is_solar_leap_year(1900).unwrap());
    }

    #[test]
    fn month_days() {
        let engine = engine();
        // 2020: 4월 30일, 윤4월 29일
        assert_eq!(30, engine.lunar_month_days(2020, 4, false).unwrap());
        assert_eq!(29, engine.lunar_month_days(2020, 4, true).unwrap());
        // 윤달이 아닌 달에 윤달을 물으면 평달
        assert_eq!(30, engine.lunar_month_days(2020, 5, true).unwrap());
        assert!(matches!(
            engine.lunar_month_days(2020, 13, false),
            Err(Error::InvalidMonth { month: 13 })
        ));

        assert_eq!(29, engine.solar_month_days(2024, 2).unwrap());
        assert_eq!(28, engine.solar_month_days(2023, 2).unwrap());
        assert_eq!(28, engine.solar_month_days(1900, 2).unwrap());
        assert_eq!(31, engine.solar_month_days(2023, 12).unwrap());
        assert_eq!(366, engine.solar_year_days(2024).unwrap());
        assert_eq!(365, engine.solar_year_days(2023).unwrap());
    }

    #[test]
    fn cumulative_days() {
        let engine = engine();
        assert_eq!(0, engine.lunar_days_before_year(BASE_YEAR - 1).unwrap());
        assert_eq!(
            engine.total_lunar_days(BASE_YEAR).unwrap() as i32,
            engine.lunar_days_before_year(BASE_YEAR).unwrap()
        );
        assert_eq!(0, engine.lunar_days_before_month(2020, 0, true).unwrap());
        // 1~4월: 30 + 29 + 30 + 30
        assert_eq!(119, engine.lunar_days_before_month(2020, 4, false).unwrap());
        // 윤4월 29일 포함
        assert_eq!(148, engine.lunar_days_before_month(2020, 4, true).unwrap());
        assert_eq!(119, engine.lunar_days_before_month(2020, 3, true).unwrap() + 30);
        assert_eq!(
            384,
            engine.lunar_days_before_month(2020, 12, true).unwrap()
        );
        assert_eq!(365, engine.solar_days_before_year(BASE_YEAR).unwrap());
        assert_eq!(0, engine.solar_days_before_month(2024, 0).unwrap());
        assert_eq!(60, engine.solar_days_before_month(2024, 2).unwrap());
    }

    #[test]
    fn epochs_share_day_one() {
        let engine = engine();
        assert_eq!(1, engine.lunar_abs_days(1000, 1, 1, false).unwrap());
        assert_eq!(1, engine.solar_abs_days(1000, 2, 13).unwrap());
        assert_eq!(-42, engine.solar_abs_days(1000, 1, 1).unwrap());
    }

    #[test]
    fn intercalation_follows_its_month() {
        let engine = engine();
        let m4 = engine.lunar_abs_days(2020, 4, 1, false).unwrap();
        let leap4 = engine.lunar_abs_days(2020, 4, 1, true).unwrap();
        let m5 = engine.lunar_abs_days(2020, 5, 1, false).unwrap();
        assert_eq!(m4 + 30, leap4);
        assert_eq!(leap4 + 29, m5);
        // 윤달이 없는 달에 윤달 표시는 무시된다
        assert_eq!(
            engine.lunar_abs_days(2020, 6, 1, false).unwrap(),
            engine.lunar_abs_days(2020, 6, 1, true).unwrap()
        );
    }

    #[test]
    fn solar_to_lunar() {
        let engine = engine();
        let dataset = [
            ((2017, 6, 24), (2017, 5, 1, true)),
            ((2017, 7, 22), (2017, 5, 29, true)),
            ((2017, 7, 23), (2017, 6, 1, false)),
            ((2020, 1, 1), (2019, 12, 7, false)),
            ((2020, 5, 23), (2020, 4, 1, true)),
            ((2020, 6, 21), (2020, 5, 1, false)),
            ((2023, 1, 22), (2023, 1, 1, false)),
            ((2024, 2, 10), (2024, 1, 1, false)),
            ((2024, 9, 17), (2024, 8, 15, false)),
            ((2000, 1, 1), (1999, 11, 25, false)),
            ((1000, 2, 13), (1000, 1, 1, false)),
            ((2050, 12, 31), (2050, 11, 18, false)),
        ];
        for ((y, m, d), (ly, lm, ld, li)) in dataset {
            assert_eq!(
                LunarDate::new(ly, lm, ld, li),
                engine.solar_to_lunar(SolarDate::new(y, m, d)).unwrap(),
                "{y:04}-{m:02}-{d:02}"
            );
        }
    }

    #[test]
    fn lunar_new_years() {
        let engine = engine();
        for (y, m, d) in [
            (2017, 1, 28),
            (2018, 2, 16),
            (2019, 2, 5),
            (2020, 1, 25),
            (2021, 2, 12),
            (2022, 2, 1),
            (2023, 1, 22),
            (2024, 2, 10),
            (2025, 1, 29),
        ] {
            assert_eq!(
                SolarDate::new(y, m, d),
                engine
                    .lunar_to_solar(LunarDate::new(y, 1, 1, false))
                    .unwrap()
            );
        }
    }

    #[test]
    fn round_trip() {
        let engine = engine();
        for (y, m, d) in [(2024, 6, 15), (2023, 12, 25), (2022, 8, 15), (2021, 10, 3)] {
            let solar = SolarDate::new(y, m, d);
            let lunar = engine.solar_to_lunar(solar).unwrap();
            assert_eq!(solar, engine.lunar_to_solar(lunar).unwrap());
        }
    }

    #[test]
    fn round_trip_every_day() {
        let engine = memoized_engine();
        let mut date = SolarDate::new(2015, 1, 1);
        while date <= SolarDate::new(2026, 12, 31) {
            let lunar = engine.solar_to_lunar(date).unwrap();
            assert_eq!(date, engine.lunar_to_solar(lunar).unwrap(), "{lunar}");
            date = next_day(date);
        }
    }

    #[test]
    fn round_trip_whole_range() {
        let engine = memoized_engine();
        let mut date = SolarDate::new(1000, 2, 13);
        let mut prev: Option<LunarDate> = None;
        while date <= SolarDate::new(2050, 12, 31) {
            let lunar = engine.solar_to_lunar(date).unwrap();
            assert_eq!(date, engine.lunar_to_solar(lunar).unwrap(), "{lunar}");
            assert!((1..=30).contains(&lunar.day), "{date}: {lunar}");
            if let Some(prev) = prev {
                assert_ne!(prev, lunar);
            }
            prev = Some(lunar);
            for _ in 0..13 {
                date = next_day(date);
            }
        }
    }

    #[test]
    fn lunar_round_trip() {
        let engine = memoized_engine();
        for year in 2015..=2025 {
            let leap = engine.intercalation_month(year).unwrap();
            for month in 1..=12 {
                for intercalation in [false, true] {
                    if intercalation && leap != month {
                        continue;
                    }
                    let len = engine.lunar_month_days(year, month, intercalation).unwrap();
                    for day in 1..=len {
                        let lunar = LunarDate::new(year, month, day, intercalation);
                        let solar = engine.lunar_to_solar(lunar).unwrap();
                        assert_eq!(lunar, engine.solar_to_lunar(solar).unwrap(), "{solar}");
                    }
                }
            }
        }
    }

    #[test]
    fn memoized_matches_plain() {
        let plain = engine();
        let memo = memoized_engine();
        let mut date = SolarDate::new(1000, 2, 13);
        while date <= SolarDate::new(2050, 12, 31) {
            let lunar = plain.solar_to_lunar(date).unwrap();
            assert_eq!(lunar, memo.solar_to_lunar(date).unwrap());
            assert_eq!(
                plain.lunar_to_solar(lunar).unwrap(),
                memo.lunar_to_solar(lunar).unwrap()
            );
            for _ in 0..997 {
                date = next_day(date);
            }
        }
        for year in [BASE_YEAR, 1500, 2000, MAX_YEAR] {
            assert_eq!(
                plain.lunar_days_before_year(year).unwrap(),
                memo.lunar_days_before_year(year).unwrap()
            );
            assert_eq!(
                plain.solar_days_before_year(year).unwrap(),
                memo.solar_days_before_year(year).unwrap()
            );
        }
    }

    #[test]
    fn clones_share_memo() {
        let engine = memoized_engine();
        let clone = engine.clone();
        engine.solar_to_lunar(SolarDate::new(2024, 1, 1)).unwrap();
        assert!(Arc::ptr_eq(engine.store(), clone.store()));
        let cache = clone.cache.as_ref().unwrap();
        assert!(!cache.lunar_years.is_empty());
        assert!(!cache.solar_years.is_empty());
        assert!(!cache.lunar_months.is_empty());
    }

    #[test]
    fn rejects_solar() {
        let engine = engine();
        for ((y, m, d), std) in [
            ((999, 1, 1), "year"),
            ((2051, 1, 1), "year"),
            ((1000, 1, 1), "year"),
            ((1000, 2, 12), "year"),
            ((2024, 0, 1), "month"),
            ((2024, 13, 1), "month"),
            ((2024, 1, 0), "day"),
            ((2024, 1, 32), "day"),
            ((2023, 2, 29), "day"),
            ((2024, 4, 31), "day"),
        ] {
            let err = engine.solar_to_lunar(SolarDate::new(y, m, d)).unwrap_err();
            let kind = match err {
                Error::YearOutOfRange { .. } => "year",
                Error::InvalidMonth { .. } => "month",
                Error::InvalidDay { .. } => "day",
                _ => "other",
            };
            assert_eq!(std, kind, "{y:04}-{m:02}-{d:02}: {err}");
        }
    }

    #[test]
    fn rejects_lunar() {
        let engine = engine();
        let err = engine
            .lunar_to_solar(LunarDate::new(2019, 12, 6, true))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIntercalation {
                year: 2019,
                month: 12,
                actual: 0
            }
        ));
        let err = engine
            .lunar_to_solar(LunarDate::new(2020, 5, 15, true))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidIntercalation {
                year: 2020,
                month: 5,
                actual: 4
            }
        ));
        // 윤4월은 29일까지
        let err = engine
            .lunar_to_solar(LunarDate::new(2020, 4, 30, true))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDay { day: 30, max: 29 }));
        assert!(engine.lunar_to_solar(LunarDate::new(2020, 4, 30, false)).is_ok());
        // 표 끝을 넘어가는 양력
        let err = engine
            .lunar_to_solar(LunarDate::new(2050, 11, 19, false))
            .unwrap_err();
        assert!(matches!(err, Error::YearOutOfRange { year: 2051, .. }));
    }
}
