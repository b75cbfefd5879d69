//! 음력 연도별 자료표
//!
//! 자료는 `data/lunar_table.json` 에서 가져오며, 한 해의 음력 정보를 32비트 정수 하나로 압축한다.
//!
//! | 비트 | 내용 |
//! |------|------|
//! | 0–11 | 평달 대소, `m` 월은 `12 - m` 번 비트, 1 이면 큰달(30일) |
//! | 12–15 | 윤달 월 번호, 없으면 0 |
//! | 16 | 윤달 대소 |
//! | 17–25 | 그해 음력 총 일수 |
//! | 30 | 같은 해 양력 윤년 여부 |

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::date::YearType;
use crate::error::{Error, ResourceError, Result};

static BUNDLED: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/lunar_table.json"));

/// 해마다 하나씩 있는 압축 레코드
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct YearRecord(pub u32);

impl YearRecord {
    /// 윤달의 월 번호, 윤달이 없는 해는 0
    pub fn intercalation_month(self) -> u32 {
        (self.0 >> 12) & 0xF
    }
    /// 윤달이 큰달이면 `true`. 윤달이 없는 해에는 의미가 없다.
    pub fn is_intercalation_big(self) -> bool {
        (self.0 >> 16) & 0x1 == 1
    }
    /// 평달 `month` 가 큰달이면 `true`
    ///
    /// `month` 는 `1..=12` 여야 한다.
    pub fn is_month_big(self, month: u32) -> bool {
        debug_assert!((1..=12).contains(&month), "month {month} not in 1..=12");
        (self.0 >> (12 - month)) & 0x1 == 1
    }
    /// 윤달을 포함한 그해 음력 총 일수
    pub fn total_days(self) -> u32 {
        (self.0 >> 17) & 0x1FF
    }
    /// 같은 해 양력이 윤년이면 `true`
    pub fn is_solar_leap(self) -> bool {
        (self.0 >> 30) & 0x1 == 1
    }
}

/// 자료표 전체
#[derive(Debug, Clone, Deserialize)]
pub struct LunarTable {
    pub metadata: Metadata,
    pub constants: Constants,
    /// `year - metadata.year_range.start` 번째가 그해 레코드
    pub data: Vec<u32>,
}

/// 자료표 출처와 지원 범위
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub version: String,
    pub source: String,
    pub year_range: YearRange,
    /// 음력으로 표현한 지원 범위
    pub lunar_range: DateRange,
    /// 양력으로 표현한 지원 범위
    pub gregorian_range: DateRange,
    pub description: String,
}

/// 자료가 있는 연도 범위(양 끝 포함)
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn contains(&self, year: i32) -> bool {
        (self.start..=self.end).contains(&year)
    }
    /// 범위에 든 연도 수
    pub fn len(&self) -> usize {
        usize::try_from(i64::from(self.end) - i64::from(self.start) + 1).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// ISO 형식 문자열로 적은 날짜 범위
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// 일수 상수
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
pub struct Constants {
    pub lunar_big_month_days: u32,
    pub lunar_small_month_days: u32,
    /// 평년 일수, 윤년은 여기에 하루를 더한다.
    pub solar_year_days: u32,
    pub lunar_year_days: u32,
}

impl Constants {
    /// 큰달이면 큰달 일수, 아니면 작은달 일수
    pub fn lunar_month_days(&self, big: bool) -> u32 {
        if big {
            self.lunar_big_month_days
        } else {
            self.lunar_small_month_days
        }
    }
}

impl LunarTable {
    /// JSON 자료를 해석하고 구조를 검사한다.
    ///
    /// 레코드 수가 연도 범위와 맞아야 하고, 해마다 월별 일수의 합이 총 일수와 같아야 한다.
    /// 양력 윤년 비트는 (1582년 이전에도) 그레고리력 규칙을 따라야 하므로 율리우스력 윤년을
    /// 적은 자료표는 받지 않는다.
    pub fn parse(json: &str) -> Result<Self, ResourceError> {
        let table: LunarTable =
            serde_json::from_str(json).map_err(|e| ResourceError::Malformed(Arc::new(e)))?;
        table.check()?;
        Ok(table)
    }

    /// 공표된 연도 범위
    pub fn year_range(&self) -> YearRange {
        self.metadata.year_range
    }

    /// `year` 의 레코드를 가져온다. 범위 밖이면 [`Error::YearOutOfRange`].
    pub fn record_for(&self, year: i32) -> Result<YearRecord> {
        let range = self.year_range();
        if !range.contains(year) {
            return Err(Error::YearOutOfRange {
                year,
                start: range.start,
                end: range.end,
            });
        }
        let idx = (i64::from(year) - i64::from(range.start)) as usize;
        Ok(YearRecord(self.data[idx]))
    }

    fn check(&self) -> Result<(), ResourceError> {
        let range = self.year_range();
        if range.is_empty() || self.data.len() != range.len() {
            return Err(ResourceError::Length {
                expected: range.len(),
                actual: self.data.len(),
            });
        }
        for (year, &raw) in (range.start..=range.end).zip(&self.data) {
            let rec = YearRecord(raw);
            let leap = rec.intercalation_month();
            if leap > 12 {
                return Err(ResourceError::Inconsistent {
                    year,
                    reason: "intercalation month not in 0..=12",
                });
            }
            let mut days: u32 = (1..=12)
                .map(|m| self.constants.lunar_month_days(rec.is_month_big(m)))
                .sum();
            if leap != 0 {
                days += self.constants.lunar_month_days(rec.is_intercalation_big());
            }
            if days != rec.total_days() {
                return Err(ResourceError::Inconsistent {
                    year,
                    reason: "total days differ from sum of months",
                });
            }
            if YearType::from(rec.is_solar_leap()) != YearType::from_gregorian(year) {
                return Err(ResourceError::Inconsistent {
                    year,
                    reason: "solar leap flag disagrees with Gregorian rule",
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
enum Source {
    Bundled,
    Json(String),
    Path(PathBuf),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Bundled => f.write_str("bundled table"),
            Source::Json(json) => write!(f, "inline JSON ({} bytes)", json.len()),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// 자료표 저장소. 처음 접근할 때 한 번만 읽어 들이고, 이후로는 읽기 전용이다.
///
/// 읽기에 실패하면 그 오류를 보관해 두고 이후 호출마다 같은 오류를 돌려준다. 원본을 다시 읽지
/// 않는다. 받아들이는 자료표의 조건은 [`LunarTable::parse`] 참고.
///
/// 여러 [`Engine`](super::Engine) 이 `Arc` 로 하나를 공유한다.
///
/// # 용례
///
/// ```
/// use eumnyeok::lunar::table::TableStore;
///
/// let store = TableStore::bundled();
/// assert!(!store.is_loaded());
///
/// let rec = store.record_for(2020).unwrap();
/// assert_eq!(4, rec.intercalation_month());
/// assert!(store.is_loaded());
/// ```
#[derive(Debug)]
pub struct TableStore {
    source: Source,
    table: OnceCell<Result<LunarTable, ResourceError>>,
}

impl TableStore {
    /// 크레이트에 내장된 자료표
    pub fn bundled() -> Self {
        Self::with_source(Source::Bundled)
    }
    /// JSON 문자열로 주어진 자료표
    pub fn from_json(json: impl Into<String>) -> Self {
        Self::with_source(Source::Json(json.into()))
    }
    /// 파일에서 읽을 자료표. 파일은 처음 접근할 때 읽는다.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(Source::Path(path.into()))
    }

    fn with_source(source: Source) -> Self {
        Self {
            source,
            table: OnceCell::new(),
        }
    }

    /// 자료표를 읽어 들인다. 이미 읽었다면 아무 일도 하지 않는다.
    ///
    /// 실패하면 [`Error::Resource`]. 한 번 실패한 저장소는 계속 같은 오류를 낸다.
    pub fn load(&self) -> Result<&LunarTable> {
        let mut fresh = false;
        let loaded = self.table.get_or_init(|| {
            fresh = true;
            self.read()
        });
        match loaded {
            Ok(table) => Ok(table),
            Err(e) => {
                if !fresh {
                    debug!("lunar table from {} failed earlier: {}", self.source, e);
                }
                Err(e.clone().into())
            }
        }
    }

    fn read(&self) -> Result<LunarTable, ResourceError> {
        let parsed = match &self.source {
            Source::Bundled => LunarTable::parse(BUNDLED),
            Source::Json(json) => LunarTable::parse(json),
            Source::Path(path) => fs::read_to_string(path)
                .map_err(|e| ResourceError::Missing(Arc::new(e)))
                .and_then(|json| LunarTable::parse(&json)),
        };
        match &parsed {
            Ok(table) => {
                let range = table.year_range();
                info!(
                    "lunar table {} loaded: {} records for {}..={}",
                    table.metadata.version,
                    table.data.len(),
                    range.start,
                    range.end
                );
            }
            Err(e) => error!("failed to load lunar table from {}: {}", self.source, e),
        }
        parsed
    }

    /// 성공적으로 읽어 들였으면 `true`
    pub fn is_loaded(&self) -> bool {
        matches!(self.table.get(), Some(Ok(_)))
    }

    /// `year` 의 레코드
    pub fn record_for(&self, year: i32) -> Result<YearRecord> {
        self.load()?.record_for(year)
    }

    pub fn metadata(&self) -> Result<&Metadata> {
        Ok(&self.load()?.metadata)
    }

    pub fn constants(&self) -> Result<Constants> {
        Ok(self.load()?.constants)
    }

    pub fn year_range(&self) -> Result<YearRange> {
        Ok(self.load()?.year_range())
    }
}
