//! 간지(干支) 계산과 표기
//!
//! 연·월·일의 천간과 지지 번호는 절대일과 연·월로부터 바로 정해진다. 음력 기준과 양력 기준을
//! 따로 구할 수 있으며, 양력 기준에는 윤달 개념이 없다.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{BASE_YEAR, Engine};
use crate::date::{LunarDate, SolarDate};
use crate::error::Result;

/// 한글 천간, 甲(갑)부터
pub const KOREAN_STEMS: [&str; 10] = ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"];
/// 한글 지지, 子(자)부터
pub const KOREAN_BRANCHES: [&str; 12] = [
    "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
];
/// 한자 천간
pub const CHINESE_STEMS: [&str; 10] = ["甲", "乙", "丙", "丁", "戊", "己", "庚", "辛", "壬", "癸"];
/// 한자 지지
pub const CHINESE_BRANCHES: [&str; 12] = [
    "子", "丑", "寅", "卯", "辰", "巳", "午", "未", "申", "酉", "戌", "亥",
];

/// 어느 날짜를 기준으로 간지를 구할지
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Basis {
    Solar,
    Lunar,
}

/// 표기 문자
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub enum Script {
    #[default]
    Korean,
    Chinese,
}

impl Script {
    fn stems(self) -> &'static [&'static str; 10] {
        match self {
            Script::Korean => &KOREAN_STEMS,
            Script::Chinese => &CHINESE_STEMS,
        }
    }
    fn branches(self) -> &'static [&'static str; 12] {
        match self {
            Script::Korean => &KOREAN_BRANCHES,
            Script::Chinese => &CHINESE_BRANCHES,
        }
    }
    /// 연·월·일 단위 글자
    fn units(self) -> [&'static str; 3] {
        match self {
            Script::Korean => ["년", "월", "일"],
            Script::Chinese => ["年", "月", "日"],
        }
    }
    /// 윤달 표시
    fn intercalation_mark(self) -> &'static str {
        match self {
            Script::Korean => "(윤)",
            Script::Chinese => "(閏)",
        }
    }
}

/// 천간 번호(`0..10`, 甲=0)와 지지 번호(`0..12`, 子=0)의 짝
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Sexagenary {
    pub stem: u32,
    pub branch: u32,
}

impl Sexagenary {
    fn new(stem: i32, branch: i32) -> Self {
        Self {
            stem: stem.rem_euclid(10) as u32,
            branch: branch.rem_euclid(12) as u32,
        }
    }

    /// 육십갑자 순번, 1(甲子)부터 60(癸亥)까지
    ///
    /// # 용례
    ///
    /// ```
    /// use eumnyeok::lunar::gapja::Sexagenary;
    ///
    /// assert_eq!(1, Sexagenary { stem: 0, branch: 0 }.number());
    /// assert_eq!(11, Sexagenary { stem: 0, branch: 10 }.number()); // 甲戌
    /// assert_eq!(60, Sexagenary { stem: 9, branch: 11 }.number());
    /// ```
    pub fn number(&self) -> u32 {
        (6 * self.stem as i32 - 5 * self.branch as i32).rem_euclid(60) as u32 + 1
    }

    /// 두 글자 이름
    ///
    /// # 용례
    ///
    /// ```
    /// use eumnyeok::lunar::gapja::{Script, Sexagenary};
    ///
    /// let s = Sexagenary { stem: 1, branch: 5 };
    /// assert_eq!("을사", s.name(Script::Korean));
    /// assert_eq!("乙巳", s.name(Script::Chinese));
    /// ```
    pub fn name(&self, script: Script) -> String {
        script.stems()[self.stem as usize].to_owned() + script.branches()[self.branch as usize]
    }
}

/// 한 날짜의 연·월·일 간지
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct GapJa {
    pub year: Sexagenary,
    pub month: Sexagenary,
    pub day: Sexagenary,
    /// 음력 기준이고 윤달의 날짜이면 `true`
    pub intercalation: bool,
    pub basis: Basis,
}

impl GapJa {
    /// 절대일과 연·월에서 간지를 구한다.
    ///
    /// 양력 기준일 때 `intercalation` 은 무시된다.
    pub fn derive(
        abs_days: i32,
        year: i32,
        month: u32,
        intercalation: bool,
        basis: Basis,
    ) -> Self {
        let years = year - BASE_YEAR;
        let months = month as i32 + 12 * years;
        GapJa {
            year: Sexagenary::new(years + 6, years),
            month: Sexagenary::new(months + 3, months + 1),
            day: Sexagenary::new(abs_days + 4, abs_days + 2),
            intercalation: intercalation && basis == Basis::Lunar,
            basis,
        }
    }

    /// 음력 날짜 기준 간지
    pub fn from_lunar(engine: &Engine, date: LunarDate) -> Result<Self> {
        let abs = engine.lunar_abs_days(date.year, date.month, date.day, date.intercalation)?;
        Ok(Self::derive(
            abs,
            date.year,
            date.month,
            date.intercalation,
            Basis::Lunar,
        ))
    }

    /// 양력 날짜 기준 간지
    pub fn from_solar(engine: &Engine, date: SolarDate) -> Result<Self> {
        let abs = engine.solar_abs_days(date.year, date.month, date.day)?;
        Ok(Self::derive(abs, date.year, date.month, false, Basis::Solar))
    }

    /// `"계묘년 갑자월 갑자일"` 꼴의 문자열. 음력 윤달이면 윤달 표시를 붙인다.
    pub fn render(&self, script: Script) -> String {
        let [y, m, d] = script.units();
        let mut rt = format!(
            "{}{} {}{} {}{}",
            self.year.name(script),
            y,
            self.month.name(script),
            m,
            self.day.name(script),
            d
        );
        if self.intercalation {
            rt += script.intercalation_mark();
        }
        rt
    }
}

impl fmt::Display for GapJa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(Script::Korean))
    }
}
