//! 누적 일수 메모

use std::collections::HashMap;
use std::hash::Hash;

use log::trace;
use parking_lot::RwLock;

use crate::error::Result;

/// 키마다 한 번 계산한 값을 보관하는 표. 이미 있는 값을 읽을 때는 서로 막지 않는다.
#[derive(Debug, Default)]
pub struct Memo<K> {
    map: RwLock<HashMap<K, i32>>,
}

impl<K: Copy + Eq + Hash + std::fmt::Debug> Memo<K> {
    pub fn new() -> Self {
        Self {
            map: RwLock::new(HashMap::new()),
        }
    }

    /// `key` 에 대한 값을 돌려준다. 없으면 `compute` 로 계산해 넣는다.
    ///
    /// 계산은 잠금 밖에서 하므로 두 스레드가 같은 값을 함께 계산할 수도 있으나, 결과는 같다.
    pub fn get_or_try_insert(
        &self,
        key: K,
        compute: impl FnOnce() -> Result<i32>,
    ) -> Result<i32> {
        if let Some(&v) = self.map.read().get(&key) {
            return Ok(v);
        }
        let v = compute()?;
        trace!("memo fill {:?} = {}", key, v);
        self.map.write().insert(key, v);
        Ok(v)
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 엔진이 쓰는 메모 묶음
#[derive(Debug, Default)]
pub struct DayCache {
    /// 기준 연도부터 그해까지의 음력 일수
    pub lunar_years: Memo<i32>,
    /// 기준 연도부터 그해까지의 양력 일수
    pub solar_years: Memo<i32>,
    /// `(연, 월, 윤달 포함 여부)` 까지의 음력 일수
    pub lunar_months: Memo<(i32, u32, bool)>,
}

impl DayCache {
    pub fn new() -> Self {
        Self::default()
    }
}
