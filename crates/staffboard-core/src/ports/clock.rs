//! Clock port - 日付の抽象化
//!
//! バックエンドのエミュレーションが `date_assigned` を刻むのに使う。
//!
//! # テスト容易性
//! - trait により日付を差し替え可能
//! - テストでは FixedClock を使用

use chrono::{Local, NaiveDate};

/// Clock は今日の日付を提供
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// SystemClock はローカル時刻の日付（本番用）
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// FixedClock は常に同じ日付を返す（テスト用）
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}
