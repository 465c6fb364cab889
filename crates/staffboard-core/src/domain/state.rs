//! State - モーダル（add / edit フォーム）の状態
//!
//! # 状態遷移
//! - Idle → Adding: open add（バッファを既定値に初期化）
//! - Idle → Editing: レコードを選択（バッファはレコードのコピー）
//! - Adding / Editing → Idle: cancel、または送信成功
//!
//! バッファは状態の中にしか存在しないので、Idle ではバッファが無い。

/// ModalState は add / edit モーダルの状態と staged buffer
///
/// - `D`: add 用のバッファ（id を持たない）
/// - `R`: edit 用のバッファ（キャッシュ上のレコードのコピー）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalState<D, R> {
    Idle,
    Adding(D),
    Editing(R),
}

impl<D, R> Default for ModalState<D, R> {
    fn default() -> Self {
        ModalState::Idle
    }
}

impl<D, R> ModalState<D, R> {
    pub fn is_idle(&self) -> bool {
        matches!(self, ModalState::Idle)
    }

    pub fn phase(&self) -> ModalPhase {
        match self {
            ModalState::Idle => ModalPhase::Idle,
            ModalState::Adding(_) => ModalPhase::Adding,
            ModalState::Editing(_) => ModalPhase::Editing,
        }
    }

    pub fn adding(&self) -> Option<&D> {
        match self {
            ModalState::Adding(draft) => Some(draft),
            _ => None,
        }
    }

    pub fn editing(&self) -> Option<&R> {
        match self {
            ModalState::Editing(record) => Some(record),
            _ => None,
        }
    }
}

/// ModalPhase はバッファを除いた状態名（ログ・エラー用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Idle,
    Adding,
    Editing,
}
