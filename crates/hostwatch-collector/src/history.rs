//! 메트릭 이력 버퍼.
//!
//! 고정 용량 FIFO. 용량을 넘으면 가장 오래된 스냅샷부터 밀려난다.
//! 조회는 항상 복사본을 반환한다.

use hostwatch_core::models::snapshot::Snapshot;
use std::collections::VecDeque;

/// 스냅샷 이력 버퍼 (FIFO, 최대 크기 제한)
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl HistoryBuffer {
    /// 새 버퍼 생성. 용량은 최소 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// 스냅샷 추가
    pub fn append(&mut self, snapshot: Snapshot) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// 최근 `count`개 (시간순)
    pub fn latest(&self, count: usize) -> Vec<Snapshot> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// 전체 이력 (시간순)
    pub fn all(&self) -> Vec<Snapshot> {
        self.entries.iter().cloned().collect()
    }

    /// 가장 최근 스냅샷
    pub fn last(&self) -> Option<&Snapshot> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 이력 비우기
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
