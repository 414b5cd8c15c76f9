//! 임계값 경고 평가.
//!
//! 순수 함수. 같은 스냅샷과 임계값이면 항상 같은 결과를 낸다.
//! 초과 판정은 `>` (같으면 경고 아님). 히스테리시스 없음: 임계값 위에
//! 머무는 동안 매 틱 경고가 나온다.

use hostwatch_core::models::alert::{AlertEvent, AlertKind, AlertThresholds};
use hostwatch_core::models::snapshot::Snapshot;

/// 스냅샷을 임계값과 비교하여 경고 목록 생성 (cpu → memory → disk 순서)
pub fn evaluate(snapshot: &Snapshot, thresholds: &AlertThresholds) -> Vec<AlertEvent> {
    [
        (AlertKind::Cpu, snapshot.cpu_load_percent, thresholds.cpu_percent),
        (AlertKind::Memory, snapshot.memory.percent, thresholds.memory_percent),
        (AlertKind::Disk, snapshot.disk.percent, thresholds.disk_percent),
    ]
    .into_iter()
    .filter(|(_, observed, threshold)| observed > threshold)
    .map(|(kind, observed_value, threshold)| AlertEvent {
        kind,
        message: format!("{}: {observed_value:.2}% (임계값 {threshold:.2}%)", kind.message()),
        observed_value,
        threshold,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hostwatch_core::models::snapshot::HostReadings;

    fn snapshot(cpu: f64, memory_pct: u64, disk_pct: u64) -> Snapshot {
        Snapshot::from_readings(
            Utc::now(),
            HostReadings {
                cpu_load: cpu,
                memory: (memory_pct, 100),
                disk: Some((disk_pct, 100)),
                ..Default::default()
            },
        )
    }

    #[test]
    fn cpu_above_threshold() {
        let alerts = evaluate(&snapshot(81.23, 10, 10), &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::Cpu);
        assert_eq!(alerts[0].observed_value, 81.23);
        assert_eq!(alerts[0].threshold, 80.0);
    }

    #[test]
    fn equal_to_threshold_is_not_alert() {
        let alerts = evaluate(&snapshot(80.0, 85, 90), &AlertThresholds::default());
        assert!(alerts.is_empty());
    }

    #[test]
    fn order_is_cpu_memory_disk() {
        let thresholds = AlertThresholds::default();
        let s = snapshot(99.0, 99, 99);
        let kinds: Vec<_> = evaluate(&s, &thresholds).into_iter().map(|a| a.kind).collect();
        assert_eq!(kinds, vec![AlertKind::Cpu, AlertKind::Memory, AlertKind::Disk]);

        // 같은 입력이면 같은 결과
        assert_eq!(evaluate(&s, &thresholds), evaluate(&s, &thresholds));
    }

    #[test]
    fn only_exceeding_metrics_are_reported() {
        let thresholds = AlertThresholds {
            cpu_percent: 50.0,
            memory_percent: 50.0,
            disk_percent: 50.0,
        };
        let kinds: Vec<_> = evaluate(&snapshot(10.0, 60, 40), &thresholds)
            .into_iter()
            .map(|a| a.kind)
            .collect();
        assert_eq!(kinds, vec![AlertKind::Memory]);
    }

    #[test]
    fn message_contains_values() {
        let alerts = evaluate(&snapshot(10.0, 10, 95), &AlertThresholds::default());
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("95.00%"));
        assert!(alerts[0].message.contains("90.00%"));
    }
}
