//! 호스트 메트릭 샘플러.
//!
//! `MetricsSampler`/`SystemInfoProvider` 포트 구현. sysinfo 기반.
//! 다섯 개의 하위 조회를 블로킹 풀에서 동시에 실행하고 모두 끝난 뒤 스냅샷을 조립한다.

use async_trait::async_trait;
use hostwatch_core::error::SamplingError;
use hostwatch_core::models::snapshot::{round2, HostReadings, Snapshot};
use hostwatch_core::models::system_info::{CpuInfo, MemoryInfo, OsInfo, SystemInfo};
use hostwatch_core::ports::monitor::{MetricsSampler, SystemInfoProvider};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use sysinfo::{
    CpuRefreshKind, Disks, MemoryRefreshKind, Networks, ProcessRefreshKind, ProcessesToUpdate,
    RefreshKind, System,
};
use tracing::debug;

/// 조회별로 분리된 sysinfo 핸들. 동시 조회 시 서로 잠금을 다투지 않는다.
struct Probes {
    cpu: Mutex<System>,
    memory: Mutex<System>,
    processes: Mutex<System>,
    disks: Mutex<Disks>,
    networks: Mutex<Networks>,
}

/// sysinfo 기반 샘플러: `MetricsSampler` 포트 구현
pub struct SysInfoSampler {
    probes: Arc<Probes>,
    last_uptime: AtomicU64,
}

impl SysInfoSampler {
    /// 새 샘플러 생성
    pub fn new() -> Self {
        let cpu = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::everything()),
        );
        let memory = System::new_with_specifics(
            RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
        );
        let processes = System::new_with_specifics(
            RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
        );

        Self {
            probes: Arc::new(Probes {
                cpu: Mutex::new(cpu),
                memory: Mutex::new(memory),
                processes: Mutex::new(processes),
                disks: Mutex::new(Disks::new_with_refreshed_list()),
                networks: Mutex::new(Networks::new_with_refreshed_list()),
            }),
            last_uptime: AtomicU64::new(0),
        }
    }

    /// 프로세스 수명 동안 감소하지 않는 가동 시간
    fn monotonic_uptime(&self, uptime: u64) -> u64 {
        let previous = self.last_uptime.fetch_max(uptime, Ordering::AcqRel);
        previous.max(uptime)
    }
}

impl Default for SysInfoSampler {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &'static str) -> Result<MutexGuard<'a, T>, SamplingError> {
    mutex.lock().map_err(|_| SamplingError::LockPoisoned(name))
}

/// 블로킹 풀에서 조회 실행
async fn run_blocking<T, F>(
    query: &'static str,
    probes: Arc<Probes>,
    f: F,
) -> Result<T, SamplingError>
where
    T: Send + 'static,
    F: FnOnce(&Probes) -> Result<T, SamplingError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(&probes))
        .await
        .map_err(|e| SamplingError::Join(format!("{query}: {e}")))?
}

/// CPU 부하 + 부하 평균
fn read_cpu(probes: &Probes) -> Result<(f64, [f64; 3]), SamplingError> {
    let mut sys = lock(&probes.cpu, "cpu")?;
    sys.refresh_cpu_usage();
    let load = System::load_average();
    Ok((
        sys.global_cpu_usage() as f64,
        [load.one, load.five, load.fifteen],
    ))
}

/// 메모리 사용량/전체
fn read_memory(probes: &Probes) -> Result<(u64, u64), SamplingError> {
    let mut sys = lock(&probes.memory, "memory")?;
    sys.refresh_memory();
    Ok((sys.used_memory(), sys.total_memory()))
}

/// 루트 볼륨(없으면 첫 번째 볼륨) 사용량/전체
fn read_disk(probes: &Probes) -> Result<Option<(u64, u64)>, SamplingError> {
    let mut disks = lock(&probes.disks, "disk")?;
    disks.refresh(true);
    let list = disks.list();
    let volume = list
        .iter()
        .find(|d| d.mount_point() == Path::new("/"))
        .or_else(|| list.first());

    Ok(volume.map(|d| {
        let total = d.total_space();
        (total.saturating_sub(d.available_space()), total)
    }))
}

/// 주 인터페이스(루프백 제외, 누적 수신량 최대) 누적 카운터
fn read_network(probes: &Probes) -> Result<Option<(u64, u64)>, SamplingError> {
    let mut networks = lock(&probes.networks, "network")?;
    networks.refresh(true);
    Ok(networks
        .iter()
        .filter(|(name, _)| !name.starts_with("lo"))
        .max_by_key(|(_, data)| data.total_received())
        .map(|(_, data)| (data.total_received(), data.total_transmitted())))
}

/// 실행 중인 프로세스 수
fn read_process_count(probes: &Probes) -> Result<u64, SamplingError> {
    let mut sys = lock(&probes.processes, "processes")?;
    sys.refresh_processes(ProcessesToUpdate::All, true);
    Ok(sys.processes().len() as u64)
}

#[async_trait]
impl MetricsSampler for SysInfoSampler {
    async fn capture(&self) -> Result<Snapshot, SamplingError> {
        let timestamp = chrono::Utc::now();

        let ((cpu_load, load_average), memory, disk, network, process_count) = tokio::try_join!(
            run_blocking("cpu", self.probes.clone(), read_cpu),
            run_blocking("memory", self.probes.clone(), read_memory),
            run_blocking("disk", self.probes.clone(), read_disk),
            run_blocking("network", self.probes.clone(), read_network),
            run_blocking("processes", self.probes.clone(), read_process_count),
        )?;

        let snapshot = Snapshot::from_readings(
            timestamp,
            HostReadings {
                cpu_load,
                memory,
                disk,
                network,
                process_count,
                uptime_secs: self.monotonic_uptime(System::uptime()),
                load_average,
            },
        );

        debug!(
            "스냅샷: CPU {:.2}%, 메모리 {:.2}%, 디스크 {:.2}%, 프로세스 {}",
            snapshot.cpu_load_percent,
            snapshot.memory.percent,
            snapshot.disk.percent,
            snapshot.process_count
        );

        Ok(snapshot)
    }
}

#[async_trait]
impl SystemInfoProvider for SysInfoSampler {
    async fn system_info(&self) -> Result<SystemInfo, SamplingError> {
        run_blocking("system-info", self.probes.clone(), |probes| {
            let cpu = {
                let sys = lock(&probes.cpu, "cpu")?;
                let cpus = sys.cpus();
                let first = cpus.first();
                CpuInfo {
                    manufacturer: first.map(|c| c.vendor_id().to_string()).unwrap_or_default(),
                    brand: first.map(|c| c.brand().trim().to_string()).unwrap_or_default(),
                    cores: cpus.len(),
                    physical_cores: System::physical_core_count().unwrap_or(cpus.len()),
                    speed_ghz: first
                        .map(|c| round2(c.frequency() as f64 / 1000.0))
                        .unwrap_or(0.0),
                }
            };

            let memory = {
                let mut sys = lock(&probes.memory, "memory")?;
                sys.refresh_memory();
                MemoryInfo::from_total(sys.total_memory())
            };

            let os = OsInfo {
                platform: std::env::consts::OS.to_string(),
                distro: System::name().unwrap_or_default(),
                release: System::os_version().unwrap_or_default(),
                hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
                uptime: System::uptime(),
            };

            Ok(SystemInfo { os, cpu, memory })
        })
        .await
    }
}
