//! # hostwatch-monitor
//!
//! 호스트 메트릭 샘플러 어댑터.
//! CPU 부하, 메모리/디스크 사용량, 네트워크 누적 카운터, 프로세스 수, 가동 시간을 수집한다.
//! sysinfo를 통해 플랫폼(macOS, Windows, Linux)별 차이를 흡수한다.

pub mod system;

pub use system::SysInfoSampler;
