//! 명령줄 인자.
//!
//! 우선순위: 기본값 < 설정 파일 < 환경변수 < CLI.

use clap::Parser;
use directories::ProjectDirs;
use hostwatch_core::config::AppConfig;
use std::path::PathBuf;

/// hostwatch 시스템 모니터링 서버
///
/// 호스트 메트릭을 주기적으로 수집하여 WebSocket/SSE로 푸시한다.
#[derive(Parser, Debug)]
#[command(name = "hostwatch")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// 설정 파일 경로 (TOML/JSON). 지정하면 파일이 반드시 있어야 함
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    pub log_level: String,

    /// 웹 서버 포트
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// 수집 주기 (밀리초)
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// 이력 버퍼 용량
    #[arg(long)]
    pub history_capacity: Option<usize>,

    /// 외부 접근 허용 (0.0.0.0 바인드)
    #[arg(long)]
    pub allow_external: bool,

    /// 시작 시 수집을 자동으로 시작하지 않음
    #[arg(long)]
    pub no_autostart: bool,

    /// 웹 서버 비활성화 (수집만 실행)
    #[arg(long)]
    pub no_web: bool,
}

impl Args {
    /// 설정 파일 경로와 필수 여부.
    ///
    /// CLI 지정 경로는 필수, 플랫폼 기본 경로는 선택.
    /// - macOS: `~/Library/Application Support/com.hostwatch.hostwatch/config.toml`
    /// - Linux: `~/.config/hostwatch/config.toml`
    pub fn config_source(&self) -> (Option<PathBuf>, bool) {
        match &self.config {
            Some(path) => (Some(path.clone()), true),
            None => (
                ProjectDirs::from("com", "hostwatch", "hostwatch")
                    .map(|p| p.config_dir().join("config.toml")),
                false,
            ),
        }
    }

    /// CLI 값으로 설정 덮어쓰기
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.monitor.interval_ms = interval_ms;
        }
        if let Some(capacity) = self.history_capacity {
            config.monitor.history_capacity = capacity;
        }
        if self.allow_external {
            config.web.allow_external = true;
        }
        if self.no_autostart {
            config.monitor.autostart = false;
        }
        if self.no_web {
            config.web.enabled = false;
        }
    }

    /// tracing 필터 문자열
    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        format!(
            "hostwatch={level},hostwatch_app={level},hostwatch_core={level},hostwatch_monitor={level},hostwatch_collector={level},hostwatch_web={level},tower_http={level}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_leave_config_untouched() {
        let args = Args::try_parse_from(["hostwatch"]).unwrap();
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.web.port, 5000);
        assert_eq!(config.monitor.interval_ms, 30_000);
        assert!(config.monitor.autostart);
        assert!(config.web.enabled);
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn overrides_apply() {
        let args = Args::try_parse_from([
            "hostwatch",
            "--port",
            "8080",
            "--interval-ms",
            "2000",
            "--history-capacity",
            "20",
            "--allow-external",
            "--no-autostart",
        ])
        .unwrap();
        let mut config = AppConfig::default();
        args.apply_overrides(&mut config);

        assert_eq!(config.web.port, 8080);
        assert_eq!(config.monitor.interval_ms, 2000);
        assert_eq!(config.monitor.history_capacity, 20);
        assert!(config.web.allow_external);
        assert!(!config.monitor.autostart);
    }

    #[test]
    fn explicit_config_is_required() {
        let args = Args::try_parse_from(["hostwatch", "-c", "/tmp/hw.toml"]).unwrap();
        let (path, required) = args.config_source();
        assert_eq!(path, Some(PathBuf::from("/tmp/hw.toml")));
        assert!(required);
    }

    #[test]
    fn log_filter_covers_crates() {
        let args = Args::try_parse_from(["hostwatch", "-l", "debug"]).unwrap();
        let filter = args.log_filter();
        assert!(filter.contains("hostwatch_collector=debug"));
        assert!(filter.contains("hostwatch_web=debug"));
    }
}
