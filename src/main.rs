//! 애플리케이션의 엔트리 포인트와 런타임 초기화.

use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;

mod app;
mod compress;
mod config;
mod encode;
mod events;
mod feedback;
mod google;
mod input;
mod layout;
mod picker;
mod progress;
mod shortcuts;
mod submission;
mod ui;
mod weeks;
mod wizard;
mod worker;

/// 파일 로깅을 초기화하고, 비동기 가드를 살려 둔다.
fn init_logging() -> Result<WorkerGuard> {
    // 로그 출력 파일 이름을 정한다.
    let log_file = "homework_tui.log";
    // TUI의 표준 출력을 어지럽히지 않게 파일에 바로 쓴다.
    let file_appender = tracing_appender::rolling::never(".", log_file);
    // 비동기 쓰기용 래퍼와 가드를 준비한다.
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // 포매터와 출력 대상을 설정해 초기화한다.
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    // 로그 저장 위치를 알려 둔다.
    tracing::info!("logging to {}", log_file);
    Ok(guard)
}

#[tokio::main]
/// 엔트리 포인트: 로그 초기화 → UI 시작 → 터미널 복원.
async fn main() -> Result<()> {
    // 로거를 초기화하고, 가드를 잡아 쓰기를 지속시킨다.
    let _log_guard = init_logging()?;
    // 시작 로그를 남긴다.
    tracing::info!("app starting");
    // TUI용 터미널 상태로 바꾼다.
    let mut terminal = ui::init_terminal()?;
    // 메인 앱을 실행한다.
    let res = app::run_app(&mut terminal).await;
    // 터미널 상태는 반드시 원래대로 되돌린다.
    ui::restore_terminal()?;
    // 오류가 있으면 로그에 남긴다.
    if let Err(ref e) = res {
        tracing::error!("app error: {e}");
    }
    // 종료 로그를 남긴다.
    tracing::info!("app exiting");
    res
}
