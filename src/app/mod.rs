//! TUI의 이벤트 루프, 입력 처리, 상태 관리.

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::{
    config::Config,
    events::{Screen, UiState},
    input::InputBoxState,
    picker::PickerState,
    shortcuts::Shortcuts,
    submission::{SubmitFlow, SubmitStatus},
    ui::Tui,
    weeks, wizard,
    worker::{self, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, is_ctrl_c};
use render::draw;

/// 입력 처리와 그리기에서 공유하는 앱 상태.
pub struct App {
    /// 영속화된 설정 파일의 경로.
    pub cfg_path: PathBuf,
    /// 메모리에 있는 현재 설정.
    pub cfg: Config,
    /// 선택 위치나 상태 문구 같은 UI 고유 상태.
    pub ui: UiState,
    /// 제출 폼(이름/주차/파일)과 업로드 상태 기계.
    pub flow: SubmitFlow,
    /// 진행 중인 업로드 시도의 식별자. 지난 시도의 이벤트를 거르는 데 쓴다.
    pub attempt: Option<Uuid>,
    /// Worker로 보내는 커맨드 채널.
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Worker에서 받는 이벤트 채널.
    pub worker_rx: mpsc::Receiver<WorkerEvent>,

    /// 설정 화면에서 편집하는 업로드 주소(Apps Script URL).
    pub script_url: String,
    /// 설정 화면에서 편집하는 파일 크기 한도(MB, 문자열 버퍼).
    pub max_size_mb: String,
    /// 설정 화면에서 편집하는 Gemini API 키.
    pub api_key: String,
    /// 설정 화면에서 편집하는 Gemini 모델명.
    pub model: String,

    /// 파일 선택 화면의 탐색 상태.
    pub picker: PickerState,

    /// 입력 박스의 상태 (입력 중에는 Some).
    pub input_box: Option<InputBoxState>,

    /// 초기 설정 마법사의 상태.
    pub wizard_state: wizard::WizardState,

    /// 단축키 설정.
    pub shortcuts: Shortcuts,
}

/// 사용자가 종료할 때까지 메인 TUI 루프를 돌린다.
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    // 설정 파일을 읽는다 (처음이면 기본값을 만든다).
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;

    // 단축키 설정을 읽는다 (없으면 기본값).
    let shortcuts_path = PathBuf::from("shortcut.toml");
    let shortcuts = Shortcuts::load_or_default(&shortcuts_path)?;

    // Worker 통신용 커맨드/이벤트 채널을 만든다.
    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(256);

    // 초기 설정 스냅샷으로 Worker를 띄운다.
    tokio::spawn(worker::run(rx_cmd, tx_ev, cfg.clone()));

    // 설정 충족 여부에 따라 첫 화면을 정한다.
    let initial_screen = if cfg.script_url_missing() {
        Screen::InitialSetup
    } else {
        Screen::Form
    };

    // 시작할 때만 오늘 날짜에 해당하는 주차를 미리 골라 둔다.
    // 초기화(리셋) 후에는 다시 채우지 않는다.
    let mut flow = SubmitFlow::default();
    if let Some(id) = weeks::current_week_id(chrono::Local::now().date_naive()) {
        flow.submission.week_id = id.to_string();
    }

    // 파일 탐색은 현재 디렉터리에서 시작한다.
    let picker_root = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // 앱 상태를 초기화한다.
    let mut app = App {
        cfg_path,
        cfg: cfg.clone(),
        ui: UiState {
            screen: initial_screen,
            file_selected: 0,
            log: vec![],
            status: "Ready".into(),
            error: None,
        },
        flow,
        attempt: None,
        worker_tx: tx_cmd,
        worker_rx: rx_ev,
        script_url: cfg.upload.script_url.clone(),
        max_size_mb: cfg.upload.max_file_size_mb.to_string(),
        api_key: cfg.gemini.api_key.clone(),
        model: cfg.gemini.model.clone(),
        picker: PickerState::new(picker_root),
        input_box: None,
        wizard_state: wizard::WizardState::new(),
        shortcuts,
    };

    loop {
        // 현재 상태를 그린다.
        terminal.draw(|f| draw(f, &app))?;

        // 입력 처리 전에 Worker 이벤트를 소화한다.
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev)?;
        }

        // UI 응답성을 위해 짧은 타임아웃으로 입력을 폴링한다.
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(k) = event::read()?
        {
            // 어느 화면에서든 Ctrl+C로 끝낼 수 있게 한다.
            if is_ctrl_c(&k) {
                break;
            }
            if handle_key(&mut app, k).await? {
                break;
            }
        }
    }
    Ok(())
}

/// Worker 이벤트를 UI 상태에 반영한다.
fn handle_worker_event(app: &mut App, ev: WorkerEvent) -> Result<()> {
    match ev {
        WorkerEvent::Progress { attempt, pct } => {
            // 지난 시도의 진행률은 버린다.
            if app.attempt == Some(attempt) && matches!(app.flow.status, SubmitStatus::Uploading) {
                app.flow.pct = pct;
            }
        }
        WorkerEvent::Finished { attempt, feedback } => {
            // 현재 시도의 완료만 받아들인다.
            if app.attempt == Some(attempt) {
                app.flow.finish_success(feedback);
                app.ui.status = "제출 완료".into();
            }
        }
        WorkerEvent::Failed { attempt, error } => {
            // 현재 시도의 실패만 받아들인다.
            if app.attempt == Some(attempt) {
                tracing::error!("upload failed: {error}");
                app.flow.finish_error(error);
                app.ui.status = "제출 실패".into();
            }
        }
        WorkerEvent::Log(s) => {
            // 알림 패널에 로그를 쌓는다.
            app.ui.log.push(s);
        }
    }
    Ok(())
}
