//! 키 입력 핸들러 함수.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use uuid::Uuid;

use crate::{
    events::Screen,
    input::{InputBoxState, InputCallbackId},
    shortcuts,
    submission::{AttachedFile, SubmitStatus},
    weeks,
    wizard::WizardStep,
    worker::WorkerCmd,
};

use super::App;

/// 키 입력을 1건 처리하고, 종료해야 하면 true를 돌려준다.
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 결과 모달이 떠 있으면 최우선으로 처리한다.
    if !matches!(app.flow.status, SubmitStatus::Idle) {
        return handle_modal_key(app, k).await;
    }

    // 입력 박스가 열려 있으면 그다음 우선으로 처리한다.
    if app.input_box.is_some() {
        return handle_input_box_key(app, k).await;
    }

    // 화면별 핸들러에 맡긴다.
    match app.ui.screen {
        Screen::Form => handle_form_key(app, k).await,
        Screen::FilePicker => handle_picker_key(app, k).await,
        Screen::Settings => handle_settings_key(app, k).await,
        Screen::InitialSetup => handle_wizard_key(app, k).await,
    }
}

/// Ctrl+C인지 판정한다.
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// 제출 화면의 키 처리.
async fn handle_form_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 제출 화면의 단축키를 참조한다.
    let sc = &app.shortcuts.form;

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.settings) {
        // 설정 화면으로 넘어가며 편집 버퍼를 갱신한다.
        reload_settings_buffers(app);
        app.ui.screen = Screen::Settings;
        app.ui.status = "Settings".into();
    } else if shortcuts::matches_shortcut(&k, &sc.name) {
        // 이름 입력 박스를 연다.
        app.input_box = Some(InputBoxState {
            prompt: "이름:".into(),
            value: app.flow.submission.name.clone(),
            cursor: app.flow.submission.name.chars().count(),
            callback_id: InputCallbackId::FormName,
        });
    } else if shortcuts::matches_shortcut(&k, &sc.attach) {
        // 파일 선택 화면으로 넘어간다. 목록은 열 때마다 새로 읽는다.
        match app.picker.refresh() {
            Ok(()) => app.ui.status = "파일 선택".into(),
            Err(e) => app.ui.status = format!("디렉터리를 읽지 못했습니다: {e}"),
        }
        app.ui.screen = Screen::FilePicker;
    } else if shortcuts::matches_shortcut(&k, &sc.remove) {
        // 선택 중인 첨부를 목록에서 뺀다.
        if let Some(f) = app.flow.submission.remove_file(app.ui.file_selected) {
            app.ui.log.push(format!("'{}' 첨부를 제거했습니다.", f.name));
            // 선택 위치를 줄어든 목록 안으로 되돌린다.
            let len = app.flow.submission.files.len();
            app.ui.file_selected = app.ui.file_selected.min(len.saturating_sub(1));
        }
    } else if shortcuts::matches_shortcut(&k, &sc.week_next) {
        cycle_week(app, 1);
    } else if shortcuts::matches_shortcut(&k, &sc.week_prev) {
        cycle_week(app, -1);
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        // 다음 첨부 행으로 이동한다.
        if app.ui.file_selected + 1 < app.flow.submission.files.len() {
            app.ui.file_selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        // 이전 첨부 행으로 이동한다.
        if app.ui.file_selected > 0 {
            app.ui.file_selected -= 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.submit) {
        submit(app).await?;
    }

    Ok(false)
}

/// 주차 선택을 카탈로그 순서에서 앞뒤로 순환시킨다.
fn cycle_week(app: &mut App, dir: i32) {
    let len = weeks::TRAINING_WEEKS.len();
    let next = match weeks::index_of(&app.flow.submission.week_id) {
        // 미선택 상태라면 방향과 무관하게 첫 주차부터 시작한다.
        None => 0,
        Some(i) => {
            if dir >= 0 {
                (i + 1) % len
            } else {
                (i + len - 1) % len
            }
        }
    };
    app.flow.submission.week_id = weeks::TRAINING_WEEKS[next].id.to_string();
}

/// 폼을 검증해 Worker에 업로드를 맡긴다.
async fn submit(app: &mut App) -> Result<()> {
    // 업로드 주소가 없으면 제출 자체를 막는다. 설정에서 고쳐야 한다.
    if app.cfg.script_url_missing() {
        tracing::warn!("submit blocked: script_url missing");
        app.ui.error =
            Some("업로드 주소가 설정되지 않았습니다. 설정(t)에서 입력해 주세요.".into());
        return Ok(());
    }
    app.ui.error = None;

    // 유효성 검사를 통과해야 Uploading으로 넘어간다.
    if !app.flow.begin_upload() {
        app.ui.status = "이름, 주차, 파일을 모두 채워야 제출할 수 있습니다.".into();
        return Ok(());
    }

    // 시도 식별자를 새로 발급해 지난 시도의 이벤트와 구분한다.
    let attempt = Uuid::new_v4();
    app.attempt = Some(attempt);
    tracing::info!("submit: {} files", app.flow.submission.files.len());
    app.worker_tx
        .send(WorkerCmd::Submit {
            attempt,
            submission: app.flow.submission.clone(),
        })
        .await?;
    app.ui.status = "업로드 중...".into();
    Ok(())
}

/// 파일 선택 화면의 키 처리.
async fn handle_picker_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 파일 선택 화면의 단축키를 참조한다.
    let sc = &app.shortcuts.picker;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 마킹을 버리고 제출 화면으로 돌아간다.
        app.picker.marked.clear();
        app.ui.screen = Screen::Form;
        app.ui.status = "Ready".into();
    } else if shortcuts::matches_shortcut(&k, &sc.enter) {
        // 디렉터리라면 안으로 들어간다.
        if let Err(e) = app.picker.enter() {
            app.ui.status = format!("디렉터리를 읽지 못했습니다: {e}");
        }
    } else if shortcuts::matches_shortcut(&k, &sc.parent) {
        // 상위 디렉터리로 올라간다.
        if let Err(e) = app.picker.parent() {
            app.ui.status = format!("디렉터리를 읽지 못했습니다: {e}");
        }
    } else if shortcuts::matches_shortcut(&k, &sc.mark) {
        app.picker.toggle_mark();
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        app.picker.move_down();
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        app.picker.move_up();
    } else if shortcuts::matches_shortcut(&k, &sc.attach) {
        // 골라 둔 파일을 폼에 붙이고 제출 화면으로 돌아간다.
        attach_batch(app);
        app.ui.screen = Screen::Form;
    }

    Ok(false)
}

/// 골라 둔 경로 묶음을 검사해서 폼에 첨부한다.
fn attach_batch(app: &mut App) {
    let paths = app.picker.take_batch();
    if paths.is_empty() {
        app.ui.status = "첨부할 파일이 없습니다.".into();
        return;
    }

    // 경로를 첨부 후보로 바꾼다. 읽지 못한 파일은 건너뛰고 알린다.
    let mut picked = Vec::new();
    for path in paths {
        match AttachedFile::from_path(&path) {
            Ok(f) => picked.push(f),
            Err(e) => {
                tracing::warn!("attach skipped: {e:#}");
                app.ui
                    .log
                    .push(format!("'{}'을(를) 읽지 못해 건너뜁니다.", path.display()));
            }
        }
    }

    // 크기 한도와 중복을 걸러 통과분만 받는다. 거절 사유는 건별로 알린다.
    let max_mb = app.cfg.upload.max_file_size_mb;
    let before = app.flow.submission.files.len();
    let rejections = app.flow.submission.admit_files(picked, max_mb);
    for r in &rejections {
        app.ui.log.push(r.notice(max_mb));
    }

    let added = app.flow.submission.files.len() - before;
    app.ui.status = format!("{added}개 파일을 첨부했습니다.");
}

/// 설정 화면의 키 처리.
async fn handle_settings_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 설정 화면의 단축키를 참조한다.
    let sc = &app.shortcuts.settings;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 변경을 버리고 제출 화면으로 돌아간다.
        reload_settings_buffers(app);
        app.ui.screen = Screen::Form;
    } else if shortcuts::matches_shortcut(&k, &sc.save) {
        // 크기 한도는 숫자만 받는다.
        let Ok(max_mb) = app.max_size_mb.trim().parse::<u64>() else {
            app.ui.error = Some("최대 파일 크기는 숫자(MB)여야 합니다.".into());
            return Ok(false);
        };

        // 편집 버퍼를 설정에 반영한다.
        app.cfg.upload.script_url = app.script_url.trim().to_string();
        app.cfg.upload.max_file_size_mb = max_mb;
        app.cfg.gemini.api_key = app.api_key.trim().to_string();
        app.cfg.gemini.model = app.model.trim().to_string();
        // 설정 파일을 저장한다.
        app.cfg.save(&app.cfg_path)?;

        // Worker에도 설정 갱신을 알린다.
        app.worker_tx
            .send(WorkerCmd::SaveSettings(app.cfg.clone()))
            .await?;
        // 화면 상태를 갱신하고 제출 화면으로 돌아간다.
        app.ui.error = None;
        app.ui.screen = Screen::Form;
        app.ui.status = "설정을 저장했습니다.".into();
    } else if shortcuts::matches_shortcut(&k, &sc.script_url) {
        // 업로드 주소의 입력 박스를 연다.
        app.input_box = Some(InputBoxState {
            prompt: "업로드 주소(Apps Script URL):".into(),
            value: app.script_url.clone(),
            cursor: app.script_url.chars().count(),
            callback_id: InputCallbackId::SettingsScriptUrl,
        });
    } else if shortcuts::matches_shortcut(&k, &sc.max_size) {
        // 크기 한도의 입력 박스를 연다.
        app.input_box = Some(InputBoxState {
            prompt: "최대 파일 크기(MB):".into(),
            value: app.max_size_mb.clone(),
            cursor: app.max_size_mb.chars().count(),
            callback_id: InputCallbackId::SettingsMaxSize,
        });
    } else if shortcuts::matches_shortcut(&k, &sc.api_key) {
        // Gemini API 키의 입력 박스를 연다.
        app.input_box = Some(InputBoxState {
            prompt: "Gemini API 키 (비우면 기본 격려 사용):".into(),
            value: app.api_key.clone(),
            cursor: app.api_key.chars().count(),
            callback_id: InputCallbackId::SettingsApiKey,
        });
    } else if shortcuts::matches_shortcut(&k, &sc.model) {
        // Gemini 모델명의 입력 박스를 연다.
        app.input_box = Some(InputBoxState {
            prompt: "Gemini 모델명:".into(),
            value: app.model.clone(),
            cursor: app.model.chars().count(),
            callback_id: InputCallbackId::SettingsModel,
        });
    }

    Ok(false)
}

/// 결과 모달의 키 처리. 업로드 중에는 닫을 수 없다.
async fn handle_modal_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 모달의 단축키를 참조한다.
    let sc = &app.shortcuts.modal;

    match &app.flow.status {
        SubmitStatus::Idle => {}
        SubmitStatus::Uploading => {
            // 전송 중에는 모달을 닫지 않는다. 끝나기를 기다려야 한다.
        }
        SubmitStatus::Success(_) | SubmitStatus::Error(_) => {
            if shortcuts::matches_shortcut(&k, &sc.upload_more) {
                // 이름/주차를 남기고 파일만 비워 이어서 제출한다.
                app.flow.reset_continue();
                app.attempt = None;
                app.ui.file_selected = 0;
                app.ui.status = "파일을 다시 첨부해 주세요.".into();
            } else if shortcuts::matches_shortcut(&k, &sc.finish) {
                // 폼 전체를 비우고 처음 상태로 돌아간다.
                app.flow.reset_full();
                app.attempt = None;
                app.ui.file_selected = 0;
                app.ui.status = "Ready".into();
            }
        }
    }

    Ok(false)
}

/// 초기 설정 마법사 화면의 키 처리.
async fn handle_wizard_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 마법사 화면의 단축키를 참조한다.
    let sc = &app.shortcuts.wizard;

    if shortcuts::matches_shortcut(&k, &sc.proceed) {
        match &app.wizard_state.current_step {
            WizardStep::Welcome => {
                // 다음 단계로 간다.
                app.wizard_state.next_step();
            }
            WizardStep::ScriptUrl => {
                // 업로드 주소 입력을 받는다.
                app.input_box = Some(InputBoxState {
                    prompt: "업로드 주소(Apps Script URL):".into(),
                    value: app.script_url.clone(),
                    cursor: app.script_url.chars().count(),
                    callback_id: InputCallbackId::WizardScriptUrl,
                });
            }
            WizardStep::GeminiKey => {
                // API 키 입력을 받는다. 건너뛰어도 된다.
                app.input_box = Some(InputBoxState {
                    prompt: "Gemini API 키 (선택):".into(),
                    value: app.api_key.clone(),
                    cursor: app.api_key.chars().count(),
                    callback_id: InputCallbackId::WizardApiKey,
                });
            }
            WizardStep::Complete => {
                // 업로드 주소 없이는 마칠 수 없다.
                if app.script_url.trim().is_empty() {
                    app.ui.error = Some("업로드 주소가 필요합니다.".into());
                    app.wizard_state.current_step = WizardStep::ScriptUrl;
                    return Ok(false);
                }

                // 설정을 저장한다.
                app.cfg.upload.script_url = app.script_url.trim().to_string();
                app.cfg.gemini.api_key = app.api_key.trim().to_string();
                app.cfg.save(&app.cfg_path)?;

                // Worker에 설정 갱신을 알린다.
                app.worker_tx
                    .send(WorkerCmd::SaveSettings(app.cfg.clone()))
                    .await?;

                // 제출 화면으로 이동한다.
                app.ui.error = None;
                app.ui.screen = Screen::Form;
                app.ui.status = "설정이 완료되었습니다!".into();
            }
        }
    } else if shortcuts::matches_shortcut(&k, &sc.skip) {
        // 현재 단계를 건너뛴다.
        app.wizard_state.next_step();
    }

    Ok(false)
}

/// 입력 박스의 키 처리.
async fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 입력 박스가 없으면 아무것도 하지 않는다.
    let Some(input_state) = &mut app.input_box else {
        return Ok(false);
    };

    // 입력 박스용 단축키를 참조한다.
    let sc = &app.shortcuts.input_box;

    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        // 입력 박스를 닫기 전에 값과 콜백 종류를 보관한다.
        let value = input_state.value.clone();
        let callback_id = input_state.callback_id.clone();
        app.input_box = None;

        // 콜백 종류에 따라 값을 반영한다.
        apply_input_callback(app, callback_id, value).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 입력을 버리고 입력 박스를 닫는다.
        app.input_box = None;
    } else if shortcuts::matches_shortcut(&k, &sc.backspace) {
        input_state.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        input_state.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        input_state.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        input_state.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        input_state.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        input_state.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        input_state.clear_line();
    } else if let KeyCode::Char(c) = k.code {
        // 일반 문자 입력을 처리한다. 컨트롤 조합은 제외한다.
        if !k.modifiers.contains(KeyModifiers::CONTROL) {
            input_state.insert_char(c);
        }
    }

    Ok(false)
}

/// 입력 박스의 콜백을 적용한다.
async fn apply_input_callback(
    app: &mut App,
    callback_id: InputCallbackId,
    value: String,
) -> Result<()> {
    match callback_id {
        InputCallbackId::FormName => {
            // 이름은 앞뒤 공백을 정리해서 폼에 반영한다.
            app.flow.submission.name = value.trim().to_string();
        }
        InputCallbackId::SettingsScriptUrl => app.script_url = value,
        InputCallbackId::SettingsMaxSize => app.max_size_mb = value,
        InputCallbackId::SettingsApiKey => app.api_key = value,
        InputCallbackId::SettingsModel => app.model = value,
        InputCallbackId::WizardScriptUrl => {
            // 마법사의 업로드 주소를 갱신하고 다음 단계로 간다.
            app.script_url = value;
            app.wizard_state.next_step();
        }
        InputCallbackId::WizardApiKey => {
            // 마법사의 API 키를 갱신하고 다음 단계로 간다.
            app.api_key = value;
            app.wizard_state.next_step();
        }
    }
    Ok(())
}

/// 설정 화면용 편집 버퍼를 설정값에서 다시 읽는다.
fn reload_settings_buffers(app: &mut App) {
    // 설정의 현재 값을 편집용 버퍼에 반영한다.
    app.script_url = app.cfg.upload.script_url.clone();
    app.max_size_mb = app.cfg.upload.max_file_size_mb.to_string();
    app.api_key = app.cfg.gemini.api_key.clone();
    app.model = app.cfg.gemini.model.clone();
}
