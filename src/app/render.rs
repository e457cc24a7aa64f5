//! TUI 그리기 관련 함수.

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};

use crate::{events::Screen, input, layout, shortcuts::Shortcuts, submission::SubmitStatus, weeks};

use super::App;

/// 화면 전체 레이아웃을 그린다.
pub fn draw(f: &mut Frame, app: &App) {
    // 마법사 화면은 전용 그리기로 처리한다.
    if app.ui.screen == Screen::InitialSetup {
        draw_wizard_screen(f, app);
        // 입력 박스가 열려 있으면 겹쳐 그린다.
        if let Some(input_state) = &app.input_box {
            input::render_input_box(f, input_state);
        }
        return;
    }

    // 메인 레이아웃(Body + HELP + STATUS)을 만든다.
    let main_layout = layout::create_main_layout(f.area());
    let body_layout = layout::create_body_layout(main_layout.body);

    // 주 패널: 화면에 따라 첨부 목록 또는 디렉터리 목록을 보여 준다.
    if app.ui.screen == Screen::FilePicker {
        draw_picker_table(f, app, body_layout.main_panel);
    } else {
        draw_files_table(f, app, body_layout.main_panel);
    }

    // 보조 패널: 화면별 안내 텍스트.
    let info_text = match app.ui.screen {
        Screen::Settings => build_settings_info_text(app),
        Screen::FilePicker => build_picker_info_text(app),
        _ => build_form_info_text(app),
    };

    // INFO 패널로 그린다.
    let info_panel = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_panel, body_layout.side_panel);

    // HELP 바(화면별 단축키)를 그린다.
    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    // STATUS 바(화면 이름·첨부 건수·오류)를 그린다.
    let status_bar = build_status_bar(app);
    f.render_widget(status_bar, main_layout.status_bar);

    // 업로드 진행/결과 모달이 있으면 겹쳐 그린다.
    if !matches!(app.flow.status, SubmitStatus::Idle) {
        draw_status_modal(f, app);
    }

    // 입력 박스가 열려 있으면 맨 위에 겹쳐 그린다.
    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// 주황색 선택 행 스타일.
fn highlight_style() -> Style {
    Style::default()
        .bg(Color::Rgb(255, 140, 0)) // 주황색 배경
        .fg(Color::Black) // 검은 글자
        .add_modifier(Modifier::BOLD)
}

/// 첨부 파일 목록 테이블을 그린다.
fn draw_files_table(f: &mut Frame, app: &App, area: Rect) {
    let files = &app.flow.submission.files;

    // 첨부 목록에서 테이블 행을 조립한다.
    let rows = files
        .iter()
        .enumerate()
        .map(|(i, file)| Row::new(vec![format!("{}", i + 1), file.name.clone(), file.size_mb()]));

    // 첨부 테이블 위젯을 만든다.
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("FILES"))
    .header(Row::new(vec!["#", "파일명", "크기"]).bold())
    .row_highlight_style(highlight_style());

    // 선택 중인 행을 강조한다.
    let mut table_state = ratatui::widgets::TableState::default();
    if !files.is_empty() {
        table_state.select(Some(app.ui.file_selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

/// 디렉터리 목록 테이블을 그린다.
fn draw_picker_table(f: &mut Frame, app: &App, area: Rect) {
    // 항목마다 마킹 여부와 크기(디렉터리는 <DIR>)를 보여 준다.
    let rows = app.picker.entries.iter().map(|e| {
        let mark = if app.picker.is_marked(&e.path) {
            "*"
        } else {
            " "
        };
        let size = if e.is_dir {
            "<DIR>".to_string()
        } else {
            format!("{:.2} MB", e.size as f64 / 1024.0 / 1024.0)
        };
        Row::new(vec![mark.to_string(), e.name.clone(), size])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(10),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("BROWSE: {}", app.picker.cwd.display())),
    )
    .header(Row::new(vec![" ", "이름", "크기"]).bold())
    .row_highlight_style(highlight_style());

    let mut table_state = ratatui::widgets::TableState::default();
    if !app.picker.entries.is_empty() {
        table_state.select(Some(app.picker.selected));
    }
    f.render_stateful_widget(table, area, &mut table_state);
}

/// 제출 화면용 안내 텍스트를 만든다.
fn build_form_info_text(app: &App) -> String {
    let s = &app.flow.submission;

    // 주차 정보는 카탈로그에서 찾아 채운다.
    let (label, topic, section, start) = match weeks::find(&s.week_id) {
        Some(w) => (
            w.label,
            w.topic.unwrap_or("-"),
            w.section.unwrap_or("-"),
            w.start_date.unwrap_or("-"),
        ),
        None => ("(미선택)", "-", "-", "-"),
    };
    let name = if s.name.is_empty() {
        "(미입력)"
    } else {
        s.name.as_str()
    };
    let endpoint = if app.cfg.script_url_missing() {
        "미설정 (t로 설정)"
    } else {
        "설정됨"
    };

    format!(
        "이름: {}\n주차: {}\n주제: {}\n구분: {}\n시작일: {}\n\n첨부: {}개 (한도 {}MB)\n업로드 주소: {}\n\nLog:\n{}",
        name,
        label,
        topic,
        section,
        start,
        s.files.len(),
        app.cfg.upload.max_file_size_mb,
        endpoint,
        app.ui
            .log
            .iter()
            .rev()
            .take(8)
            .rev()
            .cloned()
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

/// 설정 화면용 안내 텍스트를 만든다. 편집 버퍼의 값을 보여 준다.
fn build_settings_info_text(app: &App) -> String {
    // API 키는 화면에 그대로 노출하지 않는다.
    let masked_key = if app.api_key.trim().is_empty() {
        "(비어 있음)"
    } else {
        "********"
    };
    let url = if app.script_url.trim().is_empty() {
        "(비어 있음)"
    } else {
        app.script_url.as_str()
    };

    format!(
        "설정 편집:\n\n[u] 업로드 주소:\n{}\n\n[m] 최대 파일 크기(MB): {}\n[g] Gemini API 키: {}\n[o] Gemini 모델: {}\n\nEnter=저장 | ESC=취소",
        url, app.max_size_mb, masked_key, app.model,
    )
}

/// 파일 선택 화면용 안내 텍스트를 만든다.
fn build_picker_info_text(app: &App) -> String {
    // 마킹된 파일 이름은 마지막 8개까지만 보여 준다.
    let marked: Vec<String> = app
        .picker
        .marked
        .iter()
        .rev()
        .take(8)
        .rev()
        .map(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| p.display().to_string())
        })
        .collect();

    format!(
        "현재 위치:\n{}\n\n마킹: {}개\n{}\n\n마킹 없이 첨부하면 선택 중인\n파일 1개가 붙습니다.",
        app.picker.cwd.display(),
        app.picker.marked.len(),
        marked.join("\n"),
    )
}

/// 상태 바를 만든다.
fn build_status_bar(app: &App) -> Paragraph<'static> {
    let screen_name = match app.ui.screen {
        Screen::Form => "Form",
        Screen::FilePicker => "Files",
        Screen::Settings => "Settings",
        Screen::InitialSetup => "Setup",
    };

    // 첨부 건수를 요약한다.
    let file_info = format!("첨부 {}건", app.flow.submission.files.len());

    // 오류 유무에 따라 상태 문자열을 바꾼다.
    let status_text = if let Some(err) = &app.ui.error {
        format!("[{}] {} | ERROR: {}", screen_name, file_info, err)
    } else {
        format!("[{}] {} | {}", screen_name, file_info, app.ui.status)
    };

    // 상태 바 위젯을 만든다.
    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });

    // 오류일 때는 빨간색으로 강조한다.
    if app.ui.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }

    status_bar
}

/// 업로드 진행/결과 모달을 그린다.
fn draw_status_modal(f: &mut Frame, app: &App) {
    // 진행 중에는 닫을 수 없다는 전제의 중앙 팝업이다.
    let popup_area = layout::centered_popup(f.area(), 60, 16);
    f.render_widget(Clear, popup_area);

    let (title, body, text_style) = match &app.flow.status {
        SubmitStatus::Idle => return,
        SubmitStatus::Uploading => (
            "업로드 중",
            format!(
                "파일을 올리고 있습니다\n\n진행률: {}%\n\n화면을 닫지 말고 잠시만 기다려주세요.",
                app.flow.pct
            ),
            Style::default().fg(Color::Cyan),
        ),
        SubmitStatus::Success(feedback) => {
            // 전송된 파일 이름 목록을 보여 준다. 목록이 비면 접수 안내로 대신한다.
            let names: Vec<String> = app
                .flow
                .submission
                .files
                .iter()
                .map(|file| format!("- {}", file.name))
                .collect();
            let listed = if names.is_empty() {
                format!("- {}", feedback.message)
            } else {
                names.join("\n")
            };
            (
                "제출 완료!",
                format!(
                    "총 {}개의 파일이 잘 전송되었습니다.\n\n{}\n\n\"{}\"\n\nc=추가 업로드 | r=완료",
                    app.flow.submission.files.len().max(1),
                    listed,
                    feedback.encouragement,
                ),
                Style::default().fg(Color::Green),
            )
        }
        SubmitStatus::Error(err) => (
            "문제가 생겼습니다",
            format!(
                "오류가 발생했습니다.\n잠시 후 다시 시도해 주세요.\n\n({})\n\nc=파일만 다시 첨부 | r=닫기",
                err
            ),
            Style::default().fg(Color::Red),
        ),
    };

    let modal = Paragraph::new(body)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(text_style)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(modal, popup_area);
}

/// 마법사 화면을 그린다.
fn draw_wizard_screen(f: &mut Frame, app: &App) {
    // 여백을 두고 세로로 3분할한다.
    let outer_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(20), // 위 여백
            Constraint::Min(10),        // 본문 영역
            Constraint::Percentage(20), // 아래 여백
        ])
        .split(f.area());

    // 단계 번호와 총 단계 수, 안내 문구를 가져온다.
    let step_num = app.wizard_state.get_step_number();
    let total_steps = app.wizard_state.total_steps;
    let prompt = app.wizard_state.get_prompt();

    // 표시할 텍스트를 조립한다.
    let content_text = format!(
        "=== 초기 설정 마법사 ===\n\n단계 {}/{}\n\n{}\n\nEnter=진행 | ESC=단계 건너뛰기",
        step_num, total_steps, prompt
    );

    // 본문을 그린다.
    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Setup"))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(content, outer_layout[1]);

    // 오류가 있으면 하단에 보여 준다.
    if let Some(err) = &app.ui.error {
        // 오류 표시용 레이아웃을 만든다.
        let error_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        // 오류 패널을 구성한다.
        let error_text = Paragraph::new(format!("ERROR: {}", err))
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });

        // 오류 표시를 그린다.
        f.render_widget(error_text, error_layout[1]);
    }
}

/// 현재 화면에 맞는 도움말 문자열을 돌려준다.
fn get_help_text(screen: &Screen, shortcuts: &Shortcuts) -> String {
    match screen {
        Screen::Form => format!(
            "{}: 종료 | {}: 이름 | {}/{}: 주차 | {}: 첨부 | {}: 제거 | {}: 제출 | {}: 설정",
            format_keys(&shortcuts.form.quit),
            format_keys(&shortcuts.form.name),
            format_keys(&shortcuts.form.week_prev),
            format_keys(&shortcuts.form.week_next),
            format_keys(&shortcuts.form.attach),
            format_keys(&shortcuts.form.remove),
            format_keys(&shortcuts.form.submit),
            format_keys(&shortcuts.form.settings)
        ),
        Screen::FilePicker => format!(
            "{}: 마킹 | {}: 폴더 열기 | {}: 상위 폴더 | {}: 첨부 | {}: 취소",
            format_keys(&shortcuts.picker.mark),
            format_keys(&shortcuts.picker.enter),
            format_keys(&shortcuts.picker.parent),
            format_keys(&shortcuts.picker.attach),
            format_keys(&shortcuts.picker.cancel)
        ),
        Screen::Settings => format!(
            "{}: 업로드 주소 | {}: 크기 한도 | {}: API 키 | {}: 모델 | {}: 저장 | {}: 취소",
            format_keys(&shortcuts.settings.script_url),
            format_keys(&shortcuts.settings.max_size),
            format_keys(&shortcuts.settings.api_key),
            format_keys(&shortcuts.settings.model),
            format_keys(&shortcuts.settings.save),
            format_keys(&shortcuts.settings.cancel)
        ),
        Screen::InitialSetup => format!(
            "마법사 단계를 따라가세요 | {}: 진행 | {}: 건너뛰기",
            format_keys(&shortcuts.wizard.proceed),
            format_keys(&shortcuts.wizard.skip)
        ),
    }
}

/// 단축키 배열을 표시용 문자열로 바꾼다.
fn format_keys(keys: &[String]) -> String {
    keys.join("/")
}
