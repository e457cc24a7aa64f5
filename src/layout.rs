//! 레이아웃 계산 헬퍼 함수

use ratatui::prelude::*;

/// 메인 레이아웃의 세 영역
pub struct MainLayout {
    /// 본문(화면별 패널)의 영역
    pub body: Rect,
    /// HELP 바의 영역
    pub help_bar: Rect,
    /// STATUS 바의 영역
    pub status_bar: Rect,
}

/// 본문의 두 영역 (주 패널 + 보조 패널)
pub struct BodyLayout {
    /// 주 패널의 영역
    pub main_panel: Rect,
    /// 보조 패널의 영역
    pub side_panel: Rect,
}

/// 메인 화면을 세 영역으로 나눈다 (Body + HELP + STATUS)
pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Body (주 패널 + 보조 패널)
            Constraint::Length(3), // HELP 바
            Constraint::Length(3), // STATUS 바
        ])
        .split(area);

    MainLayout {
        body: chunks[0],
        help_bar: chunks[1],
        status_bar: chunks[2],
    }
}

/// Body 영역을 둘로 나눈다 (주 패널 55% + 보조 패널 45%)
pub fn create_body_layout(area: Rect) -> BodyLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(55), // 주 패널
            Constraint::Percentage(45), // 보조 패널
        ])
        .split(area);

    BodyLayout {
        main_panel: chunks[0],
        side_panel: chunks[1],
    }
}

/// 가운데 정렬된 팝업 영역을 계산한다
pub fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    // 세로 방향의 여백을 만들어 가운데 행을 꺼낸다.
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    // 가로 방향도 가운데로 맞춰 팝업 영역을 돌려준다.
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}
