//! 화면 전환용 UI 상태와 화면 종별.

/// TUI에서 현재 표시 중인 화면.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// 메인 제출 폼 화면.
    Form,
    /// 첨부할 파일을 고르는 탐색 화면.
    FilePicker,
    /// 설정 편집 화면.
    Settings,
    /// 초기 설정 마법사 화면.
    InitialSetup,
}

/// 그리기 측과 공유하는 UI 상태.
#[derive(Clone, Debug)]
pub struct UiState {
    /// 현재 화면.
    pub screen: Screen,
    /// 첨부 목록의 선택 행.
    pub file_selected: usize,
    /// 우측 패널에 표시할 알림 로그.
    pub log: Vec<String>,
    /// 화면 하단의 상태 문구.
    pub status: String,
    /// 오류 메시지(강조 표시용).
    pub error: Option<String>,
}
