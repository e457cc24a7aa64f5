//! 초기 설정 마법사의 상태 관리.

/// 마법사의 각 단계
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WizardStep {
    /// 환영 메시지
    Welcome,
    /// 업로드 주소(Apps Script URL)
    ScriptUrl,
    /// Gemini API 키 (선택)
    GeminiKey,
    /// 완료
    Complete,
}

/// 마법사의 상태 관리
#[derive(Clone, Debug)]
pub struct WizardState {
    /// 현재 단계
    pub current_step: WizardStep,
    /// 전체 단계 수
    pub total_steps: usize,
}

impl WizardState {
    /// 새 마법사 상태를 만든다
    pub fn new() -> Self {
        // 처음에는 Welcome 단계에서 시작한다.
        Self {
            current_step: WizardStep::Welcome,
            total_steps: 4,
        }
    }

    /// 다음 단계로 넘어간다
    pub fn next_step(&mut self) {
        // 현재 단계에 따라 다음 단계를 정한다.
        self.current_step = match self.current_step {
            WizardStep::Welcome => WizardStep::ScriptUrl,
            WizardStep::ScriptUrl => WizardStep::GeminiKey,
            WizardStep::GeminiKey => WizardStep::Complete,
            WizardStep::Complete => WizardStep::Complete,
        };
    }

    /// 현재 단계의 안내 문구를 가져온다
    pub fn get_prompt(&self) -> String {
        // 단계별 설명문을 돌려준다.
        match self.current_step {
            WizardStep::Welcome => {
                "homework_tui에 오신 것을 환영합니다!\n\n이 마법사에서 과제 제출에 필요한 초기 설정을 진행합니다.\nEnter 키를 눌러 시작해 주세요.".to_string()
            }
            WizardStep::ScriptUrl => {
                "업로드 주소 설정\n\n과제 파일을 받는 Google Apps Script 웹 앱 URL을 입력해 주세요.\nEnter 키로 입력 화면을 엽니다.".to_string()
            }
            WizardStep::GeminiKey => {
                "Gemini API 키 설정 (선택)\n\nAI 피드백을 쓰려면 API 키를 입력해 주세요.\n비워 두면 기본 격려 문구를 사용합니다.\nEnter 키로 입력 화면을 열고, ESC 키로 건너뜁니다.".to_string()
            }
            WizardStep::Complete => {
                "설정 완료!\n\n모든 설정이 끝났습니다.\nEnter 키를 눌러 제출 화면으로 이동합니다.".to_string()
            }
        }
    }

    /// 현재 단계 번호를 가져온다 (1부터 시작)
    pub fn get_step_number(&self) -> usize {
        // 단계를 번호에 대응시킨다.
        match self.current_step {
            WizardStep::Welcome => 1,
            WizardStep::ScriptUrl => 2,
            WizardStep::GeminiKey => 3,
            WizardStep::Complete => 4,
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}
