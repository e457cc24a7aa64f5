//! TUI 안에서 쓰는 문자열 입력 컴포넌트(InputBox).

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::layout::centered_popup;

/// InputBox 입력 상태
#[derive(Clone, Debug)]
pub struct InputBoxState {
    /// 안내 문구
    pub prompt: String,
    /// 현재 입력값
    pub value: String,
    /// 커서 위치 (문자 단위)
    pub cursor: usize,
    /// 입력 확정 시의 콜백 식별자
    pub callback_id: InputCallbackId,
}

/// 입력 확정 시의 콜백 식별자
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCallbackId {
    // 제출 화면용
    FormName,

    // 설정 화면용
    SettingsScriptUrl,
    SettingsMaxSize,
    SettingsApiKey,
    SettingsModel,

    // 마법사 화면용
    WizardScriptUrl,
    WizardApiKey,
}

impl InputBoxState {
    /// 문자 단위 커서를 바이트 오프셋으로 바꾼다. 한글 입력을 위해 필요하다.
    fn byte_idx(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// 문자를 삽입
    pub fn insert_char(&mut self, c: char) {
        // 커서 위치의 바이트 오프셋에 끼워 넣는다.
        let idx = self.byte_idx(self.cursor);
        self.value.insert(idx, c);
        self.cursor += 1;
    }

    /// Backspace (커서 앞 문자를 삭제)
    pub fn backspace(&mut self) {
        // 커서가 맨 앞이면 아무것도 하지 않는다.
        if self.cursor > 0 {
            let idx = self.byte_idx(self.cursor - 1);
            self.value.remove(idx);
            self.cursor -= 1;
        }
    }

    /// Delete (커서 위치의 문자를 삭제)
    pub fn delete(&mut self) {
        // 커서가 맨 끝이면 아무것도 하지 않는다.
        if self.cursor < self.value.chars().count() {
            let idx = self.byte_idx(self.cursor);
            self.value.remove(idx);
        }
    }

    /// 커서를 왼쪽으로 이동
    pub fn move_left(&mut self) {
        // 맨 앞보다 왼쪽으로는 가지 않는다.
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// 커서를 오른쪽으로 이동
    pub fn move_right(&mut self) {
        // 문자 수를 세어 맨 끝을 넘지 않게 한다.
        let char_count = self.value.chars().count();
        if self.cursor < char_count {
            self.cursor += 1;
        }
    }

    /// 커서를 맨 앞으로 이동
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// 커서를 맨 끝으로 이동
    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// 한 줄 전체를 비운다
    pub fn clear_line(&mut self) {
        // 입력값을 비우고 커서도 맨 앞으로 되돌린다.
        self.value.clear();
        self.cursor = 0;
    }
}

/// InputBox를 팝업으로 그린다
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    // 가운데에 놓일 팝업 영역을 계산한다.
    let popup_area = centered_popup(f.area(), 70, 7);

    // 기존 그림을 지우고 팝업 배경을 만든다.
    f.render_widget(Clear, popup_area);

    // 팝업의 테두리와 스타일을 그린다.
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    // 내부 레이아웃(안내 문구 + 입력 칸 + 도움말)을 정의한다.
    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // 안내 문구
            Constraint::Length(1), // 입력 칸
            Constraint::Length(1), // 빈 줄
            Constraint::Length(1), // 도움말
        ])
        .split(popup_area);

    // 안내 문구를 그린다.
    let prompt_widget = Paragraph::new(state.prompt.clone()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt_widget, inner_layout[0]);

    // 입력값 표시(가로 스크롤 지원)를 준비한다.
    let display_width = inner_layout[1].width as usize;
    // 커서가 표시 폭을 넘었을 때의 스크롤 양을 계산한다.
    let scroll_offset = if state.cursor > display_width.saturating_sub(2) {
        state.cursor.saturating_sub(display_width - 2)
    } else {
        0
    };

    // 현재 입력값을 보이는 범위만큼 잘라낸다.
    let chars: Vec<char> = state.value.chars().collect();
    let visible_text: String = chars
        .iter()
        .skip(scroll_offset)
        .take(display_width)
        .collect();

    // 커서 위치를 눈에 보이게 표현한다 (| 삽입).
    let cursor_pos_in_visible = state.cursor.saturating_sub(scroll_offset);
    let visible_with_cursor = if cursor_pos_in_visible <= visible_text.chars().count() {
        let visible_chars: Vec<char> = visible_text.chars().collect();
        let before: String = visible_chars[..cursor_pos_in_visible.min(visible_chars.len())]
            .iter()
            .collect();
        let after: String = visible_chars[cursor_pos_in_visible.min(visible_chars.len())..]
            .iter()
            .collect();
        format!("{}|{}", before, after)
    } else {
        format!("{}|", visible_text)
    };

    // 문자열과 커서를 함께 담은 입력 칸을 그린다.
    let input_widget = Paragraph::new(visible_with_cursor).style(Style::default().fg(Color::Green));
    f.render_widget(input_widget, inner_layout[1]);

    // 도움말을 그린다.
    let help = Paragraph::new("Enter=확정 | ESC=취소 | Ctrl+U=지우기")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner_layout[3]);
}
