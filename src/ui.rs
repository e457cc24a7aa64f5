//! TUI용 터미널의 초기화와 복원.

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};

/// 앱 전체에서 쓰는 터미널 타입.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// 대체 화면으로 전환하고 raw 모드를 켠다.
pub fn init_terminal() -> Result<Tui> {
    // 키 입력을 즉시 받을 수 있게 raw 모드로 바꾼다.
    enable_raw_mode()?;
    // 표준 출력을 얻어 대체 화면으로 들어간다.
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    // Crossterm 백엔드로 Terminal을 만든다.
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// 종료 시 터미널 상태를 원래대로 되돌린다.
pub fn restore_terminal() -> Result<()> {
    // raw 모드를 푼다.
    disable_raw_mode()?;
    // 대체 화면을 끝내고 원래 화면으로 돌아간다.
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}
